pub const CHAPTER_TEMPLATE: &str = include_str!("../templates/chapter.html");
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

pub const CHAPTER_JS: &str = include_str!("../templates/chapter.js");
