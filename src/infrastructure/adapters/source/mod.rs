//! Source Adapter - 输入文档读取实现

mod text_source;

pub use text_source::{TextDocumentSource, TextSourceConfig, DEFAULT_CHAPTER_PATTERN};
