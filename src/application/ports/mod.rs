//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod collaborators;
mod completion_cache;
mod document_source;
mod repositories;

pub use collaborators::{
    CollaboratorError, DescriptionEnhancerPort, DescriptionExtractorPort, ScenePromptPort,
};
pub use completion_cache::{generate_cache_key, CacheError, CacheStats, CompletionCachePort};
pub use document_source::{DocumentSourcePort, SourceDocument, SourceError};
pub use repositories::{
    BookReport, BookReportRepositoryPort, ChapterRecord, RepositoryError, ScenePrompt,
};
