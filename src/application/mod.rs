//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（协作方、补全缓存、文档读取、结果仓储）
//! - commands: 命令及处理器（读取、处理、保存）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{
        LoadBookSourcesHandler, LoadedBook, PipelineSettings, ProcessBookHandler,
        ProcessBookResponse, SaveBookReportHandler,
    },
    LoadBookSources, ProcessBook, SaveBookReport,
};

pub use error::ApplicationError;

pub use ports::{
    // Collaborators
    CollaboratorError,
    DescriptionEnhancerPort,
    DescriptionExtractorPort,
    ScenePromptPort,
    // Completion cache
    generate_cache_key,
    CacheError,
    CacheStats,
    CompletionCachePort,
    // Document source
    DocumentSourcePort,
    SourceDocument,
    SourceError,
    // Repositories
    BookReport,
    BookReportRepositoryPort,
    ChapterRecord,
    RepositoryError,
    ScenePrompt,
};
