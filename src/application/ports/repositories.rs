//! Repository Ports - 出站端口
//!
//! 定义运行结果持久化的抽象接口
//! 具体实现在 infrastructure 层（JSON 文件）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::book::Book;
use crate::domain::DescriptionRecord;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 单章插画提示词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePrompt {
    pub chapter_number: usize,
    pub prompt: String,
}

/// 单章合并后的描述记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub chapter_number: usize,
    pub section_count: usize,
    pub record: DescriptionRecord,
}

/// 一次运行的完整结果（用于持久化）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub book: Book,
    pub chapter_records: Vec<ChapterRecord>,
    pub consolidated: DescriptionRecord,
    pub scene_prompts: Vec<ScenePrompt>,
}

/// Book Report Repository Port
#[async_trait]
pub trait BookReportRepositoryPort: Send + Sync {
    /// 保存运行结果，返回写入位置
    async fn save(&self, report: &BookReport) -> Result<PathBuf, RepositoryError>;

    /// 按书名读取运行结果
    async fn find_by_title(&self, title: &str) -> Result<Option<BookReport>, RepositoryError>;
}
