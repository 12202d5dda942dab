//! Document Source Port - 输入文档读取
//!
//! 定义输入文件枚举与章节切分的抽象接口，具体实现在 infrastructure/adapters 层

use std::path::{Path, PathBuf};
use thiserror::Error;

/// 文档读取错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Input folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("No valid files found in {0}")]
    NoInputFiles(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(PathBuf),

    #[error("IO error on {path}: {message}")]
    IoError { path: PathBuf, message: String },
}

/// 读取后的文档
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub chapters: Vec<String>,
}

impl SourceDocument {
    /// 文件名（不含扩展名），用作书名
    pub fn stem(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }
}

/// Document Source Port
pub trait DocumentSourcePort: Send + Sync {
    /// 列出目录下所有受支持的输入文件（按文件名排序）
    fn list_inputs(&self, folder: &Path) -> Result<Vec<PathBuf>, SourceError>;

    /// 读取文件并切分为章节
    fn load(&self, path: &Path) -> Result<SourceDocument, SourceError>;
}
