//! Book Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("实体不存在: {0}")]
    EntityNotFound(String),

    #[error("无效的章节: {0}")]
    InvalidChapter(String),
}
