//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::ports::{CollaboratorError, RepositoryError, SourceError};
use crate::domain::book::BookError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部协作方错误（提取 / 合并 / 场景提示）
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// 领域规则错误
    #[error("Domain error: {0}")]
    Domain(#[from] BookError),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 输入文档错误
    #[error("Source error: {0}")]
    SourceError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<SourceError> for ApplicationError {
    fn from(err: SourceError) -> Self {
        Self::SourceError(err.to_string())
    }
}
