//! Collaborator Ports - 外部 LLM 协作方抽象
//!
//! 提取、合并、场景提示三个端口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::DescriptionRecord;

/// 协作方错误
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CollaboratorError {
    /// 是否为可重试的临时故障（网络、超时、429、5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::Network(_) | CollaboratorError::Timeout => true,
            CollaboratorError::Service { status, .. } => *status == 429 || *status >= 500,
            CollaboratorError::Decode(_) | CollaboratorError::Configuration(_) => false,
        }
    }
}

/// Description Extractor Port
///
/// 从一个小节的文本中提取人物、道具、地点描述
#[async_trait]
pub trait DescriptionExtractorPort: Send + Sync {
    async fn extract(&self, section: &str) -> Result<DescriptionRecord, CollaboratorError>;
}

/// Description Enhancer Port
///
/// 将多条描述记录合并、清理为一条规范记录
#[async_trait]
pub trait DescriptionEnhancerPort: Send + Sync {
    async fn enhance(
        &self,
        records: &[DescriptionRecord],
    ) -> Result<DescriptionRecord, CollaboratorError>;
}

/// Scene Prompt Port
///
/// 根据章节原文和合并后的描述生成一条插画提示词
#[async_trait]
pub trait ScenePromptPort: Send + Sync {
    async fn generate(
        &self,
        chapter_text: &str,
        consolidated: &DescriptionRecord,
    ) -> Result<String, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(CollaboratorError::Timeout.is_retryable());
        assert!(CollaboratorError::Network("reset".into()).is_retryable());
        assert!(CollaboratorError::Service { status: 429, message: String::new() }.is_retryable());
        assert!(CollaboratorError::Service { status: 503, message: String::new() }.is_retryable());
        assert!(!CollaboratorError::Service { status: 401, message: String::new() }.is_retryable());
        assert!(!CollaboratorError::Decode("bad json".into()).is_retryable());
        assert!(!CollaboratorError::Configuration("no key".into()).is_retryable());
    }
}
