//! Local Collaborator - 离线模式使用的协作方
//!
//! 不调用任何外部服务，始终返回固定的描述记录和场景提示词

use async_trait::async_trait;

use crate::application::ports::{
    CollaboratorError, DescriptionEnhancerPort, DescriptionExtractorPort, ScenePromptPort,
};
use crate::domain::DescriptionRecord;

/// 离线模式下每章返回的场景提示词
pub const DEFAULT_SCENE_PROMPT: &str = "Oil painting of a sea captain with a rugged face, gray beard, and deep-set blue eyes, \
standing on a wooden ship's deck. He wears a weathered tricorn hat and a dark blue coat. \
Pointing towards the horizon, a large white whale breaches the water. The crew, men and \
women of diverse descent with various hair colors and styles, hustle around him, readying \
harpoons and adjusting sails. Some wear striped shirts, others don vests and bandanas.";

/// Local Collaborator
#[derive(Debug, Clone, Default)]
pub struct LocalCollaborator;

impl LocalCollaborator {
    pub fn new() -> Self {
        tracing::info!("LocalCollaborator initialized, no requests will be sent");
        Self
    }
}

#[async_trait]
impl DescriptionExtractorPort for LocalCollaborator {
    async fn extract(&self, section: &str) -> Result<DescriptionRecord, CollaboratorError> {
        tracing::debug!(chars = section.chars().count(), "Local extract");
        Ok(DescriptionRecord::canned())
    }
}

#[async_trait]
impl DescriptionEnhancerPort for LocalCollaborator {
    async fn enhance(
        &self,
        records: &[DescriptionRecord],
    ) -> Result<DescriptionRecord, CollaboratorError> {
        tracing::debug!(records = records.len(), "Local enhance");
        Ok(DescriptionRecord::canned())
    }
}

#[async_trait]
impl ScenePromptPort for LocalCollaborator {
    async fn generate(
        &self,
        _chapter_text: &str,
        _consolidated: &DescriptionRecord,
    ) -> Result<String, CollaboratorError> {
        Ok(DEFAULT_SCENE_PROMPT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{PipelineSettings, ProcessBook, ProcessBookHandler};
    use crate::domain::SectionConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_local_ports_return_canned_values() {
        let local = LocalCollaborator::new();
        assert_eq!(local.extract("anything").await.unwrap(), DescriptionRecord::canned());
        assert_eq!(local.enhance(&[]).await.unwrap(), DescriptionRecord::canned());
        assert_eq!(
            local.generate("chapter", &DescriptionRecord::default()).await.unwrap(),
            DEFAULT_SCENE_PROMPT
        );
    }

    #[tokio::test]
    async fn test_offline_book_end_to_end() {
        let local = Arc::new(LocalCollaborator::new());
        let settings = PipelineSettings {
            section: SectionConfig::new(40),
            extraction_concurrency: 2,
        };
        let handler = ProcessBookHandler::new(local.clone(), local.clone(), local, settings);

        let response = handler
            .handle(ProcessBook {
                title: "Moby Dick".to_string(),
                chapters: vec![
                    "Call me Ishmael.\nSome years ago, never mind how long.".to_string(),
                    "The Carpet-Bag.\nI stuffed a shirt or two into my old carpet-bag.".to_string(),
                    "The Spouter-Inn.".to_string(),
                ],
            })
            .await
            .unwrap();

        assert_eq!(response.consolidated, DescriptionRecord::canned());
        assert_eq!(response.scene_prompts.len(), 3);
        assert!(response
            .scene_prompts
            .iter()
            .all(|p| p.prompt == DEFAULT_SCENE_PROMPT));

        let captain = response.book.entity("The Captain").unwrap();
        assert_eq!(captain.descriptions().len(), 3);
        assert_eq!(captain.summary(), DescriptionRecord::canned().characters[0].description);
    }
}
