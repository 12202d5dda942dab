//! Pipeline Command Handlers
//!
//! 两遍处理:
//! 1. 逐章分节、提取、章内合并，并按章节顺序前滚合并为全书描述
//! 2. 用最终的全书描述为每一章生成插画提示词

use chrono::Utc;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::application::commands::ProcessBook;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookReport, ChapterRecord, CollaboratorError, DescriptionEnhancerPort,
    DescriptionExtractorPort, ScenePrompt, ScenePromptPort,
};
use crate::domain::book::{Book, Title};
use crate::domain::{split_into_sections, DescriptionRecord, SectionConfig};

/// 流水线参数
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub section: SectionConfig,
    /// 单章内并发提取的小节数；前滚合并始终按章节顺序串行
    pub extraction_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            section: SectionConfig::default(),
            extraction_concurrency: 1,
        }
    }
}

/// 处理结果
#[derive(Debug, Clone)]
pub struct ProcessBookResponse {
    pub book: Book,
    pub chapter_records: Vec<ChapterRecord>,
    pub consolidated: DescriptionRecord,
    pub scene_prompts: Vec<ScenePrompt>,
}

impl ProcessBookResponse {
    pub fn into_report(self) -> BookReport {
        BookReport {
            title: self.book.title().to_string(),
            generated_at: Utc::now(),
            book: self.book,
            chapter_records: self.chapter_records,
            consolidated: self.consolidated,
            scene_prompts: self.scene_prompts,
        }
    }
}

/// ProcessBook Handler
pub struct ProcessBookHandler {
    extractor: Arc<dyn DescriptionExtractorPort>,
    enhancer: Arc<dyn DescriptionEnhancerPort>,
    prompter: Arc<dyn ScenePromptPort>,
    settings: PipelineSettings,
}

impl ProcessBookHandler {
    pub fn new(
        extractor: Arc<dyn DescriptionExtractorPort>,
        enhancer: Arc<dyn DescriptionEnhancerPort>,
        prompter: Arc<dyn ScenePromptPort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            enhancer,
            prompter,
            settings,
        }
    }

    pub async fn handle(&self, command: ProcessBook) -> Result<ProcessBookResponse, ApplicationError> {
        let title = Title::new(command.title).map_err(ApplicationError::validation)?;
        let mut book = Book::from_chapter_texts(title, command.chapters);
        if book.chapter_count() == 0 {
            return Err(ApplicationError::validation("book has no chapters"));
        }

        tracing::info!(
            book_id = %book.id(),
            title = %book.title(),
            chapters = book.chapter_count(),
            "Processing book"
        );

        let mut chapter_records: Vec<ChapterRecord> = Vec::new();
        let mut consolidated: Option<DescriptionRecord> = None;

        for index in 0..book.chapter_count() {
            let chapter = &book.chapters()[index];
            let chapter_number = chapter.chapter_number();
            let sections = split_into_sections(chapter.text(), &self.settings.section);

            if sections.is_empty() {
                tracing::warn!(chapter = chapter_number, "Chapter has no text, skipped");
                continue;
            }

            let records = self.extract_sections(chapter_number, &sections).await?;
            let chapter_record = self.fold_chapter(chapter_number, records).await?;
            book.record_chapter_record(chapter_number, &chapter_record)?;

            // 新章节的记录总是排在前面
            consolidated = Some(match consolidated.take() {
                None => chapter_record.clone(),
                Some(current) => {
                    self.enhancer
                        .enhance(&[chapter_record.clone(), current])
                        .await?
                }
            });

            tracing::info!(
                chapter = chapter_number,
                sections = sections.len(),
                entities = chapter_record.entry_count(),
                "Chapter folded into consolidated description"
            );

            chapter_records.push(ChapterRecord {
                chapter_number,
                section_count: sections.len(),
                record: chapter_record,
            });
        }

        let consolidated = consolidated
            .ok_or_else(|| ApplicationError::validation("no chapter contains any text"))?;
        book.apply_summaries(&consolidated);

        let scene_prompts = self.generate_scene_prompts(&book, &consolidated).await?;

        tracing::info!(
            title = %book.title(),
            entities = book.global_entities().len(),
            scene_prompts = scene_prompts.len(),
            "Book processed"
        );

        Ok(ProcessBookResponse {
            book,
            chapter_records,
            consolidated,
            scene_prompts,
        })
    }

    /// 提取一章内所有小节，结果保持小节顺序
    async fn extract_sections(
        &self,
        chapter_number: usize,
        sections: &[String],
    ) -> Result<Vec<DescriptionRecord>, CollaboratorError> {
        let concurrency = self.settings.extraction_concurrency.max(1);

        stream::iter(sections.iter().enumerate())
            .map(|(index, section)| async move {
                tracing::debug!(
                    chapter = chapter_number,
                    section = index,
                    chars = section.chars().count(),
                    "Extracting descriptions"
                );
                self.extractor.extract(section).await
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// 章内合并：多个小节时调用合并协作方，单个小节直接使用
    async fn fold_chapter(
        &self,
        chapter_number: usize,
        mut records: Vec<DescriptionRecord>,
    ) -> Result<DescriptionRecord, CollaboratorError> {
        if records.len() == 1 {
            return Ok(records.remove(0));
        }
        tracing::debug!(
            chapter = chapter_number,
            records = records.len(),
            "Enhancing chapter records"
        );
        self.enhancer.enhance(&records).await
    }

    /// 第二遍：每章都使用最终的全书描述
    async fn generate_scene_prompts(
        &self,
        book: &Book,
        consolidated: &DescriptionRecord,
    ) -> Result<Vec<ScenePrompt>, CollaboratorError> {
        let mut prompts = Vec::with_capacity(book.chapter_count());
        for chapter in book.chapters() {
            let prompt = self.prompter.generate(chapter.text(), consolidated).await?;
            tracing::info!(
                chapter = chapter.chapter_number(),
                prompt_len = prompt.len(),
                "Scene prompt generated"
            );
            prompts.push(ScenePrompt {
                chapter_number: chapter.chapter_number(),
                prompt,
            });
        }
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NamedDescription;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 以小节原文作为 artstyle，并记录一个名为 Ahab 的人物
    struct EchoExtractor;

    #[async_trait]
    impl DescriptionExtractorPort for EchoExtractor {
        async fn extract(&self, section: &str) -> Result<DescriptionRecord, CollaboratorError> {
            Ok(DescriptionRecord {
                characters: vec![NamedDescription::new("Ahab", section)],
                artstyle: section.to_string(),
                ..Default::default()
            })
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl DescriptionExtractorPort for FailingExtractor {
        async fn extract(&self, _section: &str) -> Result<DescriptionRecord, CollaboratorError> {
            Err(CollaboratorError::Decode("not json".to_string()))
        }
    }

    /// 记录每次调用的 artstyle 列表，返回 enh(a,b,...)
    #[derive(Default)]
    struct RecordingEnhancer {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl DescriptionEnhancerPort for RecordingEnhancer {
        async fn enhance(
            &self,
            records: &[DescriptionRecord],
        ) -> Result<DescriptionRecord, CollaboratorError> {
            let styles: Vec<String> = records.iter().map(|r| r.artstyle.clone()).collect();
            self.calls.lock().unwrap().push(styles.clone());
            Ok(DescriptionRecord {
                characters: records[0].characters.clone(),
                artstyle: format!("enh({})", styles.join(",")),
                ..Default::default()
            })
        }
    }

    struct EchoPrompter;

    #[async_trait]
    impl ScenePromptPort for EchoPrompter {
        async fn generate(
            &self,
            chapter_text: &str,
            consolidated: &DescriptionRecord,
        ) -> Result<String, CollaboratorError> {
            Ok(format!("{} | {}", chapter_text, consolidated.artstyle))
        }
    }

    fn handler_with(
        extractor: Arc<dyn DescriptionExtractorPort>,
        enhancer: Arc<RecordingEnhancer>,
        settings: PipelineSettings,
    ) -> ProcessBookHandler {
        ProcessBookHandler::new(extractor, enhancer, Arc::new(EchoPrompter), settings)
    }

    fn command(chapters: &[&str]) -> ProcessBook {
        ProcessBook {
            title: "Moby Dick".to_string(),
            chapters: chapters.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_fold_forward_order() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer.clone(), PipelineSettings::default());

        let response = handler.handle(command(&["r1", "r2", "r3"])).await.unwrap();

        assert_eq!(response.consolidated.artstyle, "enh(r3,enh(r2,r1))");
        let calls = enhancer.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                vec!["r2".to_string(), "r1".to_string()],
                vec!["r3".to_string(), "enh(r2,r1)".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_scene_prompts_use_final_description() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let response = handler.handle(command(&["r1", "r2", "r3"])).await.unwrap();

        let prompts: Vec<&str> = response.scene_prompts.iter().map(|p| p.prompt.as_str()).collect();
        assert_eq!(
            prompts,
            vec![
                "r1 | enh(r3,enh(r2,r1))",
                "r2 | enh(r3,enh(r2,r1))",
                "r3 | enh(r3,enh(r2,r1))",
            ]
        );
        let numbers: Vec<usize> = response.scene_prompts.iter().map(|p| p.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_multi_section_chapter_is_enhanced() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let settings = PipelineSettings {
            section: SectionConfig::new(6),
            extraction_concurrency: 4,
        };
        let handler = handler_with(Arc::new(EchoExtractor), enhancer.clone(), settings);

        let response = handler.handle(command(&["aaaa\nbbbb\ncccc"])).await.unwrap();

        assert_eq!(response.chapter_records.len(), 1);
        assert_eq!(response.chapter_records[0].section_count, 3);
        // 并发提取仍保持小节顺序
        assert_eq!(response.consolidated.artstyle, "enh(aaaa,bbbb,cccc)");
        assert_eq!(enhancer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_timeline_recorded_per_chapter() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let response = handler.handle(command(&["r1", "r2", "r3"])).await.unwrap();

        let ahab = response.book.entity("Ahab").unwrap();
        assert_eq!(ahab.get_description_for_chapter(1), "r1");
        assert_eq!(ahab.get_description_for_chapter(2), "r2");
        assert_eq!(ahab.get_description_for_chapter(7), "r3");
        // summary 来自最终记录（RecordingEnhancer 保留第一条记录的人物）
        assert_eq!(ahab.summary(), "r3");
        assert_eq!(response.book.get_entities_for_chapter(2).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chapter_skipped_in_fold() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let response = handler.handle(command(&["r1", "  \n", "r3"])).await.unwrap();

        assert_eq!(response.consolidated.artstyle, "enh(r3,r1)");
        assert_eq!(response.chapter_records.len(), 2);
        assert_eq!(response.scene_prompts.len(), 3);
    }

    #[tokio::test]
    async fn test_book_without_text_fails() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let result = handler.handle(command(&["", "\n"])).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));

        let result = handler.handle(command(&[])).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_blank_title_is_validation_error() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let result = handler
            .handle(ProcessBook {
                title: "   ".to_string(),
                chapters: vec!["r1".to_string()],
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_collaborator_fault_aborts() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(FailingExtractor), enhancer, PipelineSettings::default());

        let result = handler.handle(command(&["r1"])).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Collaborator(CollaboratorError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn test_into_report() {
        let enhancer = Arc::new(RecordingEnhancer::default());
        let handler = handler_with(Arc::new(EchoExtractor), enhancer, PipelineSettings::default());

        let report = handler.handle(command(&["r1"])).await.unwrap().into_report();
        assert_eq!(report.title, "Moby Dick");
        assert_eq!(report.consolidated.artstyle, "r1");
        assert_eq!(report.scene_prompts.len(), 1);
    }
}
