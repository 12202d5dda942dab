//! Book Command Handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::commands::{LoadBookSources, SaveBookReport};
use crate::application::error::ApplicationError;
use crate::application::ports::{BookReportRepositoryPort, DocumentSourcePort};

// ============================================================================
// LoadBookSources
// ============================================================================

/// 读取结果：所有文件的章节按文件顺序拼接
#[derive(Debug, Clone)]
pub struct LoadedBook {
    pub title: String,
    pub chapters: Vec<String>,
    pub sources: Vec<PathBuf>,
}

/// LoadBookSources Handler
pub struct LoadBookSourcesHandler {
    source: Arc<dyn DocumentSourcePort>,
}

impl LoadBookSourcesHandler {
    pub fn new(source: Arc<dyn DocumentSourcePort>) -> Self {
        Self { source }
    }

    pub fn handle(&self, command: LoadBookSources) -> Result<LoadedBook, ApplicationError> {
        let first = command
            .paths
            .first()
            .ok_or_else(|| ApplicationError::validation("no input files"))?;
        let title = first
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| ApplicationError::validation("input file has no name"))?;

        let mut chapters = Vec::new();
        for path in &command.paths {
            let document = self.source.load(path)?;
            tracing::info!(
                path = %path.display(),
                chapters = document.chapters.len(),
                "Source loaded"
            );
            chapters.extend(document.chapters);
        }

        if chapters.is_empty() {
            return Err(ApplicationError::validation("input files contain no chapters"));
        }

        Ok(LoadedBook {
            title,
            chapters,
            sources: command.paths,
        })
    }
}

// ============================================================================
// SaveBookReport
// ============================================================================

/// SaveBookReport Handler
pub struct SaveBookReportHandler {
    report_repo: Arc<dyn BookReportRepositoryPort>,
}

impl SaveBookReportHandler {
    pub fn new(report_repo: Arc<dyn BookReportRepositoryPort>) -> Self {
        Self { report_repo }
    }

    /// 保存结果；同名书籍已有结果时覆盖，并记录旧结果的生成时间
    pub async fn handle(&self, command: SaveBookReport) -> Result<PathBuf, ApplicationError> {
        match self.report_repo.find_by_title(&command.report.title).await {
            Ok(Some(previous)) => tracing::warn!(
                title = %command.report.title,
                previous_generated_at = %previous.generated_at,
                "Overwriting existing book report"
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Existing book report is unreadable"),
        }

        let path = self.report_repo.save(&command.report).await?;

        tracing::info!(
            title = %command.report.title,
            scene_prompts = command.report.scene_prompts.len(),
            path = %path.display(),
            "Book report saved"
        );

        Ok(path)
    }
}
