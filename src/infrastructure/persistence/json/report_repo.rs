//! JSON Book Report Repository
//!
//! 每本书一个文件：`{folder}/{title}.json`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{BookReport, BookReportRepositoryPort, RepositoryError};

/// JSON 文件结果仓储
pub struct JsonBookReportRepository {
    /// 输出目录
    folder: PathBuf,
}

impl JsonBookReportRepository {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// 书名中的路径分隔符替换为下划线
    fn report_path(&self, title: &str) -> PathBuf {
        let file_name: String = title
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.folder.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl BookReportRepositoryPort for JsonBookReportRepository {
    async fn save(&self, report: &BookReport) -> Result<PathBuf, RepositoryError> {
        // 确保输出目录存在
        fs::create_dir_all(&self.folder)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let path = self.report_path(&report.title);
        fs::write(&path, json)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Report written");
        Ok(path)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<BookReport>, RepositoryError> {
        let path = self.report_path(title);
        if !fs::try_exists(&path)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?
        {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;
        let report = serde_json::from_str(&json)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ScenePrompt;
    use crate::domain::book::{Book, Title};
    use crate::domain::DescriptionRecord;
    use chrono::Utc;
    use tempfile::tempdir;

    fn report(title: &str) -> BookReport {
        let mut book = Book::from_chapter_texts(Title::new(title).unwrap(), ["Call me Ishmael."]);
        book.record_chapter_record(1, &DescriptionRecord::canned()).unwrap();
        book.apply_summaries(&DescriptionRecord::canned());

        BookReport {
            title: title.to_string(),
            generated_at: Utc::now(),
            book,
            chapter_records: Vec::new(),
            consolidated: DescriptionRecord::canned(),
            scene_prompts: vec![ScenePrompt {
                chapter_number: 1,
                prompt: "A whale.".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let dir = tempdir().unwrap();
        let repo = JsonBookReportRepository::new(dir.path().join("output"));

        let path = repo.save(&report("moby_dick")).await.unwrap();
        assert_eq!(path, dir.path().join("output").join("moby_dick.json"));

        let loaded = repo.find_by_title("moby_dick").await.unwrap().unwrap();
        assert_eq!(loaded.consolidated, DescriptionRecord::canned());
        assert_eq!(loaded.scene_prompts.len(), 1);
        assert_eq!(
            loaded.book.entity("Harpoon").unwrap().get_description_for_chapter(1),
            DescriptionRecord::canned().props[0].description
        );
    }

    #[tokio::test]
    async fn test_find_missing() {
        let dir = tempdir().unwrap();
        let repo = JsonBookReportRepository::new(dir.path());
        assert!(repo.find_by_title("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_title_with_separator() {
        let dir = tempdir().unwrap();
        let repo = JsonBookReportRepository::new(dir.path());
        let path = repo.save(&report("a/b")).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "a_b.json");
    }
}
