//! Text Document Source - 纯文本 / Markdown 输入
//!
//! 实现 DocumentSourcePort trait：按扩展名筛选目录中的文件，
//! 再按章节标题行切分全文。

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::application::ports::{DocumentSourcePort, SourceDocument, SourceError};

/// 默认章节标题模式
pub const DEFAULT_CHAPTER_PATTERN: &str = r"(?i)^\s*chapter\b";

/// 文本输入配置
#[derive(Debug, Clone)]
pub struct TextSourceConfig {
    /// 受支持的扩展名（不含点，不区分大小写）
    pub extensions: Vec<String>,
    /// 章节标题行的正则
    pub chapter_pattern: String,
    /// 少于该词数的章节被丢弃，0 表示不过滤
    pub min_chapter_words: usize,
}

impl Default for TextSourceConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string(), "md".to_string()],
            chapter_pattern: DEFAULT_CHAPTER_PATTERN.to_string(),
            min_chapter_words: 0,
        }
    }
}

/// 文本文档读取器
pub struct TextDocumentSource {
    extensions: Vec<String>,
    chapter_pattern: Regex,
    min_chapter_words: usize,
}

impl TextDocumentSource {
    pub fn new(config: TextSourceConfig) -> Result<Self, regex::Error> {
        let chapter_pattern = Regex::new(&config.chapter_pattern)?;
        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            chapter_pattern,
            min_chapter_words: config.min_chapter_words,
        })
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|s| s.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// 在标题行处切分；第一个标题之前的非空文本单独成章
    pub fn split_chapters(&self, text: &str) -> Vec<String> {
        let mut chapters = Vec::new();
        let mut current = String::new();

        for line in text.lines() {
            if self.chapter_pattern.is_match(line) && !current.trim().is_empty() {
                chapters.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            current.push('\n');
        }
        if !current.trim().is_empty() {
            chapters.push(current);
        }

        chapters
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| c.split_whitespace().count() >= self.min_chapter_words)
            .collect()
    }
}

impl DocumentSourcePort for TextDocumentSource {
    fn list_inputs(&self, folder: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if !folder.is_dir() {
            return Err(SourceError::FolderNotFound(folder.to_path_buf()));
        }

        let entries = std::fs::read_dir(folder).map_err(|e| SourceError::IoError {
            path: folder.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.is_supported(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::NoInputFiles(folder.to_path_buf()));
        }

        tracing::debug!(folder = %folder.display(), files = paths.len(), "Input files listed");
        Ok(paths)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument, SourceError> {
        if !self.is_supported(path) {
            return Err(SourceError::UnsupportedFile(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|e| SourceError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let chapters = self.split_chapters(&text);

        tracing::debug!(
            path = %path.display(),
            chars = text.chars().count(),
            chapters = chapters.len(),
            "Document split into chapters"
        );

        Ok(SourceDocument {
            path: path.to_path_buf(),
            chapters,
        })
    }
}
