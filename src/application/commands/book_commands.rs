//! Book Commands

use std::path::PathBuf;

use crate::application::ports::BookReport;

/// 读取输入文件并合并为一本书（书名取第一个文件名）
#[derive(Debug, Clone)]
pub struct LoadBookSources {
    pub paths: Vec<PathBuf>,
}

/// 处理整本书：分节 → 提取 → 合并 → 逐章前滚 → 场景提示
#[derive(Debug, Clone)]
pub struct ProcessBook {
    pub title: String,
    pub chapters: Vec<String>,
}

/// 保存运行结果
#[derive(Debug, Clone)]
pub struct SaveBookReport {
    pub report: BookReport,
}
