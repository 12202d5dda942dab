//! 章节分节器
//!
//! 将章节原文切分为有上限的小节，作为提取请求的最小单位。
//! 段落（按 `\n` 划分）永远不会被拆开。

/// 默认小节最大字符数
pub const DEFAULT_MAX_SECTION_CHARS: usize = 20_000;

/// 分节配置
#[derive(Debug, Clone)]
pub struct SectionConfig {
    /// 小节最大字符数（按 Unicode 字符计）
    pub max_chars: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_SECTION_CHARS,
        }
    }
}

impl SectionConfig {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

/// 收尾当前小节：去除首尾空白，空小节直接丢弃
fn finalize(current: &mut String, sections: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
    current.clear();
}

/// 将文本切分为小节
///
/// 分节策略：
/// 1. 按 `\n` 划分段落
/// 2. 贪心累积：`len(当前小节) + len(段落) < max_chars` 时追加段落（保留换行）
/// 3. 否则收尾当前小节，以触发溢出的段落开始新小节
///
/// 单个段落超过 `max_chars` 时不会被拆分，而是单独成为一个超长小节。
pub fn split_into_sections(text: &str, config: &SectionConfig) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();
    // current 的字符数（含换行），避免每次重新计数
    let mut current_len = 0usize;

    for paragraph in text.split('\n') {
        let paragraph_len = paragraph.chars().count();

        if current_len + paragraph_len >= config.max_chars {
            finalize(&mut current, &mut sections);
            current_len = 0;
        }

        current.push_str(paragraph);
        current.push('\n');
        current_len += paragraph_len + 1;
    }

    finalize(&mut current, &mut sections);

    sections
}

/// 使用默认配置分节（便捷方法）
pub fn split_into_sections_default(text: &str) -> Vec<String> {
    split_into_sections(text, &SectionConfig::default())
}
