//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// LLM 协作方配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 输入配置
    #[serde(default)]
    pub input: InputConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 补全缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// LLM 协作方配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API Key，为空时回退到 OPENAI_API_KEY 环境变量
    #[serde(default)]
    pub api_key: String,

    /// OpenAI 兼容服务基础 URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,

    /// 离线模式：不发送任何请求，使用固定结果
    #[serde(default)]
    pub local_mode: bool,

    /// 系统提示词目录
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_llm_max_retries() -> u32 {
    3
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_llm_max_retries(),
            local_mode: false,
            prompts_dir: default_prompts_dir(),
        }
    }
}

/// 输入配置
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// 输入目录
    #[serde(default = "default_input_folder")]
    pub folder: PathBuf,

    /// 受支持的扩展名
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 章节标题行正则
    #[serde(default = "default_chapter_pattern")]
    pub chapter_pattern: String,

    /// 章节最少词数，0 表示不过滤
    #[serde(default)]
    pub min_chapter_words: usize,
}

fn default_input_folder() -> PathBuf {
    PathBuf::from("input")
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string()]
}

fn default_chapter_pattern() -> String {
    r"(?i)^\s*chapter\b".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            folder: default_input_folder(),
            extensions: default_extensions(),
            chapter_pattern: default_chapter_pattern(),
            min_chapter_words: 0,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 结果目录
    #[serde(default = "default_output_folder")]
    pub folder: PathBuf,
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: default_output_folder(),
        }
    }
}

/// 流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// 小节最大字符数
    #[serde(default = "default_max_section_chars")]
    pub max_section_chars: usize,

    /// 单章内并发提取数
    #[serde(default = "default_extraction_concurrency")]
    pub extraction_concurrency: usize,
}

fn default_max_section_chars() -> usize {
    20_000
}

fn default_extraction_concurrency() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_section_chars: default_max_section_chars(),
            extraction_concurrency: default_extraction_concurrency(),
        }
    }
}

/// 补全缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 是否启用
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Sled 数据库路径
    #[serde(default = "default_cache_path")]
    pub path: String,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_path() -> String {
    "data/completions.sled".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: default_cache_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
