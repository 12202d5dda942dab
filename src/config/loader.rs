//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行覆盖项
//! 2. 环境变量
//! 3. 配置文件（bookscene.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["bookscene", "bookscene.local"];

/// API Key 回退使用的标准环境变量
const API_KEY_FALLBACK_ENV: &str = "OPENAI_API_KEY";

/// 示例配置中的占位符
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// 命令行覆盖项（优先级高于环境变量）
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub local_mode: bool,
    pub output_folder: Option<PathBuf>,
}

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 命令行覆盖项
/// 2. 环境变量（前缀 `BOOKSCENE_`，层级分隔符 `__`）
/// 3. 配置文件（`config_path`，为 None 时搜索 bookscene.toml 或 bookscene.local.toml）
/// 4. 默认值
///
/// # 环境变量示例
/// - `BOOKSCENE_LLM__MODEL=gpt-4o`
/// - `BOOKSCENE_LLM__LOCAL_MODE=true`
/// - `BOOKSCENE_PIPELINE__EXTRACTION_CONCURRENCY=4`
///
/// `llm.api_key` 为空时读取 `OPENAI_API_KEY`。
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("llm.api_key", "")?
        .set_default("llm.base_url", "https://api.openai.com/v1")?
        .set_default("llm.model", "gpt-4")?
        .set_default("llm.timeout_secs", 120)?
        .set_default("llm.max_retries", 3)?
        .set_default("llm.local_mode", false)?
        .set_default("llm.prompts_dir", "prompts")?
        .set_default("input.folder", "input")?
        .set_default("input.extensions", vec!["txt", "md"])?
        .set_default("input.chapter_pattern", r"(?i)^\s*chapter\b")?
        .set_default("input.min_chapter_words", 0)?
        .set_default("output.folder", "output")?
        .set_default("pipeline.max_section_chars", 20_000)?
        .set_default("pipeline.extraction_concurrency", 1)?
        .set_default("cache.enabled", true)?
        .set_default("cache.path", "data/completions.sled")?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量
    // 前缀: BOOKSCENE_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("BOOKSCENE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 命令行覆盖项
    if overrides.local_mode {
        builder = builder.set_override("llm.local_mode", true)?;
    }
    if let Some(folder) = &overrides.output_folder {
        builder = builder.set_override("output.folder", folder.to_string_lossy().into_owned())?;
    }

    // 5. 构建配置
    let config = builder.build()?;

    // 6. 反序列化为 AppConfig
    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 7. API Key 回退
    apply_api_key_fallback(&mut app_config, std::env::var(API_KEY_FALLBACK_ENV).ok());

    // 8. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

fn apply_api_key_fallback(config: &mut AppConfig, fallback: Option<String>) {
    if config.llm.api_key.trim().is_empty() {
        if let Some(key) = fallback.filter(|k| !k.trim().is_empty()) {
            config.llm.api_key = key;
        }
    }
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 离线模式不需要 API Key
    if !config.llm.local_mode {
        let key = config.llm.api_key.trim();
        if key.is_empty() || key == API_KEY_PLACEHOLDER {
            return Err(ConfigError::ValidationError(format!(
                "LLM API key is not set (set llm.api_key, BOOKSCENE_LLM__API_KEY or {}), \
                 or enable local mode",
                API_KEY_FALLBACK_ENV
            )));
        }
        if config.llm.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "LLM base URL cannot be empty".to_string(),
            ));
        }
    }

    if config.input.folder.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Input folder cannot be empty".to_string(),
        ));
    }

    if config.output.folder.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Output folder cannot be empty".to_string(),
        ));
    }

    if config.pipeline.max_section_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Max section chars cannot be 0".to_string(),
        ));
    }

    if config.pipeline.extraction_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "Extraction concurrency cannot be 0".to_string(),
        ));
    }

    if let Err(e) = Regex::new(&config.input.chapter_pattern) {
        return Err(ConfigError::ValidationError(format!(
            "Invalid chapter pattern: {}",
            e
        )));
    }

    if config.cache.enabled && config.cache.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Cache path cannot be empty when cache is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    if config.llm.local_mode {
        tracing::info!("LLM: local mode, no requests will be sent");
    } else {
        tracing::info!("LLM URL: {}", config.llm.base_url);
        tracing::info!("LLM Model: {}", config.llm.model);
        tracing::info!("LLM API Key: {}", redact(&config.llm.api_key));
        tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
        tracing::info!("LLM Max Retries: {}", config.llm.max_retries);
    }
    tracing::info!("Prompts Directory: {:?}", config.llm.prompts_dir);
    tracing::info!("Input Folder: {:?}", config.input.folder);
    tracing::info!("Input Extensions: {:?}", config.input.extensions);
    tracing::info!("Output Folder: {:?}", config.output.folder);
    tracing::info!("Max Section Chars: {}", config.pipeline.max_section_chars);
    tracing::info!(
        "Extraction Concurrency: {}",
        config.pipeline.extraction_concurrency
    );
    tracing::info!("Cache Enabled: {}", config.cache.enabled);
    if config.cache.enabled {
        tracing::info!("Cache Path: {}", config.cache.path);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

fn redact(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
