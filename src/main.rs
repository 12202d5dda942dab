//! Bookscene - 书籍实体描述整合与章节插画提示词生成
//!
//! 流程：读取输入 -> 逐章提取并前滚合并描述 -> 每章生成插画提示词 -> 保存 JSON 结果

mod cli;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use bookscene::application::{
    CompletionCachePort, DescriptionEnhancerPort, DescriptionExtractorPort, DocumentSourcePort,
    LoadBookSources, LoadBookSourcesHandler, PipelineSettings, ProcessBook, ProcessBookHandler,
    SaveBookReport, SaveBookReportHandler, ScenePromptPort,
};
use bookscene::config::{load_config_with_overrides, print_config, AppConfig, ConfigOverrides};
use bookscene::domain::SectionConfig;
use bookscene::infrastructure::adapters::{
    LocalCollaborator, OpenAiClientConfig, OpenAiCollaborator, TextDocumentSource,
    TextSourceConfig,
};
use bookscene::infrastructure::persistence::{
    JsonBookReportRepository, SledCacheConfig, SledCompletionCache,
};

use cli::Cli;

/// 三个协作方端口
struct Collaborators {
    extractor: Arc<dyn DescriptionExtractorPort>,
    enhancer: Arc<dyn DescriptionEnhancerPort>,
    prompter: Arc<dyn ScenePromptPort>,
    /// 启用时的补全缓存，运行结束后输出统计
    cache: Option<Arc<SledCompletionCache>>,
}

fn build_collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    if config.llm.local_mode {
        let local = Arc::new(LocalCollaborator::new());
        return Ok(Collaborators {
            extractor: local.clone(),
            enhancer: local.clone(),
            prompter: local,
            cache: None,
        });
    }

    let client_config = OpenAiClientConfig {
        base_url: config.llm.base_url.clone(),
        api_key: config.llm.api_key.clone(),
        model: config.llm.model.clone(),
        timeout_secs: config.llm.timeout_secs,
        max_retries: config.llm.max_retries,
        prompts_dir: Some(config.llm.prompts_dir.clone()),
        ..Default::default()
    };
    let mut client = OpenAiCollaborator::new(client_config)?;

    // 创建 Sled 补全缓存
    let mut cache = None;
    if config.cache.enabled {
        if let Some(parent) = std::path::Path::new(&config.cache.path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let cache_config = SledCacheConfig {
            db_path: config.cache.path.clone(),
        };
        let sled_cache = SledCompletionCache::new(&cache_config)?.arc();
        client = client.with_cache(sled_cache.clone());
        cache = Some(sled_cache);
    }

    let client = Arc::new(client);
    Ok(Collaborators {
        extractor: client.clone(),
        enhancer: client.clone(),
        prompter: client,
        cache,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let overrides = ConfigOverrides {
        local_mode: cli.local,
        output_folder: cli.output.clone(),
    };
    let config = load_config_with_overrides(cli.config.as_deref(), &overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},bookscene={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Bookscene - 书籍插画提示词生成");
    print_config(&config);

    // 输入文件：命令行指定优先，否则列出输入目录
    let source = Arc::new(TextDocumentSource::new(TextSourceConfig {
        extensions: config.input.extensions.clone(),
        chapter_pattern: config.input.chapter_pattern.clone(),
        min_chapter_words: config.input.min_chapter_words,
    })?);
    let files: Vec<PathBuf> = if cli.files.is_empty() {
        source.list_inputs(&config.input.folder)?
    } else {
        cli.files.clone()
    };

    if !cli.yes && !cli::confirm(&files)? {
        tracing::info!("Aborted by user");
        return Ok(());
    }

    let collaborators = build_collaborators(&config)?;

    // 读取章节
    let loaded = LoadBookSourcesHandler::new(source).handle(LoadBookSources { paths: files })?;
    tracing::info!(
        title = %loaded.title,
        files = loaded.sources.len(),
        chapters = loaded.chapters.len(),
        "Book loaded"
    );

    // 处理
    let settings = PipelineSettings {
        section: SectionConfig::new(config.pipeline.max_section_chars),
        extraction_concurrency: config.pipeline.extraction_concurrency,
    };
    let processor = ProcessBookHandler::new(
        collaborators.extractor,
        collaborators.enhancer,
        collaborators.prompter,
        settings,
    );
    let response = processor
        .handle(ProcessBook {
            title: loaded.title,
            chapters: loaded.chapters,
        })
        .await?;

    // 保存结果
    let report_repo = Arc::new(JsonBookReportRepository::new(&config.output.folder));
    let path = SaveBookReportHandler::new(report_repo)
        .handle(SaveBookReport {
            report: response.into_report(),
        })
        .await?;

    if let Some(cache) = &collaborators.cache {
        let stats = cache.stats().await;
        tracing::info!(
            entries = stats.total_entries,
            hits = stats.hit_count,
            misses = stats.miss_count,
            "Completion cache stats"
        );
        cache.flush()?;
    }

    tracing::info!(path = %path.display(), "Done");

    Ok(())
}
