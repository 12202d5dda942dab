//! Bookscene - 书籍实体描述整合与章节插画提示词生成
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书籍、章节、实体时间线与实体注册表
//! - Sectioner: 章节分节
//! - DescriptionRecord: 协作方之间交换的描述记录
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Extractor, Enhancer, ScenePrompt, CompletionCache, DocumentSource, Repositories）
//! - Commands: 读取、处理（前滚合并 + 场景提示）、保存
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: OpenAI 兼容客户端、离线协作方、文本输入
//! - Persistence: Sled 补全缓存、JSON 结果文件

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config_with_overrides, AppConfig, ConfigOverrides};
