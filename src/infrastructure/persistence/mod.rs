//! Persistence Layer - 数据持久化
//!
//! Sled 补全缓存和 JSON 结果文件

pub mod json;
pub mod sled;

pub use self::json::JsonBookReportRepository;
pub use self::sled::{SledCacheConfig, SledCompletionCache};
