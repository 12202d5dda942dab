//! Sled 存储实现

mod completion_cache;

pub use completion_cache::{SledCacheConfig, SledCompletionCache};
