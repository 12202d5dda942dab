//! Completion Cache Port - LLM 补全结果缓存
//!
//! 定义补全缓存的抽象接口，具体实现使用 Sled

use async_trait::async_trait;
use thiserror::Error;

/// Completion Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Completion Cache Port
///
/// 缓存 key: md5(model + system prompt + user prompt)
#[async_trait]
pub trait CompletionCachePort: Send + Sync {
    /// 存储补全文本
    async fn put(&self, cache_key: &str, completion: &str) -> Result<(), CacheError>;

    /// 根据缓存 key 获取补全文本
    async fn get(&self, cache_key: &str) -> Result<Option<String>, CacheError>;

    /// 获取缓存统计信息
    async fn stats(&self) -> CacheStats;
}

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
}

/// 生成缓存 key
///
/// 各部分之间用 NUL 分隔，避免拼接歧义
pub fn generate_cache_key(model: &str, system_prompt: &str, user_prompt: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(model.as_bytes());
    context.consume([0u8]);
    context.consume(system_prompt.as_bytes());
    context.consume([0u8]);
    context.consume(user_prompt.as_bytes());
    format!("{:x}", context.compute())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable() {
        let a = generate_cache_key("gpt-4", "system", "user");
        let b = generate_cache_key("gpt-4", "system", "user");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_cache_key_depends_on_every_part() {
        let base = generate_cache_key("gpt-4", "system", "user");
        assert_ne!(base, generate_cache_key("gpt-4o", "system", "user"));
        assert_ne!(base, generate_cache_key("gpt-4", "other", "user"));
        assert_ne!(base, generate_cache_key("gpt-4", "system", "other"));
        // 拼接边界不同
        assert_ne!(
            generate_cache_key("gpt-4", "ab", "c"),
            generate_cache_key("gpt-4", "a", "bc")
        );
    }
}
