//! Sled-based Completion Cache Implementation

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{CacheError, CacheStats, CompletionCachePort};

const KEY_PREFIX: &str = "completion:";

/// Sled 缓存配置
#[derive(Debug, Clone)]
pub struct SledCacheConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledCacheConfig {
    fn default() -> Self {
        Self {
            db_path: "data/completions.sled".to_string(),
        }
    }
}

/// 内部缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InternalCacheEntry {
    completion: String,
    created_at: i64,
}

/// Sled 补全缓存
pub struct SledCompletionCache {
    db: Db,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledCompletionCache {
    /// 创建新的缓存实例
    pub fn new(config: &SledCacheConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            entries = db.scan_prefix(KEY_PREFIX).count(),
            "SledCompletionCache initialized"
        );

        Ok(Self {
            db,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    /// 打开现有缓存
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let config = SledCacheConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CompletionCachePort for SledCompletionCache {
    async fn put(&self, cache_key: &str, completion: &str) -> Result<(), CacheError> {
        let entry = InternalCacheEntry {
            completion: completion.to_string(),
            created_at: Utc::now().timestamp(),
        };

        let entry_bytes =
            bincode::serialize(&entry).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.db
            .insert(format!("{}{}", KEY_PREFIX, cache_key), entry_bytes)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::debug!(
            cache_key = %cache_key,
            size_bytes = completion.len(),
            "Completion cached"
        );

        Ok(())
    }

    async fn get(&self, cache_key: &str) -> Result<Option<String>, CacheError> {
        let key = format!("{}{}", KEY_PREFIX, cache_key);

        match self.db.get(&key) {
            Ok(Some(data)) => {
                let entry: InternalCacheEntry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.completion))
            }
            Ok(None) => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => Err(CacheError::DatabaseError(e.to_string())),
        }
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.db.scan_prefix(KEY_PREFIX).count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::generate_cache_key;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cache_put_get() {
        let dir = tempdir().unwrap();
        let cache = SledCompletionCache::open(dir.path().join("test.sled")).unwrap();
        let key = generate_cache_key("gpt-4", "system", "Call me Ishmael.");

        assert_eq!(cache.get(&key).await.unwrap(), None);

        cache.put(&key, r#"{"artstyle":"ink"}"#).await.unwrap();
        let result = cache.get(&key).await.unwrap();
        assert_eq!(result.as_deref(), Some(r#"{"artstyle":"ink"}"#));

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[tokio::test]
    async fn test_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sled");

        {
            let cache = SledCompletionCache::open(&path).unwrap();
            cache.put("key", "value").await.unwrap();
            cache.flush().unwrap();
        }

        let cache = SledCompletionCache::open(&path).unwrap();
        assert_eq!(cache.get("key").await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let cache = SledCompletionCache::open(dir.path().join("test.sled")).unwrap();

        cache.put("key", "first").await.unwrap();
        cache.put("key", "second").await.unwrap();

        assert_eq!(cache.get("key").await.unwrap().as_deref(), Some("second"));
        assert_eq!(cache.stats().await.total_entries, 1);
    }
}
