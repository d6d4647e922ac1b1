//! Redis cache implementation using bb8 connection pool.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::{AppCache, CacheError};
use crate::config::RedisCacheConfig;

type RedisPool = Pool<Client>;

const SCAN_BATCH_SIZE: usize = 500;

/// Redis-based cache with bb8 connection pool.
///
/// Every key is stored as `{key_prefix}:{key}` so several deployments can
/// share one Redis database.
pub struct RedisCache {
    pool: RedisPool,
    key_prefix: String,
    default_ttl: u64,
}

impl RedisCache {
    pub async fn new(config: &RedisCacheConfig, default_ttl: u64) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .build(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix.clone(),
            default_ttl,
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }

    /// Walks the keyspace with `SCAN` and deletes each batch as it arrives.
    async fn delete_matching(&self, pattern: String) -> Result<usize, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        let mut cursor = 0_u64;
        let mut removed = 0_usize;
        loop {
            let (next, keys): (u64, Vec<String>) = scan_command(cursor, &pattern)
                .query_async(&mut *conn_ref)
                .await
                .map_err(|e: RedisError| CacheError::Operation(e.to_string()))?;

            if !keys.is_empty() {
                let deleted: usize = conn_ref
                    .del(keys)
                    .await
                    .map_err(|e: RedisError| CacheError::Operation(e.to_string()))?;
                removed += deleted;
            }

            if next == 0 {
                return Ok(removed);
            }
            cursor = next;
        }
    }
}

fn scan_command(cursor: u64, pattern: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("SCAN");
    cmd.arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(SCAN_BATCH_SIZE);
    cmd
}

#[async_trait]
impl AppCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .get(&prefixed)
            .await
            .map_err(|e: RedisError| CacheError::Operation(e.to_string()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);
        // SET EX rejects 0
        let ttl = ttl_seconds.unwrap_or(self.default_ttl).max(1);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .set_ex::<_, _, ()>(&prefixed, value, ttl)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .del::<_, ()>(&prefixed)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        self.delete_matching(self.prefixed_key(pattern)).await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(cmd: &redis::Cmd) -> String {
        String::from_utf8_lossy(&cmd.get_packed_command()).into_owned()
    }

    #[test]
    fn test_pattern_delete_scans_instead_of_keys() {
        let wire = packed(&scan_command(0, "jobhub:jobs:*"));
        assert!(wire.contains("$4\r\nSCAN\r\n"));
        assert!(wire.contains("$5\r\nMATCH\r\n$13\r\njobhub:jobs:*\r\n"));
        assert!(wire.contains("$5\r\nCOUNT\r\n$3\r\n500\r\n"));
        assert!(!wire.contains("KEYS"));
    }

    #[test]
    fn test_scan_resumes_from_cursor() {
        let wire = packed(&scan_command(1742, "jobhub:user:7:*"));
        assert!(wire.starts_with("*6\r\n$4\r\nSCAN\r\n$4\r\n1742\r\n"));
    }
}
