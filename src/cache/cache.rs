use std::future::Future;

use redis::{aio::MultiplexedConnection, AsyncCommands, FromRedisValue, ToRedisArgs};
use redis_macros::{FromRedisValue, ToRedisArgs};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::database::error::CacheError;

const METADATA_CACHE_BIND: &str = "metadata-cache-key";

// Caching - keys

#[derive(Serialize, Clone, Debug)]
pub struct CacheKey<T: ToString + Serialize> {
    value: T,
    r#type: CacheKeyType,
}

impl<T: ToString + Serialize> std::fmt::Display for CacheKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.r#type {
            CacheKeyType::Metadata => write!(f, "metadata-{}", self.value.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum CacheKeyType {
    Metadata,
}

impl CacheKeyType {
    pub fn new<T: ToString + Serialize>(self, key: T) -> CacheKey<T> {
        CacheKey {
            value: key,
            r#type: self,
        }
    }

    fn lifetime(&self) -> CacheLifetime {
        match self {
            CacheKeyType::Metadata => CacheLifetime::BindMetadataCache,
        }
    }
}

// Cache - wrappers

/// The generation key a cached value is bound to. Bound values go stale as
/// soon as the generation they were stored under changes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum CacheLifetime {
    BindMetadataCache,
}

impl CacheLifetime {
    fn bind_key(&self) -> &'static str {
        match self {
            CacheLifetime::BindMetadataCache => METADATA_CACHE_BIND,
        }
    }

    pub async fn current_bind(
        &self,
        cache: &mut MultiplexedConnection,
    ) -> Result<Option<String>, Error> {
        get_cache_value::<&str, String>(self.bind_key(), cache).await
    }

    pub async fn is_current(
        &self,
        bind: &Option<String>,
        cache: &mut MultiplexedConnection,
    ) -> Result<bool, Error> {
        Ok(bind == &self.current_bind(cache).await?)
    }

    /// Moves the bind key to a fresh generation, invalidating every value bound to it.
    pub async fn invalidate(&self, cache: &mut MultiplexedConnection) -> Result<(), Error> {
        let key = self.bind_key();
        let generation = uuid::Uuid::new_v4().to_string();
        log::info!("> Invalidating {key} ({generation})");
        set_cache_value(key, generation, cache).await
    }
}

#[derive(Serialize, serde::Deserialize, FromRedisValue, ToRedisArgs, Clone)]
pub struct RedisValue<T: serde::Serialize + Send + Sync + Clone> {
    pub value: T,
    lifetime: CacheLifetime,
    bind: Option<String>,
}

impl<T: serde::Serialize + Send + Sync + Clone + for<'a> Deserialize<'a>> RedisValue<T> {
    async fn new(
        value: T,
        lifetime: CacheLifetime,
        cache: &mut MultiplexedConnection,
    ) -> Result<Self, Error> {
        let bind = lifetime.current_bind(cache).await?;

        Ok(Self {
            value,
            lifetime,
            bind,
        })
    }

    async fn lookup<K>(
        key: &CacheKey<K>,
        cache: &mut MultiplexedConnection,
    ) -> Result<Option<RedisValue<T>>, Error>
    where
        K: ToString + Serialize + Clone + Send + Sync,
    {
        let value = get_cache_value::<String, RedisValue<T>>(key.to_string(), cache)
            .await
            .unwrap_or_else(|_| {
                let mut c = cache.clone();
                let k = key.to_string();
                tokio::spawn(async move {
                    log::error!("> Failed to deserialize cached value. Deleting {}", &k);
                    if let Err(e) = delete_cache_value(k, &mut c).await {
                        log::error!("> Failed to delete cached value! {e}");
                    }
                });
                None
            });

        match value {
            Some(value) => {
                log::trace!("> Found {}", key);
                if value.lifetime.is_current(&value.bind, cache).await? {
                    return Ok(Some(value));
                }
                log::trace!("> Invalidated {}", key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn store<K>(
        key: &CacheKey<K>,
        value: T,
        cache: &mut MultiplexedConnection,
    ) -> Result<RedisValue<T>, Error>
    where
        K: ToString + Serialize + Clone + Send + Sync,
    {
        let value = RedisValue::new(value, key.r#type.lifetime(), cache).await?;

        set_cache_value::<String, RedisValue<T>>(key.to_string(), value.clone(), cache).await?;

        Ok(value)
    }

    /// Like [`RedisValue::get_or`], but a `None` from the callback is returned
    /// without being cached.
    pub async fn get_or_optional<'a, F, Fut, K>(
        key: CacheKey<K>,
        cache: &mut MultiplexedConnection,
        callback: F,
    ) -> Result<Option<RedisValue<T>>, Error>
    where
        K: ToString + Serialize + Clone + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>, Error>> + Send + 'a,
    {
        if let Some(value) = Self::lookup(&key, cache).await? {
            return Ok(Some(value));
        }

        log::trace!("> Fetching {}", key);
        match callback().await? {
            Some(value) => match Self::store(&key, value.clone(), cache).await {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    log::error!("{e:?}");
                    Ok(Some(RedisValue {
                        value,
                        lifetime: key.r#type.lifetime(),
                        bind: None,
                    }))
                }
            },
            None => Ok(None),
        }
    }

    pub async fn get_or<'a, F, Fut, K>(
        key: CacheKey<K>,
        cache: &mut MultiplexedConnection,
        callback: F,
    ) -> Result<RedisValue<T>, Error>
    where
        K: ToString + Serialize + Clone + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'a,
    {
        if let Some(value) = Self::lookup(&key, cache).await? {
            return Ok(value);
        }

        log::trace!("> Fetching {}", key);
        let value = callback().await?;
        Self::store(&key, value, cache).await
    }
}

// Cache - raw handlers

pub async fn set_cache_value<K: ToRedisArgs + Send + Sync, V: ToRedisArgs + Send + Sync>(
    key: K,
    value: V,
    cache: &mut MultiplexedConnection,
) -> Result<(), Error> {
    let _: () = cache
        .set(key, value)
        .await
        .map_err(|e| Error::from(CacheError::from(e)))?;

    Ok(())
}

pub async fn delete_cache_value<K: ToRedisArgs + Send + Sync>(
    key: K,
    cache: &mut MultiplexedConnection,
) -> Result<(), Error> {
    let _: () = cache
        .del(key)
        .await
        .map_err(|e| Error::from(CacheError::from(e)))?;

    Ok(())
}

pub async fn get_cache_value<K: ToRedisArgs + Send + Sync, V: FromRedisValue>(
    key: K,
    cache: &mut MultiplexedConnection,
) -> Result<Option<V>, Error> {
    let value: Option<V> = cache
        .get(key)
        .await
        .map_err(|e| Error::from(CacheError::from(e)))?;

    Ok(value)
}

pub async fn connect(url: &str) -> Result<MultiplexedConnection, Error> {
    let client = redis::Client::open(url).map_err(|e| Error::from(CacheError::from(e)))?;
    client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| Error::from(CacheError::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_keys_are_prefixed() {
        assert_eq!(CacheKeyType::Metadata.new("glass").to_string(), "metadata-glass");
        assert_eq!(CacheKeyType::Metadata.new("all").to_string(), "metadata-all");
    }

    #[test]
    fn metadata_keys_bind_to_metadata_generation() {
        let key = CacheKeyType::Metadata.new("category");
        assert_eq!(key.r#type.lifetime(), CacheLifetime::BindMetadataCache);
        assert_eq!(CacheLifetime::BindMetadataCache.bind_key(), METADATA_CACHE_BIND);
    }

    #[test]
    fn cached_values_carry_their_generation() {
        let value = RedisValue {
            value: vec![String::from("Coupe")],
            lifetime: CacheLifetime::BindMetadataCache,
            bind: Some(String::from("generation-1")),
        };

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["value"][0], "Coupe");
        assert_eq!(json["bind"], "generation-1");
    }
}
