use std::collections::BTreeMap;

use redis::aio::MultiplexedConnection;
use sqlx::{Pool, Postgres};

use crate::{
    cache::{CacheKeyType, CacheLifetime, RedisValue},
    database::error::QueryError,
    error::Error,
    schema::{Metadata, MetadataType},
};

pub type MetadataMap = BTreeMap<String, Vec<String>>;

pub async fn get_metadata(
    r#type: MetadataType,
    pool: &Pool<Postgres>,
) -> Result<Option<Vec<String>>, Error> {
    let row: Option<Metadata> = sqlx::query_as("SELECT * FROM metadata WHERE type = $1")
        .bind(r#type)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row.map(|m| m.entries))
}

pub async fn list_metadata(pool: &Pool<Postgres>) -> Result<MetadataMap, Error> {
    let rows: Vec<Metadata> = sqlx::query_as("SELECT * FROM metadata")
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(rows
        .into_iter()
        .map(|m| (m.r#type.as_str().to_string(), m.entries))
        .collect())
}

/// Replaces the stored list for a type wholesale.
pub async fn upsert_metadata(
    r#type: MetadataType,
    entries: &[String],
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query(
        "
        INSERT INTO metadata (type, entries, last_updated)
        VALUES ($1, $2, NOW())
        ON CONFLICT (type) DO UPDATE
        SET entries = $2, last_updated = NOW()
    ",
    )
    .bind(r#type)
    .bind(entries)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(())
}

/// Sorted, trimmed and deduplicated, with blank entries dropped.
pub fn normalize_entries<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    entries.sort();
    entries.dedup();
    entries
}

/// Reads one type through the cache when one is connected. Cache failures
/// fall back to the database.
pub async fn get_metadata_cached(
    r#type: MetadataType,
    pool: &Pool<Postgres>,
    cache: Option<&MultiplexedConnection>,
) -> Result<Option<Vec<String>>, Error> {
    if let Some(cache) = cache {
        let mut cache = cache.clone();
        let p = pool.clone();
        let cached = RedisValue::get_or_optional(
            CacheKeyType::Metadata.new(r#type.as_str()),
            &mut cache,
            move || async move { get_metadata(r#type, &p).await },
        )
        .await;

        match cached {
            Ok(value) => return Ok(value.map(|v| v.value)),
            Err(e) => log::warn!("Metadata cache unavailable: {e}"),
        }
    }

    get_metadata(r#type, pool).await
}

pub async fn list_metadata_cached(
    pool: &Pool<Postgres>,
    cache: Option<&MultiplexedConnection>,
) -> Result<MetadataMap, Error> {
    if let Some(cache) = cache {
        let mut cache = cache.clone();
        let p = pool.clone();
        let cached = RedisValue::get_or(
            CacheKeyType::Metadata.new("all"),
            &mut cache,
            move || async move { list_metadata(&p).await },
        )
        .await;

        match cached {
            Ok(value) => return Ok(value.value),
            Err(e) => log::warn!("Metadata cache unavailable: {e}"),
        }
    }

    list_metadata(pool).await
}

/// Drops every cached metadata read; called after a seed run.
pub async fn invalidate_metadata_cache(cache: &mut MultiplexedConnection) -> Result<(), Error> {
    CacheLifetime::BindMetadataCache.invalidate(cache).await
}
