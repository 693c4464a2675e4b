//! Refreshes the metadata lists from TheCocktailDB.
//!
//! Each type is fetched, normalised and upserted on its own; a failed fetch
//! leaves that type as it was.

use std::process;

use cocktail_api::{
    actions::{invalidate_metadata_cache, normalize_entries, upsert_metadata},
    cache,
    config::{init_logging, Config},
    proxy::{client::build_client, cocktaildb::CocktailDb},
    schema::MetadataType,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {e}");
        process::exit(1);
    });

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .unwrap_or_else(|e| {
            log::error!("Failed to connect to the database: {e}");
            process::exit(1);
        });

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        log::error!("Migration failed: {e}");
        process::exit(1);
    }

    let http = build_client().unwrap_or_else(|e| {
        log::error!("Failed to build HTTP client: {e}");
        process::exit(1);
    });
    let cocktaildb = CocktailDb::new(http, &config.cocktaildb_url);

    let mut seeded = 0;
    for r#type in MetadataType::ALL {
        let values = match cocktaildb.list_values(r#type).await {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Fetching {} failed, keeping stored list: {e}", r#type.as_str());
                continue;
            }
        };

        let entries = normalize_entries(values);
        if entries.is_empty() {
            log::warn!("No {} entries returned, keeping stored list", r#type.as_str());
            continue;
        }

        match upsert_metadata(r#type, &entries, &pool).await {
            Ok(()) => {
                log::info!("Seeded {} {} entries", entries.len(), r#type.as_str());
                seeded += 1;
            }
            Err(e) => log::error!("Saving {} failed: {e}", r#type.as_str()),
        }
    }

    if let Some(url) = config.redis_url.as_deref() {
        match cache::connect(url).await {
            Ok(mut connection) => match invalidate_metadata_cache(&mut connection).await {
                Ok(()) => log::info!("Metadata cache invalidated"),
                Err(e) => log::warn!("Failed to invalidate metadata cache: {e}"),
            },
            Err(e) => log::warn!("Redis unavailable, cache not invalidated: {e}"),
        }
    }

    log::info!("Seeding complete: {seeded}/{} types updated", MetadataType::ALL.len());
}
