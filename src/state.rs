use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    cache,
    config::Config,
    database::error::QueryError,
    error::{Error, HtmlError},
    images::ImageGenerator,
    proxy::{client::build_client, cocktaildb::CocktailDb, deepl::DeepL, openai::OpenAi},
};

const MAX_CONNECTIONS: u32 = 10;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct State {
    pub config: Config,
    pub pool: Pool<Postgres>,
    pub cache: Option<MultiplexedConnection>,
    pub cocktaildb: CocktailDb,
    pub deepl: DeepL,
    pub openai: OpenAi,
    pub images: ImageGenerator,
    pub jwt_secret: Arc<str>,
}

impl State {
    /// Connects to Postgres, applies pending migrations and opens the
    /// optional redis connection.
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&config.database_url)
            .await
            .map_err(QueryError::from)?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            log::error!("Migration failed: {e}");
            HtmlError::InternalServerError.new("Failed to apply migrations")
        })?;
        log::info!("Database ready");

        let cache = match config.redis_url.as_deref() {
            Some(url) => match cache::connect(url).await {
                Ok(connection) => {
                    log::info!("Metadata cache connected");
                    Some(connection)
                }
                Err(e) => {
                    log::warn!("Redis unavailable, metadata reads go to the database: {e}");
                    None
                }
            },
            None => None,
        };

        Self::assemble(config, pool, cache)
    }

    /// State whose pool connects on first use; nothing is contacted here.
    pub fn lazy(config: Config) -> Result<Arc<Self>, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy(&config.database_url)
            .map_err(QueryError::from)?;

        Self::assemble(config, pool, None)
    }

    fn assemble(
        config: Config,
        pool: Pool<Postgres>,
        cache: Option<MultiplexedConnection>,
    ) -> Result<Arc<Self>, Error> {
        let http = build_client()?;

        Ok(Arc::new(Self {
            cocktaildb: CocktailDb::new(http.clone(), &config.cocktaildb_url),
            deepl: DeepL::new(http.clone(), &config.deepl_url, config.deepl_api_key.clone()),
            openai: OpenAi::new(http.clone(), &config.openai_url, config.openai_api_key.clone()),
            images: ImageGenerator::new(
                http,
                &config.gemini_url,
                config.google_api_key.clone(),
                config.image_dir.clone(),
            ),
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            config,
            pool,
            cache,
        }))
    }
}
