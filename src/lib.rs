pub mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod schema;
}
pub mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
}
pub mod cache {
    #[allow(clippy::module_inception)]
    mod cache;

    pub use self::cache::*;
}
pub mod proxy {
    pub mod client;
    pub mod cocktaildb;
    pub mod deepl;
    pub mod openai;
}
pub mod routes;

pub mod config;
pub mod constants;
pub mod error;
pub mod images;
pub mod parser;
pub mod state;

pub use authentication::*;
pub use database::{actions, form, schema};
