//! The HTTP surface: one filter tree per resource, joined under `/api`.

use std::{convert::Infallible, sync::Arc};

use serde::de::DeserializeOwned;
use warp::{
    filters::BoxedFilter,
    reject::Rejection,
    reply::{Reply, Response},
    Filter,
};

use crate::{constants::MAX_BODY_BYTES, error::handle_rejection, state::State};

pub mod auth;
pub mod favorites;
pub mod metadata;
pub mod providers;
pub mod recipes;

pub fn with_state(
    state: Arc<State>,
) -> impl Filter<Extract = (Arc<State>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// JSON request body, bounded by [`MAX_BODY_BYTES`].
pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    json_body_limited(MAX_BODY_BYTES)
}

pub fn json_body_limited<T>(limit: u64) -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(limit).and(warp::body::json())
}

fn status() -> BoxedFilter<(Response,)> {
    warp::path::end()
        .and(warp::get())
        .map(|| "Cocktail API is running".into_response())
        .boxed()
}

fn images(state: &State) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "images" / ..)
        .and(warp::get())
        .and(warp::fs::dir(state.images.image_dir().to_path_buf()))
        .map(|file: warp::fs::File| file.into_response())
        .boxed()
}

/// The complete application: every resource, static images, CORS, request
/// logging and the error envelope.
pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"]);

    status()
        .or(recipes::routes(state.clone()))
        .unify()
        .or(favorites::routes(state.clone()))
        .unify()
        .or(metadata::routes(state.clone()))
        .unify()
        .or(auth::routes(state.clone()))
        .unify()
        .or(providers::routes(state.clone()))
        .unify()
        .or(images(&state))
        .unify()
        .recover(handle_rejection)
        .unify()
        .with(cors)
        .with(warp::log("cocktail_api::http"))
        .map(|reply| Reply::into_response(reply))
        .boxed()
}
