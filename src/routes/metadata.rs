use std::sync::Arc;

use warp::{
    filters::BoxedFilter,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use super::with_state;
use crate::{
    actions,
    error::HtmlError,
    schema::MetadataType,
    state::State,
};

async fn list(state: Arc<State>) -> Result<Response, Rejection> {
    let metadata = actions::list_metadata_cached(&state.pool, state.cache.as_ref()).await?;
    Ok(reply::json(&metadata).into_response())
}

/// 400 for an unknown type, 404 for a type that was never seeded.
async fn get(r#type: String, state: Arc<State>) -> Result<Response, Rejection> {
    let r#type: MetadataType = r#type.parse()?;

    let entries = actions::get_metadata_cached(r#type, &state.pool, state.cache.as_ref())
        .await?
        .ok_or_else(|| HtmlError::NotFound.new("Metadata not found"))?;

    Ok(reply::json(&entries).into_response())
}

pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let list = warp::path!("api" / "metadata")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list);

    let get = warp::path!("api" / "metadata" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(get);

    list.or(get).unify().boxed()
}
