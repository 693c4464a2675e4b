use std::sync::Arc;

use serde_json::json;
use warp::{
    filters::BoxedFilter,
    http::StatusCode,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use super::{json_body, with_state};
use crate::{
    actions,
    form::{FavoriteForm, FavoriteQuery, GroupForm},
    schema::Id,
    state::State,
};

/// Every group, the default one created first if needed.
async fn list(state: Arc<State>) -> Result<Response, Rejection> {
    let groups = actions::list_groups(&state.pool).await?;
    Ok(reply::json(&groups).into_response())
}

async fn create_group(form: GroupForm, state: Arc<State>) -> Result<Response, Rejection> {
    let name = form.name()?;
    let group = actions::create_group(&name, &state.pool).await?;
    Ok(reply::with_status(reply::json(&group), StatusCode::CREATED).into_response())
}

async fn delete_group(id: Id, state: Arc<State>) -> Result<Response, Rejection> {
    actions::delete_group(id, &state.pool).await?;
    Ok(reply::json(&json!({ "message": "Group deleted" })).into_response())
}

async fn add(form: FavoriteForm, state: Arc<State>) -> Result<Response, Rejection> {
    let recipe_id = form.recipe_reference()?;
    let group = actions::add_favorite(&recipe_id, form.group_id, &state.pool).await?;
    Ok(reply::json(&group).into_response())
}

async fn remove(
    recipe_id: String,
    query: FavoriteQuery,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    let group = actions::remove_favorite(&recipe_id, query.group_id, &state.pool).await?;
    Ok(reply::json(&group).into_response())
}

pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let list = warp::path!("api" / "favorites")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list);

    let create_group = warp::path!("api" / "favorites" / "group")
        .and(warp::post())
        .and(json_body::<GroupForm>())
        .and(with_state(state.clone()))
        .and_then(create_group);

    let delete_group = warp::path!("api" / "favorites" / "group" / Id)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(delete_group);

    let add = warp::path!("api" / "favorites")
        .and(warp::post())
        .and(json_body::<FavoriteForm>())
        .and(with_state(state.clone()))
        .and_then(add);

    let remove = warp::path!("api" / "favorites" / String)
        .and(warp::delete())
        .and(warp::query::<FavoriteQuery>())
        .and(with_state(state))
        .and_then(remove);

    list.or(create_group)
        .unify()
        .or(delete_group)
        .unify()
        .or(add)
        .unify()
        .or(remove)
        .unify()
        .boxed()
}
