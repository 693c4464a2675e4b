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
    form::{NewRecipe, RecipeForm, RecipeQuery, RecipeUpdate},
    jwt::SessionData,
    middleware::{with_possible_session, with_session},
    schema::{Id, Recipe},
    state::State,
};

async fn list(
    query: RecipeQuery,
    session: Option<SessionData>,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    let viewer = session.map(|s| s.user_id);
    let recipes = actions::fetch_recipes(&query, viewer, &state.pool).await?;
    Ok(reply::json(&recipes).into_response())
}

async fn list_own(session: SessionData, state: Arc<State>) -> Result<Response, Rejection> {
    let recipes = actions::list_own_recipes(session.user_id, &state.pool).await?;
    Ok(reply::json(&recipes).into_response())
}

async fn get(
    id: Id,
    session: Option<SessionData>,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    let recipe = actions::get_visible_recipe(id, session.map(|s| s.user_id), &state.pool).await?;
    Ok(reply::json(&recipe).into_response())
}

/// Stores the image URL for a freshly created recipe. Failures only cost the
/// recipe its image.
async fn attach_image(recipe: Recipe, state: &State) -> Recipe {
    let url = match state.images.recipe_image(&recipe).await {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Image generation failed for recipe {}: {e}", recipe.id);
            return recipe;
        }
    };

    match actions::set_recipe_image(recipe.id, &url, &state.pool).await {
        Ok(updated) => updated,
        Err(e) => {
            log::warn!("Failed to save image for recipe {}: {e}", recipe.id);
            recipe
        }
    }
}

async fn create(
    form: RecipeForm,
    session: Option<SessionData>,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    // Ahead of field validation.
    actions::authorize_visibility(form.is_public.unwrap_or(true), session.as_ref())?;

    let recipe = NewRecipe::try_from(form)?;
    let needs_image = recipe.image.is_none();

    let mut recipe = actions::create_recipe(recipe, session.as_ref(), &state.pool).await?;
    if needs_image {
        recipe = attach_image(recipe, &state).await;
    }

    Ok(reply::with_status(reply::json(&recipe), StatusCode::CREATED).into_response())
}

async fn update(
    id: Id,
    session: SessionData,
    form: RecipeForm,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    let update = RecipeUpdate::try_from(form)?;
    let recipe = actions::update_recipe(id, update, &session, &state.pool).await?;
    Ok(reply::json(&recipe).into_response())
}

async fn delete(id: Id, session: SessionData, state: Arc<State>) -> Result<Response, Rejection> {
    actions::delete_recipe(id, &session, &state.pool).await?;
    Ok(reply::json(&json!({ "message": "Recipe deleted" })).into_response())
}

pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let secret = state.jwt_secret.clone();

    let list = warp::path!("api" / "recipes")
        .and(warp::get())
        .and(warp::query::<RecipeQuery>())
        .and(with_possible_session(secret.clone()))
        .and(with_state(state.clone()))
        .and_then(list);

    let list_own = warp::path!("api" / "recipes" / "my-recipes")
        .and(warp::get())
        .and(with_session(secret.clone()))
        .and(with_state(state.clone()))
        .and_then(list_own);

    let get = warp::path!("api" / "recipes" / Id)
        .and(warp::get())
        .and(with_possible_session(secret.clone()))
        .and(with_state(state.clone()))
        .and_then(get);

    let create = warp::path!("api" / "recipes")
        .and(warp::post())
        .and(json_body::<RecipeForm>())
        .and(with_possible_session(secret.clone()))
        .and(with_state(state.clone()))
        .and_then(create);

    let update = warp::path!("api" / "recipes" / Id)
        .and(warp::put())
        .and(with_session(secret.clone()))
        .and(json_body::<RecipeForm>())
        .and(with_state(state.clone()))
        .and_then(update);

    let delete = warp::path!("api" / "recipes" / Id)
        .and(warp::delete())
        .and(with_session(secret))
        .and(with_state(state))
        .and_then(delete);

    list.or(list_own)
        .unify()
        .or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}
