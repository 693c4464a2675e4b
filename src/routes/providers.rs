//! Routes backed by third-party services: TheCocktailDB, DeepL, OpenAI and
//! the ingredient icon generator.

use std::sync::Arc;

use serde_json::json;
use warp::{
    filters::BoxedFilter,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use super::{json_body, json_body_limited, with_state};
use crate::{
    constants::MAX_CHAT_BODY_BYTES,
    error::HtmlError,
    form::IconForm,
    proxy::{
        cocktaildb::CocktailQuery,
        deepl::{DeepLQuery, TranslateForm},
        openai::ChatForm,
    },
    state::State,
};

fn invalid_endpoint() -> Rejection {
    HtmlError::InvalidRequest
        .new("Invalid endpoint parameter")
        .into()
}

async fn search(query: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.cocktaildb.search(&query).await?)
}

async fn filter(query: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.cocktaildb.filter(&query).await?)
}

async fn lookup(query: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.cocktaildb.lookup(&query).await?)
}

async fn random(_: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.cocktaildb.random().await?)
}

async fn list(query: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.cocktaildb.list(&query).await?)
}

async fn drink(query: CocktailQuery, state: Arc<State>) -> Result<Response, Rejection> {
    let drink = state.cocktaildb.drink(&query).await?;
    Ok(reply::json(&drink).into_response())
}

async fn translate(
    query: DeepLQuery,
    form: TranslateForm,
    state: Arc<State>,
) -> Result<Response, Rejection> {
    match query.endpoint.as_deref() {
        Some("translate") => Ok(state.deepl.translate(form).await?),
        _ => Err(invalid_endpoint()),
    }
}

async fn languages(query: DeepLQuery, state: Arc<State>) -> Result<Response, Rejection> {
    match query.endpoint.as_deref() {
        Some("languages") => Ok(state.deepl.languages(query.r#type.as_deref()).await?),
        _ => Err(invalid_endpoint()),
    }
}

async fn chat(form: ChatForm, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(state.openai.chat(form).await?)
}

async fn icon(form: IconForm, state: Arc<State>) -> Result<Response, Rejection> {
    let name = form.name()?;
    let url = state.images.ingredient_icon(&name).await?;
    Ok(reply::json(&json!({ "url": url })).into_response())
}

fn cocktaildb(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let base = warp::get()
        .and(warp::query::<CocktailQuery>())
        .and(with_state(state));

    let search = warp::path!("api" / "cocktaildb" / "search")
        .and(base.clone())
        .and_then(search);
    let filter = warp::path!("api" / "cocktaildb" / "filter")
        .and(base.clone())
        .and_then(filter);
    let lookup = warp::path!("api" / "cocktaildb" / "lookup")
        .and(base.clone())
        .and_then(lookup);
    let random = warp::path!("api" / "cocktaildb" / "random")
        .and(base.clone())
        .and_then(random);
    let list = warp::path!("api" / "cocktaildb" / "list")
        .and(base.clone())
        .and_then(list);
    let drink = warp::path!("api" / "cocktaildb" / "drink")
        .and(base)
        .and_then(drink);

    search
        .or(filter)
        .unify()
        .or(lookup)
        .unify()
        .or(random)
        .unify()
        .or(list)
        .unify()
        .or(drink)
        .unify()
        .boxed()
}

pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let translate = warp::path!("api" / "deepl")
        .and(warp::post())
        .and(warp::query::<DeepLQuery>())
        .and(json_body::<TranslateForm>())
        .and(with_state(state.clone()))
        .and_then(translate);

    let languages = warp::path!("api" / "deepl")
        .and(warp::get())
        .and(warp::query::<DeepLQuery>())
        .and(with_state(state.clone()))
        .and_then(languages);

    let chat = warp::path!("api" / "openai")
        .and(warp::post())
        .and(json_body_limited::<ChatForm>(MAX_CHAT_BODY_BYTES))
        .and(with_state(state.clone()))
        .and_then(chat);

    let icon = warp::path!("api" / "ingredients" / "icon")
        .and(warp::post())
        .and(json_body::<IconForm>())
        .and(with_state(state.clone()))
        .and_then(icon);

    cocktaildb(state)
        .or(translate)
        .unify()
        .or(languages)
        .unify()
        .or(chat)
        .unify()
        .or(icon)
        .unify()
        .boxed()
}
