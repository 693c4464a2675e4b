use std::sync::Arc;

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
    form::{NewUser, SigninForm, SignupForm},
    state::State,
};

async fn signup(form: SignupForm, state: Arc<State>) -> Result<Response, Rejection> {
    let user = NewUser::try_from(form)?;
    let session = actions::register_user(user, &state.jwt_secret, &state.pool).await?;
    Ok(reply::with_status(reply::json(&session), StatusCode::CREATED).into_response())
}

async fn signin(form: SigninForm, state: Arc<State>) -> Result<Response, Rejection> {
    let (email, password) = form.credentials()?;
    let session = actions::login_user(&email, &password, &state.jwt_secret, &state.pool).await?;
    Ok(reply::json(&session).into_response())
}

pub fn routes(state: Arc<State>) -> BoxedFilter<(Response,)> {
    let signup = warp::path!("api" / "auth" / "signup")
        .and(warp::post())
        .and(json_body::<SignupForm>())
        .and(with_state(state.clone()))
        .and_then(signup);

    let signin = warp::path!("api" / "auth" / "signin")
        .and(warp::post())
        .and(json_body::<SigninForm>())
        .and(with_state(state))
        .and_then(signin);

    signup.or(signin).unify().boxed()
}
