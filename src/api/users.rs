use super::ApiState;
use super::error::ApiResult;
use crate::model::{NewUser, User};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

pub async fn register(
    State(state): State<ApiState>,
    Json(new): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.create_user(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    username: String,
    password: String,
}

pub async fn login(
    State(state): State<ApiState>,
    Query(params): Query<LoginParams>,
) -> ApiResult<Json<User>> {
    let user = state.users.login(&params.username, &params.password).await?;
    Ok(Json(user))
}
