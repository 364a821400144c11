use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{password, AuthenticatedUser},
    error::{AppError, AppResult},
    models::User,
    schema::users::dsl,
    state::AppState,
    utils::json::JsonBody,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    // Argon2 work runs without the connection lock held.
    let user: User = {
        let mut conn = state.db()?;
        dsl::users
            .filter(dsl::username.eq(payload.username.trim()))
            .first(&mut *conn)
            .optional()?
            .ok_or_else(AppError::unauthorized)?
    };

    let valid = password::verify_password(&payload.password, &user.password)
        .map_err(|_| AppError::unauthorized())?;

    if !valid {
        tracing::warn!(username = %user.username, "rejected login");
        return Err(AppError::unauthorized());
    }

    if !password::is_hashed(&user.password) {
        let upgraded = password::hash_password(&payload.password)?;
        let mut conn = state.db()?;
        diesel::update(dsl::users.find(&user.id))
            .set(dsl::password.eq(upgraded))
            .execute(&mut *conn)?;
        tracing::info!(user_id = %user.id, "upgraded stored password to argon2");
    }

    let access_token = state
        .jwt
        .generate_token(&user.id, &user.username, &user.role)
        .map_err(AppError::from)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.expiry_seconds(),
    }))
}

pub async fn me(user: AuthenticatedUser) -> Json<AuthenticatedUser> {
    Json(user)
}
