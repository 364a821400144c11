use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    auth::{password, AuthenticatedUser},
    error::{AppError, AppResult},
    models::{NewUser, User},
    schema::users,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

use super::dependents_conflict;

pub const DEFAULT_USER_ROLE: &str = "user";

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
struct UserChangeset {
    username: Option<String>,
    password: Option<String>,
    email: Option<Option<String>>,
    role: Option<String>,
}

impl UserChangeset {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.role.is_none()
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> AppResult<Json<Vec<User>>> {
    let mut conn = state.db()?;

    let mut query = users::table.order(users::username.asc()).into_boxed();
    if let Some(role) = params.role {
        query = query.filter(users::role.eq(role));
    }

    let rows: Vec<User> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<User>> {
    let mut conn = state.db()?;
    let user: User = users::table.find(&user_id).first(&mut *conn)?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    caller.require_admin()?;

    if payload.password.is_empty() {
        return Err(AppError::bad_request("password must not be empty"));
    }
    let new_user = NewUser {
        id: resolve_id(payload.id)?,
        username: required_text("username", &payload.username)?,
        password: password::hash_password(&payload.password)?,
        email: optional_text(payload.email),
        role: optional_text(payload.role).unwrap_or_else(|| DEFAULT_USER_ROLE.to_string()),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(users::table)
        .values((&new_user, users::created_at.eq(now)))
        .execute(&mut *conn)?;

    let user: User = users::table.find(&new_user.id).first(&mut *conn)?;
    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        created_by = %caller.username,
        "user created"
    );
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<User>> {
    caller.require_admin()?;

    let password = match body.get("password") {
        None => None,
        Some(Value::String(raw)) if !raw.is_empty() => Some(password::hash_password(raw)?),
        Some(_) => return Err(AppError::bad_request("password must be a non-empty string")),
    };
    let changeset = UserChangeset {
        username: patch_required_text(&body, "username")?,
        password,
        email: patch_text(&body, "email")?,
        role: patch_required_text(&body, "role")?,
    };

    let mut conn = state.db()?;
    if !changeset.is_empty() {
        let updated = diesel::update(users::table.find(&user_id))
            .set(&changeset)
            .execute(&mut *conn)?;
        if updated == 0 {
            return Err(AppError::not_found());
        }
    }

    let user: User = users::table.find(&user_id).first(&mut *conn)?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    caller.require_admin()?;
    if caller.user_id == user_id {
        return Err(AppError::bad_request("cannot delete the authenticated user"));
    }

    let mut conn = state.db()?;
    let deleted = diesel::delete(users::table.find(&user_id))
        .execute(&mut *conn)
        .map_err(dependents_conflict("user"))?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
