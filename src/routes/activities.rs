//! Activity log. Entries are append-only: there is no update or delete route.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;

use crate::{
    auth::AuthenticatedUser,
    error::AppResult,
    models::{Activity, NewActivity},
    schema::atividades,
    state::AppState,
    utils::{json::JsonBody, optional_text, resolve_id},
};

#[derive(Deserialize)]
pub struct ListActivitiesQuery {
    pub usuario_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateActivityRequest {
    pub id: Option<String>,
    /// Defaults to the caller's own user id.
    pub usuario_id: Option<String>,
    pub acao: Option<String>,
    pub descricao: Option<String>,
}

pub async fn list_activities(
    State(state): State<AppState>,
    Query(params): Query<ListActivitiesQuery>,
) -> AppResult<Json<Vec<Activity>>> {
    let mut conn = state.db()?;

    let mut query = atividades::table
        .order((atividades::created_at.desc(), atividades::id.asc()))
        .into_boxed();
    if let Some(usuario_id) = params.usuario_id {
        query = query.filter(atividades::usuario_id.eq(usuario_id));
    }

    let rows: Vec<Activity> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<Activity>> {
    let mut conn = state.db()?;
    let activity: Activity = atividades::table.find(&activity_id).first(&mut *conn)?;
    Ok(Json(activity))
}

pub async fn create_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateActivityRequest>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    let new_activity = NewActivity {
        id: resolve_id(payload.id)?,
        usuario_id: optional_text(payload.usuario_id).or(Some(user.user_id)),
        acao: optional_text(payload.acao),
        descricao: optional_text(payload.descricao),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(atividades::table)
        .values((&new_activity, atividades::created_at.eq(now)))
        .execute(&mut *conn)?;

    let activity: Activity = atividades::table
        .find(&new_activity.id)
        .first(&mut *conn)?;
    Ok((StatusCode::CREATED, Json(activity)))
}
