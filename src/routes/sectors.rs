use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{NewSector, Sector},
    schema::setores,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

use super::dependents_conflict;

#[derive(Deserialize)]
pub struct CreateSectorRequest {
    pub id: Option<String>,
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = setores)]
struct SectorChangeset {
    nome: Option<String>,
    descricao: Option<Option<String>>,
}

pub async fn list_sectors(State(state): State<AppState>) -> AppResult<Json<Vec<Sector>>> {
    let mut conn = state.db()?;
    let rows: Vec<Sector> = setores::table
        .order(setores::nome.asc())
        .load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_sector(
    State(state): State<AppState>,
    Path(sector_id): Path<String>,
) -> AppResult<Json<Sector>> {
    let mut conn = state.db()?;
    let sector: Sector = setores::table.find(&sector_id).first(&mut *conn)?;
    Ok(Json(sector))
}

pub async fn create_sector(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateSectorRequest>,
) -> AppResult<(StatusCode, Json<Sector>)> {
    let new_sector = NewSector {
        id: resolve_id(payload.id)?,
        nome: required_text("nome", &payload.nome)?,
        descricao: optional_text(payload.descricao),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(setores::table)
        .values((
            &new_sector,
            setores::created_at.eq(now),
            setores::updated_at.eq(now),
        ))
        .execute(&mut *conn)?;

    let sector: Sector = setores::table.find(&new_sector.id).first(&mut *conn)?;
    tracing::info!(sector_id = %sector.id, nome = %sector.nome, "sector created");
    Ok((StatusCode::CREATED, Json(sector)))
}

pub async fn update_sector(
    State(state): State<AppState>,
    Path(sector_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Sector>> {
    let changeset = SectorChangeset {
        nome: patch_required_text(&body, "nome")?,
        descricao: patch_text(&body, "descricao")?,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(setores::table.find(&sector_id))
        .set((&changeset, setores::updated_at.eq(now)))
        .execute(&mut *conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let sector: Sector = setores::table.find(&sector_id).first(&mut *conn)?;
    Ok(Json(sector))
}

pub async fn delete_sector(
    State(state): State<AppState>,
    Path(sector_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(setores::table.find(&sector_id))
        .execute(&mut *conn)
        .map_err(dependents_conflict("sector"))?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
