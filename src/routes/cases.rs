use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{LegalCase, NewLegalCase},
    schema::processos,
    state::AppState,
    utils::{
        json::{patch_date, patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

pub const DEFAULT_CASE_STATUS: &str = "ativo";

#[derive(Deserialize)]
pub struct ListCasesQuery {
    pub cliente_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCaseRequest {
    pub id: Option<String>,
    pub cliente_id: String,
    pub numero_processo: String,
    pub status: Option<String>,
    pub vara: Option<String>,
    pub comarca: Option<String>,
    pub descricao: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = processos)]
struct CaseChangeset {
    cliente_id: Option<String>,
    numero_processo: Option<String>,
    status: Option<String>,
    vara: Option<Option<String>>,
    comarca: Option<Option<String>>,
    descricao: Option<Option<String>>,
    data_inicio: Option<Option<NaiveDate>>,
    data_fim: Option<Option<NaiveDate>>,
}

fn duplicate_case_number(err: DieselError) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.message().contains("numero_processo") =>
        {
            AppError::conflict("numero_processo already exists")
        }
        other => AppError::from(other),
    }
}

pub async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<ListCasesQuery>,
) -> AppResult<Json<Vec<LegalCase>>> {
    let mut conn = state.db()?;

    let mut query = processos::table
        .order((processos::created_at.asc(), processos::id.asc()))
        .into_boxed();
    if let Some(cliente_id) = params.cliente_id {
        query = query.filter(processos::cliente_id.eq(cliente_id));
    }
    if let Some(status) = params.status {
        query = query.filter(processos::status.eq(status));
    }

    let rows: Vec<LegalCase> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> AppResult<Json<LegalCase>> {
    let mut conn = state.db()?;
    let case: LegalCase = processos::table.find(&case_id).first(&mut *conn)?;
    Ok(Json(case))
}

pub async fn create_case(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCaseRequest>,
) -> AppResult<(StatusCode, Json<LegalCase>)> {
    let new_case = NewLegalCase {
        id: resolve_id(payload.id)?,
        cliente_id: required_text("cliente_id", &payload.cliente_id)?,
        numero_processo: required_text("numero_processo", &payload.numero_processo)?,
        status: optional_text(payload.status).unwrap_or_else(|| DEFAULT_CASE_STATUS.to_string()),
        vara: optional_text(payload.vara),
        comarca: optional_text(payload.comarca),
        descricao: optional_text(payload.descricao),
        data_inicio: payload.data_inicio,
        data_fim: payload.data_fim,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(processos::table)
        .values((
            &new_case,
            processos::created_at.eq(now),
            processos::updated_at.eq(now),
        ))
        .execute(&mut *conn)
        .map_err(duplicate_case_number)?;

    let case: LegalCase = processos::table.find(&new_case.id).first(&mut *conn)?;
    tracing::info!(
        case_id = %case.id,
        numero_processo = %case.numero_processo,
        "case created"
    );
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn update_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<LegalCase>> {
    let changeset = CaseChangeset {
        cliente_id: patch_required_text(&body, "cliente_id")?,
        numero_processo: patch_required_text(&body, "numero_processo")?,
        status: patch_required_text(&body, "status")?,
        vara: patch_text(&body, "vara")?,
        comarca: patch_text(&body, "comarca")?,
        descricao: patch_text(&body, "descricao")?,
        data_inicio: patch_date(&body, "data_inicio")?,
        data_fim: patch_date(&body, "data_fim")?,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(processos::table.find(&case_id))
        .set((&changeset, processos::updated_at.eq(now)))
        .execute(&mut *conn)
        .map_err(duplicate_case_number)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let case: LegalCase = processos::table.find(&case_id).first(&mut *conn)?;
    Ok(Json(case))
}

pub async fn delete_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(processos::table.find(&case_id)).execute(&mut *conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
