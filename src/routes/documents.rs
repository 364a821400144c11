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
    error::{AppError, AppResult},
    models::{Document, NewDocument},
    schema::documentos,
    state::AppState,
    utils::{
        json::{patch_integer, patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

#[derive(Deserialize)]
pub struct ListDocumentsQuery {
    pub cliente_id: Option<String>,
    pub categoria: Option<String>,
}

/// Metadata for a file stored elsewhere; `url_arquivo` points at it.
#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    pub id: Option<String>,
    pub cliente_id: String,
    pub titulo: String,
    pub categoria: Option<String>,
    pub url_arquivo: Option<String>,
    pub nome_arquivo: Option<String>,
    pub tamanho_arquivo: Option<i64>,
    pub tipo_mime: Option<String>,
    pub descricao: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = documentos)]
struct DocumentChangeset {
    cliente_id: Option<String>,
    titulo: Option<String>,
    categoria: Option<Option<String>>,
    url_arquivo: Option<Option<String>>,
    nome_arquivo: Option<Option<String>>,
    tamanho_arquivo: Option<Option<i64>>,
    tipo_mime: Option<Option<String>>,
    descricao: Option<Option<String>>,
}

fn check_size(size: Option<i64>) -> AppResult<Option<i64>> {
    match size {
        Some(bytes) if bytes < 0 => Err(AppError::bad_request(
            "tamanho_arquivo must not be negative",
        )),
        other => Ok(other),
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsQuery>,
) -> AppResult<Json<Vec<Document>>> {
    let mut conn = state.db()?;

    let mut query = documentos::table
        .order((documentos::created_at.asc(), documentos::id.asc()))
        .into_boxed();
    if let Some(cliente_id) = params.cliente_id {
        query = query.filter(documentos::cliente_id.eq(cliente_id));
    }
    if let Some(categoria) = params.categoria {
        query = query.filter(documentos::categoria.eq(categoria));
    }

    let rows: Vec<Document> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<Document>> {
    let mut conn = state.db()?;
    let document: Document = documentos::table.find(&document_id).first(&mut *conn)?;
    Ok(Json(document))
}

pub async fn create_document(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let new_document = NewDocument {
        id: resolve_id(payload.id)?,
        cliente_id: required_text("cliente_id", &payload.cliente_id)?,
        titulo: required_text("titulo", &payload.titulo)?,
        categoria: optional_text(payload.categoria),
        url_arquivo: optional_text(payload.url_arquivo),
        nome_arquivo: optional_text(payload.nome_arquivo),
        tamanho_arquivo: check_size(payload.tamanho_arquivo)?,
        tipo_mime: optional_text(payload.tipo_mime),
        descricao: optional_text(payload.descricao),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(documentos::table)
        .values((
            &new_document,
            documentos::created_at.eq(now),
            documentos::updated_at.eq(now),
        ))
        .execute(&mut *conn)?;

    let document: Document = documentos::table
        .find(&new_document.id)
        .first(&mut *conn)?;
    tracing::info!(
        document_id = %document.id,
        cliente_id = %document.cliente_id,
        "document registered"
    );
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Document>> {
    let tamanho_arquivo = patch_integer(&body, "tamanho_arquivo")?;
    if let Some(size) = tamanho_arquivo {
        check_size(size)?;
    }
    let changeset = DocumentChangeset {
        cliente_id: patch_required_text(&body, "cliente_id")?,
        titulo: patch_required_text(&body, "titulo")?,
        categoria: patch_text(&body, "categoria")?,
        url_arquivo: patch_text(&body, "url_arquivo")?,
        nome_arquivo: patch_text(&body, "nome_arquivo")?,
        tamanho_arquivo,
        tipo_mime: patch_text(&body, "tipo_mime")?,
        descricao: patch_text(&body, "descricao")?,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(documentos::table.find(&document_id))
        .set((&changeset, documentos::updated_at.eq(now)))
        .execute(&mut *conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let document: Document = documentos::table.find(&document_id).first(&mut *conn)?;
    Ok(Json(document))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(documentos::table.find(&document_id)).execute(&mut *conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
