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
    models::{Message, NewMessage},
    schema::mensagens,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

#[derive(Deserialize)]
pub struct ListMessagesQuery {
    pub conversa_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateMessageRequest {
    pub id: Option<String>,
    pub conversa_id: String,
    pub tipo_remetente: Option<String>,
    pub nome_remetente: Option<String>,
    pub conteudo: Option<String>,
}

// mensagens has no updated_at, so an empty changeset must not reach diesel.
#[derive(AsChangeset, Default)]
#[diesel(table_name = mensagens)]
struct MessageChangeset {
    conversa_id: Option<String>,
    tipo_remetente: Option<Option<String>>,
    nome_remetente: Option<Option<String>>,
    conteudo: Option<Option<String>>,
}

impl MessageChangeset {
    fn is_empty(&self) -> bool {
        self.conversa_id.is_none()
            && self.tipo_remetente.is_none()
            && self.nome_remetente.is_none()
            && self.conteudo.is_none()
    }
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<ListMessagesQuery>,
) -> AppResult<Json<Vec<Message>>> {
    let mut conn = state.db()?;

    let mut query = mensagens::table
        .order((mensagens::created_at.asc(), mensagens::id.asc()))
        .into_boxed();
    if let Some(conversa_id) = params.conversa_id {
        query = query.filter(mensagens::conversa_id.eq(conversa_id));
    }

    let rows: Vec<Message> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> AppResult<Json<Message>> {
    let mut conn = state.db()?;
    let message: Message = mensagens::table.find(&message_id).first(&mut *conn)?;
    Ok(Json(message))
}

pub async fn create_message(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let new_message = NewMessage {
        id: resolve_id(payload.id)?,
        conversa_id: required_text("conversa_id", &payload.conversa_id)?,
        tipo_remetente: optional_text(payload.tipo_remetente),
        nome_remetente: optional_text(payload.nome_remetente),
        conteudo: payload.conteudo,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(mensagens::table)
        .values((&new_message, mensagens::created_at.eq(now)))
        .execute(&mut *conn)?;

    let message: Message = mensagens::table.find(&new_message.id).first(&mut *conn)?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Message>> {
    let changeset = MessageChangeset {
        conversa_id: patch_required_text(&body, "conversa_id")?,
        tipo_remetente: patch_text(&body, "tipo_remetente")?,
        nome_remetente: patch_text(&body, "nome_remetente")?,
        conteudo: patch_text(&body, "conteudo")?,
    };

    let mut conn = state.db()?;
    if !changeset.is_empty() {
        let updated = diesel::update(mensagens::table.find(&message_id))
            .set(&changeset)
            .execute(&mut *conn)?;
        if updated == 0 {
            return Err(AppError::not_found());
        }
    }

    let message: Message = mensagens::table.find(&message_id).first(&mut *conn)?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(mensagens::table.find(&message_id)).execute(&mut *conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
