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
    models::{Conversation, NewConversation},
    schema::conversas,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

use super::dependents_conflict;

#[derive(Deserialize)]
pub struct ListConversationsQuery {
    pub cliente_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub id: Option<String>,
    pub cliente_id: String,
    pub assunto: Option<String>,
    pub resumo: Option<String>,
    pub ultima_mensagem: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = conversas)]
struct ConversationChangeset {
    cliente_id: Option<String>,
    assunto: Option<Option<String>>,
    resumo: Option<Option<String>>,
    ultima_mensagem: Option<Option<String>>,
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Query(params): Query<ListConversationsQuery>,
) -> AppResult<Json<Vec<Conversation>>> {
    let mut conn = state.db()?;

    let mut query = conversas::table
        .order((conversas::updated_at.desc(), conversas::id.asc()))
        .into_boxed();
    if let Some(cliente_id) = params.cliente_id {
        query = query.filter(conversas::cliente_id.eq(cliente_id));
    }

    let rows: Vec<Conversation> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Conversation>> {
    let mut conn = state.db()?;
    let conversation: Conversation = conversas::table
        .find(&conversation_id)
        .first(&mut *conn)?;
    Ok(Json(conversation))
}

pub async fn create_conversation(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateConversationRequest>,
) -> AppResult<(StatusCode, Json<Conversation>)> {
    let new_conversation = NewConversation {
        id: resolve_id(payload.id)?,
        cliente_id: required_text("cliente_id", &payload.cliente_id)?,
        assunto: optional_text(payload.assunto),
        resumo: optional_text(payload.resumo),
        ultima_mensagem: optional_text(payload.ultima_mensagem),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(conversas::table)
        .values((
            &new_conversation,
            conversas::created_at.eq(now),
            conversas::updated_at.eq(now),
        ))
        .execute(&mut *conn)?;

    let conversation: Conversation = conversas::table
        .find(&new_conversation.id)
        .first(&mut *conn)?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn update_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Conversation>> {
    let changeset = ConversationChangeset {
        cliente_id: patch_required_text(&body, "cliente_id")?,
        assunto: patch_text(&body, "assunto")?,
        resumo: patch_text(&body, "resumo")?,
        ultima_mensagem: patch_text(&body, "ultima_mensagem")?,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(conversas::table.find(&conversation_id))
        .set((&changeset, conversas::updated_at.eq(now)))
        .execute(&mut *conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let conversation: Conversation = conversas::table
        .find(&conversation_id)
        .first(&mut *conn)?;
    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(conversas::table.find(&conversation_id))
        .execute(&mut *conn)
        .map_err(dependents_conflict("conversation"))?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
