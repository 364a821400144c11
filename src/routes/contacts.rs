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
    models::{Contact, NewContact},
    schema::contatos,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

#[derive(Deserialize)]
pub struct ListContactsQuery {
    pub cliente_id: Option<String>,
    pub tipo: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateContactRequest {
    pub id: Option<String>,
    pub cliente_id: String,
    pub tipo: Option<String>,
    pub label: Option<String>,
    pub valor: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = contatos)]
struct ContactChangeset {
    cliente_id: Option<String>,
    tipo: Option<Option<String>>,
    label: Option<Option<String>>,
    valor: Option<Option<String>>,
}

impl ContactChangeset {
    fn is_empty(&self) -> bool {
        self.cliente_id.is_none()
            && self.tipo.is_none()
            && self.label.is_none()
            && self.valor.is_none()
    }
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ListContactsQuery>,
) -> AppResult<Json<Vec<Contact>>> {
    let mut conn = state.db()?;

    let mut query = contatos::table
        .order((contatos::created_at.asc(), contatos::id.asc()))
        .into_boxed();
    if let Some(cliente_id) = params.cliente_id {
        query = query.filter(contatos::cliente_id.eq(cliente_id));
    }
    if let Some(tipo) = params.tipo {
        query = query.filter(contatos::tipo.eq(tipo));
    }

    let rows: Vec<Contact> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> AppResult<Json<Contact>> {
    let mut conn = state.db()?;
    let contact: Contact = contatos::table.find(&contact_id).first(&mut *conn)?;
    Ok(Json(contact))
}

pub async fn create_contact(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateContactRequest>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    let new_contact = NewContact {
        id: resolve_id(payload.id)?,
        cliente_id: required_text("cliente_id", &payload.cliente_id)?,
        tipo: optional_text(payload.tipo),
        label: optional_text(payload.label),
        valor: optional_text(payload.valor),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(contatos::table)
        .values((&new_contact, contatos::created_at.eq(now)))
        .execute(&mut *conn)?;

    let contact: Contact = contatos::table.find(&new_contact.id).first(&mut *conn)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Contact>> {
    let changeset = ContactChangeset {
        cliente_id: patch_required_text(&body, "cliente_id")?,
        tipo: patch_text(&body, "tipo")?,
        label: patch_text(&body, "label")?,
        valor: patch_text(&body, "valor")?,
    };

    let mut conn = state.db()?;
    if !changeset.is_empty() {
        let updated = diesel::update(contatos::table.find(&contact_id))
            .set(&changeset)
            .execute(&mut *conn)?;
        if updated == 0 {
            return Err(AppError::not_found());
        }
    }

    let contact: Contact = contatos::table.find(&contact_id).first(&mut *conn)?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(contatos::table.find(&contact_id)).execute(&mut *conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
