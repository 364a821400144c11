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
    models::{Client, NewClient},
    schema::clientes,
    state::AppState,
    utils::{
        json::{patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

use super::dependents_conflict;

pub const DEFAULT_CLIENT_STATUS: &str = "ativo";

#[derive(Deserialize)]
pub struct ListClientsQuery {
    pub status: Option<String>,
    pub setor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub id: Option<String>,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub status: Option<String>,
    pub setor_id: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = clientes)]
struct ClientChangeset {
    nome: Option<String>,
    email: Option<Option<String>>,
    telefone: Option<Option<String>>,
    whatsapp: Option<Option<String>>,
    cpf_cnpj: Option<Option<String>>,
    endereco: Option<Option<String>>,
    cidade: Option<Option<String>>,
    estado: Option<Option<String>>,
    cep: Option<Option<String>>,
    status: Option<String>,
    setor_id: Option<Option<String>>,
    observacoes: Option<Option<String>>,
}

impl ClientChangeset {
    fn from_body(body: &Value) -> AppResult<Self> {
        Ok(Self {
            nome: patch_required_text(body, "nome")?,
            email: patch_text(body, "email")?,
            telefone: patch_text(body, "telefone")?,
            whatsapp: patch_text(body, "whatsapp")?,
            cpf_cnpj: patch_text(body, "cpf_cnpj")?,
            endereco: patch_text(body, "endereco")?,
            cidade: patch_text(body, "cidade")?,
            estado: patch_text(body, "estado")?,
            cep: patch_text(body, "cep")?,
            status: patch_required_text(body, "status")?,
            setor_id: patch_text(body, "setor_id")?,
            observacoes: patch_text(body, "observacoes")?,
        })
    }
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListClientsQuery>,
) -> AppResult<Json<Vec<Client>>> {
    let mut conn = state.db()?;

    let mut query = clientes::table
        .order((clientes::created_at.asc(), clientes::id.asc()))
        .into_boxed();
    if let Some(status) = params.status {
        query = query.filter(clientes::status.eq(status));
    }
    if let Some(setor_id) = params.setor_id {
        query = query.filter(clientes::setor_id.eq(setor_id));
    }

    let rows: Vec<Client> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<Json<Client>> {
    let mut conn = state.db()?;
    let client: Client = clientes::table.find(&client_id).first(&mut *conn)?;
    Ok(Json(client))
}

pub async fn create_client(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateClientRequest>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let new_client = NewClient {
        id: resolve_id(payload.id)?,
        nome: required_text("nome", &payload.nome)?,
        email: optional_text(payload.email),
        telefone: optional_text(payload.telefone),
        whatsapp: optional_text(payload.whatsapp),
        cpf_cnpj: optional_text(payload.cpf_cnpj),
        endereco: optional_text(payload.endereco),
        cidade: optional_text(payload.cidade),
        estado: optional_text(payload.estado),
        cep: optional_text(payload.cep),
        status: optional_text(payload.status)
            .unwrap_or_else(|| DEFAULT_CLIENT_STATUS.to_string()),
        setor_id: optional_text(payload.setor_id),
        observacoes: optional_text(payload.observacoes),
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(clientes::table)
        .values((
            &new_client,
            clientes::created_at.eq(now),
            clientes::updated_at.eq(now),
        ))
        .execute(&mut *conn)?;

    let client: Client = clientes::table.find(&new_client.id).first(&mut *conn)?;
    tracing::info!(client_id = %client.id, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Client>> {
    let changeset = ClientChangeset::from_body(&body)?;

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(clientes::table.find(&client_id))
        .set((&changeset, clientes::updated_at.eq(now)))
        .execute(&mut *conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let client: Client = clientes::table.find(&client_id).first(&mut *conn)?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(clientes::table.find(&client_id))
        .execute(&mut *conn)
        .map_err(dependents_conflict("client"))?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }

    tracing::info!(client_id = %client_id, "client deleted");
    Ok(StatusCode::NO_CONTENT)
}
