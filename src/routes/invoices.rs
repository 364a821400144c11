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
    models::{Invoice, NewInvoice},
    schema::faturas,
    state::AppState,
    utils::{
        decimal::{amount_to_db, parse_amount},
        json::{patch_amount, patch_date, patch_required_text, patch_text, JsonBody},
        optional_text, required_text, resolve_id,
    },
};

pub const DEFAULT_INVOICE_STATUS: &str = "pendente";

#[derive(Deserialize)]
pub struct ListInvoicesQuery {
    pub cliente_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateInvoiceRequest {
    pub id: Option<String>,
    pub cliente_id: String,
    pub numero_fatura: String,
    pub descricao: Option<String>,
    /// Decimal string or JSON number.
    pub valor: Option<Value>,
    pub status: Option<String>,
    pub data_vencimento: Option<NaiveDate>,
    pub data_pagamento: Option<NaiveDate>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = faturas)]
struct InvoiceChangeset {
    cliente_id: Option<String>,
    numero_fatura: Option<String>,
    descricao: Option<Option<String>>,
    valor: Option<Option<f64>>,
    status: Option<String>,
    data_vencimento: Option<Option<NaiveDate>>,
    data_pagamento: Option<Option<NaiveDate>>,
}

fn duplicate_invoice_number(err: DieselError) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.message().contains("numero_fatura") =>
        {
            AppError::conflict("numero_fatura already exists")
        }
        other => AppError::from(other),
    }
}

fn amount_column(value: Option<&Value>) -> AppResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => {
            let amount = parse_amount(raw)
                .map_err(|message| AppError::bad_request(format!("valor: {message}")))?;
            amount_to_db(amount).map(Some).map_err(AppError::bad_request)
        }
    }
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let mut conn = state.db()?;

    let mut query = faturas::table
        .order((faturas::created_at.asc(), faturas::id.asc()))
        .into_boxed();
    if let Some(cliente_id) = params.cliente_id {
        query = query.filter(faturas::cliente_id.eq(cliente_id));
    }
    if let Some(status) = params.status {
        query = query.filter(faturas::status.eq(status));
    }

    let rows: Vec<Invoice> = query.load(&mut *conn)?;
    Ok(Json(rows))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> AppResult<Json<Invoice>> {
    let mut conn = state.db()?;
    let invoice: Invoice = faturas::table.find(&invoice_id).first(&mut *conn)?;
    Ok(Json(invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let new_invoice = NewInvoice {
        id: resolve_id(payload.id)?,
        cliente_id: required_text("cliente_id", &payload.cliente_id)?,
        numero_fatura: required_text("numero_fatura", &payload.numero_fatura)?,
        descricao: optional_text(payload.descricao),
        valor: amount_column(payload.valor.as_ref())?,
        status: optional_text(payload.status)
            .unwrap_or_else(|| DEFAULT_INVOICE_STATUS.to_string()),
        data_vencimento: payload.data_vencimento,
        data_pagamento: payload.data_pagamento,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    diesel::insert_into(faturas::table)
        .values((
            &new_invoice,
            faturas::created_at.eq(now),
            faturas::updated_at.eq(now),
        ))
        .execute(&mut *conn)
        .map_err(duplicate_invoice_number)?;

    let invoice: Invoice = faturas::table.find(&new_invoice.id).first(&mut *conn)?;
    tracing::info!(
        invoice_id = %invoice.id,
        numero_fatura = %invoice.numero_fatura,
        "invoice created"
    );
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Invoice>> {
    let valor = match patch_amount(&body, "valor")? {
        None => None,
        Some(None) => Some(None),
        Some(Some(amount)) => Some(Some(amount_to_db(amount).map_err(AppError::bad_request)?)),
    };
    let changeset = InvoiceChangeset {
        cliente_id: patch_required_text(&body, "cliente_id")?,
        numero_fatura: patch_required_text(&body, "numero_fatura")?,
        descricao: patch_text(&body, "descricao")?,
        valor,
        status: patch_required_text(&body, "status")?,
        data_vencimento: patch_date(&body, "data_vencimento")?,
        data_pagamento: patch_date(&body, "data_pagamento")?,
    };

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(faturas::table.find(&invoice_id))
        .set((&changeset, faturas::updated_at.eq(now)))
        .execute(&mut *conn)
        .map_err(duplicate_invoice_number)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let invoice: Invoice = faturas::table.find(&invoice_id).first(&mut *conn)?;
    Ok(Json(invoice))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(faturas::table.find(&invoice_id)).execute(&mut *conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
