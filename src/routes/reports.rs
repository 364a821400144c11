//! Read-only aggregates. Mounted outside the bearer-token layer.

use std::collections::{BTreeMap, HashMap};

use axum::{extract::State, Json};
use diesel::{
    dsl::{count_star, sum},
    prelude::*,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::Sector,
    schema::{clientes, documentos, faturas, processos, setores},
    state::AppState,
    utils::decimal::amount_from_db,
};

#[derive(Serialize)]
pub struct CountByStatus {
    pub total: i64,
    pub por_status: BTreeMap<String, i64>,
}

#[derive(Serialize)]
pub struct InvoiceStatusTotals {
    pub quantidade: i64,
    pub valor_total: Decimal,
}

#[derive(Serialize)]
pub struct SummaryReport {
    pub clientes: CountByStatus,
    pub processos: CountByStatus,
    pub documentos: i64,
    pub faturas: BTreeMap<String, InvoiceStatusTotals>,
}

#[derive(Serialize)]
pub struct SectorClientCount {
    pub setor_id: Option<String>,
    pub nome: Option<String>,
    pub total_clientes: i64,
}

fn by_status(rows: Vec<(String, i64)>) -> CountByStatus {
    let total = rows.iter().map(|(_, count)| count).sum();
    CountByStatus {
        total,
        por_status: rows.into_iter().collect(),
    }
}

pub async fn summary(State(state): State<AppState>) -> AppResult<Json<SummaryReport>> {
    let mut conn = state.db()?;

    let client_rows: Vec<(String, i64)> = clientes::table
        .group_by(clientes::status)
        .select((clientes::status, count_star()))
        .load(&mut *conn)?;

    let case_rows: Vec<(String, i64)> = processos::table
        .group_by(processos::status)
        .select((processos::status, count_star()))
        .load(&mut *conn)?;

    let documentos: i64 = documentos::table.count().get_result(&mut *conn)?;

    let invoice_rows: Vec<(String, i64, Option<f64>)> = faturas::table
        .group_by(faturas::status)
        .select((faturas::status, count_star(), sum(faturas::valor)))
        .load(&mut *conn)?;

    let faturas = invoice_rows
        .into_iter()
        .map(|(status, quantidade, total)| {
            let valor_total = amount_from_db(total.unwrap_or(0.0)).unwrap_or_default();
            (
                status,
                InvoiceStatusTotals {
                    quantidade,
                    valor_total,
                },
            )
        })
        .collect();

    Ok(Json(SummaryReport {
        clientes: by_status(client_rows),
        processos: by_status(case_rows),
        documentos,
        faturas,
    }))
}

pub async fn clients_by_sector(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SectorClientCount>>> {
    let mut conn = state.db()?;

    let sectors: Vec<Sector> = setores::table
        .order(setores::nome.asc())
        .load(&mut *conn)?;

    let count_rows: Vec<(Option<String>, i64)> = clientes::table
        .group_by(clientes::setor_id)
        .select((clientes::setor_id, count_star()))
        .load(&mut *conn)?;
    let mut counts: HashMap<Option<String>, i64> = count_rows.into_iter().collect();

    let mut response: Vec<SectorClientCount> = sectors
        .into_iter()
        .map(|sector| SectorClientCount {
            total_clientes: counts.remove(&Some(sector.id.clone())).unwrap_or(0),
            setor_id: Some(sector.id),
            nome: Some(sector.nome),
        })
        .collect();

    response.push(SectorClientCount {
        setor_id: None,
        nome: None,
        total_clientes: counts.remove(&None).unwrap_or(0),
    });

    Ok(Json(response))
}
