mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{json_body, TestApp};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
struct InvoiceResponse {
    id: String,
    numero_fatura: String,
    valor: Option<String>,
    status: String,
    data_vencimento: Option<String>,
    data_pagamento: Option<String>,
}

async fn seed_client(app: &TestApp, token: &str) -> Result<()> {
    let response = app
        .post_json(
            "/api/clientes",
            &json!({ "id": "c1", "nome": "Ana Souza" }),
            Some(token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn amounts_keep_two_decimal_places() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    seed_client(&app, &token).await?;

    let response = app
        .post_json(
            "/api/faturas",
            &json!({
                "id": "f1",
                "cliente_id": "c1",
                "numero_fatura": "2024-0001",
                "valor": "150.50",
                "data_vencimento": "2024-03-10"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invoice: InvoiceResponse = json_body(response).await?;
    assert_eq!(invoice.valor.as_deref(), Some("150.50"));
    assert_eq!(invoice.status, "pendente");
    assert_eq!(invoice.data_vencimento.as_deref(), Some("2024-03-10"));

    let response = app
        .post_json(
            "/api/faturas",
            &json!({ "cliente_id": "c1", "numero_fatura": "2024-0002", "valor": 99 }),
            Some(&token),
        )
        .await?;
    let invoice: InvoiceResponse = json_body(response).await?;
    assert_eq!(invoice.valor.as_deref(), Some("99.00"));

    let response = app
        .post_json(
            "/api/faturas",
            &json!({ "cliente_id": "c1", "numero_fatura": "2024-0003" }),
            Some(&token),
        )
        .await?;
    let invoice: InvoiceResponse = json_body(response).await?;
    assert_eq!(invoice.valor, None);
    Ok(())
}

#[tokio::test]
async fn invalid_amounts_are_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    seed_client(&app, &token).await?;

    for valor in [json!("10.005"), json!("100000000.00"), json!("muito"), json!(true)] {
        let response = app
            .post_json(
                "/api/faturas",
                &json!({ "cliente_id": "c1", "numero_fatura": "X-1", "valor": valor }),
                Some(&token),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "valor {valor}");
    }

    let response = app.get("/api/faturas", Some(&token)).await?;
    let invoices: Vec<InvoiceResponse> = json_body(response).await?;
    assert!(invoices.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_invoice_number_conflicts() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    seed_client(&app, &token).await?;

    let payload = json!({ "cliente_id": "c1", "numero_fatura": "2024-0100", "valor": "10.00" });
    let response = app.post_json("/api/faturas", &payload, Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.post_json("/api/faturas", &payload, Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = json_body(response).await?;
    assert_eq!(body["error"], "numero_fatura already exists");
    Ok(())
}

#[tokio::test]
async fn paying_an_invoice() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    seed_client(&app, &token).await?;

    app.post_json(
        "/api/faturas",
        &json!({ "id": "f1", "cliente_id": "c1", "numero_fatura": "A-1", "valor": 300 }),
        Some(&token),
    )
    .await?;
    app.post_json(
        "/api/faturas",
        &json!({ "id": "f2", "cliente_id": "c1", "numero_fatura": "A-2", "valor": 45.9 }),
        Some(&token),
    )
    .await?;

    let response = app
        .patch_json(
            "/api/faturas/f1",
            &json!({ "status": "pago", "data_pagamento": "2024-04-02", "valor": "275.25" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let invoice: InvoiceResponse = json_body(response).await?;
    assert_eq!(invoice.status, "pago");
    assert_eq!(invoice.valor.as_deref(), Some("275.25"));
    assert_eq!(invoice.data_pagamento.as_deref(), Some("2024-04-02"));

    let response = app
        .patch_json("/api/faturas/f1", &json!({ "valor": "1.999" }), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/faturas?status=pago", Some(&token)).await?;
    let paid: Vec<InvoiceResponse> = json_body(response).await?;
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].id, "f1");

    let response = app
        .get("/api/faturas?cliente_id=c1&status=pendente", Some(&token))
        .await?;
    let pending: Vec<InvoiceResponse> = json_body(response).await?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].numero_fatura, "A-2");
    assert_eq!(pending[0].valor.as_deref(), Some("45.90"));
    Ok(())
}

#[tokio::test]
async fn invalid_dates_are_bad_requests_on_create_and_update() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;
    seed_client(&app, &token).await?;

    let response = app
        .post_json(
            "/api/faturas",
            &json!({ "cliente_id": "c1", "numero_fatura": "D-1", "data_vencimento": "10/03/2024" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response).await?;
    assert!(body["error"].is_string());

    app.post_json(
        "/api/faturas",
        &json!({ "id": "f1", "cliente_id": "c1", "numero_fatura": "D-2" }),
        Some(&token),
    )
    .await?;
    let response = app
        .patch_json(
            "/api/faturas/f1",
            &json!({ "data_vencimento": "10/03/2024" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
