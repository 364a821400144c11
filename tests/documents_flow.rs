mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{json_body, TestApp};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct DocumentResponse {
    id: String,
    cliente_id: String,
    titulo: String,
    categoria: Option<String>,
    nome_arquivo: Option<String>,
    tamanho_arquivo: Option<i64>,
    tipo_mime: Option<String>,
}

#[tokio::test]
async fn client_without_documents_lists_empty() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;

    app.post_json(
        "/api/clientes",
        &json!({ "id": "c1", "nome": "Ana Souza" }),
        Some(&token),
    )
    .await?;

    let response = app.get("/api/documentos?cliente_id=c1", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let documents: Vec<DocumentResponse> = json_body(response).await?;
    assert!(documents.is_empty());

    // Filtering by a client that does not exist is not an error.
    let response = app
        .get("/api/documentos?cliente_id=ninguem", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let documents: Vec<DocumentResponse> = json_body(response).await?;
    assert!(documents.is_empty());
    Ok(())
}

#[tokio::test]
async fn document_metadata_lifecycle() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;

    app.post_json(
        "/api/clientes",
        &json!({ "id": "c1", "nome": "Ana Souza" }),
        Some(&token),
    )
    .await?;

    let response = app
        .post_json(
            "/api/documentos",
            &json!({
                "cliente_id": "c1",
                "titulo": "Procuracao",
                "categoria": "contratos",
                "url_arquivo": "https://files.example.com/procuracao.pdf",
                "nome_arquivo": "procuracao.pdf",
                "tamanho_arquivo": 48213,
                "tipo_mime": "application/pdf"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let document: DocumentResponse = json_body(response).await?;
    assert_eq!(document.cliente_id, "c1");
    assert_eq!(document.tamanho_arquivo, Some(48213));
    assert_eq!(document.tipo_mime.as_deref(), Some("application/pdf"));

    app.post_json(
        "/api/documentos",
        &json!({ "cliente_id": "c1", "titulo": "RG", "categoria": "pessoais" }),
        Some(&token),
    )
    .await?;

    let response = app
        .get("/api/documentos?cliente_id=c1&categoria=contratos", Some(&token))
        .await?;
    let documents: Vec<DocumentResponse> = json_body(response).await?;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].titulo, "Procuracao");

    let path = format!("/api/documentos/{}", document.id);
    let response = app
        .patch_json(
            &path,
            &json!({ "titulo": "Procuracao assinada", "nome_arquivo": null }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: DocumentResponse = json_body(response).await?;
    assert_eq!(updated.titulo, "Procuracao assinada");
    assert_eq!(updated.nome_arquivo, None);
    assert_eq!(updated.categoria.as_deref(), Some("contratos"));

    let response = app
        .patch_json(&path, &json!({ "tamanho_arquivo": -1 }), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.delete(&path, Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get(&path, Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn negative_size_is_rejected_on_create() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.admin_token().await?;

    app.post_json(
        "/api/clientes",
        &json!({ "id": "c1", "nome": "Ana Souza" }),
        Some(&token),
    )
    .await?;

    let response = app
        .post_json(
            "/api/documentos",
            &json!({ "cliente_id": "c1", "titulo": "Vazio", "tamanho_arquivo": -10 }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
