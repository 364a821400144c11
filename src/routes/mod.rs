use axum::http::{HeaderValue, StatusCode};
use axum::{
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{get, post},
    Json, Router,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{auth::AuthenticatedUser, error::AppError, state::AppState};

pub mod activities;
pub mod auth;
pub mod cases;
pub mod clients;
pub mod contacts;
pub mod conversations;
pub mod documents;
pub mod health;
pub mod invoices;
pub mod messages;
pub mod reports;
pub mod sectors;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = trimmed, "ignoring invalid CORS allowed origin");
                        None
                    }
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let users_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            get(users::get_user)
                .patch(users::update_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    let sectors_routes = Router::new()
        .route("/", get(sectors::list_sectors).post(sectors::create_sector))
        .route(
            "/:id",
            get(sectors::get_sector)
                .patch(sectors::update_sector)
                .put(sectors::update_sector)
                .delete(sectors::delete_sector),
        );

    let clients_routes = Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            get(clients::get_client)
                .patch(clients::update_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        );

    let cases_routes = Router::new()
        .route("/", get(cases::list_cases).post(cases::create_case))
        .route(
            "/:id",
            get(cases::get_case)
                .patch(cases::update_case)
                .put(cases::update_case)
                .delete(cases::delete_case),
        );

    let documents_routes = Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/:id",
            get(documents::get_document)
                .patch(documents::update_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        );

    let conversations_routes = Router::new()
        .route(
            "/",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/:id",
            get(conversations::get_conversation)
                .patch(conversations::update_conversation)
                .put(conversations::update_conversation)
                .delete(conversations::delete_conversation),
        );

    let messages_routes = Router::new()
        .route(
            "/",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/:id",
            get(messages::get_message)
                .patch(messages::update_message)
                .put(messages::update_message)
                .delete(messages::delete_message),
        );

    let contacts_routes = Router::new()
        .route(
            "/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/:id",
            get(contacts::get_contact)
                .patch(contacts::update_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        );

    let invoices_routes = Router::new()
        .route(
            "/",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/:id",
            get(invoices::get_invoice)
                .patch(invoices::update_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        );

    let activities_routes = Router::new()
        .route(
            "/",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route("/:id", get(activities::get_activity));

    let reports_routes = Router::new()
        .route("/resumo", get(reports::summary))
        .route("/clientes-por-setor", get(reports::clients_by_sector));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/usuarios", users_routes)
        .nest("/api/setores", sectors_routes)
        .nest("/api/clientes", clients_routes)
        .nest("/api/processos", cases_routes)
        .nest("/api/documentos", documents_routes)
        .nest("/api/conversas", conversations_routes)
        .nest("/api/mensagens", messages_routes)
        .nest("/api/contatos", contacts_routes)
        .nest("/api/faturas", invoices_routes)
        .nest("/api/atividades", activities_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    let router = Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/relatorios", reports_routes)
        .route("/api/health", get(health::health_check));

    let router = match state.config.static_dir.clone() {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(route_not_found.into_service()),
        ),
        None => router.fallback(route_not_found),
    };

    router
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "route not found" })),
    )
}

/// Deleting a row that other rows still reference is rejected by the store.
pub(crate) fn dependents_conflict(
    entity: &'static str,
) -> impl FnOnce(DieselError) -> AppError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            AppError::conflict(format!(
                "cannot delete {entity} that is still referenced by other records"
            ))
        }
        other => AppError::from(other),
    }
}
