use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use advocacia::auth::jwt::JwtService;
use advocacia::auth::password::hash_password;
use advocacia::config::AppConfig;
use advocacia::db::{Database, ADMIN_PASSWORD, ADMIN_USERNAME};
use advocacia::models::NewUser;
use advocacia::routes;
use advocacia::state::AppState;
use diesel::prelude::*;
use diesel::SqliteConnection;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _dir: TempDir,
}

#[allow(dead_code)]
pub fn test_config(database_path: String) -> AppConfig {
    AppConfig {
        database_path,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_issuer: "test-issuer".to_string(),
        jwt_audience: "test-audience".to_string(),
        jwt_expiry_minutes: 60,
        cors_allowed_origin: None,
        static_dir: None,
    }
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        let database_path = dir.path().join("advocacia.db").to_string_lossy().into_owned();
        let config = test_config(database_path);

        let database = Arc::new(Database::new(config.database_path.clone()));
        database
            .initialize()
            .map_err(|err| anyhow!("failed to initialize database: {err}"))?;

        let jwt = JwtService::from_config(&config)?;
        let state = AppState::new(database, config, jwt);
        let router = routes::create_router(state.clone());

        Ok(Self {
            state,
            router,
            _dir: dir,
        })
    }

    /// Runs `f` against the shared connection, outside any request.
    #[allow(dead_code)]
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T>,
    {
        let handle = self.state.database.handle()?;
        let mut conn = handle.lock();
        f(&mut conn)
    }

    #[allow(dead_code)]
    pub async fn insert_user(&self, username: &str, password: &str, role: &str) -> Result<String> {
        let user = NewUser {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: hash_password(password)?,
            email: None,
            role: role.to_string(),
        };
        self.with_conn(|conn| {
            diesel::insert_into(advocacia::schema::users::table)
                .values(&user)
                .execute(conn)
                .context("failed to insert user")?;
            Ok(())
        })?;
        Ok(user.id)
    }

    pub async fn login_token(&self, username: &str, password: &str) -> Result<String> {
        #[derive(Serialize)]
        struct LoginPayload<'a> {
            username: &'a str,
            password: &'a str,
        }

        let response = self
            .post_json(
                "/api/auth/login",
                &LoginPayload { username, password },
                None,
            )
            .await?;

        ensure!(
            response.status() == StatusCode::OK,
            "login failed with status {}",
            response.status()
        );

        #[derive(serde::Deserialize)]
        struct LoginResponse {
            access_token: String,
        }
        let parsed: LoginResponse = json_body(response).await?;
        Ok(parsed.access_token)
    }

    /// Token for the seeded administrator.
    pub async fn admin_token(&self) -> Result<String> {
        self.login_token(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload, token).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload, token).await
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PUT, path, payload, token).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body))?;
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::DELETE).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Result<hyper::Response<Body>> {
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

#[allow(dead_code)]
pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn json_body<T: DeserializeOwned>(response: hyper::Response<Body>) -> Result<T> {
    let status = response.status();
    let body = body_to_vec(response.into_body()).await?;
    serde_json::from_slice(&body).with_context(|| {
        format!(
            "unexpected body for status {status}: {}",
            String::from_utf8_lossy(&body)
        )
    })
}
