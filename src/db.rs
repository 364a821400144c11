//! Schema manager: owns the single SQLite connection for the process.
//!
//! [`Database::initialize`] opens the store, creates every table that is
//! missing and inserts the seed rows. It runs its statements at most once per
//! [`Database`]; later calls hand back the same handle. Request code reaches
//! the connection only through [`Database::handle`], which refuses to open
//! anything on its own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::models::{NewSector, NewUser};
use crate::schema::{setores, users};

pub const DEFAULT_DATABASE_PATH: &str = "advocacia.db";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("database has not been initialized; call Database::initialize first")]
    Uninitialized,

    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// Creation order follows the foreign keys: users and sectors first,
/// clients before everything that hangs off a client, conversations before
/// messages.
pub const TABLES: [(&str, &str); 10] = [
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            email TEXT,
            role TEXT DEFAULT 'user',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "setores",
        r#"
        CREATE TABLE IF NOT EXISTS setores (
            id TEXT PRIMARY KEY,
            nome TEXT NOT NULL UNIQUE,
            descricao TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "clientes",
        r#"
        CREATE TABLE IF NOT EXISTS clientes (
            id TEXT PRIMARY KEY,
            nome TEXT NOT NULL,
            email TEXT,
            telefone TEXT,
            whatsapp TEXT,
            cpf_cnpj TEXT,
            endereco TEXT,
            cidade TEXT,
            estado TEXT,
            cep TEXT,
            status TEXT DEFAULT 'ativo',
            setor_id TEXT,
            observacoes TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (setor_id) REFERENCES setores(id)
        )
        "#,
    ),
    (
        "processos",
        r#"
        CREATE TABLE IF NOT EXISTS processos (
            id TEXT PRIMARY KEY,
            cliente_id TEXT NOT NULL,
            numero_processo TEXT UNIQUE NOT NULL,
            status TEXT DEFAULT 'ativo',
            vara TEXT,
            comarca TEXT,
            descricao TEXT,
            data_inicio DATE,
            data_fim DATE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        )
        "#,
    ),
    (
        "documentos",
        r#"
        CREATE TABLE IF NOT EXISTS documentos (
            id TEXT PRIMARY KEY,
            cliente_id TEXT NOT NULL,
            titulo TEXT NOT NULL,
            categoria TEXT,
            url_arquivo TEXT,
            nome_arquivo TEXT,
            tamanho_arquivo INTEGER,
            tipo_mime TEXT,
            descricao TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        )
        "#,
    ),
    (
        "conversas",
        r#"
        CREATE TABLE IF NOT EXISTS conversas (
            id TEXT PRIMARY KEY,
            cliente_id TEXT NOT NULL,
            assunto TEXT,
            resumo TEXT,
            ultima_mensagem TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        )
        "#,
    ),
    (
        "mensagens",
        r#"
        CREATE TABLE IF NOT EXISTS mensagens (
            id TEXT PRIMARY KEY,
            conversa_id TEXT NOT NULL,
            tipo_remetente TEXT,
            nome_remetente TEXT,
            conteudo TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (conversa_id) REFERENCES conversas(id)
        )
        "#,
    ),
    (
        "contatos",
        r#"
        CREATE TABLE IF NOT EXISTS contatos (
            id TEXT PRIMARY KEY,
            cliente_id TEXT NOT NULL,
            tipo TEXT,
            label TEXT,
            valor TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        )
        "#,
    ),
    (
        "faturas",
        r#"
        CREATE TABLE IF NOT EXISTS faturas (
            id TEXT PRIMARY KEY,
            cliente_id TEXT NOT NULL,
            numero_fatura TEXT UNIQUE NOT NULL,
            descricao TEXT,
            valor DECIMAL(10, 2),
            status TEXT DEFAULT 'pendente',
            data_vencimento DATE,
            data_pagamento DATE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (cliente_id) REFERENCES clientes(id)
        )
        "#,
    ),
    (
        "atividades",
        r#"
        CREATE TABLE IF NOT EXISTS atividades (
            id TEXT PRIMARY KEY,
            usuario_id TEXT,
            acao TEXT,
            descricao TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (usuario_id) REFERENCES users(id)
        )
        "#,
    ),
];

pub const ADMIN_USER_ID: &str = "1";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_EMAIL: &str = "admin@advocacia.com";

pub const DEFAULT_SECTORS: [(&str, &str, &str); 4] = [
    ("1", "Atendimento", "Setor de atendimento ao cliente"),
    ("2", "Financeiro", "Setor financeiro"),
    ("3", "Documentos", "Setor de documentos"),
    ("4", "Processos", "Setor de processos judiciais"),
];

/// Shared handle to the one open connection.
#[derive(Clone)]
pub struct DbHandle {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl DbHandle {
    /// A request that panicked mid-query leaves the mutex poisoned; the
    /// connection itself is still usable, so later callers take it over.
    pub fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("recovering database handle after a panicked request");
            self.conn.clear_poison();
            poisoned.into_inner()
        })
    }
}

pub struct Database {
    path: String,
    handle: OnceCell<DbHandle>,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handle: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Opens the store and brings schema and seed rows up to date.
    ///
    /// Concurrent callers block until the first one finishes. A failure
    /// leaves the database uninitialized; callers at process start are
    /// expected to treat it as fatal.
    pub fn initialize(&self) -> Result<&DbHandle, DbError> {
        self.handle.get_or_try_init(|| {
            let handle = open(&self.path)?;
            tracing::info!(database_path = %self.path, "database connected");
            {
                let mut conn = handle.lock();
                create_tables(&mut conn)?;
                seed(&mut conn)?;
            }
            tracing::info!(
                database_path = %self.path,
                tables = TABLES.len(),
                "database tables created/verified"
            );
            Ok(handle)
        })
    }

    pub fn handle(&self) -> Result<&DbHandle, DbError> {
        self.handle.get().ok_or(DbError::Uninitialized)
    }
}

fn open(path: &str) -> Result<DbHandle, DbError> {
    let mut conn = SqliteConnection::establish(path).map_err(|source| DbError::Open {
        path: path.to_string(),
        source,
    })?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    Ok(DbHandle {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn create_tables(conn: &mut SqliteConnection) -> Result<(), DbError> {
    for (table, ddl) in TABLES {
        tracing::debug!(table, "ensuring table exists");
        conn.batch_execute(ddl)?;
    }
    Ok(())
}

fn seed(conn: &mut SqliteConnection) -> Result<(), DbError> {
    let admin = NewUser {
        id: ADMIN_USER_ID.to_string(),
        username: ADMIN_USERNAME.to_string(),
        password: ADMIN_PASSWORD.to_string(),
        email: Some(ADMIN_EMAIL.to_string()),
        role: "admin".to_string(),
    };
    diesel::insert_or_ignore_into(users::table)
        .values(&admin)
        .execute(conn)?;

    for (id, nome, descricao) in DEFAULT_SECTORS {
        let sector = NewSector {
            id: id.to_string(),
            nome: nome.to_string(),
            descricao: Some(descricao.to_string()),
        };
        diesel::insert_or_ignore_into(setores::table)
            .values(&sector)
            .execute(conn)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::Text;
    use tempfile::TempDir;

    use crate::models::{Sector, User};

    #[derive(QueryableByName)]
    struct TableSql {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        sql: String,
    }

    fn schema_snapshot(conn: &mut SqliteConnection) -> Vec<(String, String)> {
        diesel::sql_query(
            "SELECT name, sql FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .load::<TableSql>(conn)
        .unwrap()
        .into_iter()
        .map(|row| (row.name, row.sql))
        .collect()
    }

    fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advocacia.db");
        let database = Database::new(path.to_string_lossy().into_owned());
        (dir, database)
    }

    #[test]
    fn handle_fails_before_initialize() {
        let (_dir, database) = temp_database();
        assert!(!database.is_initialized());
        assert!(matches!(database.handle(), Err(DbError::Uninitialized)));
    }

    #[test]
    fn handle_is_available_after_initialize() {
        let (_dir, database) = temp_database();
        database.initialize().unwrap();
        assert!(database.is_initialized());
        let handle = database.handle().unwrap();
        let mut conn = handle.lock();
        let count: i64 = users::table.count().get_result(&mut *conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn creates_every_table_and_seed_rows() {
        let (_dir, database) = temp_database();
        let handle = database.initialize().unwrap();
        let mut conn = handle.lock();

        let names: Vec<String> = schema_snapshot(&mut conn)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let mut expected: Vec<String> = TABLES.iter().map(|(name, _)| name.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);

        let admin: User = users::table.find(ADMIN_USER_ID).first(&mut *conn).unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, ADMIN_PASSWORD);
        assert_eq!(admin.role, "admin");

        let sectors: Vec<Sector> = setores::table
            .order(setores::id.asc())
            .load(&mut *conn)
            .unwrap();
        let names: Vec<&str> = sectors.iter().map(|s| s.nome.as_str()).collect();
        assert_eq!(
            names,
            vec!["Atendimento", "Financeiro", "Documentos", "Processos"]
        );
    }

    #[test]
    fn panicked_holder_does_not_wedge_the_handle() {
        let (_dir, database) = temp_database();
        let handle = database.initialize().unwrap().clone();

        let holder = handle.clone();
        let outcome = std::thread::spawn(move || {
            let _conn = holder.lock();
            panic!("request handler panicked");
        })
        .join();
        assert!(outcome.is_err());

        let mut conn = handle.lock();
        let count: i64 = setores::table.count().get_result(&mut *conn).unwrap();
        assert_eq!(count, 4);
        drop(conn);
        assert!(!handle.conn.is_poisoned());
    }

    #[test]
    fn repeated_initialize_reuses_the_same_handle() {
        let (_dir, database) = temp_database();
        let first = database.initialize().unwrap().clone();
        let second = database.initialize().unwrap();
        assert!(Arc::ptr_eq(&first.conn, &second.conn));
    }

    #[test]
    fn initializing_an_existing_store_is_idempotent() {
        let (dir, database) = temp_database();
        let (schema_before, users_before, sectors_before) = {
            let mut conn = database.initialize().unwrap().lock();
            (
                schema_snapshot(&mut conn),
                users::table.count().get_result::<i64>(&mut *conn).unwrap(),
                setores::table.count().get_result::<i64>(&mut *conn).unwrap(),
            )
        };
        drop(database);

        let reopened = Database::new(
            dir.path()
                .join("advocacia.db")
                .to_string_lossy()
                .into_owned(),
        );
        let mut conn = reopened.initialize().unwrap().lock();
        assert_eq!(schema_snapshot(&mut conn), schema_before);
        assert_eq!(
            users::table.count().get_result::<i64>(&mut *conn).unwrap(),
            users_before
        );
        assert_eq!(
            setores::table.count().get_result::<i64>(&mut *conn).unwrap(),
            sectors_before
        );
    }

    #[test]
    fn seeding_leaves_edited_seed_rows_alone() {
        let (dir, database) = temp_database();
        {
            let mut conn = database.initialize().unwrap().lock();
            diesel::update(setores::table.find("1"))
                .set(setores::descricao.eq("Recepção"))
                .execute(&mut *conn)
                .unwrap();
        }
        drop(database);

        let reopened = Database::new(
            dir.path()
                .join("advocacia.db")
                .to_string_lossy()
                .into_owned(),
        );
        let mut conn = reopened.initialize().unwrap().lock();
        let sector: Sector = setores::table.find("1").first(&mut *conn).unwrap();
        assert_eq!(sector.nome, "Atendimento");
        assert_eq!(sector.descricao.as_deref(), Some("Recepção"));
        let count: i64 = setores::table
            .filter(setores::nome.eq("Atendimento"))
            .count()
            .get_result(&mut *conn)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn foreign_keys_are_enforced_on_the_handle() {
        let (_dir, database) = temp_database();
        let mut conn = database.initialize().unwrap().lock();
        let result = diesel::sql_query(
            "INSERT INTO processos (id, cliente_id, numero_processo) VALUES ('p1', 'missing', '1')",
        )
        .execute(&mut *conn);
        assert!(matches!(
            result,
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _
            ))
        ));
    }

    #[test]
    fn open_failure_is_reported_and_leaves_database_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("advocacia.db");
        let database = Database::new(path.to_string_lossy().into_owned());
        assert!(matches!(database.initialize(), Err(DbError::Open { .. })));
        assert!(matches!(database.handle(), Err(DbError::Uninitialized)));
    }
}
