use std::env;

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use tracing_subscriber::EnvFilter;

use advocacia::config;
use advocacia::db::{Database, TABLES};

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("init-db") => init_db()?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\nUsage: maintenance init-db");
            std::process::exit(1);
        }
        None => {
            eprintln!("Usage: maintenance init-db");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_db() -> Result<()> {
    let database_path = config::database_path(|key| env::var(key).ok());
    tracing::info!(component = "maintenance", database_path = %database_path, "initializing database");

    let database = Database::new(database_path);
    let handle = match database.initialize() {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Database initialization failed: {err}");
            std::process::exit(1);
        }
    };
    let mut conn = handle.lock();

    for (table, _) in TABLES {
        let row: RowCount = diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
            .get_result(&mut *conn)
            .with_context(|| format!("failed to count rows in {table}"))?;
        println!("{table:<12} {}", row.count);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
