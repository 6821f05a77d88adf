// StateCity
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST service to manage states and the cities within them.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use http::HeaderValue;
use log::{info, warn};
use statecity_core::clocks::SystemClock;
use statecity_core::db::postgres::PostgresDb;
use statecity_core::db::{Db, sqlite};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod config;
use config::{Config, DbConfig};
mod db;
mod driver;
use driver::Driver;
mod model;
mod rest;
use rest::app;

/// Waits until the user asks the process to terminate.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for termination signals: {}", e);
            futures::future::pending::<()>().await
        }
    }
}

/// Serves the application against an already-connected `db` until asked to terminate.
async fn run(
    db: Arc<dyn Db + Send + Sync>,
    bind_addr: SocketAddr,
    cors_origin: HeaderValue,
) -> Result<(), Box<dyn Error>> {
    db::init_schema(&mut db.ex().await?).await?;

    let driver = Driver::new(db, Arc::new(SystemClock::default()));
    let app = app(driver, cors_origin);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application described by `config`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(config: Config) -> Result<(), Box<dyn Error>> {
    let Config { bind_addr, cors_origin, db: db_config } = config;

    let db: Arc<dyn Db + Send + Sync> = match db_config {
        DbConfig::Postgres(opts) => Arc::new(PostgresDb::connect(opts)?),
        DbConfig::Sqlite(conn_str) => Arc::new(sqlite::connect(&conn_str).await?),
    };

    // The database must be closed even if serving fails.
    let result = run(db.clone(), bind_addr, cors_origin).await;
    db.close().await;
    result
}
