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

//! Configuration of the service, read from environment variables.

use http::HeaderValue;
use statecity_core::db::postgres::PostgresOptions;
use statecity_core::env::get_optional_var;
use std::net::{Ipv4Addr, SocketAddr};

/// Prefix of the environment variables that configure the service.
const PREFIX: &str = "STATECITY";

/// Prefix of the environment variables that configure the PostgreSQL connection.
const POSTGRES_PREFIX: &str = "PGSQL_PROD";

/// Default port to listen on when `STATECITY_PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Default origin allowed by CORS when `STATECITY_CORS_ORIGIN` is not set.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

/// Database to persist the documents in.
#[derive(Debug)]
pub enum DbConfig {
    /// A PostgreSQL server.
    Postgres(PostgresOptions),

    /// A SQLite database identified by its connection string.
    Sqlite(String),
}

/// Configuration of the service.
#[derive(Debug)]
pub struct Config {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Origin that browsers are allowed to issue cross-origin requests from.
    pub cors_origin: HeaderValue,

    /// Database to persist the documents in.
    pub db: DbConfig,
}

impl Config {
    /// Initializes the configuration from environment variables.
    ///
    /// This uses `STATECITY_HOST`, `STATECITY_PORT`, `STATECITY_CORS_ORIGIN` and
    /// `STATECITY_SQLITE`.  If the latter is not set, the PostgreSQL connection details are read
    /// from the `PGSQL_PROD_*` variables.
    pub fn from_env() -> Result<Self, String> {
        let host = get_optional_var::<Ipv4Addr>(PREFIX, "HOST")?.unwrap_or(Ipv4Addr::LOCALHOST);
        let port = get_optional_var::<u16>(PREFIX, "PORT")?.unwrap_or(DEFAULT_PORT);

        let cors_origin = get_optional_var::<String>(PREFIX, "CORS_ORIGIN")?
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_owned());
        let cors_origin = HeaderValue::from_str(&cors_origin)
            .map_err(|e| format!("Invalid CORS origin '{}': {}", cors_origin, e))?;

        let db = match get_optional_var::<String>(PREFIX, "SQLITE")? {
            Some(conn_str) => DbConfig::Sqlite(conn_str),
            None => DbConfig::Postgres(PostgresOptions::from_env(POSTGRES_PREFIX)?),
        };

        Ok(Self { bind_addr: SocketAddr::from((host, port)), cors_origin, db })
    }
}
