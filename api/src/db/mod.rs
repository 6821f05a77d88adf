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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Every collection of documents is offered as a set of free functions that take an `Executor`,
//! plus a type that implements the `Collection` trait on top of them for the generic engine.

use sqlx::{Database, Encode, QueryBuilder, Type};
use statecity_core::db::{DbError, DbResult, Executor, postgres, sqlite};

mod cities;
pub(crate) use cities::*;
mod states;
pub(crate) use states::*;
#[cfg(test)]
mod tests;

/// Initializes the database schema.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => {
            postgres::run_schema(ex, include_str!("postgres.sql")).await
        }
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

/// A condition on a single column used to select rows.
pub(crate) enum Condition {
    /// The column is equal to the value.
    Equals(&'static str, String),

    /// The column, which must hold text already folded to lowercase, contains the value after
    /// folding it in the same way.
    ContainsIgnoreCase(&'static str, String),
}

/// Name of the PostgreSQL function that returns the position of a substring.
const POSTGRES_FIND_FN: &str = "STRPOS";

/// Name of the SQLite function that returns the position of a substring.
const SQLITE_FIND_FN: &str = "INSTR";

/// Appends a `WHERE` clause to `qb` that matches all `conditions`, if any.
///
/// `find_fn` is the name of the SQL function that returns the 1-based position of a substring in
/// a string (or 0 if not found), which differs across databases.
fn push_conditions<'args, DB>(
    qb: &mut QueryBuilder<'args, DB>,
    conditions: Vec<Condition>,
    find_fn: &str,
) where
    DB: Database,
    String: 'args + Encode<'args, DB> + Type<DB>,
{
    for (i, condition) in conditions.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match condition {
            Condition::Equals(column, value) => {
                qb.push(column).push(" = ").push_bind(value);
            }
            Condition::ContainsIgnoreCase(column, value) => {
                qb.push(find_fn)
                    .push("(")
                    .push(column)
                    .push(", ")
                    .push_bind(value.to_lowercase())
                    .push(") > 0");
            }
        }
    }
}

/// Ensures that a write against a single document identified by its primary key did not touch
/// more than one row, and returns the number of affected rows.
fn ensure_at_most_one(rows_affected: u64) -> DbResult<u64> {
    if rows_affected > 1 {
        return Err(DbError::BackendError(format!(
            "Single-document operation affected {} rows",
            rows_affected
        )));
    }
    Ok(rows_affected)
}
