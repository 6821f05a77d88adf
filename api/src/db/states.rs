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

//! Persistence of states.

use crate::db::{
    Condition, POSTGRES_FIND_FN, SQLITE_FIND_FN, ensure_at_most_one, push_conditions,
};
use crate::model::{Abbreviation, Name, NewState, State, StateFilter, StatePatch};
use async_trait::async_trait;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{QueryBuilder, Row};
use statecity_core::clocks::Clock;
use statecity_core::db::sqlite::{build_timestamp, unpack_timestamp};
use statecity_core::db::{Db, DbError, DbResult, Executor, postgres, sqlite};
use statecity_core::driver::Collection;
use statecity_core::model::DocumentId;
use std::sync::Arc;
use time::OffsetDateTime;

impl TryFrom<PgRow> for State {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let abbreviation: String = row.try_get("abbreviation").map_err(postgres::map_sqlx_error)?;
        let created: OffsetDateTime = row.try_get("created").map_err(postgres::map_sqlx_error)?;
        let updated: OffsetDateTime = row.try_get("updated").map_err(postgres::map_sqlx_error)?;

        Ok(State::new(
            DocumentId::new(id)?,
            Name::new(name)?,
            Abbreviation::new(abbreviation)?,
            created,
            updated,
        ))
    }
}

impl TryFrom<SqliteRow> for State {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let abbreviation: String = row.try_get("abbreviation").map_err(sqlite::map_sqlx_error)?;
        let created_sec: i64 = row.try_get("created_sec").map_err(sqlite::map_sqlx_error)?;
        let created_nsec: i64 = row.try_get("created_nsec").map_err(sqlite::map_sqlx_error)?;
        let updated_sec: i64 = row.try_get("updated_sec").map_err(sqlite::map_sqlx_error)?;
        let updated_nsec: i64 = row.try_get("updated_nsec").map_err(sqlite::map_sqlx_error)?;

        Ok(State::new(
            DocumentId::new(id)?,
            Name::new(name)?,
            Abbreviation::new(abbreviation)?,
            build_timestamp(created_sec, created_nsec)?,
            build_timestamp(updated_sec, updated_nsec)?,
        ))
    }
}

/// Converts a `filter` into the conditions on the `states` table that implement it.
fn state_conditions(filter: &StateFilter) -> Vec<Condition> {
    let mut conditions = vec![];
    if let Some(text) = filter.name_contains.as_ref() {
        conditions.push(Condition::ContainsIgnoreCase("name_folded", text.clone()));
    }
    conditions
}

/// Inserts a fully-formed `state` into the database.
pub(crate) async fn create_state(ex: &mut Executor, state: &State) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO states (id, name, name_folded, abbreviation, created, updated)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(state.id().as_str())
                .bind(state.name().as_str())
                .bind(state.name().folded())
                .bind(state.abbreviation().as_str())
                .bind(state.created_at())
                .bind(state.updated_at())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let (created_sec, created_nsec) = unpack_timestamp(*state.created_at());
            let (updated_sec, updated_nsec) = unpack_timestamp(*state.updated_at());

            let query_str = "
                INSERT INTO states
                    (id, name, name_folded, abbreviation,
                     created_sec, created_nsec, updated_sec, updated_nsec)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(state.id().as_str())
                .bind(state.name().as_str())
                .bind(state.name().folded())
                .bind(state.abbreviation().as_str())
                .bind(created_sec)
                .bind(created_nsec)
                .bind(updated_sec)
                .bind(updated_nsec)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the state identified by `id`, if it exists.
pub(crate) async fn get_state(ex: &mut Executor, id: &DocumentId) -> DbResult<Option<State>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM states WHERE id = $1";
            let raw = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw.map(State::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM states WHERE id = ?";
            let raw = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw.map(State::try_from).transpose()
        }
    }
}

/// Gets all states that match `filter` in creation order.
pub(crate) async fn find_states(ex: &mut Executor, filter: &StateFilter) -> DbResult<Vec<State>> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM states");
            push_conditions(&mut qb, state_conditions(filter), POSTGRES_FIND_FN);
            qb.push(" ORDER BY created, id");
            let rows =
                qb.build().fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(State::try_from).collect()
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM states");
            push_conditions(&mut qb, state_conditions(filter), SQLITE_FIND_FN);
            qb.push(" ORDER BY created_sec, created_nsec, id");
            let rows = qb.build().fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(State::try_from).collect()
        }
    }
}

/// Returns true if any state matches `filter`.
pub(crate) async fn state_exists(ex: &mut Executor, filter: &StateFilter) -> DbResult<bool> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM states");
            push_conditions(&mut qb, state_conditions(filter), POSTGRES_FIND_FN);
            qb.push(" LIMIT 1");
            let row =
                qb.build().fetch_optional(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(row.is_some())
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM states");
            push_conditions(&mut qb, state_conditions(filter), SQLITE_FIND_FN);
            qb.push(" LIMIT 1");
            let row =
                qb.build().fetch_optional(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            Ok(row.is_some())
        }
    }
}

/// Applies `patch` to the state `id` and marks it as updated at `now`.
///
/// Returns the number of states that matched `id`.
pub(crate) async fn update_state(
    ex: &mut Executor,
    id: &DocumentId,
    patch: &StatePatch,
    now: OffsetDateTime,
) -> DbResult<u64> {
    let name = patch.name.as_ref().map(Name::as_str);
    let name_folded = patch.name.as_ref().map(Name::folded);
    let abbreviation = patch.abbreviation.as_ref().map(Abbreviation::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE states
                SET
                    name = COALESCE($1, name),
                    name_folded = COALESCE($2, name_folded),
                    abbreviation = COALESCE($3, abbreviation),
                    updated = $4
                WHERE id = $5";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(name_folded.as_deref())
                .bind(abbreviation)
                .bind(now)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let (updated_sec, updated_nsec) = unpack_timestamp(now);

            let query_str = "
                UPDATE states
                SET
                    name = COALESCE(?, name),
                    name_folded = COALESCE(?, name_folded),
                    abbreviation = COALESCE(?, abbreviation),
                    updated_sec = ?,
                    updated_nsec = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(name_folded.as_deref())
                .bind(abbreviation)
                .bind(updated_sec)
                .bind(updated_nsec)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    ensure_at_most_one(rows_affected)
}

/// Deletes the state `id` and returns the number of deleted states.
pub(crate) async fn delete_state(ex: &mut Executor, id: &DocumentId) -> DbResult<u64> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM states WHERE id = $1")
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM states WHERE id = ?")
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    ensure_at_most_one(rows_affected)
}

/// Deletes all states that match `filter` and returns how many there were.
pub(crate) async fn delete_states(ex: &mut Executor, filter: &StateFilter) -> DbResult<u64> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM states");
            push_conditions(&mut qb, state_conditions(filter), POSTGRES_FIND_FN);
            let done = qb.build().execute(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM states");
            push_conditions(&mut qb, state_conditions(filter), SQLITE_FIND_FN);
            let done = qb.build().execute(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            Ok(done.rows_affected())
        }
    }
}

/// The collection of states, backed by the database.
#[derive(Clone)]
pub(crate) struct StateCollection {
    /// The database that holds the states.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock used to timestamp writes.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl StateCollection {
    /// Creates a new collection backed by `db` that timestamps writes with `clock`.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl Collection for StateCollection {
    type Document = State;
    type NewDocument = NewState;
    type Patch = StatePatch;
    type Filter = StateFilter;

    async fn create(&self, doc: NewState) -> DbResult<State> {
        let now = self.clock.now_utc();
        let state = State::new(
            DocumentId::generate(now),
            doc.name().clone(),
            doc.abbreviation().clone(),
            now,
            now,
        );
        create_state(&mut self.db.ex().await?, &state).await?;
        Ok(state)
    }

    async fn find_by_id(&self, id: &DocumentId) -> DbResult<Option<State>> {
        get_state(&mut self.db.ex().await?, id).await
    }

    async fn find(&self, filter: &StateFilter) -> DbResult<Vec<State>> {
        find_states(&mut self.db.ex().await?, filter).await
    }

    async fn update_one(&self, id: &DocumentId, patch: StatePatch) -> DbResult<u64> {
        let now = self.clock.now_utc();
        update_state(&mut self.db.ex().await?, id, &patch, now).await
    }

    async fn delete_one(&self, id: &DocumentId) -> DbResult<u64> {
        delete_state(&mut self.db.ex().await?, id).await
    }

    async fn delete_many(&self, filter: &StateFilter) -> DbResult<u64> {
        delete_states(&mut self.db.ex().await?, filter).await
    }

    async fn exists(&self, filter: &StateFilter) -> DbResult<bool> {
        state_exists(&mut self.db.ex().await?, filter).await
    }
}
