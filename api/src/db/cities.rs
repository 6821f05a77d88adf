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

//! Persistence of cities.

use crate::db::{
    Condition, POSTGRES_FIND_FN, SQLITE_FIND_FN, ensure_at_most_one, push_conditions,
};
use crate::model::{City, CityFilter, CityPatch, Name, NewCity};
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

impl TryFrom<PgRow> for City {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let state_id: String = row.try_get("state_id").map_err(postgres::map_sqlx_error)?;
        let created: OffsetDateTime = row.try_get("created").map_err(postgres::map_sqlx_error)?;
        let updated: OffsetDateTime = row.try_get("updated").map_err(postgres::map_sqlx_error)?;

        Ok(City::new(
            DocumentId::new(id)?,
            Name::new(name)?,
            DocumentId::new(state_id)?,
            created,
            updated,
        ))
    }
}

impl TryFrom<SqliteRow> for City {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let state_id: String = row.try_get("state_id").map_err(sqlite::map_sqlx_error)?;
        let created_sec: i64 = row.try_get("created_sec").map_err(sqlite::map_sqlx_error)?;
        let created_nsec: i64 = row.try_get("created_nsec").map_err(sqlite::map_sqlx_error)?;
        let updated_sec: i64 = row.try_get("updated_sec").map_err(sqlite::map_sqlx_error)?;
        let updated_nsec: i64 = row.try_get("updated_nsec").map_err(sqlite::map_sqlx_error)?;

        Ok(City::new(
            DocumentId::new(id)?,
            Name::new(name)?,
            DocumentId::new(state_id)?,
            build_timestamp(created_sec, created_nsec)?,
            build_timestamp(updated_sec, updated_nsec)?,
        ))
    }
}

fn city_conditions(filter: &CityFilter) -> Vec<Condition> {
    let mut conditions = vec![];
    if let Some(name) = filter.name.as_ref() {
        conditions.push(Condition::Equals("name", name.as_str().to_owned()));
    }
    if let Some(text) = filter.name_contains.as_ref() {
        conditions.push(Condition::ContainsIgnoreCase("name_folded", text.clone()));
    }
    if let Some(state) = filter.state.as_ref() {
        conditions.push(Condition::Equals("state_id", state.as_str().to_owned()));
    }
    conditions
}

/// Inserts a fully-formed `city` into the database.
///
/// The referenced state is not validated here.
pub(crate) async fn create_city(ex: &mut Executor, city: &City) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO cities (id, name, name_folded, state_id, created, updated)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(city.id().as_str())
                .bind(city.name().as_str())
                .bind(city.name().folded())
                .bind(city.state().as_str())
                .bind(city.created_at())
                .bind(city.updated_at())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let (created_sec, created_nsec) = unpack_timestamp(*city.created_at());
            let (updated_sec, updated_nsec) = unpack_timestamp(*city.updated_at());

            let query_str = "
                INSERT INTO cities
                    (id, name, name_folded, state_id,
                     created_sec, created_nsec, updated_sec, updated_nsec)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(city.id().as_str())
                .bind(city.name().as_str())
                .bind(city.name().folded())
                .bind(city.state().as_str())
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

/// Gets the city identified by `id`, if it exists.
pub(crate) async fn get_city(ex: &mut Executor, id: &DocumentId) -> DbResult<Option<City>> {
    match ex {
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM cities WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw.map(City::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM cities WHERE id = ?")
                .bind(id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw.map(City::try_from).transpose()
        }
    }
}

/// Gets all cities that match `filter` in creation order.
pub(crate) async fn find_cities(ex: &mut Executor, filter: &CityFilter) -> DbResult<Vec<City>> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM cities");
            push_conditions(&mut qb, city_conditions(filter), POSTGRES_FIND_FN);
            qb.push(" ORDER BY created, id");
            let rows =
                qb.build().fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(City::try_from).collect()
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM cities");
            push_conditions(&mut qb, city_conditions(filter), SQLITE_FIND_FN);
            qb.push(" ORDER BY created_sec, created_nsec, id");
            let rows = qb.build().fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(City::try_from).collect()
        }
    }
}

/// Returns true if any city matches `filter`.
pub(crate) async fn city_exists(ex: &mut Executor, filter: &CityFilter) -> DbResult<bool> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM cities");
            push_conditions(&mut qb, city_conditions(filter), POSTGRES_FIND_FN);
            qb.push(" LIMIT 1");
            let row =
                qb.build().fetch_optional(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(row.is_some())
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM cities");
            push_conditions(&mut qb, city_conditions(filter), SQLITE_FIND_FN);
            qb.push(" LIMIT 1");
            let row =
                qb.build().fetch_optional(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            Ok(row.is_some())
        }
    }
}

/// Applies `patch` to the city `id` and marks it as updated at `now`.
///
/// Returns the number of cities that matched `id`.
pub(crate) async fn update_city(
    ex: &mut Executor,
    id: &DocumentId,
    patch: &CityPatch,
    now: OffsetDateTime,
) -> DbResult<u64> {
    let name = patch.name.as_ref().map(Name::as_str);
    let name_folded = patch.name.as_ref().map(Name::folded);
    let state_id = patch.state.as_ref().map(DocumentId::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE cities
                SET
                    name = COALESCE($1, name),
                    name_folded = COALESCE($2, name_folded),
                    state_id = COALESCE($3, state_id),
                    updated = $4
                WHERE id = $5";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(name_folded.as_deref())
                .bind(state_id)
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
                UPDATE cities
                SET
                    name = COALESCE(?, name),
                    name_folded = COALESCE(?, name_folded),
                    state_id = COALESCE(?, state_id),
                    updated_sec = ?,
                    updated_nsec = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(name_folded.as_deref())
                .bind(state_id)
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

/// Deletes the city `id` and returns the number of deleted cities.
pub(crate) async fn delete_city(ex: &mut Executor, id: &DocumentId) -> DbResult<u64> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM cities WHERE id = $1")
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM cities WHERE id = ?")
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    ensure_at_most_one(rows_affected)
}

/// Deletes all cities that match `filter` and returns how many there were.
pub(crate) async fn delete_cities(ex: &mut Executor, filter: &CityFilter) -> DbResult<u64> {
    match ex {
        Executor::Postgres(ex) => {
            let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM cities");
            push_conditions(&mut qb, city_conditions(filter), POSTGRES_FIND_FN);
            let done = qb.build().execute(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        Executor::Sqlite(ex) => {
            let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM cities");
            push_conditions(&mut qb, city_conditions(filter), SQLITE_FIND_FN);
            let done = qb.build().execute(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            Ok(done.rows_affected())
        }
    }
}

/// The collection of cities, backed by the database.
#[derive(Clone)]
pub(crate) struct CityCollection {
    /// The database that holds the cities.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock used to timestamp writes.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl CityCollection {
    /// Creates a new collection backed by `db` that timestamps writes with `clock`.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl Collection for CityCollection {
    type Document = City;
    type NewDocument = NewCity;
    type Patch = CityPatch;
    type Filter = CityFilter;

    async fn create(&self, doc: NewCity) -> DbResult<City> {
        let now = self.clock.now_utc();
        let city =
            City::new(DocumentId::generate(now), doc.name().clone(), doc.state().clone(), now, now);
        create_city(&mut self.db.ex().await?, &city).await?;
        Ok(city)
    }

    async fn find_by_id(&self, id: &DocumentId) -> DbResult<Option<City>> {
        get_city(&mut self.db.ex().await?, id).await
    }

    async fn find(&self, filter: &CityFilter) -> DbResult<Vec<City>> {
        find_cities(&mut self.db.ex().await?, filter).await
    }

    async fn update_one(&self, id: &DocumentId, patch: CityPatch) -> DbResult<u64> {
        let now = self.clock.now_utc();
        update_city(&mut self.db.ex().await?, id, &patch, now).await
    }

    async fn delete_one(&self, id: &DocumentId) -> DbResult<u64> {
        delete_city(&mut self.db.ex().await?, id).await
    }

    async fn delete_many(&self, filter: &CityFilter) -> DbResult<u64> {
        delete_cities(&mut self.db.ex().await?, filter).await
    }

    async fn exists(&self, filter: &CityFilter) -> DbResult<bool> {
        city_exists(&mut self.db.ex().await?, filter).await
    }
}
