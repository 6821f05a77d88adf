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

//! Common tests for any database implementation.

use crate::db::*;
use crate::model::{
    Abbreviation, City, CityFilter, CityPatch, Name, NewCity, NewState, State, StateFilter,
    StatePatch,
};
use statecity_core::clocks::testutils::SettableClock;
use statecity_core::db::{Db, DbError, Executor};
use statecity_core::driver::Collection;
use statecity_core::model::DocumentId;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::datetime;

/// Identifier that is well-formed but that never matches any document.
const MISSING_ID: &str = "000000000000000000000000";

/// Obtains an executor on `db` with the schema already in place.
async fn setup_ex(db: &(dyn Db + Send + Sync)) -> Executor {
    let mut ex = db.ex().await.unwrap();
    init_schema(&mut ex).await.unwrap();
    ex
}

/// Syntactic sugar to instantiate a state with a deterministic identifier.
fn new_state(seq: u32, name: &'static str, abbreviation: &'static str) -> State {
    let ts = datetime!(2023-12-01 10:00:00 UTC) + Duration::from_secs(u64::from(seq));
    State::new(
        DocumentId::new(format!("656a2f00{:016x}", seq)).unwrap(),
        Name::from(name),
        Abbreviation::from(abbreviation),
        ts,
        ts,
    )
}

/// Syntactic sugar to instantiate a city with a deterministic identifier.
fn new_city(seq: u32, name: &'static str, state: &State) -> City {
    let ts = datetime!(2023-12-02 10:00:00 UTC) + Duration::from_secs(u64::from(seq));
    City::new(
        DocumentId::new(format!("656b8080{:016x}", seq)).unwrap(),
        Name::from(name),
        state.id().clone(),
        ts,
        ts,
    )
}

/// Extracts the names of `states` for easier comparisons.
fn state_names(states: &[State]) -> Vec<&str> {
    states.iter().map(|s| s.name().as_str()).collect()
}

/// Extracts the names of `cities` for easier comparisons.
fn city_names(cities: &[City]) -> Vec<&str> {
    cities.iter().map(|c| c.name().as_str()).collect()
}

pub(crate) async fn test_init_schema_is_idempotent(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;
        create_state(&mut ex, &new_state(1, "Bahia", "BA")).await.unwrap();
        init_schema(&mut ex).await.unwrap();
        assert_eq!(1, find_states(&mut ex, &StateFilter::default()).await.unwrap().len());
    }

    db.close().await;
}

pub(crate) async fn test_states_create_and_get(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state = new_state(1, "Rio de Janeiro", "RJ");
        create_state(&mut ex, &state).await.unwrap();

        assert_eq!(Some(state.clone()), get_state(&mut ex, state.id()).await.unwrap());
        assert_eq!(None, get_state(&mut ex, &DocumentId::new(MISSING_ID).unwrap()).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_states_unique_fields(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        create_state(&mut ex, &new_state(1, "Rio de Janeiro", "RJ")).await.unwrap();
        assert_eq!(
            DbError::AlreadyExists,
            create_state(&mut ex, &new_state(2, "Rio de Janeiro", "XX")).await.unwrap_err()
        );
        assert_eq!(
            DbError::AlreadyExists,
            create_state(&mut ex, &new_state(3, "Somewhere", "RJ")).await.unwrap_err()
        );

        let other = new_state(4, "Sao Paulo", "SP");
        create_state(&mut ex, &other).await.unwrap();
        let patch = StatePatch { name: Some(Name::from("Rio de Janeiro")), abbreviation: None };
        assert_eq!(
            DbError::AlreadyExists,
            update_state(&mut ex, other.id(), &patch, datetime!(2023-12-05 00:00:00 UTC))
                .await
                .unwrap_err()
        );

        assert_eq!(2, find_states(&mut ex, &StateFilter::default()).await.unwrap().len());
    }

    db.close().await;
}

pub(crate) async fn test_states_find_with_filters(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        // Insert out of order to verify that results come back in creation order.
        create_state(&mut ex, &new_state(3, "Sao Paulo", "SP")).await.unwrap();
        create_state(&mut ex, &new_state(1, "Rio de Janeiro", "RJ")).await.unwrap();
        create_state(&mut ex, &new_state(2, "Rio Grande do Sul", "RS")).await.unwrap();

        let all = find_states(&mut ex, &StateFilter::default()).await.unwrap();
        assert_eq!(vec!["Rio de Janeiro", "Rio Grande do Sul", "Sao Paulo"], state_names(&all));

        let filter = StateFilter { name_contains: Some("rIO".to_owned()) };
        let found = find_states(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Rio de Janeiro", "Rio Grande do Sul"], state_names(&found));

        let filter = StateFilter { name_contains: Some("PAULO".to_owned()) };
        let found = find_states(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Sao Paulo"], state_names(&found));

        let filter = StateFilter { name_contains: Some("%".to_owned()) };
        assert!(find_states(&mut ex, &filter).await.unwrap().is_empty());
    }

    db.close().await;
}

pub(crate) async fn test_states_update(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state = new_state(1, "Rio de Janeiro", "XX");
        create_state(&mut ex, &state).await.unwrap();

        let now = datetime!(2023-12-10 08:30:00.654321 UTC);
        let patch = StatePatch { name: None, abbreviation: Some(Abbreviation::from("RJ")) };
        assert_eq!(1, update_state(&mut ex, state.id(), &patch, now).await.unwrap());

        let updated = get_state(&mut ex, state.id()).await.unwrap().unwrap();
        assert_eq!("Rio de Janeiro", updated.name().as_str());
        assert_eq!("RJ", updated.abbreviation().as_str());
        assert_eq!(state.created_at(), updated.created_at());
        assert_eq!(&now, updated.updated_at());

        let missing = DocumentId::new(MISSING_ID).unwrap();
        assert_eq!(0, update_state(&mut ex, &missing, &patch, now).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_states_delete(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state1 = new_state(1, "Rio de Janeiro", "RJ");
        let state2 = new_state(2, "Sao Paulo", "SP");
        create_state(&mut ex, &state1).await.unwrap();
        create_state(&mut ex, &state2).await.unwrap();

        assert_eq!(1, delete_state(&mut ex, state1.id()).await.unwrap());
        assert_eq!(0, delete_state(&mut ex, state1.id()).await.unwrap());

        let all = find_states(&mut ex, &StateFilter::default()).await.unwrap();
        assert_eq!(vec![state2], all);

        assert_eq!(1, delete_states(&mut ex, &StateFilter::default()).await.unwrap());
        assert!(find_states(&mut ex, &StateFilter::default()).await.unwrap().is_empty());
    }

    db.close().await;
}

pub(crate) async fn test_states_exists(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        assert!(!state_exists(&mut ex, &StateFilter::default()).await.unwrap());

        create_state(&mut ex, &new_state(1, "Rio de Janeiro", "RJ")).await.unwrap();
        assert!(state_exists(&mut ex, &StateFilter::default()).await.unwrap());

        let filter = StateFilter { name_contains: Some("JANEIRO".to_owned()) };
        assert!(state_exists(&mut ex, &filter).await.unwrap());
        let filter = StateFilter { name_contains: Some("Paulo".to_owned()) };
        assert!(!state_exists(&mut ex, &filter).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_states_find_non_ascii(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        create_state(&mut ex, &new_state(1, "Paraíba", "PB")).await.unwrap();
        create_state(&mut ex, &new_state(2, "São Paulo", "SP")).await.unwrap();

        for (text, expected) in [
            ("PARAÍBA", vec!["Paraíba"]),
            ("paraíba", vec!["Paraíba"]),
            ("SÃO", vec!["São Paulo"]),
            ("são", vec!["São Paulo"]),
            ("A", vec!["Paraíba", "São Paulo"]),
        ] {
            let filter = StateFilter { name_contains: Some(text.to_owned()) };
            let found = find_states(&mut ex, &filter).await.unwrap();
            assert_eq!(expected, state_names(&found), "Unexpected matches for {}", text);
        }
    }

    db.close().await;
}

pub(crate) async fn test_states_find_after_rename(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state = new_state(1, "Guanabara", "GB");
        create_state(&mut ex, &state).await.unwrap();

        let now = datetime!(2023-12-10 08:30:00 UTC);
        let patch = StatePatch { name: Some(Name::from("Ceará")), abbreviation: None };
        assert_eq!(1, update_state(&mut ex, state.id(), &patch, now).await.unwrap());

        let filter = StateFilter { name_contains: Some("guana".to_owned()) };
        assert!(find_states(&mut ex, &filter).await.unwrap().is_empty());
        let filter = StateFilter { name_contains: Some("CEARÁ".to_owned()) };
        let found = find_states(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Ceará"], state_names(&found));
    }

    db.close().await;
}

pub(crate) async fn test_cities_create_and_get(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state = new_state(1, "Rio de Janeiro", "RJ");
        create_state(&mut ex, &state).await.unwrap();

        let city = new_city(1, "Niteroi", &state);
        create_city(&mut ex, &city).await.unwrap();
        assert_eq!(Some(city.clone()), get_city(&mut ex, city.id()).await.unwrap());

        // Cities with the same name in the same state are not rejected at this layer.
        create_city(&mut ex, &new_city(2, "Niteroi", &state)).await.unwrap();
        assert_eq!(2, find_cities(&mut ex, &CityFilter::default()).await.unwrap().len());

        assert_eq!(None, get_city(&mut ex, &DocumentId::new(MISSING_ID).unwrap()).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_cities_find_with_filters(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let rj = new_state(1, "Rio de Janeiro", "RJ");
        let sp = new_state(2, "Sao Paulo", "SP");
        create_state(&mut ex, &rj).await.unwrap();
        create_state(&mut ex, &sp).await.unwrap();

        create_city(&mut ex, &new_city(1, "Niteroi", &rj)).await.unwrap();
        create_city(&mut ex, &new_city(2, "Campinas", &sp)).await.unwrap();
        create_city(&mut ex, &new_city(3, "Petropolis", &rj)).await.unwrap();
        create_city(&mut ex, &new_city(4, "Santos", &sp)).await.unwrap();

        let all = find_cities(&mut ex, &CityFilter::default()).await.unwrap();
        assert_eq!(vec!["Niteroi", "Campinas", "Petropolis", "Santos"], city_names(&all));

        let filter = CityFilter { state: Some(rj.id().clone()), ..Default::default() };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Niteroi", "Petropolis"], city_names(&found));

        let filter = CityFilter { name_contains: Some("O".to_owned()), ..Default::default() };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Niteroi", "Petropolis", "Santos"], city_names(&found));

        let filter = CityFilter {
            name_contains: Some("o".to_owned()),
            state: Some(sp.id().clone()),
            ..Default::default()
        };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Santos"], city_names(&found));

        let filter = CityFilter { name: Some(Name::from("Campinas")), ..Default::default() };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Campinas"], city_names(&found));
    }

    db.close().await;
}

pub(crate) async fn test_cities_find_non_ascii(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let state = new_state(1, "Paraíba", "PB");
        create_state(&mut ex, &state).await.unwrap();
        let city = new_city(1, "Campina Grande", &state);
        create_city(&mut ex, &city).await.unwrap();
        create_city(&mut ex, &new_city(2, "João Pessoa", &state)).await.unwrap();

        let filter = CityFilter { name_contains: Some("JOÃO".to_owned()), ..Default::default() };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["João Pessoa"], city_names(&found));

        let now = datetime!(2023-12-10 08:30:00 UTC);
        let patch = CityPatch { name: Some(Name::from("Patos ÁGUA")), state: None };
        assert_eq!(1, update_city(&mut ex, city.id(), &patch, now).await.unwrap());

        let filter = CityFilter { name_contains: Some("água".to_owned()), ..Default::default() };
        let found = find_cities(&mut ex, &filter).await.unwrap();
        assert_eq!(vec!["Patos ÁGUA"], city_names(&found));
        let filter = CityFilter { name_contains: Some("campina".to_owned()), ..Default::default() };
        assert!(find_cities(&mut ex, &filter).await.unwrap().is_empty());
    }

    db.close().await;
}

pub(crate) async fn test_cities_update(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let rj = new_state(1, "Rio de Janeiro", "RJ");
        let sp = new_state(2, "Sao Paulo", "SP");
        create_state(&mut ex, &rj).await.unwrap();
        create_state(&mut ex, &sp).await.unwrap();
        let city = new_city(1, "Campinas", &rj);
        create_city(&mut ex, &city).await.unwrap();

        let now = datetime!(2023-12-20 12:00:00 UTC);
        let patch = CityPatch { name: None, state: Some(sp.id().clone()) };
        assert_eq!(1, update_city(&mut ex, city.id(), &patch, now).await.unwrap());

        let updated = get_city(&mut ex, city.id()).await.unwrap().unwrap();
        assert_eq!("Campinas", updated.name().as_str());
        assert_eq!(sp.id(), updated.state());
        assert_eq!(&now, updated.updated_at());

        let missing = DocumentId::new(MISSING_ID).unwrap();
        assert_eq!(0, update_city(&mut ex, &missing, &patch, now).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_cities_delete(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let rj = new_state(1, "Rio de Janeiro", "RJ");
        let sp = new_state(2, "Sao Paulo", "SP");
        create_state(&mut ex, &rj).await.unwrap();
        create_state(&mut ex, &sp).await.unwrap();
        let niteroi = new_city(1, "Niteroi", &rj);
        create_city(&mut ex, &niteroi).await.unwrap();
        create_city(&mut ex, &new_city(2, "Petropolis", &rj)).await.unwrap();
        create_city(&mut ex, &new_city(3, "Santos", &sp)).await.unwrap();

        assert_eq!(1, delete_city(&mut ex, niteroi.id()).await.unwrap());
        assert_eq!(0, delete_city(&mut ex, niteroi.id()).await.unwrap());

        let filter = CityFilter { state: Some(rj.id().clone()), ..Default::default() };
        assert_eq!(1, delete_cities(&mut ex, &filter).await.unwrap());
        assert_eq!(0, delete_cities(&mut ex, &filter).await.unwrap());

        let all = find_cities(&mut ex, &CityFilter::default()).await.unwrap();
        assert_eq!(vec!["Santos"], city_names(&all));
    }

    db.close().await;
}

pub(crate) async fn test_cities_exists(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let rj = new_state(1, "Rio de Janeiro", "RJ");
        let sp = new_state(2, "Sao Paulo", "SP");
        create_state(&mut ex, &rj).await.unwrap();
        create_city(&mut ex, &new_city(1, "Niteroi", &rj)).await.unwrap();

        let mut filter = CityFilter::from(&NewCity::new(Name::from("Niteroi"), rj.id().clone()));
        assert!(city_exists(&mut ex, &filter).await.unwrap());
        filter.state = Some(sp.id().clone());
        assert!(!city_exists(&mut ex, &filter).await.unwrap());
    }

    db.close().await;
}

pub(crate) async fn test_collections(db: Box<dyn Db + Send + Sync>) {
    let db: Arc<dyn Db + Send + Sync> = Arc::from(db);
    drop(setup_ex(db.as_ref()).await);

    let clock = Arc::new(SettableClock::new(datetime!(2023-12-14 06:30:09 UTC)));
    let states = StateCollection::new(db.clone(), clock.clone());
    let cities = CityCollection::new(db.clone(), clock.clone());

    let state = states
        .create(NewState::new(Name::from("Rio de Janeiro"), Abbreviation::from("RJ")))
        .await
        .unwrap();
    assert_eq!(&datetime!(2023-12-14 06:30:09 UTC), state.created_at());
    assert_eq!(state.created_at(), state.updated_at());
    assert!(state.id().as_str().starts_with("657aa0f1"));
    assert_eq!(
        DbError::AlreadyExists,
        states
            .create(NewState::new(Name::from("Rio de Janeiro"), Abbreviation::from("XX")))
            .await
            .unwrap_err()
    );

    clock.advance(Duration::from_secs(1));
    let city =
        cities.create(NewCity::new(Name::from("Niteroi"), state.id().clone())).await.unwrap();
    assert_eq!(&datetime!(2023-12-14 06:30:10 UTC), city.created_at());
    assert_eq!(Some(city.clone()), cities.find_by_id(city.id()).await.unwrap());

    clock.advance(Duration::from_secs(60));
    let patch = StatePatch { name: Some(Name::from("Estado do Rio")), abbreviation: None };
    assert_eq!(1, states.update_one(state.id(), patch).await.unwrap());
    let state = states.find_by_id(state.id()).await.unwrap().unwrap();
    assert_eq!(&datetime!(2023-12-14 06:30:09 UTC), state.created_at());
    assert_eq!(&datetime!(2023-12-14 06:31:10 UTC), state.updated_at());

    let filter = CityFilter { state: Some(state.id().clone()), ..Default::default() };
    assert!(cities.exists(&filter).await.unwrap());
    assert_eq!(1, cities.delete_many(&filter).await.unwrap());
    assert!(!cities.exists(&filter).await.unwrap());

    assert_eq!(1, states.delete_one(state.id()).await.unwrap());
    assert!(states.find(&StateFilter::default()).await.unwrap().is_empty());

    db.close().await;
}

/// Ensures the timestamps that go through the database keep microsecond precision.
pub(crate) async fn test_timestamps_precision(db: Box<dyn Db + Send + Sync>) {
    {
        let mut ex = setup_ex(db.as_ref()).await;

        let ts = OffsetDateTime::from_unix_timestamp_nanos(1_702_535_409_123_456_000).unwrap();
        let state = State::new(
            DocumentId::generate(ts),
            Name::from("Bahia"),
            Abbreviation::from("BA"),
            ts,
            ts,
        );
        create_state(&mut ex, &state).await.unwrap();
        assert_eq!(Some(state.clone()), get_state(&mut ex, state.id()).await.unwrap());
    }

    db.close().await;
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta])? ) => {
        statecity_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests,
            test_init_schema_is_idempotent,
            test_states_create_and_get,
            test_states_unique_fields,
            test_states_find_with_filters,
            test_states_update,
            test_states_delete,
            test_states_exists,
            test_states_find_non_ascii,
            test_states_find_after_rename,
            test_cities_create_and_get,
            test_cities_find_with_filters,
            test_cities_find_non_ascii,
            test_cities_update,
            test_cities_delete,
            test_cities_exists,
            test_collections,
            test_timestamps_precision
        );
    }
];

mod postgres {
    use statecity_core::db::postgres::testutils;

    generate_db_tests!(
        Box::from(testutils::setup().await),
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    use statecity_core::db::sqlite::testutils;

    generate_db_tests!(Box::from(testutils::setup().await));
}
