// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use spendsight::db;
use spendsight::errors::TrackerError;
use spendsight::models::{Currency, ExpenseDraft, ExpensePatch, Identity};
use spendsight::store::{RecordStore, SqliteStore};

fn draft(amount: &str, cat: &str, desc: &str, date: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount: Decimal::from_str(amount).unwrap(),
        category: cat.to_string(),
        description: desc.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}

fn setup() -> SqliteStore {
    SqliteStore::new(db::open_in_memory().unwrap())
}

#[tokio::test]
async fn records_list_newest_first_per_user() {
    let store = setup();
    store
        .create_record("u1", &draft("5", "Food", "Bagel", "2025-03-01"))
        .await
        .unwrap();
    store
        .create_record("u1", &draft("9", "Food", "Dinner", "2025-03-03"))
        .await
        .unwrap();
    store
        .create_record("u2", &draft("1", "Food", "Gum", "2025-03-02"))
        .await
        .unwrap();

    let mine = store.list_records("u1").await.unwrap();
    let descs: Vec<&str> = mine.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descs, ["Dinner", "Bagel"]);
    assert!(mine.iter().all(|r| r.updated_at.is_none()));
    assert_eq!(store.list_records("u2").await.unwrap().len(), 1);
    assert!(store.list_records("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_patch_and_stamps_time() {
    let store = setup();
    let id = store
        .create_record("u1", &draft("5", "Food", "Bagel", "2025-03-01"))
        .await
        .unwrap();
    let patch = ExpensePatch {
        amount: Some(Decimal::from(7)),
        description: Some("  Bagel and coffee  ".to_string()),
        ..Default::default()
    };
    store.update_record("u1", &id, &patch).await.unwrap();

    let r = &store.list_records("u1").await.unwrap()[0];
    assert_eq!(r.amount, Decimal::from(7));
    assert_eq!(r.category, "Food");
    assert_eq!(r.description, "Bagel and coffee");
    assert!(r.updated_at.is_some());
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let store = setup();
    let id = store
        .create_record("u1", &draft("5", "Food", "Bagel", "2025-03-01"))
        .await
        .unwrap();

    // Another user's id is invisible.
    let err = store.delete_record("u2", &id).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { .. }));

    store.delete_record("u1", &id).await.unwrap();
    let err = store.delete_record("u1", &id).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { id: ref got } if *got == id));

    let patch = ExpensePatch {
        category: Some("Other".into()),
        ..Default::default()
    };
    let err = store.update_record("u1", &id, &patch).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { .. }));
}

#[tokio::test]
async fn profile_defaults_and_preferences() {
    let store = setup();
    let identity = Identity {
        uid: "u1".into(),
        email: "kim@example.com".into(),
    };
    assert!(store.get_profile("u1").await.unwrap().is_none());

    let p = store.create_profile(&identity, "Kim").await.unwrap();
    assert_eq!(p.preferred_currency, Currency::Usd);
    assert!(p.monthly_budget.is_zero());

    store.set_currency("u1", Currency::Inr).await.unwrap();
    store.set_budget("u1", Decimal::from(1500)).await.unwrap();
    let p = store.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(p.name, "Kim");
    assert_eq!(p.preferred_currency, Currency::Inr);
    assert_eq!(p.monthly_budget, Decimal::from(1500));
}
