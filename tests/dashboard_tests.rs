// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use spendsight::auth::{AuthProvider, LocalAuth};
use spendsight::db;
use spendsight::engine::{FilterCriteria, Tier};
use spendsight::errors::{TrackerError, TrackerResult};
use spendsight::models::{
    Currency, ExpenseDraft, ExpensePatch, ExpenseRecord, Identity, UserProfile,
};
use spendsight::session::{Command, Dashboard, NoticeKind, Session};
use spendsight::store::{RecordStore, SqliteStore};

fn march_15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn draft(amount: &str, cat: &str, date: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount: Decimal::from_str(amount).unwrap(),
        category: cat.to_string(),
        description: format!("{cat} spend"),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}

async fn open(store: Arc<dyn RecordStore>) -> Dashboard {
    let identity = Identity {
        uid: "u1".into(),
        email: "lee@example.com".into(),
    };
    let session = Session::open(store.as_ref(), identity).await.unwrap();
    Dashboard::new(store, session).with_clock(march_15)
}

fn sqlite() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new(db::open_in_memory().unwrap()))
}

#[tokio::test]
async fn profile_is_created_on_first_open() {
    let dash = open(sqlite()).await;
    let s = dash.session().unwrap();
    assert_eq!(s.profile.name, "lee");
    assert_eq!(s.currency(), Currency::Usd);
    assert!(dash.snapshot().unwrap().is_none());
}

#[tokio::test]
async fn mutations_reload_views() {
    let dash = open(sqlite()).await;

    let n = dash
        .dispatch(Command::AddRecord(draft("50", "Food", "2025-03-01")))
        .await
        .unwrap();
    assert_eq!(n.kind, NoticeKind::Success);
    dash.dispatch(Command::AddRecord(draft("20", "Transport", "2025-03-02")))
        .await
        .unwrap();
    dash.dispatch(Command::AddRecord(draft("30", "Food", "2025-02-10")))
        .await
        .unwrap();

    let snap = dash.snapshot().unwrap().unwrap();
    assert_eq!(snap.records.len(), 3);
    assert_eq!(snap.aggregates.lifetime_total, Decimal::from(100));
    assert_eq!(snap.aggregates.monthly_total, Decimal::from(70));

    let id = snap.records[0].id.clone();
    let patch = ExpensePatch {
        amount: Some(Decimal::from(25)),
        ..Default::default()
    };
    dash.dispatch(Command::EditRecord {
        id: id.clone(),
        patch,
    })
    .await
    .unwrap();
    let snap = dash.snapshot().unwrap().unwrap();
    assert_eq!(snap.aggregates.lifetime_total, Decimal::from(105));

    dash.dispatch(Command::DeleteRecord { id: id.clone() })
        .await
        .unwrap();
    assert_eq!(dash.snapshot().unwrap().unwrap().records.len(), 2);

    let err = dash
        .dispatch(Command::DeleteRecord { id })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { .. }));
}

#[tokio::test]
async fn filter_changes_only_the_filtered_view() {
    let dash = open(sqlite()).await;
    for (amt, cat, date) in [
        ("5", "Food", "2025-03-15"),
        ("6", "Food", "2025-03-01"),
        ("7", "Rent", "2025-03-15"),
    ] {
        dash.dispatch(Command::AddRecord(draft(amt, cat, date)))
            .await
            .unwrap();
    }
    let before = dash.snapshot().unwrap().unwrap();

    let notice = dash
        .dispatch(Command::SetFilter(FilterCriteria::new(
            Some("Food"),
            Some("today"),
        )))
        .await
        .unwrap();
    assert_eq!(notice.message, "Showing 1 expenses");

    let after = dash.snapshot().unwrap().unwrap();
    assert_eq!(after.filtered.len(), 1);
    assert_eq!(after.aggregates, before.aggregates);
    assert_eq!(after.sequence, before.sequence);
    assert_eq!(dash.criteria().unwrap().category.as_deref(), Some("Food"));
}

#[tokio::test]
async fn budget_and_currency_update_status() {
    let dash = open(sqlite()).await;
    dash.dispatch(Command::AddRecord(draft("850", "Rent", "2025-03-03")))
        .await
        .unwrap();

    let snap = dash.snapshot().unwrap().unwrap();
    assert!(snap.budget.tier().is_none());

    dash.dispatch(Command::SetBudget(Decimal::from(1000)))
        .await
        .unwrap();
    let snap = dash.snapshot().unwrap().unwrap();
    assert_eq!(snap.budget.tier(), Some(Tier::Warning));

    let err = dash
        .dispatch(Command::SetBudget(Decimal::from(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation { .. }));

    let n = dash
        .dispatch(Command::SetCurrency(Currency::Jpy))
        .await
        .unwrap();
    assert_eq!(n.message, "Currency changed to JPY");
    assert_eq!(dash.session().unwrap().currency(), Currency::Jpy);

    let (name, text) = dash.export_csv().await.unwrap();
    assert_eq!(name, "expenses_2025-03-15.csv");
    assert!(text.contains("¥850.00"));
}

/// Delays the first listing so a later load finishes before it.
struct SlowFirstList {
    inner: Arc<SqliteStore>,
    calls: AtomicUsize,
}

#[async_trait]
impl RecordStore for SlowFirstList {
    async fn list_records(&self, uid: &str) -> TrackerResult<Vec<ExpenseRecord>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.inner.list_records(uid).await
    }

    async fn create_record(&self, uid: &str, draft: &ExpenseDraft) -> TrackerResult<String> {
        self.inner.create_record(uid, draft).await
    }

    async fn update_record(
        &self,
        uid: &str,
        id: &str,
        patch: &ExpensePatch,
    ) -> TrackerResult<()> {
        self.inner.update_record(uid, id, patch).await
    }

    async fn delete_record(&self, uid: &str, id: &str) -> TrackerResult<()> {
        self.inner.delete_record(uid, id).await
    }

    async fn create_profile(&self, identity: &Identity, name: &str) -> TrackerResult<UserProfile> {
        self.inner.create_profile(identity, name).await
    }

    async fn get_profile(&self, uid: &str) -> TrackerResult<Option<UserProfile>> {
        self.inner.get_profile(uid).await
    }

    async fn set_currency(&self, uid: &str, currency: Currency) -> TrackerResult<()> {
        self.inner.set_currency(uid, currency).await
    }

    async fn set_budget(&self, uid: &str, budget: Decimal) -> TrackerResult<()> {
        self.inner.set_budget(uid, budget).await
    }
}

#[tokio::test]
async fn stale_load_is_dropped() {
    let inner = sqlite();
    inner
        .create_record("u1", &draft("12", "Food", "2025-03-10"))
        .await
        .unwrap();
    let store = Arc::new(SlowFirstList {
        inner,
        calls: AtomicUsize::new(0),
    });
    let dash = open(store).await;

    let (slow, fast) = tokio::join!(dash.refresh(), dash.refresh());
    let fast = fast.unwrap().expect("newer load applies");
    assert!(slow.unwrap().is_none());
    assert_eq!(fast.sequence, 2);
    assert_eq!(dash.latest_applied(), 2);
    assert_eq!(dash.snapshot().unwrap().unwrap().sequence, 2);
}

#[tokio::test]
async fn restore_requires_a_signed_in_user() {
    let conn = db::open_in_memory().unwrap();
    let auth = LocalAuth::new(conn.clone()).unwrap();
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(conn));

    let err = Dashboard::restore(&auth, store.clone()).await.err().unwrap();
    assert!(matches!(err, TrackerError::NotSignedIn));

    auth.sign_up("jo@example.com", "hunter22").await.unwrap();
    let dash = Dashboard::restore(&auth, store).await.unwrap();
    assert_eq!(dash.session().unwrap().profile.email, "jo@example.com");

    dash.logout(&auth).await.unwrap();
    assert!(auth.current_identity().is_none());
}
