// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed access to the per-user document store.
//!
//! Every call is an independent round-trip and may fail on its own; nothing is
//! cached between calls, so each `list_records` is a fresh authoritative read.

use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::SharedConn;
use crate::errors::{TrackerError, TrackerResult};
use crate::models::{Currency, ExpenseDraft, ExpensePatch, ExpenseRecord, Identity, UserProfile};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records for `uid`, newest date first.
    async fn list_records(&self, uid: &str) -> TrackerResult<Vec<ExpenseRecord>>;

    async fn create_record(&self, uid: &str, draft: &ExpenseDraft) -> TrackerResult<String>;

    async fn update_record(&self, uid: &str, id: &str, patch: &ExpensePatch)
    -> TrackerResult<()>;

    async fn delete_record(&self, uid: &str, id: &str) -> TrackerResult<()>;

    async fn create_profile(&self, identity: &Identity, name: &str) -> TrackerResult<UserProfile>;

    async fn get_profile(&self, uid: &str) -> TrackerResult<Option<UserProfile>>;

    async fn set_currency(&self, uid: &str, currency: Currency) -> TrackerResult<()>;

    async fn set_budget(&self, uid: &str, budget: Decimal) -> TrackerResult<()>;
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: SharedConn,
}

impl SqliteStore {
    pub fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    fn lock(&self) -> TrackerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TrackerError::Store("database connection poisoned".into()))
    }
}

fn conv_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conv_err(idx, e))
}

fn record_from_row(r: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let amount: String = r.get(1)?;
    let date: String = r.get(4)?;
    let created: String = r.get(5)?;
    let updated: Option<String> = r.get(6)?;
    Ok(ExpenseRecord {
        id: r.get(0)?,
        amount: amount.parse::<Decimal>().map_err(|e| conv_err(1, e))?,
        category: r.get(2)?,
        description: r.get(3)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| conv_err(4, e))?,
        created_at: parse_ts(5, &created)?,
        updated_at: updated.as_deref().map(|s| parse_ts(6, s)).transpose()?,
    })
}

fn profile_from_row(r: &Row<'_>) -> rusqlite::Result<UserProfile> {
    let ccy: String = r.get(3)?;
    let budget: String = r.get(4)?;
    let created: String = r.get(5)?;
    let updated: String = r.get(6)?;
    Ok(UserProfile {
        uid: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        // Unknown codes fall back to the default currency.
        preferred_currency: ccy.parse().unwrap_or_default(),
        monthly_budget: budget.parse::<Decimal>().map_err(|e| conv_err(4, e))?,
        created_at: parse_ts(5, &created)?,
        updated_at: parse_ts(6, &updated)?,
    })
}

const RECORD_COLS: &str = "id, amount, category, description, date, created_at, updated_at";
const PROFILE_COLS: &str =
    "uid, name, email, preferred_currency, monthly_budget, created_at, updated_at";

fn fetch_record(conn: &Connection, uid: &str, id: &str) -> TrackerResult<Option<ExpenseRecord>> {
    let sql = format!("SELECT {RECORD_COLS} FROM expenses WHERE uid=?1 AND id=?2");
    let rec = conn
        .query_row(&sql, params![uid, id], record_from_row)
        .optional()?;
    Ok(rec)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list_records(&self, uid: &str) -> TrackerResult<Vec<ExpenseRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {RECORD_COLS} FROM expenses WHERE uid=?1 ORDER BY date DESC, created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![uid], record_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    async fn create_record(&self, uid: &str, draft: &ExpenseDraft) -> TrackerResult<String> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().simple().to_string();
        conn.execute(
            "INSERT INTO expenses(id, uid, amount, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                uid,
                draft.amount.to_string(),
                draft.category,
                draft.description.trim(),
                draft.date.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        info!("expense {} created for {}", id, uid);
        Ok(id)
    }

    async fn update_record(
        &self,
        uid: &str,
        id: &str,
        patch: &ExpensePatch,
    ) -> TrackerResult<()> {
        let conn = self.lock()?;
        let cur = fetch_record(&conn, uid, id)?.ok_or_else(|| TrackerError::NotFound {
            id: id.to_string(),
        })?;
        let amount = patch.amount.unwrap_or(cur.amount);
        let category = patch.category.clone().unwrap_or(cur.category);
        let description = patch
            .description
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .unwrap_or(cur.description);
        let date = patch.date.unwrap_or(cur.date);
        conn.execute(
            "UPDATE expenses SET amount=?1, category=?2, description=?3, date=?4, updated_at=?5
             WHERE uid=?6 AND id=?7",
            params![
                amount.to_string(),
                category,
                description,
                date.to_string(),
                Utc::now().to_rfc3339(),
                uid,
                id
            ],
        )?;
        info!("expense {} updated for {}", id, uid);
        Ok(())
    }

    async fn delete_record(&self, uid: &str, id: &str) -> TrackerResult<()> {
        let conn = self.lock()?;
        let n = conn.execute(
            "DELETE FROM expenses WHERE uid=?1 AND id=?2",
            params![uid, id],
        )?;
        if n == 0 {
            return Err(TrackerError::NotFound { id: id.to_string() });
        }
        info!("expense {} deleted for {}", id, uid);
        Ok(())
    }

    async fn create_profile(&self, identity: &Identity, name: &str) -> TrackerResult<UserProfile> {
        let conn = self.lock()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users(uid, name, email, preferred_currency, monthly_budget, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'USD', '0', ?4, ?4)
             ON CONFLICT(uid) DO UPDATE SET name=excluded.name, email=excluded.email,
                updated_at=excluded.updated_at",
            params![identity.uid, name, identity.email, now.to_rfc3339()],
        )?;
        let sql = format!("SELECT {PROFILE_COLS} FROM users WHERE uid=?1");
        let profile = conn.query_row(&sql, params![identity.uid], profile_from_row)?;
        info!("profile created for {}", identity.uid);
        Ok(profile)
    }

    async fn get_profile(&self, uid: &str) -> TrackerResult<Option<UserProfile>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {PROFILE_COLS} FROM users WHERE uid=?1");
        let p = conn
            .query_row(&sql, params![uid], profile_from_row)
            .optional()?;
        Ok(p)
    }

    async fn set_currency(&self, uid: &str, currency: Currency) -> TrackerResult<()> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE users SET preferred_currency=?1, updated_at=?2 WHERE uid=?3",
            params![currency.code(), Utc::now().to_rfc3339(), uid],
        )?;
        if n == 0 {
            return Err(TrackerError::NotFound { id: uid.to_string() });
        }
        Ok(())
    }

    async fn set_budget(&self, uid: &str, budget: Decimal) -> TrackerResult<()> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE users SET monthly_budget=?1, updated_at=?2 WHERE uid=?3",
            params![budget.to_string(), Utc::now().to_rfc3339(), uid],
        )?;
        if n == 0 {
            return Err(TrackerError::NotFound { id: uid.to_string() });
        }
        Ok(())
    }
}
