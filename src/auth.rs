// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Authentication boundary.
//!
//! `AuthProvider` is the contract the dashboard relies on. `LocalAuth` keeps
//! credentials in the same SQLite file as the records and reports failures with
//! the same `auth/*` codes a hosted identity service would.

use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::{self, SESSION_UID};
use crate::db::SharedConn;
use crate::errors::{AuthErrorCode, TrackerError, TrackerResult};
use crate::models::Identity;
use crate::validation::{is_valid_email, is_valid_password};

/// Consecutive failures before sign-in is throttled.
pub const MAX_FAILED_ATTEMPTS: i64 = 5;

/// How long a throttled account stays locked after its last failure.
pub const LOCKOUT_MINUTES: i64 = 15;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> TrackerResult<Identity>;

    /// Creates the identity and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> TrackerResult<Identity>;

    async fn sign_out(&self) -> TrackerResult<()>;

    fn current_identity(&self) -> Option<Identity>;

    /// Receives the current identity, then every change to it.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

pub struct LocalAuth {
    conn: SharedConn,
    state: watch::Sender<Option<Identity>>,
}

fn hash_password(salt: &str, password: &str) -> blake3::Hash {
    let mut h = blake3::Hasher::new();
    h.update(salt.as_bytes());
    h.update(password.as_bytes());
    h.finalize()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn fail(code: AuthErrorCode) -> TrackerError {
    warn!("auth failure: {}", code);
    TrackerError::auth(code)
}

struct CredentialRow {
    uid: String,
    email: String,
    password_hash: String,
    salt: String,
    disabled: bool,
    failed_attempts: i64,
    last_failed_at: Option<DateTime<Utc>>,
}

impl CredentialRow {
    fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.failed_attempts >= MAX_FAILED_ATTEMPTS
            && self
                .last_failed_at
                .is_some_and(|t| now < t + Duration::minutes(LOCKOUT_MINUTES))
    }
}

impl LocalAuth {
    /// Restores a persisted session if one exists.
    pub fn new(conn: SharedConn) -> TrackerResult<Self> {
        let current = {
            let c = conn
                .lock()
                .map_err(|_| TrackerError::Store("database connection poisoned".into()))?;
            match config::get_setting(&c, SESSION_UID)? {
                Some(uid) => identity_for_uid(&c, &uid)?,
                None => None,
            }
        };
        let (state, _) = watch::channel(current);
        Ok(Self { conn, state })
    }

    fn lock(&self) -> TrackerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| fail(AuthErrorCode::NetworkRequestFailed))
    }

    pub fn set_disabled(&self, email: &str, disabled: bool) -> TrackerResult<()> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE credentials SET disabled=?1 WHERE email=?2",
            params![disabled, normalize_email(email)],
        )?;
        if n == 0 {
            return Err(fail(AuthErrorCode::UserNotFound));
        }
        Ok(())
    }

    fn publish(&self, identity: Option<Identity>) {
        self.state.send_replace(identity);
    }
}

fn identity_for_uid(conn: &Connection, uid: &str) -> TrackerResult<Option<Identity>> {
    let id = conn
        .query_row(
            "SELECT uid, email FROM credentials WHERE uid=?1",
            params![uid],
            |r| {
                Ok(Identity {
                    uid: r.get(0)?,
                    email: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(id)
}

fn credential_by_email(conn: &Connection, email: &str) -> TrackerResult<Option<CredentialRow>> {
    let row = conn
        .query_row(
            "SELECT uid, email, password_hash, salt, disabled, failed_attempts, last_failed_at
             FROM credentials WHERE email=?1",
            params![email],
            |r| {
                Ok(CredentialRow {
                    uid: r.get(0)?,
                    email: r.get(1)?,
                    password_hash: r.get(2)?,
                    salt: r.get(3)?,
                    disabled: r.get(4)?,
                    failed_attempts: r.get(5)?,
                    last_failed_at: r.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> TrackerResult<Identity> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(fail(AuthErrorCode::InvalidEmail));
        }
        let identity = {
            let conn = self.lock()?;
            let cred =
                credential_by_email(&conn, &email)?.ok_or_else(|| fail(AuthErrorCode::UserNotFound))?;
            if cred.disabled {
                return Err(fail(AuthErrorCode::UserDisabled));
            }
            let now = Utc::now();
            if cred.is_locked(now) {
                return Err(fail(AuthErrorCode::TooManyRequests));
            }
            let matches = blake3::Hash::from_hex(&cred.password_hash)
                .map(|stored| stored == hash_password(&cred.salt, password))
                .unwrap_or(false);
            if !matches {
                // A lapsed lockout starts a fresh count.
                let attempts = if cred.failed_attempts >= MAX_FAILED_ATTEMPTS {
                    1
                } else {
                    cred.failed_attempts + 1
                };
                conn.execute(
                    "UPDATE credentials SET failed_attempts=?1, last_failed_at=?2 WHERE uid=?3",
                    params![attempts, now, cred.uid],
                )?;
                return Err(fail(AuthErrorCode::WrongPassword));
            }
            conn.execute(
                "UPDATE credentials SET failed_attempts=0, last_failed_at=NULL WHERE uid=?1",
                params![cred.uid],
            )?;
            config::set_setting(&conn, SESSION_UID, &cred.uid)?;
            Identity {
                uid: cred.uid,
                email: cred.email,
            }
        };
        info!("signed in {}", identity.uid);
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> TrackerResult<Identity> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(fail(AuthErrorCode::InvalidEmail));
        }
        if !is_valid_password(password) {
            return Err(fail(AuthErrorCode::WeakPassword));
        }
        let identity = {
            let conn = self.lock()?;
            if credential_by_email(&conn, &email)?.is_some() {
                return Err(fail(AuthErrorCode::EmailAlreadyInUse));
            }
            let uid = Uuid::new_v4().simple().to_string();
            let salt = Uuid::new_v4().simple().to_string();
            let hash = hash_password(&salt, password);
            conn.execute(
                "INSERT INTO credentials(uid, email, password_hash, salt) VALUES (?1, ?2, ?3, ?4)",
                params![uid, email, hash.to_hex().as_str(), salt],
            )?;
            config::set_setting(&conn, SESSION_UID, &uid)?;
            Identity { uid, email }
        };
        info!("account created {}", identity.uid);
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> TrackerResult<()> {
        {
            let conn = self.lock()?;
            config::clear_setting(&conn, SESSION_UID)?;
        }
        info!("signed out");
        self.publish(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}
