// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod account;
pub mod budgets;
pub mod currency;
pub mod expenses;
pub mod exporter;
pub mod summary;

use std::io::{self, BufRead, Write};
use std::sync::{Arc, MutexGuard};

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::auth::LocalAuth;
use crate::config::AppConfig;
use crate::db::{self, SharedConn};
use crate::engine::FilterCriteria;
use crate::session::{Dashboard, Notice, NoticeKind};
use crate::store::{RecordStore, SqliteStore};

/// Everything a command handler needs for one invocation.
pub struct AppContext {
    pub cfg: AppConfig,
    pub conn: SharedConn,
    pub auth: LocalAuth,
    pub store: Arc<SqliteStore>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, conn: SharedConn) -> Result<Self> {
        let auth = LocalAuth::new(conn.clone())?;
        let store = Arc::new(SqliteStore::new(conn.clone()));
        Ok(Self {
            cfg,
            conn,
            auth,
            store,
        })
    }

    pub fn open(cfg: AppConfig) -> Result<Self> {
        let conn = db::open_or_init(&cfg)?;
        Self::new(cfg, conn)
    }

    pub fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection poisoned"))
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Dashboard for the signed-in user, loaded once.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let dash = Dashboard::restore(&self.auth, self.store()).await?;
        dash.refresh().await?;
        Ok(dash)
    }
}

pub fn print_notice(n: &Notice) {
    match n.kind {
        NoticeKind::Success => println!("✔ {}", n.message),
        NoticeKind::Info => println!("ℹ {}", n.message),
        NoticeKind::Warning => eprintln!("⚠ {}", n.message),
        NoticeKind::Error => eprintln!("✖ {}", n.message),
    }
}

pub fn criteria_from(m: &clap::ArgMatches) -> FilterCriteria {
    FilterCriteria::new(
        m.get_one::<String>("category").map(String::as_str),
        m.get_one::<String>("period").map(String::as_str),
    )
}

/// Reads one line from stdin after printing `label`.
pub fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
