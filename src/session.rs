// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Signed-in session and the dashboard controller.
//!
//! A `Dashboard` exists only between login and logout. UI events reach it as
//! typed `Command`s; each one either mutates the store and reloads, or
//! recomputes derived views from the current snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::AuthProvider;
use crate::engine::export::{self, ReportContext};
use crate::engine::{
    aggregate, evaluate_budget, filter, Aggregates, BudgetStatus, ExpenseReport, FilterCriteria,
    Severity,
};
use crate::errors::{TrackerError, TrackerResult};
use crate::models::{Currency, ExpenseDraft, ExpensePatch, ExpenseRecord, Identity, UserProfile};
use crate::store::RecordStore;
use crate::utils::{fmt_money, today};
use crate::validation::{LoginForm, SignupForm, MAX_AMOUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard { uid: String },
}

impl Route {
    pub fn for_identity(identity: Option<&Identity>) -> Self {
        match identity {
            Some(id) => Route::Dashboard {
                uid: id.uid.clone(),
            },
            None => Route::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: msg.into(),
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: msg.into(),
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: msg.into(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: msg.into(),
        }
    }

    /// Budget banner; exceeded and over share the error style.
    pub fn from_budget(status: &BudgetStatus, ccy: Currency) -> Option<Self> {
        let msg = status.message(ccy)?;
        Some(match status.tier()?.severity() {
            Severity::Success => Notice::success(msg),
            Severity::Warning => Notice::warning(msg),
            Severity::Danger => Notice::error(msg),
        })
    }

    pub fn from_error(e: &TrackerError) -> Self {
        let message = match e {
            TrackerError::Auth { code } => code.message().to_string(),
            TrackerError::Store(_) => "Operation failed. Please try again.".to_string(),
            TrackerError::Validation { message, .. } => message.clone(),
            TrackerError::NotFound { .. } => {
                "Expense not found. It may have been deleted.".to_string()
            }
            TrackerError::EmptyExport => "No expenses to export".to_string(),
            TrackerError::NotSignedIn => "Please log in first".to_string(),
        };
        Self {
            kind: NoticeKind::Error,
            message,
        }
    }
}

/// Logs a failure the way it will be surfaced. Validation stays local.
pub fn log_failure(e: &TrackerError) {
    match e {
        TrackerError::Validation { field, message } => debug!("invalid {}: {}", field, message),
        TrackerError::EmptyExport => debug!("export requested with no records"),
        other => error!("{:?}", other),
    }
}

/// State owned by one signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub profile: UserProfile,
}

impl Session {
    /// Loads the profile, creating one if the identity has none yet.
    pub async fn open(store: &dyn RecordStore, identity: Identity) -> TrackerResult<Self> {
        let profile = match store.get_profile(&identity.uid).await? {
            Some(p) => p,
            None => {
                let name = identity
                    .email
                    .split('@')
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("User")
                    .to_string();
                store.create_profile(&identity, &name).await?
            }
        };
        Ok(Self { identity, profile })
    }

    pub fn currency(&self) -> Currency {
        self.profile.preferred_currency
    }

    pub fn budget(&self) -> Decimal {
        self.profile.monthly_budget
    }
}

/// Hands out increasing tickets for record loads and accepts a load's result
/// only if no newer load has already been applied.
#[derive(Debug, Default)]
pub struct LoadGuard {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl LoadGuard {
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn try_commit(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }

    pub fn latest_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}

/// Every derived view for one load.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub today: NaiveDate,
    pub records: Vec<ExpenseRecord>,
    pub aggregates: Aggregates,
    pub filtered: Vec<ExpenseRecord>,
    pub budget: BudgetStatus,
}

impl Snapshot {
    pub fn compute(
        sequence: u64,
        records: Vec<ExpenseRecord>,
        criteria: &FilterCriteria,
        budget: Decimal,
        today: NaiveDate,
    ) -> Self {
        let aggregates = aggregate(&records, today);
        let filtered = filter(&records, criteria, today);
        let budget = evaluate_budget(budget, aggregates.monthly_total);
        Self {
            sequence,
            today,
            records,
            aggregates,
            filtered,
            budget,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddRecord(ExpenseDraft),
    EditRecord { id: String, patch: ExpensePatch },
    DeleteRecord { id: String },
    SetFilter(FilterCriteria),
    SetCurrency(Currency),
    SetBudget(Decimal),
    Refresh,
}

struct DashboardState {
    session: Session,
    criteria: FilterCriteria,
    snapshot: Option<Arc<Snapshot>>,
}

pub struct Dashboard {
    uid: String,
    store: Arc<dyn RecordStore>,
    guard: LoadGuard,
    state: Mutex<DashboardState>,
    clock: fn() -> NaiveDate,
}

impl Dashboard {
    pub fn new(store: Arc<dyn RecordStore>, session: Session) -> Self {
        Self {
            uid: session.identity.uid.clone(),
            store,
            guard: LoadGuard::default(),
            state: Mutex::new(DashboardState {
                session,
                criteria: FilterCriteria::default(),
                snapshot: None,
            }),
            clock: today,
        }
    }

    /// Fixes "today" for every derived view.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Opens the dashboard for whoever the auth provider says is signed in.
    pub async fn restore(
        auth: &dyn AuthProvider,
        store: Arc<dyn RecordStore>,
    ) -> TrackerResult<Self> {
        let identity = auth.current_identity();
        match Route::for_identity(identity.as_ref()) {
            Route::Login => Err(TrackerError::NotSignedIn),
            Route::Dashboard { .. } => {
                let identity = identity.ok_or(TrackerError::NotSignedIn)?;
                let session = Session::open(store.as_ref(), identity).await?;
                Ok(Self::new(store, session))
            }
        }
    }

    fn lock(&self) -> TrackerResult<MutexGuard<'_, DashboardState>> {
        self.state
            .lock()
            .map_err(|_| TrackerError::Store("dashboard state poisoned".into()))
    }

    pub fn session(&self) -> TrackerResult<Session> {
        Ok(self.lock()?.session.clone())
    }

    pub fn criteria(&self) -> TrackerResult<FilterCriteria> {
        Ok(self.lock()?.criteria.clone())
    }

    pub fn snapshot(&self) -> TrackerResult<Option<Arc<Snapshot>>> {
        Ok(self.lock()?.snapshot.clone())
    }

    pub fn latest_applied(&self) -> u64 {
        self.guard.latest_applied()
    }

    /// Reloads records. Returns `None` when a newer load finished first and
    /// this result was dropped.
    pub async fn refresh(&self) -> TrackerResult<Option<Arc<Snapshot>>> {
        let ticket = self.guard.begin();
        let records = self.store.list_records(&self.uid).await?;
        let mut st = self.lock()?;
        if !self.guard.try_commit(ticket) {
            debug!(
                "dropping stale load #{} (newer #{} already applied)",
                ticket,
                self.guard.latest_applied()
            );
            return Ok(None);
        }
        let snap = Arc::new(Snapshot::compute(
            ticket,
            records,
            &st.criteria,
            st.session.budget(),
            (self.clock)(),
        ));
        st.snapshot = Some(snap.clone());
        Ok(Some(snap))
    }

    /// Recomputes views from the last loaded records without a store call.
    fn recompute(&self) -> TrackerResult<Option<Arc<Snapshot>>> {
        let mut st = self.lock()?;
        let Some(prev) = st.snapshot.clone() else {
            return Ok(None);
        };
        let snap = Arc::new(Snapshot::compute(
            prev.sequence,
            prev.records.clone(),
            &st.criteria,
            st.session.budget(),
            (self.clock)(),
        ));
        st.snapshot = Some(snap.clone());
        Ok(Some(snap))
    }

    pub async fn dispatch(&self, cmd: Command) -> TrackerResult<Notice> {
        let res = self.apply(cmd).await;
        if let Err(e) = &res {
            log_failure(e);
        }
        res
    }

    async fn apply(&self, cmd: Command) -> TrackerResult<Notice> {
        match cmd {
            Command::AddRecord(draft) => {
                let id = self.store.create_record(&self.uid, &draft).await?;
                self.refresh().await?;
                info!("added expense {}", id);
                Ok(Notice::success("Expense added successfully!"))
            }
            Command::EditRecord { id, patch } => {
                self.store.update_record(&self.uid, &id, &patch).await?;
                self.refresh().await?;
                Ok(Notice::success("Expense updated successfully!"))
            }
            Command::DeleteRecord { id } => {
                self.store.delete_record(&self.uid, &id).await?;
                self.refresh().await?;
                Ok(Notice::success("Expense deleted"))
            }
            Command::SetFilter(criteria) => {
                self.lock()?.criteria = criteria;
                let shown = self.recompute()?.map(|s| s.filtered.len()).unwrap_or(0);
                Ok(Notice::info(format!("Showing {} expenses", shown)))
            }
            Command::SetCurrency(ccy) => {
                self.store.set_currency(&self.uid, ccy).await?;
                self.lock()?.session.profile.preferred_currency = ccy;
                Ok(Notice::success(format!("Currency changed to {}", ccy)))
            }
            Command::SetBudget(amount) => {
                if amount < Decimal::ZERO || amount > MAX_AMOUNT {
                    return Err(TrackerError::validation(
                        crate::errors::Field::Budget,
                        "Budget must be a non-negative number",
                    ));
                }
                self.store.set_budget(&self.uid, amount).await?;
                let ccy = {
                    let mut st = self.lock()?;
                    st.session.profile.monthly_budget = amount;
                    st.session.currency()
                };
                self.recompute()?;
                if amount.is_zero() {
                    Ok(Notice::info("Monthly budget cleared"))
                } else {
                    Ok(Notice::success(format!(
                        "Monthly budget set to {}",
                        fmt_money(&amount, ccy)
                    )))
                }
            }
            Command::Refresh => {
                let n = self
                    .refresh()
                    .await?
                    .map(|s| s.records.len())
                    .unwrap_or(0);
                Ok(Notice::info(format!("Loaded {} expenses", n)))
            }
        }
    }

    async fn loaded(&self) -> TrackerResult<Arc<Snapshot>> {
        if let Some(s) = self.snapshot()? {
            return Ok(s);
        }
        match self.refresh().await? {
            Some(s) => Ok(s),
            None => self
                .snapshot()?
                .ok_or_else(|| TrackerError::Store("no records loaded".into())),
        }
    }

    /// Delimited-text export of the filtered view: (file name, contents).
    pub async fn export_csv(&self) -> TrackerResult<(String, String)> {
        let snap = self.loaded().await?;
        let ccy = self.session()?.currency();
        let res = export::to_delimited_text(&snap.filtered, ccy)
            .map(|text| (export::csv_file_name(snap.today), text));
        if let Err(e) = &res {
            log_failure(e);
        }
        res
    }

    pub async fn export_report(&self) -> TrackerResult<ExpenseReport> {
        let snap = self.loaded().await?;
        let (session, criteria) = {
            let st = self.lock()?;
            (st.session.clone(), st.criteria.clone())
        };
        let ctx = ReportContext {
            user: &session.profile.email,
            currency: session.currency(),
            criteria: &criteria,
            today: snap.today,
        };
        let res = export::to_report(&snap.filtered, &ctx);
        if let Err(e) = &res {
            log_failure(e);
        }
        res
    }

    /// Ends the session; the dashboard is consumed.
    pub async fn logout(self, auth: &dyn AuthProvider) -> TrackerResult<()> {
        auth.sign_out().await.inspect_err(log_failure)?;
        info!("session closed for {}", self.uid);
        Ok(())
    }
}

/// Signs in and opens the dashboard. The password is cleared after success
/// and after credential failures.
pub async fn login(
    auth: &dyn AuthProvider,
    store: Arc<dyn RecordStore>,
    form: &mut LoginForm,
) -> TrackerResult<Dashboard> {
    form.validate().inspect_err(log_failure)?;
    let identity = match auth.sign_in(&form.email, &form.password).await {
        Ok(id) => id,
        Err(e) => {
            if let TrackerError::Auth { code } = &e {
                if code.clears_password() {
                    form.clear_password();
                }
            }
            log_failure(&e);
            return Err(e);
        }
    };
    form.clear_password();
    let session = Session::open(store.as_ref(), identity).await?;
    Ok(Dashboard::new(store, session))
}

/// Creates the account and its profile. A profile write failure leaves the
/// account in place and is reported as a warning.
pub async fn register(
    auth: &dyn AuthProvider,
    store: &dyn RecordStore,
    form: &SignupForm,
) -> Result<(Identity, Notice), Vec<TrackerError>> {
    form.validate()?;
    let identity = auth
        .sign_up(form.email.trim(), &form.password)
        .await
        .map_err(|e| {
            log_failure(&e);
            vec![e]
        })?;
    let notice = match store.create_profile(&identity, form.name.trim()).await {
        Ok(_) => Notice::success("Account created successfully!"),
        Err(e) => {
            warn!("profile setup failed for {}: {}", identity.uid, e);
            Notice::warning("Account created but profile setup incomplete. Please contact support.")
        }
    };
    Ok((identity, notice))
}
