// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Currency;
use crate::utils::fmt_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ok,
    Warning,
    Exceeded,
    Over,
}

/// Visual class shared by one or more tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Tier {
    pub fn from_percent(pct: Decimal) -> Self {
        if pct >= Decimal::from(110) {
            Tier::Over
        } else if pct >= Decimal::from(100) {
            Tier::Exceeded
        } else if pct >= Decimal::from(80) {
            Tier::Warning
        } else {
            Tier::Ok
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Tier::Ok => Severity::Success,
            Tier::Warning => Severity::Warning,
            Tier::Exceeded | Tier::Over => Severity::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BudgetStatus {
    Unconfigured,
    Configured {
        budget: Decimal,
        spent: Decimal,
        remaining: Decimal,
        percent_used: Decimal,
        tier: Tier,
    },
}

pub fn evaluate_budget(budget: Decimal, spent: Decimal) -> BudgetStatus {
    if budget <= Decimal::ZERO {
        return BudgetStatus::Unconfigured;
    }
    let percent_used = spent
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|p| p.checked_div(budget))
        .unwrap_or(Decimal::MAX);
    BudgetStatus::Configured {
        budget,
        spent,
        remaining: budget.saturating_sub(spent),
        percent_used,
        tier: Tier::from_percent(percent_used),
    }
}

impl BudgetStatus {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            BudgetStatus::Unconfigured => None,
            BudgetStatus::Configured { tier, .. } => Some(*tier),
        }
    }

    /// Human message for the tier; `None` when no budget is set.
    pub fn message(&self, ccy: Currency) -> Option<String> {
        let BudgetStatus::Configured {
            remaining,
            percent_used,
            tier,
            ..
        } = self
        else {
            return None;
        };
        let msg = match tier {
            Tier::Over => format!(
                "You've exceeded your monthly budget by {}!",
                fmt_money(&remaining.abs(), ccy)
            ),
            Tier::Exceeded => "You've reached your monthly budget limit.".to_string(),
            Tier::Warning => format!(
                "You've used {:.0}% of your monthly budget.",
                percent_used
            ),
            Tier::Ok => format!(
                "{} left of your monthly budget.",
                fmt_money(remaining, ccy)
            ),
        };
        Some(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn zero_budget_is_unconfigured() {
        for spent in [0, 1, 999_999] {
            let s = evaluate_budget(Decimal::ZERO, d(spent));
            assert_eq!(s, BudgetStatus::Unconfigured);
            assert_eq!(s.tier(), None);
            assert!(s.message(Currency::Usd).is_none());
        }
        assert_eq!(evaluate_budget(d(-10), d(5)), BudgetStatus::Unconfigured);
    }

    #[test]
    fn warning_at_85_percent() {
        let s = evaluate_budget(d(1000), d(850));
        match &s {
            BudgetStatus::Configured {
                percent_used, tier, remaining, ..
            } => {
                assert_eq!(*percent_used, d(85));
                assert_eq!(*tier, Tier::Warning);
                assert_eq!(*remaining, d(150));
            }
            _ => panic!("expected configured"),
        }
        assert_eq!(
            s.message(Currency::Usd).unwrap(),
            "You've used 85% of your monthly budget."
        );
    }

    #[test]
    fn over_at_130_percent() {
        let s = evaluate_budget(d(500), d(650));
        match &s {
            BudgetStatus::Configured {
                percent_used, tier, remaining, ..
            } => {
                assert_eq!(*percent_used, d(130));
                assert_eq!(*tier, Tier::Over);
                assert_eq!(*remaining, d(-150));
            }
            _ => panic!("expected configured"),
        }
        assert_eq!(
            s.message(Currency::Usd).unwrap(),
            "You've exceeded your monthly budget by $150.00!"
        );
    }

    #[test]
    fn threshold_edges() {
        assert_eq!(Tier::from_percent(d(80)), Tier::Warning);
        assert_eq!(Tier::from_percent(Decimal::new(7999, 2)), Tier::Ok);
        assert_eq!(Tier::from_percent(d(100)), Tier::Exceeded);
        assert_eq!(Tier::from_percent(d(110)), Tier::Over);
    }

    #[test]
    fn exceeded_and_over_share_severity_not_message() {
        let exceeded = evaluate_budget(d(100), d(105));
        let over = evaluate_budget(d(100), d(120));
        assert_eq!(exceeded.tier().unwrap().severity(), Severity::Danger);
        assert_eq!(over.tier().unwrap().severity(), Severity::Danger);
        assert_ne!(
            exceeded.message(Currency::Gbp),
            over.message(Currency::Gbp)
        );
    }
}
