//! Savings goal progress.
use crate::core::ledger::Goal;
use crate::core::ranking::{TopN, top_n_by};
use crate::core::rate_cache::{Converter, RateTable};
use crate::core::session::Session;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal: Goal,
    /// `current / target * 100`, unclamped. `None` when the target is not positive.
    pub percent_complete: Option<Decimal>,
}

impl GoalProgress {
    pub fn new(goal: Goal) -> Self {
        let percent_complete = percent_of(goal.current_amount, goal.target_amount);
        Self {
            goal,
            percent_complete,
        }
    }

    /// Progress for display, clamped to `[0, 100]`.
    pub fn display_percent(&self) -> Option<Decimal> {
        self.percent_complete.map(clamp_percent)
    }

    pub fn target_reached(&self) -> bool {
        self.goal.current_amount >= self.goal.target_amount
    }

    pub fn remaining(&self) -> Decimal {
        (self.goal.target_amount - self.goal.current_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalSummary {
    pub currency: String,
    pub active: usize,
    pub completed: usize,
    pub total_saved: Decimal,
    pub total_target: Decimal,
    /// Pooled progress across all goals, clamped to `[0, 100]`.
    pub percent_complete: Option<Decimal>,
    pub missing_rates: BTreeSet<String>,
}

fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return None;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

fn clamp_percent(percent: Decimal) -> Decimal {
    percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

pub fn required_pairs(goals: &[Goal], display_currency: &str) -> Vec<(String, String)> {
    goals
        .iter()
        .map(|g| (g.currency.clone(), display_currency.to_string()))
        .collect()
}

/// Goals that are still being saved towards, in input order.
pub fn list_active(goals: &[Goal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .filter(|g| !g.is_completed)
        .cloned()
        .map(GoalProgress::new)
        .collect()
}

/// Pools every goal, completed ones included, into one progress figure.
///
/// A large goal weighs more than a small one: the result is total saved over
/// total target, not the mean of per-goal percentages.
pub fn summarize(goals: &[Goal], rates: &RateTable, session: &Session) -> GoalSummary {
    let mut converter = Converter::new(rates, &session.display_currency);
    let mut total_saved = Decimal::ZERO;
    let mut total_target = Decimal::ZERO;
    let mut completed = 0;

    for goal in goals {
        if goal.is_completed {
            completed += 1;
        }
        if let (Some(saved), Some(target)) = (
            converter.convert_to_target(goal.current_amount, &goal.currency),
            converter.convert_to_target(goal.target_amount, &goal.currency),
        ) {
            total_saved += saved;
            total_target += target;
        }
    }

    GoalSummary {
        currency: session.display_currency.clone(),
        active: goals.len() - completed,
        completed,
        total_saved,
        total_target,
        percent_complete: percent_of(total_saved, total_target).map(clamp_percent),
        missing_rates: converter.into_missing(),
    }
}

pub fn top_goals(progress: Vec<GoalProgress>, n: usize) -> TopN<GoalProgress> {
    top_n_by(progress, n, |p| p.percent_complete)
}
