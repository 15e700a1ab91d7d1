use chrono::{Months, NaiveDate};

use super::ordering::priority_order;
use super::types::{Debt, DebtRetirement, SchedulePoint, Strategy, StrategyResult};

/// Closing balances at or below this are treated as paid off.
const BALANCE_EPSILON: f64 = 1e-9;

/// One simulated month: what went in, where the money went, and what was left.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    pub month: u32,
    pub opening_balances: Vec<f64>,
    pub interest: Vec<f64>,
    pub minimum_pool: f64,
    pub extra_pool: f64,
    pub rolled_over_pool: f64,
    pub minimum_allocations: Vec<f64>,
    pub surplus_allocations: Vec<f64>,
    pub closing_balances: Vec<f64>,
    /// Indices of debts whose balance reached zero this month.
    pub retired: Vec<usize>,
    pub unspent: f64,
    /// Rolled-over pool carried into the following month.
    pub next_rolled_over_pool: f64,
}

impl MonthRecord {
    pub fn pool(&self) -> f64 {
        self.minimum_pool + self.extra_pool + self.rolled_over_pool
    }

    pub fn total_interest(&self) -> f64 {
        self.interest.iter().sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.minimum_allocations.iter().sum::<f64>() + self.surplus_allocations.iter().sum::<f64>()
    }

    pub fn remaining_balance(&self) -> f64 {
        self.closing_balances.iter().sum()
    }
}

/// Advances one month from `opening` balances.
///
/// Debts with a positive opening balance are active: they accrue interest,
/// receive their own minimum (capped at the balance), and then the rest of the
/// pool waterfalls down `order` until it runs out or nothing is owed.
pub fn step_month(
    debts: &[Debt],
    order: &[usize],
    extra_payment: f64,
    month: u32,
    opening: &[f64],
    rolled_over: f64,
) -> MonthRecord {
    let active: Vec<bool> = opening.iter().map(|&b| b > 0.0).collect();

    let interest: Vec<f64> = debts
        .iter()
        .zip(opening)
        .zip(&active)
        .map(|((debt, &balance), &is_active)| {
            if is_active {
                balance * debt.monthly_rate()
            } else {
                0.0
            }
        })
        .collect();
    let mut balances: Vec<f64> = opening.iter().zip(&interest).map(|(b, i)| b + i).collect();

    let minimum_pool: f64 = debts
        .iter()
        .zip(&active)
        .filter(|(_, is_active)| **is_active)
        .map(|(debt, _)| debt.min_payment)
        .sum();
    let extra_pool = extra_payment.max(0.0);
    let mut remaining = minimum_pool + extra_pool + rolled_over;

    let mut minimum_allocations = vec![0.0; debts.len()];
    for (idx, debt) in debts.iter().enumerate() {
        if !active[idx] {
            continue;
        }
        let paid = debt.min_payment.min(balances[idx]).max(0.0);
        minimum_allocations[idx] = paid;
        balances[idx] -= paid;
        remaining -= paid;
    }

    let mut surplus_allocations = vec![0.0; debts.len()];
    for &idx in order {
        if remaining <= 0.0 {
            break;
        }
        if balances[idx] <= 0.0 {
            continue;
        }
        let paid = remaining.min(balances[idx]);
        surplus_allocations[idx] = paid;
        balances[idx] -= paid;
        remaining -= paid;
    }

    let mut retired = Vec::new();
    for (idx, balance) in balances.iter_mut().enumerate() {
        if active[idx] && *balance <= BALANCE_EPSILON {
            *balance = 0.0;
            retired.push(idx);
        }
    }
    let freed: f64 = retired.iter().map(|&idx| debts[idx].min_payment).sum();

    MonthRecord {
        month,
        opening_balances: opening.to_vec(),
        interest,
        minimum_pool,
        extra_pool,
        rolled_over_pool: rolled_over,
        minimum_allocations,
        surplus_allocations,
        closing_balances: balances,
        retired,
        unspent: remaining.max(0.0),
        next_rolled_over_pool: rolled_over + freed,
    }
}

#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub strategy: Strategy,
    pub order: Vec<usize>,
    pub months: Vec<MonthRecord>,
    pub retirement_months: Vec<Option<u32>>,
    pub payoff_month: Option<u32>,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl StrategyRun {
    pub fn converged(&self) -> bool {
        self.payoff_month.is_some()
    }

    pub fn retagged(&self, strategy: Strategy) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }

    pub fn to_result(
        &self,
        debts: &[Debt],
        as_of_date: NaiveDate,
        include_schedule: bool,
    ) -> StrategyResult {
        let retirements = debts
            .iter()
            .zip(&self.retirement_months)
            .map(|(debt, month)| DebtRetirement {
                debt_id: debt.id.clone(),
                month: *month,
            })
            .collect();
        let schedule = include_schedule.then(|| {
            self.months
                .iter()
                .map(|record| SchedulePoint {
                    month: record.month,
                    remaining_balance: record.remaining_balance(),
                    interest: record.total_interest(),
                    payment: record.total_paid(),
                })
                .collect()
        });

        StrategyResult {
            strategy: self.strategy,
            payoff_month: self.payoff_month,
            converged: self.converged(),
            payoff_date: self
                .payoff_month
                .and_then(|m| as_of_date.checked_add_months(Months::new(m))),
            total_interest_paid: self.total_interest,
            total_paid: self.total_paid,
            retirements,
            schedule,
        }
    }
}

/// Runs `strategy` over `debts` until every debt is retired or the horizon is hit.
pub fn simulate(
    strategy: Strategy,
    debts: &[Debt],
    extra_payment: f64,
    horizon_months: u32,
) -> StrategyRun {
    let order = priority_order(strategy, debts);
    let extra = if strategy.routes_extra() {
        extra_payment.max(0.0)
    } else {
        0.0
    };
    let run = run_with_order(strategy, debts, order, extra, horizon_months);

    match run.payoff_month {
        Some(month) => tracing::debug!(
            strategy = strategy.as_str(),
            payoff_month = month,
            total_interest = run.total_interest,
            "strategy run converged"
        ),
        None => tracing::warn!(
            strategy = strategy.as_str(),
            horizon_months,
            "debts still outstanding at horizon; reporting non-convergent payoff"
        ),
    }
    run
}

/// Runs the month loop with an explicit priority order.
pub fn run_with_order(
    strategy: Strategy,
    debts: &[Debt],
    order: Vec<usize>,
    extra_payment: f64,
    horizon_months: u32,
) -> StrategyRun {
    let mut retirement_months: Vec<Option<u32>> = debts
        .iter()
        .map(|debt| (debt.balance <= 0.0).then_some(0))
        .collect();
    let mut months: Vec<MonthRecord> = Vec::new();

    let mut month = 0;
    while month < horizon_months && retirement_months.iter().any(Option::is_none) {
        month += 1;
        let record = match months.last() {
            Some(prev) => step_month(
                debts,
                &order,
                extra_payment,
                month,
                &prev.closing_balances,
                prev.next_rolled_over_pool,
            ),
            None => {
                let opening: Vec<f64> = debts.iter().map(|d| d.balance.max(0.0)).collect();
                step_month(debts, &order, extra_payment, month, &opening, 0.0)
            }
        };
        for &idx in &record.retired {
            retirement_months[idx] = Some(month);
        }
        months.push(record);
    }

    let payoff_month = retirement_months
        .iter()
        .all(Option::is_some)
        .then_some(month);
    let total_interest = months.iter().map(MonthRecord::total_interest).sum();
    let total_paid = months.iter().map(MonthRecord::total_paid).sum();

    StrategyRun {
        strategy,
        order,
        months,
        retirement_months,
        payoff_month,
        total_interest,
        total_paid,
    }
}

/// Months to retire `debt` on its own minimum alone, ignoring every other debt.
pub fn solo_payoff_months(debt: &Debt, horizon_months: u32) -> Option<u32> {
    let run = run_with_order(
        Strategy::StatusQuo,
        std::slice::from_ref(debt),
        vec![0],
        0.0,
        horizon_months,
    );
    run.payoff_month
}
