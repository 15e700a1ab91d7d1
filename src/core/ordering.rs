use std::cmp::Ordering;

use super::types::{Debt, Strategy};

/// Priority order (indices into `debts`) in which surplus money is routed.
/// Computed once from starting balances and rates; it stays fixed for the
/// whole run and is not re-sorted as balances fall.
///
/// Status quo never routes extra money, but minimums freed by retired debts
/// still cascade, so it follows the snowball order to stay independent of the
/// order debts were entered in.
pub fn priority_order(strategy: Strategy, debts: &[Debt]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..debts.len()).collect();
    match strategy {
        Strategy::Snowball | Strategy::StatusQuo => {
            order.sort_by(|&a, &b| snowball_cmp(&debts[a], &debts[b]).then(a.cmp(&b)));
        }
        Strategy::Avalanche => {
            order.sort_by(|&a, &b| avalanche_cmp(&debts[a], &debts[b]).then(a.cmp(&b)));
        }
    }
    order
}

fn snowball_cmp(a: &Debt, b: &Debt) -> Ordering {
    a.balance
        .total_cmp(&b.balance)
        .then_with(|| a.apr.total_cmp(&b.apr))
}

fn avalanche_cmp(a: &Debt, b: &Debt) -> Ordering {
    b.apr
        .total_cmp(&a.apr)
        .then_with(|| b.balance.total_cmp(&a.balance))
}
