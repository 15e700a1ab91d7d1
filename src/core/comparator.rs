use rayon::prelude::*;

use super::simulator::{StrategyRun, simulate, solo_payoff_months};
use super::types::{
    Analysis, Debt, DebtSummary, EngineConfig, Savings, SimulationRequest, Strategy,
    StrategyResults,
};

/// Runs the baseline and both extra-payment strategies and derives the savings report.
///
/// The three runs are independent and execute in parallel. `excluded` is left
/// empty; the caller fills it from the registry output.
pub fn analyze(request: &SimulationRequest, config: &EngineConfig) -> Analysis {
    let debts = &request.debts;
    let horizon = config.horizon_months;
    let extra = request.extra_payment.max(0.0);

    let (baseline, routed) = rayon::join(
        || simulate(Strategy::StatusQuo, debts, 0.0, horizon),
        || {
            (extra > 0.0).then(|| {
                rayon::join(
                    || simulate(Strategy::Snowball, debts, extra, horizon),
                    || simulate(Strategy::Avalanche, debts, extra, horizon),
                )
            })
        },
    );
    // With nothing extra to route, both strategies are the minimum-only plan.
    let (snowball, avalanche) = routed.unwrap_or_else(|| {
        (
            baseline.retagged(Strategy::Snowball),
            baseline.retagged(Strategy::Avalanche),
        )
    });

    let savings = Savings {
        interest_saved_snowball: interest_saved(&baseline, &snowball),
        interest_saved_avalanche: interest_saved(&baseline, &avalanche),
        months_saved_snowball: months_saved(&baseline, &snowball, horizon),
        months_saved_avalanche: months_saved(&baseline, &avalanche, horizon),
    };

    let as_of = request.as_of_date;
    let schedule = request.include_schedule;
    let strategies = StrategyResults {
        status_quo: baseline.to_result(debts, as_of, schedule),
        snowball: snowball.to_result(debts, as_of, schedule),
        avalanche: avalanche.to_result(debts, as_of, schedule),
    };

    let analysis = Analysis {
        as_of_date: as_of,
        extra_payment: extra,
        horizon_months: horizon,
        total_debt: debts.iter().map(|d| d.balance).sum(),
        total_min_payment: debts
            .iter()
            .filter(|d| d.balance > 0.0)
            .map(|d| d.min_payment)
            .sum(),
        strategies,
        savings,
        debts: rank_debts(debts, horizon),
        excluded: Vec::new(),
    };

    tracing::info!(
        debts = debts.len(),
        extra_payment = extra,
        status_quo_months = ?analysis.strategies.status_quo.payoff_month,
        snowball_months = ?analysis.strategies.snowball.payoff_month,
        avalanche_months = ?analysis.strategies.avalanche.payoff_month,
        "analysis complete"
    );
    analysis
}

fn interest_saved(baseline: &StrategyRun, run: &StrategyRun) -> f64 {
    (baseline.total_interest - run.total_interest).max(0.0)
}

/// A non-convergent run counts as the full horizon.
fn months_saved(baseline: &StrategyRun, run: &StrategyRun, horizon: u32) -> u32 {
    let baseline_months = baseline.payoff_month.unwrap_or(horizon);
    let run_months = run.payoff_month.unwrap_or(horizon);
    baseline_months.saturating_sub(run_months)
}

/// Solo payoff per debt plus a 1-based display rank: fastest solo payoff first,
/// non-convergent debts last, ties by smaller balance then input order.
pub fn rank_debts(debts: &[Debt], horizon: u32) -> Vec<DebtSummary> {
    let solo: Vec<Option<u32>> = debts
        .par_iter()
        .map(|debt| solo_payoff_months(debt, horizon))
        .collect();

    let mut order: Vec<usize> = (0..debts.len()).collect();
    order.sort_by(|&a, &b| {
        solo[a]
            .unwrap_or(u32::MAX)
            .cmp(&solo[b].unwrap_or(u32::MAX))
            .then_with(|| debts[a].balance.total_cmp(&debts[b].balance))
            .then(a.cmp(&b))
    });
    let mut ranks = vec![0_u32; debts.len()];
    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = position as u32 + 1;
    }

    debts
        .iter()
        .zip(solo)
        .zip(ranks)
        .map(|((debt, solo_payoff_months), rank)| DebtSummary {
            debt: debt.clone(),
            solo_payoff_months,
            rank,
        })
        .collect()
}
