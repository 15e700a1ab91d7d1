mod comparator;
mod ordering;
mod registry;
mod simulator;
mod types;

pub use comparator::{analyze, rank_debts};
pub use ordering::priority_order;
pub use registry::{
    AprOverrides, DebtInput, LinkedLiability, MinimumPaymentFloor, NormalizedDebts,
    derive_min_payment, normalize,
};
pub use simulator::{MonthRecord, StrategyRun, run_with_order, simulate, solo_payoff_months, step_month};
pub use types::{
    Analysis, DEFAULT_HORIZON_MONTHS, Debt, DebtOrigin, DebtRetirement, DebtSummary, DebtType,
    EngineConfig, ExcludedDebt, ExclusionReason, Savings, SchedulePoint, SimulationRequest,
    Strategy, StrategyResult, StrategyResults,
};
