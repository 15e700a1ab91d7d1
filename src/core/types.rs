use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HORIZON_MONTHS: u32 = 600;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[serde(alias = "statusQuo", alias = "status-quo", alias = "minimum")]
    StatusQuo,
    Snowball,
    Avalanche,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::StatusQuo, Strategy::Snowball, Strategy::Avalanche];

    /// Whether the caller's extra payment is routed under this strategy.
    pub fn routes_extra(self) -> bool {
        !matches!(self, Strategy::StatusQuo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::StatusQuo => "status_quo",
            Strategy::Snowball => "snowball",
            Strategy::Avalanche => "avalanche",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtOrigin {
    #[default]
    Custom,
    Linked,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    #[serde(alias = "creditCard", alias = "credit-card", alias = "credit")]
    CreditCard,
    #[serde(alias = "lineOfCredit", alias = "line-of-credit", alias = "loc")]
    LineOfCredit,
    #[serde(alias = "personalLoan", alias = "personal-loan", alias = "loan")]
    PersonalLoan,
    #[serde(alias = "studentLoan", alias = "student-loan", alias = "student")]
    StudentLoan,
    #[default]
    Other,
}

/// A validated debt. `min_payment` is always resolved, and positive whenever
/// `balance` is positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub origin: DebtOrigin,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: f64,
    pub debt_type: DebtType,
}

impl Debt {
    pub fn monthly_rate(&self) -> f64 {
        self.apr / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub horizon_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub extra_payment: f64,
    pub debts: Vec<Debt>,
    pub as_of_date: NaiveDate,
    pub include_schedule: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRetirement {
    pub debt_id: String,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePoint {
    pub month: u32,
    pub remaining_balance: f64,
    pub interest: f64,
    pub payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub strategy: Strategy,
    /// `None` when the run hit the horizon with debt outstanding.
    pub payoff_month: Option<u32>,
    pub converged: bool,
    pub payoff_date: Option<NaiveDate>,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub retirements: Vec<DebtRetirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<SchedulePoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StrategyResults {
    pub status_quo: StrategyResult,
    pub snowball: StrategyResult,
    pub avalanche: StrategyResult,
}

impl StrategyResults {
    pub fn get(&self, strategy: Strategy) -> &StrategyResult {
        match strategy {
            Strategy::StatusQuo => &self.status_quo,
            Strategy::Snowball => &self.snowball,
            Strategy::Avalanche => &self.avalanche,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Savings {
    pub interest_saved_snowball: f64,
    pub interest_saved_avalanche: f64,
    pub months_saved_snowball: u32,
    pub months_saved_avalanche: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    #[serde(flatten)]
    pub debt: Debt,
    pub solo_payoff_months: Option<u32>,
    pub rank: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    NegativeBalance,
    NegativeApr,
    NonFiniteValue,
    MissingBalance,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedDebt {
    pub id: String,
    pub name: String,
    pub reason: ExclusionReason,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub as_of_date: NaiveDate,
    pub extra_payment: f64,
    pub horizon_months: u32,
    pub total_debt: f64,
    pub total_min_payment: f64,
    pub strategies: StrategyResults,
    pub savings: Savings,
    pub debts: Vec<DebtSummary>,
    pub excluded: Vec<ExcludedDebt>,
}
