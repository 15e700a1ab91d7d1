use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use super::types::{Debt, DebtOrigin, DebtType, ExcludedDebt, ExclusionReason};

/// Stored APR overrides for linked accounts, keyed by account id.
pub type AprOverrides = BTreeMap<String, f64>;

/// A user-entered debt as it arrives from the store or a request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtInput {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: Option<f64>,
    pub debt_type: DebtType,
}

/// A liability snapshot reported by the account aggregator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkedLiability {
    #[serde(alias = "id")]
    pub account_id: String,
    pub name: String,
    #[serde(alias = "currentBalance")]
    pub balance: Option<f64>,
    #[serde(alias = "lastStatementBalance")]
    pub statement_balance: Option<f64>,
    pub apr: Option<f64>,
    #[serde(alias = "minimumPaymentAmount")]
    pub min_payment: Option<f64>,
    pub debt_type: DebtType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDebts {
    pub debts: Vec<Debt>,
    pub excluded: Vec<ExcludedDebt>,
}

/// Floor applied when a debt carries no usable minimum payment:
/// `max(amount, percent_of_balance * balance)`, never above the balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumPaymentFloor {
    pub amount: f64,
    pub percent_of_balance: f64,
}

impl DebtType {
    pub fn minimum_payment_floor(self) -> MinimumPaymentFloor {
        let (amount, percent_of_balance) = match self {
            DebtType::CreditCard => (25.0, 0.03),
            DebtType::LineOfCredit => (25.0, 0.03),
            DebtType::PersonalLoan => (50.0, 0.02),
            DebtType::StudentLoan => (50.0, 0.01),
            DebtType::Other => (25.0, 0.02),
        };
        MinimumPaymentFloor {
            amount,
            percent_of_balance,
        }
    }

    /// Rate assumed for a linked liability the aggregator reports without one.
    pub fn default_apr(self) -> f64 {
        match self {
            DebtType::CreditCard => 22.99,
            DebtType::LineOfCredit => 12.0,
            DebtType::PersonalLoan => 10.0,
            DebtType::StudentLoan => 5.5,
            DebtType::Other => 8.0,
        }
    }
}

pub fn derive_min_payment(debt_type: DebtType, balance: f64) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }
    let floor = debt_type.minimum_payment_floor();
    floor
        .amount
        .max(floor.percent_of_balance * balance)
        .min(balance)
}

#[derive(Debug)]
struct Candidate {
    id: String,
    name: String,
    origin: DebtOrigin,
    balance: Option<f64>,
    apr: f64,
    min_payment: Option<f64>,
    debt_type: DebtType,
}

impl Candidate {
    fn from_custom(id: String, input: &DebtInput) -> Self {
        Self {
            name: display_name(&input.name, &id),
            id,
            origin: DebtOrigin::Custom,
            balance: Some(input.balance),
            apr: input.apr,
            min_payment: input.min_payment,
            debt_type: input.debt_type,
        }
    }

    fn from_linked(id: String, liability: &LinkedLiability, overrides: &AprOverrides) -> Self {
        let apr = overrides
            .get(&id)
            .copied()
            .or(liability.apr)
            .unwrap_or_else(|| liability.debt_type.default_apr());
        Self {
            name: display_name(&liability.name, &id),
            balance: liability.balance.or(liability.statement_balance),
            apr,
            id,
            origin: DebtOrigin::Linked,
            min_payment: liability.min_payment,
            debt_type: liability.debt_type,
        }
    }

    fn exclude(self, reason: ExclusionReason, message: String) -> ExcludedDebt {
        ExcludedDebt {
            id: self.id,
            name: self.name,
            reason,
            message,
        }
    }

    fn validate(self) -> Result<Debt, ExcludedDebt> {
        let Some(balance) = self.balance else {
            return Err(self.exclude(
                ExclusionReason::MissingBalance,
                "no current or statement balance reported".to_string(),
            ));
        };
        let min_is_finite = self.min_payment.is_none_or(f64::is_finite);
        if !balance.is_finite() || !self.apr.is_finite() || !min_is_finite {
            return Err(self.exclude(
                ExclusionReason::NonFiniteValue,
                "balance, apr and minPayment must be finite numbers".to_string(),
            ));
        }
        if balance < 0.0 {
            let message = format!("balance must be >= 0, got {balance}");
            return Err(self.exclude(ExclusionReason::NegativeBalance, message));
        }
        if self.apr < 0.0 {
            let message = format!("apr must be >= 0, got {}", self.apr);
            return Err(self.exclude(ExclusionReason::NegativeApr, message));
        }

        let min_payment = match self.min_payment {
            Some(v) if v > 0.0 || balance <= 0.0 => v.max(0.0),
            _ => derive_min_payment(self.debt_type, balance),
        };

        Ok(Debt {
            id: self.id,
            name: self.name,
            origin: self.origin,
            balance,
            apr: self.apr,
            min_payment,
            debt_type: self.debt_type,
        })
    }
}

/// Hands out ids for records that arrived without one, skipping any id a
/// record supplied explicitly.
struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    fn new<'a>(explicit: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: explicit
                .into_iter()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn resolve(&mut self, raw: &str, prefix: &str, index: usize) -> String {
        let raw = raw.trim();
        if !raw.is_empty() {
            return raw.to_string();
        }
        let mut n = index + 1;
        loop {
            let id = format!("{prefix}-{n}");
            if self.taken.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }
}

fn display_name(name: &str, id: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        id.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Merges user-entered debts and linked liabilities into one validated list.
///
/// Custom debts come first, so a valid custom record shadows a linked snapshot
/// that shares its id. An invalid record never claims its id. Every record that
/// does not make it into `debts` is listed in `excluded` with the reason.
pub fn normalize(
    custom: &[DebtInput],
    linked: &[LinkedLiability],
    overrides: &AprOverrides,
) -> NormalizedDebts {
    let mut ids = IdAllocator::new(
        custom
            .iter()
            .map(|input| input.id.as_str())
            .chain(linked.iter().map(|liability| liability.account_id.as_str())),
    );
    let mut candidates = Vec::with_capacity(custom.len() + linked.len());
    for (i, input) in custom.iter().enumerate() {
        let id = ids.resolve(&input.id, "custom", i);
        candidates.push(Candidate::from_custom(id, input));
    }
    for (i, liability) in linked.iter().enumerate() {
        let id = ids.resolve(&liability.account_id, "linked", i);
        candidates.push(Candidate::from_linked(id, liability, overrides));
    }

    let mut accepted = HashSet::new();
    let mut out = NormalizedDebts::default();
    for candidate in candidates {
        let debt = match candidate.validate() {
            Ok(debt) => debt,
            Err(excluded) => {
                out.excluded.push(excluded);
                continue;
            }
        };
        if accepted.insert(debt.id.clone()) {
            out.debts.push(debt);
        } else {
            out.excluded.push(ExcludedDebt {
                message: format!("duplicate debt id {}", debt.id),
                id: debt.id,
                name: debt.name,
                reason: ExclusionReason::Duplicate,
            });
        }
    }

    for excluded in &out.excluded {
        tracing::warn!(
            debt_id = %excluded.id,
            reason = ?excluded.reason,
            "excluding debt: {}",
            excluded.message
        );
    }

    out
}
