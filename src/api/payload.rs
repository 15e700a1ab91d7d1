use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{
    AprOverrides, Debt, DebtInput, ExcludedDebt, LinkedLiability, SimulationRequest, normalize,
};
use crate::error::{FieldIssue, RequestError};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzePayload {
    pub extra_payment: Option<f64>,
    pub debts: Option<Vec<DebtInput>>,
    pub linked_liabilities: Vec<LinkedLiability>,
    pub apr_overrides: AprOverrides,
    pub as_of_date: Option<String>,
    pub include_schedule: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizePayload {
    pub debts: Vec<DebtInput>,
    pub linked_liabilities: Vec<LinkedLiability>,
    pub apr_overrides: AprOverrides,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResponse {
    pub debts: Vec<Debt>,
    pub excluded: Vec<ExcludedDebt>,
}

/// A boundary-validated analysis request plus the debts the registry dropped.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub simulation: SimulationRequest,
    pub excluded: Vec<ExcludedDebt>,
}

pub fn analyze_request_from_json(json: &str, today: NaiveDate) -> Result<AnalyzeRequest, RequestError> {
    let payload = serde_json::from_str::<AnalyzePayload>(json)
        .map_err(|e| RequestError::MalformedJson(e.to_string()))?;
    analyze_request_from_payload(payload, today)
}

pub fn analyze_request_from_payload(
    payload: AnalyzePayload,
    today: NaiveDate,
) -> Result<AnalyzeRequest, RequestError> {
    let mut issues = Vec::new();

    let extra_payment = payload.extra_payment.unwrap_or(0.0);
    if !extra_payment.is_finite() {
        issues.push(FieldIssue::new("extraPayment", "must be a finite number"));
    } else if extra_payment < 0.0 {
        issues.push(FieldIssue::new(
            "extraPayment",
            format!("must be >= 0, got {extra_payment}"),
        ));
    }

    if payload.debts.is_none() {
        issues.push(FieldIssue::new("debts", "is required"));
    }

    let as_of_date = match payload.as_of_date.as_deref().map(str::trim) {
        None | Some("") => Some(today),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                issues.push(FieldIssue::new(
                    "asOfDate",
                    format!("expected YYYY-MM-DD, got {raw:?}"),
                ));
                None
            }
        },
    };

    let (Some(custom), Some(as_of_date), true) = (payload.debts, as_of_date, issues.is_empty())
    else {
        return Err(RequestError::Invalid(issues));
    };

    let normalized = normalize(&custom, &payload.linked_liabilities, &payload.apr_overrides);
    Ok(AnalyzeRequest {
        simulation: SimulationRequest {
            extra_payment,
            debts: normalized.debts,
            as_of_date,
            include_schedule: payload.include_schedule,
        },
        excluded: normalized.excluded,
    })
}

pub fn normalize_from_payload(payload: NormalizePayload) -> NormalizeResponse {
    let normalized = normalize(
        &payload.debts,
        &payload.linked_liabilities,
        &payload.apr_overrides,
    );
    NormalizeResponse {
        debts: normalized.debts,
        excluded: normalized.excluded,
    }
}
