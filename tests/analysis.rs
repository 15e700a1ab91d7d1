use chrono::NaiveDate;
use payoff::core::{
    Debt, DebtOrigin, DebtType, EngineConfig, SimulationRequest, Strategy, analyze,
};

fn debt(id: &str, balance: f64, apr: f64, min_payment: f64) -> Debt {
    Debt {
        id: id.to_string(),
        name: id.to_string(),
        origin: DebtOrigin::Custom,
        balance,
        apr,
        min_payment,
        debt_type: DebtType::CreditCard,
    }
}

fn request(extra: f64, debts: Vec<Debt>) -> SimulationRequest {
    SimulationRequest {
        extra_payment: extra,
        debts,
        as_of_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        include_schedule: false,
    }
}

#[test]
fn avalanche_clears_the_expensive_card_first() {
    let debts = vec![debt("A", 1000.0, 20.0, 50.0), debt("B", 2000.0, 10.0, 60.0)];
    let analysis = analyze(&request(100.0, debts), &EngineConfig::default());

    let avalanche = analysis.strategies.get(Strategy::Avalanche);
    let snowball = analysis.strategies.get(Strategy::Snowball);
    let retired_a = avalanche
        .retirements
        .iter()
        .find(|r| r.debt_id == "A")
        .and_then(|r| r.month);
    assert_eq!(retired_a, Some(8));
    assert!(avalanche.total_interest_paid <= snowball.total_interest_paid + 1e-9);
    assert!(analysis.savings.months_saved_avalanche > 0);
}

#[test]
fn payment_below_interest_never_converges() {
    let analysis = analyze(
        &request(0.0, vec![debt("B", 1000.0, 30.0, 10.0)]),
        &EngineConfig::default(),
    );
    for strategy in Strategy::ALL {
        let result = analysis.strategies.get(strategy);
        assert!(!result.converged);
        assert_eq!(result.payoff_month, None);
        assert_eq!(result.payoff_date, None);
    }
    assert_eq!(analysis.debts[0].solo_payoff_months, None);
}
