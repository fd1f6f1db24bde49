use super::duration::cap_reached_label;
use super::engine::{gross_gains, simulate, tax_on_gains};
use super::error::ComparisonError;
use super::types::{AccountParameters, ComparisonReport, ScenarioComparison, SimulationResult};

pub const SCENARIO_COUNT: usize = 3;

/// Runs one simulation per rate against the shared account and returns the
/// scenarios in the order the rates were given.
pub fn compare(
    account: &AccountParameters,
    rates: &[f64],
) -> Result<ComparisonReport, ComparisonError> {
    if rates.len() != SCENARIO_COUNT {
        log::warn!(
            "comparison rejected: {} rates supplied, {SCENARIO_COUNT} required",
            rates.len()
        );
        return Err(ComparisonError::RateCount {
            expected: SCENARIO_COUNT,
            actual: rates.len(),
        });
    }

    let scenarios = rates
        .iter()
        .map(|&rate| {
            let result = simulate(&account.with_rate(rate));
            build_scenario(rate, account.tax_rate_percent, result)
        })
        .collect();

    Ok(ComparisonReport {
        account: *account,
        scenarios,
    })
}

fn build_scenario(rate: f64, tax_rate_percent: f64, result: SimulationResult) -> ScenarioComparison {
    let gross_final_capital = result.gross_final_capital();
    ScenarioComparison {
        rate_percent: rate,
        rate_label: rate_label(rate),
        cap_reached_month: result.cap_reached_month,
        cap_reached: cap_reached_label(result.cap_reached_month),
        total_contributed: result.total_contributed,
        gross_final_capital,
        gross_interest: gross_gains(gross_final_capital, result.total_contributed),
        tax: tax_on_gains(
            gross_final_capital,
            result.total_contributed,
            tax_rate_percent,
        ),
        net_final_capital: result.final_capital_after_tax,
        monthly_capital_history: result.monthly_capital_history,
    }
}

pub fn rate_label(rate: f64) -> String {
    format!("{rate}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::month_count;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_account() -> AccountParameters {
        AccountParameters::default()
    }

    #[test]
    fn compare_rejects_two_and_four_rates() {
        let account = sample_account();

        let err = compare(&account, &[5.0, 7.0]).expect_err("two rates must be rejected");
        assert_eq!(
            err,
            ComparisonError::RateCount {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(err.to_string(), "expected exactly 3 rates, got 2");

        let err = compare(&account, &[1.0, 2.0, 3.0, 4.0]).expect_err("four rates");
        assert!(matches!(err, ComparisonError::RateCount { actual: 4, .. }));

        assert!(compare(&account, &[]).is_err());
    }

    #[test]
    fn compare_keeps_caller_rate_order() {
        let report = compare(&sample_account(), &[10.0, 2.5, 6.0]).expect("three rates");

        let labels = report
            .scenarios
            .iter()
            .map(|s| s.rate_label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["10%", "2.5%", "6%"]);
        assert_eq!(report.account, sample_account());
    }

    #[test]
    fn scenario_metrics_match_engine_output() {
        let account = sample_account();
        let report = compare(&account, &[6.0, 8.0, 10.0]).expect("three rates");

        for scenario in &report.scenarios {
            let result = simulate(&account.with_rate(scenario.rate_percent));
            let gross = *result.monthly_capital_history.last().expect("history");
            let interest = (gross - result.total_contributed).max(0.0);

            assert_eq!(scenario.gross_final_capital, gross);
            assert_approx(scenario.gross_interest, interest);
            assert_approx(scenario.tax, 0.172 * interest);
            assert_approx(scenario.net_final_capital, result.final_capital_after_tax);
            assert_approx(
                scenario.net_final_capital,
                scenario.gross_final_capital - scenario.tax,
            );
            assert_eq!(scenario.monthly_capital_history, result.monthly_capital_history);
        }
    }

    #[test]
    fn cap_labels_follow_cap_reached_month() {
        // 10k + 1k/month against a 150k cap closes in month 140.
        let report = compare(&sample_account(), &[6.0, 8.0, 10.0]).expect("three rates");
        for scenario in &report.scenarios {
            assert_eq!(scenario.cap_reached_month, None);
            assert_eq!(scenario.cap_reached, "not reached");
        }

        let mut account = sample_account();
        account.duration_years = 15.0;
        let report = compare(&account, &[6.0, 8.0, 10.0]).expect("three rates");
        for scenario in &report.scenarios {
            assert_eq!(scenario.cap_reached_month, Some(140));
            assert_eq!(scenario.cap_reached, "11 years and 8 months");
        }
    }

    #[test]
    fn losing_scenario_has_zero_interest_and_tax() {
        let report = compare(&sample_account(), &[-5.0, 0.0, 5.0]).expect("three rates");

        let losing = &report.scenarios[0];
        assert!(losing.gross_final_capital < losing.total_contributed);
        assert_approx(losing.gross_interest, 0.0);
        assert_approx(losing.tax, 0.0);
        assert_approx(losing.net_final_capital, losing.gross_final_capital);

        let flat = &report.scenarios[1];
        assert_approx(flat.gross_final_capital, 130_000.0);
        assert_approx(flat.gross_interest, 0.0);
    }

    #[test]
    fn rate_label_uses_shortest_display() {
        assert_eq!(rate_label(6.0), "6%");
        assert_eq!(rate_label(7.5), "7.5%");
        assert_eq!(rate_label(-2.0), "-2%");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_three_rates_yield_three_aligned_scenarios(
            rate_a in -1_000i32..2_000,
            rate_b in -1_000i32..2_000,
            rate_c in -1_000i32..2_000,
            duration_months in 0u32..360,
            initial in 0u32..200_000,
            monthly in 0u32..3_000
        ) {
            let account = AccountParameters {
                duration_years: duration_months as f64 / 12.0,
                initial_capital: initial as f64,
                monthly_contribution: monthly as f64,
                ..AccountParameters::default()
            };
            let rates = [
                rate_a as f64 / 100.0,
                rate_b as f64 / 100.0,
                rate_c as f64 / 100.0,
            ];
            let report = compare(&account, &rates).expect("three rates");

            prop_assert_eq!(report.scenarios.len(), 3);
            for (scenario, rate) in report.scenarios.iter().zip(rates) {
                prop_assert_eq!(scenario.rate_percent, rate);
                prop_assert_eq!(
                    scenario.monthly_capital_history.len(),
                    month_count(account.duration_years) as usize + 1
                );
                prop_assert!(scenario.gross_interest >= 0.0);
                prop_assert!(scenario.tax >= 0.0);
                prop_assert!(scenario.net_final_capital <= scenario.gross_final_capital);
            }
        }
    }
}
