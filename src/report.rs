use crate::core::{ComparisonReport, ScenarioComparison};

const LABEL_WIDTH: usize = 25;
const COLUMN_WIDTH: usize = 24;

/// Columnar text report: one column per scenario, one row per metric.
pub fn render_report(report: &ComparisonReport) -> String {
    let account = &report.account;
    let mut lines = Vec::new();
    lines.push("=== PEA COMPARISON (SIMULATION WITH OPTIONS): COLUMN VIEW ===".to_string());
    lines.push(format!("- Max duration: {} year(s)", account.duration_years));
    lines.push(format!(
        "- Contribution cap: {}",
        format_money(account.contribution_cap)
    ));
    lines.push(format!(
        "- Initial capital: {}",
        format_money(account.initial_capital)
    ));
    lines.push(format!(
        "- Monthly contribution: {}",
        format_money(account.monthly_contribution)
    ));
    if account.annual_fee_percent != 0.0 {
        lines.push(format!("- Annual fees: {}%", account.annual_fee_percent));
    }
    if account.inflation_percent != 0.0 {
        lines.push(format!("- Inflation: {}%", account.inflation_percent));
    }
    lines.push(String::new());

    let mut header = format!("{:<LABEL_WIDTH$}", "");
    for scenario in &report.scenarios {
        header.push_str(&format!("{:>COLUMN_WIDTH$}", scenario.rate_label));
    }
    lines.push(header);

    let rows: [(&str, Vec<String>); 5] = [
        (
            "Cap reached",
            report
                .scenarios
                .iter()
                .map(|s| s.cap_reached.clone())
                .collect(),
        ),
        (
            "Gross final capital",
            money_column(report, |s| s.gross_final_capital),
        ),
        ("Gross interest", money_column(report, |s| s.gross_interest)),
        ("Tax", money_column(report, |s| s.tax)),
        (
            "Net final capital",
            money_column(report, |s| s.net_final_capital),
        ),
    ];
    for (label, values) in rows {
        let mut row = format!("{label:<LABEL_WIDTH$}");
        for value in values {
            row.push_str(&format!("{value:>COLUMN_WIDTH$}"));
        }
        lines.push(row);
    }

    lines.join("\n")
}

fn money_column(
    report: &ComparisonReport,
    metric: impl Fn(&ScenarioComparison) -> f64,
) -> Vec<String> {
    report
        .scenarios
        .iter()
        .map(|s| format_money(metric(s)))
        .collect()
}

/// Two decimals, comma thousands separator, euro suffix: `12,345.68 €`.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value} €");
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{sign}{grouped}.{cents} €")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AccountParameters, compare};
    use std::fs;
    use std::path::Path;

    fn assert_golden_snapshot(path: &str, actual: &str) {
        let update = matches!(
            std::env::var("UPDATE_GOLDEN").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );
        let snapshot_path = Path::new(path);

        if update {
            if let Some(parent) = snapshot_path.parent() {
                fs::create_dir_all(parent).expect("failed to create snapshot directory");
            }
            fs::write(snapshot_path, actual).expect("failed to write golden snapshot");
            return;
        }

        let expected = fs::read_to_string(snapshot_path).unwrap_or_else(|_| {
            panic!("missing golden snapshot at {path}; run with UPDATE_GOLDEN=1 to generate")
        });
        assert_eq!(
            actual, expected,
            "snapshot mismatch for {path}; run with UPDATE_GOLDEN=1 to refresh if expected"
        );
    }

    #[test]
    fn format_money_groups_thousands() {
        assert_eq!(format_money(0.0), "0.00 €");
        assert_eq!(format_money(999.999), "1,000.00 €");
        assert_eq!(format_money(1_234_567.891), "1,234,567.89 €");
        assert_eq!(format_money(150_000.0), "150,000.00 €");
        assert_eq!(format_money(-2_500.5), "-2,500.50 €");
    }

    #[test]
    fn header_lists_fee_and_inflation_only_when_set() {
        let account = AccountParameters::default();
        let report = compare(&account, &[6.0, 8.0, 10.0]).expect("three rates");
        let text = render_report(&report);
        assert!(!text.contains("Annual fees"));
        assert!(!text.contains("Inflation"));

        let account = AccountParameters {
            annual_fee_percent: 0.5,
            inflation_percent: 2.0,
            ..AccountParameters::default()
        };
        let report = compare(&account, &[6.0, 8.0, 10.0]).expect("three rates");
        let text = render_report(&report);
        assert!(text.contains("- Annual fees: 0.5%"));
        assert!(text.contains("- Inflation: 2%"));
    }

    #[test]
    fn rows_have_one_column_per_scenario() {
        let report = compare(&AccountParameters::default(), &[6.0, 8.0, 10.0])
            .expect("three rates");
        let text = render_report(&report);
        let table = text.lines().skip_while(|line| !line.is_empty()).skip(1);
        for line in table {
            assert_eq!(line.chars().count(), LABEL_WIDTH + 3 * COLUMN_WIDTH, "{line}");
        }
        assert!(text.contains("Cap reached"));
        assert!(text.contains("not reached"));
    }

    #[test]
    fn golden_snapshot_default_report() {
        let account = AccountParameters {
            duration_years: 15.0,
            ..AccountParameters::default()
        };
        let report = compare(&account, &[6.0, 8.0, 10.0]).expect("three rates");
        let text = format!("{}\n", render_report(&report));

        assert_golden_snapshot("tests/golden/report_default.txt", &text);
    }
}
