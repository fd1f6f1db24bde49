use serde::Serialize;

pub const DEFAULT_TAX_RATE_PERCENT: f64 = 17.2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapPreset {
    Single,
    Couple,
}

impl CapPreset {
    pub fn amount(self) -> f64 {
        match self {
            CapPreset::Single => 150_000.0,
            CapPreset::Couple => 300_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub duration_years: f64,
    pub annual_rate_percent: f64,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub contribution_cap: f64,
    pub annual_fee_percent: f64,
    pub tax_rate_percent: f64,
    pub inflation_percent: f64,
}

impl SimulationParameters {
    /// Parameters with zero fees, zero inflation and the default tax on gains.
    pub fn new(
        duration_years: f64,
        annual_rate_percent: f64,
        initial_capital: f64,
        monthly_contribution: f64,
        contribution_cap: f64,
    ) -> Self {
        Self {
            duration_years,
            annual_rate_percent,
            initial_capital,
            monthly_contribution,
            contribution_cap,
            annual_fee_percent: 0.0,
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            inflation_percent: 0.0,
        }
    }
}

/// Everything a scenario needs except its rate; shared by all scenarios of
/// one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountParameters {
    pub duration_years: f64,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub contribution_cap: f64,
    pub annual_fee_percent: f64,
    pub tax_rate_percent: f64,
    pub inflation_percent: f64,
}

impl Default for AccountParameters {
    fn default() -> Self {
        Self {
            duration_years: 10.0,
            initial_capital: 10_000.0,
            monthly_contribution: 1_000.0,
            contribution_cap: CapPreset::Single.amount(),
            annual_fee_percent: 0.0,
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            inflation_percent: 0.0,
        }
    }
}

impl AccountParameters {
    pub fn with_rate(&self, annual_rate_percent: f64) -> SimulationParameters {
        SimulationParameters {
            duration_years: self.duration_years,
            annual_rate_percent,
            initial_capital: self.initial_capital,
            monthly_contribution: self.monthly_contribution,
            contribution_cap: self.contribution_cap,
            annual_fee_percent: self.annual_fee_percent,
            tax_rate_percent: self.tax_rate_percent,
            inflation_percent: self.inflation_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub final_capital_after_tax: f64,
    pub total_contributed: f64,
    /// Month index at which cumulative contributions first hit the cap;
    /// 0 is the initial deposit.
    pub cap_reached_month: Option<u32>,
    /// Capital after each month, starting with the post-deposit month 0.
    pub monthly_capital_history: Vec<f64>,
}

impl SimulationResult {
    pub fn gross_final_capital(&self) -> f64 {
        self.monthly_capital_history.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub rate_percent: f64,
    pub rate_label: String,
    pub cap_reached_month: Option<u32>,
    pub cap_reached: String,
    pub total_contributed: f64,
    pub gross_final_capital: f64,
    pub gross_interest: f64,
    pub tax: f64,
    pub net_final_capital: f64,
    pub monthly_capital_history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub account: AccountParameters,
    pub scenarios: Vec<ScenarioComparison>,
}
