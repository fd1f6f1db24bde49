use super::types::{SimulationParameters, SimulationResult};

/// Remaining cap at or below this is treated as exhausted.
pub const CAP_EPSILON: f64 = 1e-9;

/// Longest horizon simulated: 100 years. Longer durations are truncated.
pub const MAX_MONTHS: u32 = 1_200;

#[derive(Debug)]
struct Account {
    capital: f64,
    total_contributed: f64,
    remaining_cap: f64,
    cap_reached_month: Option<u32>,
}

impl Account {
    fn new(contribution_cap: f64) -> Self {
        Self {
            capital: 0.0,
            total_contributed: 0.0,
            remaining_cap: contribution_cap,
            cap_reached_month: None,
        }
    }

    fn cap_open(&self) -> bool {
        self.remaining_cap > CAP_EPSILON
    }

    fn deposit(&mut self, amount: f64, month: u32) {
        let deposit = amount.min(self.remaining_cap).max(0.0);
        self.capital += deposit;
        self.total_contributed += deposit;
        self.remaining_cap -= deposit;
        if !self.cap_open() && self.cap_reached_month.is_none() {
            self.cap_reached_month = Some(month);
        }
    }

    fn grow(&mut self, monthly_rate: f64, monthly_fee: f64) {
        self.capital *= 1.0 + monthly_rate;
        if monthly_fee > 0.0 {
            self.capital *= 1.0 - monthly_fee;
        }
    }
}

pub fn simulate(params: &SimulationParameters) -> SimulationResult {
    let months = month_count(params.duration_years);
    let monthly_rate = effective_monthly_rate(params.annual_rate_percent, params.inflation_percent);
    let monthly_fee = monthly_fee_fraction(params.annual_fee_percent);

    let mut account = Account::new(params.contribution_cap);
    let mut history = Vec::with_capacity(months as usize + 1);

    account.deposit(params.initial_capital, 0);
    history.push(account.capital);

    for month in 1..=months {
        account.grow(monthly_rate, monthly_fee);
        if account.cap_open() {
            account.deposit(params.monthly_contribution, month);
        }
        history.push(account.capital);
    }

    let tax = tax_on_gains(
        account.capital,
        account.total_contributed,
        params.tax_rate_percent,
    );

    log::debug!(
        "simulated {months} months at {}%: gross={:.2} contributed={:.2} tax={:.2} cap_month={:?}",
        params.annual_rate_percent,
        account.capital,
        account.total_contributed,
        tax,
        account.cap_reached_month
    );

    SimulationResult {
        final_capital_after_tax: account.capital - tax,
        total_contributed: account.total_contributed,
        cap_reached_month: account.cap_reached_month,
        monthly_capital_history: history,
    }
}

/// Whole months in the horizon, at most [`MAX_MONTHS`]. Negative and NaN
/// durations give zero.
pub fn month_count(duration_years: f64) -> u32 {
    ((duration_years * 12.0).floor() as u32).min(MAX_MONTHS)
}

/// Inflation is subtracted from the nominal rate before the /12 split; it is
/// not compounded.
pub fn effective_monthly_rate(annual_rate_percent: f64, inflation_percent: f64) -> f64 {
    ((annual_rate_percent - inflation_percent) / 100.0) / 12.0
}

pub fn monthly_fee_fraction(annual_fee_percent: f64) -> f64 {
    (annual_fee_percent / 100.0) / 12.0
}

pub fn gross_gains(gross_capital: f64, total_contributed: f64) -> f64 {
    (gross_capital - total_contributed).max(0.0)
}

pub fn tax_on_gains(gross_capital: f64, total_contributed: f64, tax_rate_percent: f64) -> f64 {
    (tax_rate_percent / 100.0) * gross_gains(gross_capital, total_contributed)
}
