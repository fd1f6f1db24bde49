mod comparator;
mod duration;
mod engine;
mod error;
mod types;

pub use comparator::{SCENARIO_COUNT, compare, rate_label};
pub use duration::{NOT_REACHED, cap_reached_label, format_months};
pub use engine::{
    CAP_EPSILON, MAX_MONTHS, effective_monthly_rate, gross_gains, month_count,
    monthly_fee_fraction, simulate, tax_on_gains,
};
pub use error::ComparisonError;
pub use types::{
    AccountParameters, CapPreset, ComparisonReport, DEFAULT_TAX_RATE_PERCENT, ScenarioComparison,
    SimulationParameters, SimulationResult,
};
