use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    AccountParameters, CapPreset, ComparisonReport, DEFAULT_TAX_RATE_PERCENT, MAX_MONTHS, compare,
};
use crate::report::render_report;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MAX_DURATION_YEARS: f64 = MAX_MONTHS as f64 / 12.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCapPreset {
    Single,
    Couple,
}

impl From<CliCapPreset> for CapPreset {
    fn from(value: CliCapPreset) -> Self {
        match value {
            CliCapPreset::Single => CapPreset::Single,
            CliCapPreset::Couple => CapPreset::Couple,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCapPreset {
    #[serde(alias = "person", alias = "individual")]
    Single,
    #[serde(alias = "joint")]
    Couple,
}

impl From<ApiCapPreset> for CliCapPreset {
    fn from(value: ApiCapPreset) -> Self {
        match value {
            ApiCapPreset::Single => CliCapPreset::Single,
            ApiCapPreset::Couple => CliCapPreset::Couple,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    duration_years: Option<f64>,
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    cap_preset: Option<ApiCapPreset>,
    contribution_cap: Option<f64>,
    rates: Option<Vec<f64>>,
    annual_fee: Option<f64>,
    inflation: Option<f64>,
    tax_rate: Option<f64>,
}

/// Query-string form of [`ComparePayload`]; `rates` is comma separated.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompareQuery {
    duration_years: Option<f64>,
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    cap_preset: Option<ApiCapPreset>,
    contribution_cap: Option<f64>,
    rates: Option<String>,
    annual_fee: Option<f64>,
    inflation: Option<f64>,
    tax_rate: Option<f64>,
}

impl TryFrom<CompareQuery> for ComparePayload {
    type Error = String;

    fn try_from(query: CompareQuery) -> Result<Self, Self::Error> {
        let rates = match query.rates {
            Some(raw) => Some(parse_rate_list(&raw)?),
            None => None,
        };
        Ok(ComparePayload {
            duration_years: query.duration_years,
            initial_capital: query.initial_capital,
            monthly_contribution: query.monthly_contribution,
            cap_preset: query.cap_preset,
            contribution_cap: query.contribution_cap,
            rates,
            annual_fee: query.annual_fee,
            inflation: query.inflation,
            tax_rate: query.tax_rate,
        })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pea",
    about = "Capped savings account simulator comparing three annual rate scenarios"
)]
struct Cli {
    #[arg(long, default_value_t = 10.0, help = "Investment horizon in years")]
    duration_years: f64,
    #[arg(long, default_value_t = 10_000.0, help = "Lump sum deposited at month 0")]
    initial_capital: f64,
    #[arg(long, default_value_t = 1_000.0)]
    monthly_contribution: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCapPreset::Single,
        help = "Contribution cap preset: single (150 000) or couple (300 000)"
    )]
    cap_preset: CliCapPreset,
    #[arg(
        long,
        help = "Explicit ceiling on cumulative contributions; overrides --cap-preset"
    )]
    contribution_cap: Option<f64>,
    #[arg(
        long = "rate",
        num_args = 1..,
        allow_negative_numbers = true,
        default_values_t = [6.0, 8.0, 10.0],
        help = "Annual rate scenario in percent; give exactly three"
    )]
    rates: Vec<f64>,
    #[arg(long, default_value_t = 0.0, help = "Annual fees in percent of capital")]
    annual_fee: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        allow_negative_numbers = true,
        help = "Annual inflation in percent, subtracted from each rate"
    )]
    inflation: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_TAX_RATE_PERCENT,
        help = "Tax on gains in percent"
    )]
    tax_rate: f64,
    #[arg(long, help = "Print the comparison as JSON instead of a text table")]
    json: bool,
}

#[derive(Debug)]
struct CompareRequest {
    account: AccountParameters,
    rates: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    #[serde(flatten)]
    report: ComparisonReport,
    text_report: String,
}

#[derive(Error, Debug)]
pub enum CliError {
    /// Bad flags, `--help` or `--version`; `clap::Error::exit` prints it.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: &Cli) -> Result<CompareRequest, String> {
    for (name, value) in [
        ("--duration-years", cli.duration_years),
        ("--initial-capital", cli.initial_capital),
        ("--monthly-contribution", cli.monthly_contribution),
        ("--annual-fee", cli.annual_fee),
        ("--inflation", cli.inflation),
        ("--tax-rate", cli.tax_rate),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if !(0.0..=MAX_DURATION_YEARS).contains(&cli.duration_years) {
        return Err(format!(
            "--duration-years must be between 0 and {MAX_DURATION_YEARS}"
        ));
    }

    if cli.initial_capital < 0.0 {
        return Err("--initial-capital must be >= 0".to_string());
    }

    if cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    let contribution_cap = cli
        .contribution_cap
        .unwrap_or_else(|| CapPreset::from(cli.cap_preset).amount());
    if !contribution_cap.is_finite() || contribution_cap < 0.0 {
        return Err("--contribution-cap must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.annual_fee) {
        return Err("--annual-fee must be between 0 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&cli.tax_rate) {
        return Err("--tax-rate must be between 0 and 100".to_string());
    }

    if let Some(rate) = cli.rates.iter().find(|rate| !rate.is_finite()) {
        return Err(format!("--rate must be a finite number, got {rate}"));
    }

    Ok(CompareRequest {
        account: AccountParameters {
            duration_years: cli.duration_years,
            initial_capital: cli.initial_capital,
            monthly_contribution: cli.monthly_contribution,
            contribution_cap,
            annual_fee_percent: cli.annual_fee,
            tax_rate_percent: cli.tax_rate,
            inflation_percent: cli.inflation,
        },
        rates: cli.rates.clone(),
    })
}

/// Parses command line flags, runs the comparison and returns what should be
/// printed on stdout.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let request = build_request(&cli).map_err(CliError::Invalid)?;
    let report = compare(&request.account, &request.rates)
        .map_err(|e| CliError::Invalid(e.to_string()))?;

    if cli.json {
        serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Invalid(format!("Failed to encode report: {e}")))
    } else {
        Ok(render_report(&report))
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("PEA HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(query: Result<Query<CompareQuery>, QueryRejection>) -> Response {
    let payload = query
        .map_err(|e| format!("Invalid query parameters: {}", e.body_text()))
        .and_then(|Query(query)| ComparePayload::try_from(query));
    match payload {
        Ok(payload) => compare_response(payload),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn compare_post_handler(payload: Result<Json<ComparePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => compare_response(payload),
        Err(e) => error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid API JSON payload: {}", e.body_text()),
        ),
    }
}

fn compare_response(payload: ComparePayload) -> Response {
    let request = match compare_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let report = match compare(&request.account, &request.rates) {
        Ok(report) => report,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    };
    log::info!(
        "compared {} scenarios over {} years",
        report.scenarios.len(),
        report.account.duration_years
    );

    let text_report = render_report(&report);
    json_response(
        StatusCode::OK,
        CompareResponse {
            report,
            text_report,
        },
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn parse_rate_list(raw: &str) -> Result<Vec<f64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| format!("rates must be a comma-separated list of numbers, got '{part}'"))
        })
        .collect()
}

#[cfg(test)]
fn compare_request_from_json(json: &str) -> Result<CompareRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    compare_request_from_payload(payload)
}

fn compare_request_from_payload(payload: ComparePayload) -> Result<CompareRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.duration_years {
        cli.duration_years = v;
    }
    if let Some(v) = payload.initial_capital {
        cli.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.cap_preset {
        cli.cap_preset = v.into();
    }
    if let Some(v) = payload.contribution_cap {
        cli.contribution_cap = Some(v);
    }
    if let Some(v) = payload.rates {
        cli.rates = v;
    }
    if let Some(v) = payload.annual_fee {
        cli.annual_fee = v;
    }
    if let Some(v) = payload.inflation {
        cli.inflation = v;
    }
    if let Some(v) = payload.tax_rate {
        cli.tax_rate = v;
    }

    build_request(&cli)
}

fn default_cli_for_api() -> Cli {
    let defaults = AccountParameters::default();
    Cli {
        duration_years: defaults.duration_years,
        initial_capital: defaults.initial_capital,
        monthly_contribution: defaults.monthly_contribution,
        cap_preset: CliCapPreset::Single,
        contribution_cap: None,
        rates: vec![6.0, 8.0, 10.0],
        annual_fee: defaults.annual_fee_percent,
        inflation: defaults.inflation_percent,
        tax_rate: defaults.tax_rate_percent,
        json: false,
    }
}
