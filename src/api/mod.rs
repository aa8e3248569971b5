use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::core::{
    AgingPolicy, ConfigError, MonteCarloRun, PathResult, ProjectEconomics, SimulationConfig,
    SummaryRow, SummaryStatistics, run_monte_carlo, run_monte_carlo_with_paths,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAgingPolicy {
    SameMonth,
    FollowingMonth,
}

impl From<CliAgingPolicy> for AgingPolicy {
    fn from(value: CliAgingPolicy) -> Self {
        match value {
            CliAgingPolicy::SameMonth => AgingPolicy::SameMonth,
            CliAgingPolicy::FollowingMonth => AgingPolicy::FollowingMonth,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAgingPolicy {
    #[serde(alias = "sameMonth", alias = "same_month")]
    SameMonth,
    #[serde(alias = "followingMonth", alias = "following_month")]
    FollowingMonth,
}

impl From<ApiAgingPolicy> for CliAgingPolicy {
    fn from(value: ApiAgingPolicy) -> Self {
        match value {
            ApiAgingPolicy::SameMonth => CliAgingPolicy::SameMonth,
            ApiAgingPolicy::FollowingMonth => CliAgingPolicy::FollowingMonth,
        }
    }
}

/// Every field overlays the API defaults; the snake-case aliases accept the
/// parameter names of the older form-based client.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    #[serde(alias = "starting_capital_ke")]
    starting_capital: Option<f64>,
    #[serde(alias = "sqm_buy_value_ke")]
    buy_price_per_area: Option<f64>,
    #[serde(alias = "sqm_sell_value_ke")]
    sell_price_per_area: Option<f64>,
    #[serde(alias = "total_sqm")]
    area_per_project: Option<f64>,
    renovation_cost_per_area: Option<f64>,
    #[serde(alias = "project_duration_months")]
    project_duration_months: Option<u32>,

    #[serde(alias = "financing_ratio_percent")]
    financing_ratio: Option<f64>,
    #[serde(alias = "interest_rate_percent")]
    annual_interest_rate: Option<f64>,
    #[serde(alias = "tax_rate_percent")]
    tax_rate: Option<f64>,
    holding_fee_total: Option<f64>,
    land_transfer_tax_rate: Option<f64>,
    notary_fee_rate: Option<f64>,
    buyer_agent_fee_rate: Option<f64>,
    seller_agent_fee_rate: Option<f64>,

    #[serde(alias = "duration_jitter_percent")]
    duration_jitter_ratio: Option<f64>,
    #[serde(alias = "sell_price_jitter_percent")]
    sale_price_jitter_ratio: Option<f64>,
    #[serde(alias = "total_simulation_months")]
    total_months: Option<u32>,
    #[serde(alias = "num_simulations")]
    num_simulations: Option<u32>,
    seed: Option<u64>,
    aging_policy: Option<ApiAgingPolicy>,
    include_paths: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "flipfinity",
    about = "Monte Carlo simulator for capital-recycling project businesses (buy, renovate, sell)"
)]
struct Cli {
    #[arg(long, default_value_t = 60.0, help = "Capital available at month 0")]
    starting_capital: f64,
    #[arg(long, default_value_t = 1.5, help = "Acquisition price per area unit")]
    buy_price_per_area: f64,
    #[arg(long, default_value_t = 2.0, help = "Expected sale price per area unit")]
    sell_price_per_area: f64,
    #[arg(long, default_value_t = 100.0, help = "Area of each project")]
    area_per_project: f64,
    #[arg(long, default_value_t = 0.0, help = "Renovation cost per area unit")]
    renovation_cost_per_area: f64,
    #[arg(long, default_value_t = 9, help = "Target project duration in months")]
    project_duration_months: u32,
    #[arg(
        long,
        default_value_t = 90.0,
        help = "Share of each project's upfront cost that is borrowed, in percent"
    )]
    financing_ratio: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual loan interest rate in percent")]
    annual_interest_rate: f64,
    #[arg(long, default_value_t = 29.0, help = "Tax rate on positive profits in percent")]
    tax_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Total recurring holding fees over a project's life"
    )]
    holding_fee_total: f64,
    #[arg(long, default_value_t = 0.0, help = "Land transfer tax on the buy value in percent")]
    land_transfer_tax_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Notary fee on the buy value in percent")]
    notary_fee_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Buyer-side agent fee in percent")]
    buyer_agent_fee_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Seller-side agent fee on revenue in percent")]
    seller_agent_fee_rate: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Max +/- variation of project duration in percent"
    )]
    duration_jitter_ratio: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Max +/- variation of sale price in percent"
    )]
    sale_price_jitter_ratio: f64,
    #[arg(long, default_value_t = 60, help = "Months to simulate")]
    total_months: u32,
    #[arg(long, default_value_t = 50, help = "Independent paths to simulate")]
    num_simulations: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliAgingPolicy::SameMonth,
        help = "Whether new projects are aged in their start month"
    )]
    aging_policy: CliAgingPolicy,
    #[arg(long, default_value_t = false, help = "Include every simulated path in the output")]
    include_paths: bool,
}

#[derive(Debug)]
struct ApiRequest {
    config: SimulationConfig,
    include_paths: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    summary_text: String,
    total_months: u32,
    num_simulations: u32,
    seed: u64,
    aging_policy: AgingPolicy,
    project: ProjectEconomics,
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<Vec<PathResult>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn flag_name(field: &str) -> String {
    format!("--{}", field.replace('_', "-"))
}

fn build_config(cli: Cli) -> Result<SimulationConfig, String> {
    for (name, pct) in [
        ("--financing-ratio", cli.financing_ratio),
        ("--tax-rate", cli.tax_rate),
        ("--land-transfer-tax-rate", cli.land_transfer_tax_rate),
        ("--notary-fee-rate", cli.notary_fee_rate),
        ("--buyer-agent-fee-rate", cli.buyer_agent_fee_rate),
        ("--seller-agent-fee-rate", cli.seller_agent_fee_rate),
    ] {
        if !(0.0..=100.0).contains(&pct) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    let config = SimulationConfig {
        starting_capital: cli.starting_capital,
        buy_price_per_area: cli.buy_price_per_area,
        sell_price_per_area: cli.sell_price_per_area,
        area_per_project: cli.area_per_project,
        renovation_cost_per_area: cli.renovation_cost_per_area,
        project_duration_months: cli.project_duration_months,
        financing_ratio: cli.financing_ratio / 100.0,
        annual_interest_rate: cli.annual_interest_rate / 100.0,
        tax_rate: cli.tax_rate / 100.0,
        holding_fee_total: cli.holding_fee_total,
        land_transfer_tax_rate: cli.land_transfer_tax_rate / 100.0,
        notary_fee_rate: cli.notary_fee_rate / 100.0,
        buyer_agent_fee_rate: cli.buyer_agent_fee_rate / 100.0,
        seller_agent_fee_rate: cli.seller_agent_fee_rate / 100.0,
        duration_jitter_ratio: cli.duration_jitter_ratio / 100.0,
        sale_price_jitter_ratio: cli.sale_price_jitter_ratio / 100.0,
        total_months: cli.total_months,
        num_simulations: cli.num_simulations,
        seed: cli.seed,
        aging: cli.aging_policy.into(),
    };

    config
        .validate()
        .map_err(|err| format!("{}: {err}", flag_name(err.field())))?;
    Ok(config)
}

/// Parses `simulate` flags, runs the model and returns the response as pretty JSON.
pub fn run_cli_simulation<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let include_paths = cli.include_paths;
    let config = build_config(cli)?;
    let response = simulate(&config, include_paths).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode output: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "flipfinity HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let ApiRequest {
        config,
        include_paths,
    } = request;
    let outcome = tokio::task::spawn_blocking(move || simulate(&config, include_paths)).await;

    match outcome {
        Ok(Ok(response)) => json_response(StatusCode::OK, response),
        Ok(Err(err)) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        Err(join_err) => {
            error!(%join_err, "simulation task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred during simulation",
            )
        }
    }
}

fn simulate(
    config: &SimulationConfig,
    include_paths: bool,
) -> Result<SimulateResponse, ConfigError> {
    let (summary, paths) = if include_paths {
        let MonteCarloRun { summary, paths } = run_monte_carlo_with_paths(config)?;
        (summary, Some(paths))
    } else {
        (run_monte_carlo(config)?, None)
    };
    Ok(build_simulate_response(config, summary, paths))
}

fn build_simulate_response(
    config: &SimulationConfig,
    summary: SummaryStatistics,
    paths: Option<Vec<PathResult>>,
) -> SimulateResponse {
    SimulateResponse {
        summary_text: summary.final_summary(),
        total_months: config.total_months,
        num_simulations: summary.num_paths,
        seed: config.seed,
        aging_policy: config.aging,
        project: ProjectEconomics::from_config(config),
        columns: SummaryStatistics::column_names(),
        rows: summary.rows,
        paths,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.starting_capital {
        cli.starting_capital = v;
    }
    if let Some(v) = payload.buy_price_per_area {
        cli.buy_price_per_area = v;
    }
    if let Some(v) = payload.sell_price_per_area {
        cli.sell_price_per_area = v;
    }
    if let Some(v) = payload.area_per_project {
        cli.area_per_project = v;
    }
    if let Some(v) = payload.renovation_cost_per_area {
        cli.renovation_cost_per_area = v;
    }
    if let Some(v) = payload.project_duration_months {
        cli.project_duration_months = v;
    }

    if let Some(v) = payload.financing_ratio {
        cli.financing_ratio = v;
    }
    if let Some(v) = payload.annual_interest_rate {
        cli.annual_interest_rate = v;
    }
    if let Some(v) = payload.tax_rate {
        cli.tax_rate = v;
    }
    if let Some(v) = payload.holding_fee_total {
        cli.holding_fee_total = v;
    }
    if let Some(v) = payload.land_transfer_tax_rate {
        cli.land_transfer_tax_rate = v;
    }
    if let Some(v) = payload.notary_fee_rate {
        cli.notary_fee_rate = v;
    }
    if let Some(v) = payload.buyer_agent_fee_rate {
        cli.buyer_agent_fee_rate = v;
    }
    if let Some(v) = payload.seller_agent_fee_rate {
        cli.seller_agent_fee_rate = v;
    }

    if let Some(v) = payload.duration_jitter_ratio {
        cli.duration_jitter_ratio = v;
    }
    if let Some(v) = payload.sale_price_jitter_ratio {
        cli.sale_price_jitter_ratio = v;
    }
    if let Some(v) = payload.total_months {
        cli.total_months = v;
    }
    if let Some(v) = payload.num_simulations {
        cli.num_simulations = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }
    if let Some(v) = payload.aging_policy {
        cli.aging_policy = v.into();
    }
    if let Some(v) = payload.include_paths {
        cli.include_paths = v;
    }

    let include_paths = cli.include_paths;
    let config = build_config(cli)?;
    Ok(ApiRequest {
        config,
        include_paths,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        starting_capital: 60.0,
        buy_price_per_area: 1.5,
        sell_price_per_area: 2.0,
        area_per_project: 100.0,
        renovation_cost_per_area: 0.0,
        project_duration_months: 9,
        financing_ratio: 90.0,
        annual_interest_rate: 5.0,
        tax_rate: 29.0,
        holding_fee_total: 0.0,
        land_transfer_tax_rate: 0.0,
        notary_fee_rate: 0.0,
        buyer_agent_fee_rate: 0.0,
        seller_agent_fee_rate: 0.0,
        duration_jitter_ratio: 20.0,
        sale_price_jitter_ratio: 10.0,
        total_months: 60,
        num_simulations: 50,
        seed: 42,
        aging_policy: CliAgingPolicy::SameMonth,
        include_paths: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn build_config_converts_percent_flags_to_ratios() {
        let mut cli = sample_cli();
        cli.tax_rate = 29.125;
        cli.notary_fee_rate = 1.5;

        let config = build_config(cli).expect("valid config");
        assert_approx(config.financing_ratio, 0.9);
        assert_approx(config.annual_interest_rate, 0.05);
        assert_approx(config.tax_rate, 0.29125);
        assert_approx(config.notary_fee_rate, 0.015);
        assert_approx(config.duration_jitter_ratio, 0.2);
        assert_approx(config.sale_price_jitter_ratio, 0.1);
        assert_eq!(config.aging, AgingPolicy::SameMonth);
    }

    #[test]
    fn build_config_rejects_financing_ratio_above_hundred() {
        let mut cli = sample_cli();
        cli.financing_ratio = 120.0;
        let err = build_config(cli).expect_err("must reject financing above 100%");
        assert!(err.contains("--financing-ratio"));
    }

    #[test]
    fn build_config_reports_core_rejections_by_flag() {
        let mut cli = sample_cli();
        cli.area_per_project = 0.0;
        let err = build_config(cli).expect_err("must reject zero area");
        assert!(err.starts_with("--area-per-project"), "{err}");

        let mut cli = sample_cli();
        cli.total_months = 0;
        let err = build_config(cli).expect_err("must reject zero months");
        assert!(err.starts_with("--total-months"), "{err}");
    }

    #[test]
    fn build_config_rejects_negative_jitter() {
        let mut cli = sample_cli();
        cli.duration_jitter_ratio = -5.0;
        let err = build_config(cli).expect_err("must reject negative jitter");
        assert!(err.contains("--duration-jitter-ratio"));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "startingCapital": 120,
          "buyPricePerArea": 1.8,
          "sellPricePerArea": 2.6,
          "areaPerProject": 80,
          "renovationCostPerArea": 0.3,
          "projectDurationMonths": 12,
          "financingRatio": 75,
          "annualInterestRate": 4.5,
          "taxRate": 25,
          "holdingFeeTotal": 2.4,
          "landTransferTaxRate": 6,
          "notaryFeeRate": 1.5,
          "buyerAgentFeeRate": 3,
          "sellerAgentFeeRate": 2,
          "durationJitterRatio": 15,
          "salePriceJitterRatio": 5,
          "totalMonths": 36,
          "numSimulations": 200,
          "seed": 9,
          "agingPolicy": "following-month",
          "includePaths": true
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let config = request.config;

        assert_approx(config.starting_capital, 120.0);
        assert_approx(config.buy_price_per_area, 1.8);
        assert_approx(config.sell_price_per_area, 2.6);
        assert_approx(config.area_per_project, 80.0);
        assert_approx(config.renovation_cost_per_area, 0.3);
        assert_eq!(config.project_duration_months, 12);
        assert_approx(config.financing_ratio, 0.75);
        assert_approx(config.annual_interest_rate, 0.045);
        assert_approx(config.tax_rate, 0.25);
        assert_approx(config.holding_fee_total, 2.4);
        assert_approx(config.land_transfer_tax_rate, 0.06);
        assert_approx(config.notary_fee_rate, 0.015);
        assert_approx(config.buyer_agent_fee_rate, 0.03);
        assert_approx(config.seller_agent_fee_rate, 0.02);
        assert_approx(config.duration_jitter_ratio, 0.15);
        assert_approx(config.sale_price_jitter_ratio, 0.05);
        assert_eq!(config.total_months, 36);
        assert_eq!(config.num_simulations, 200);
        assert_eq!(config.seed, 9);
        assert_eq!(config.aging, AgingPolicy::FollowingMonth);
        assert!(request.include_paths);
    }

    #[test]
    fn api_request_from_json_accepts_form_client_keys() {
        let json = r#"{
          "starting_capital_ke": 60,
          "sqm_buy_value_ke": 1.5,
          "sqm_sell_value_ke": 2.0,
          "total_sqm": 100,
          "project_duration_months": 9,
          "financing_ratio_percent": 90,
          "interest_rate_percent": 5,
          "tax_rate_percent": 29.125,
          "duration_jitter_percent": 0,
          "sell_price_jitter_percent": 0,
          "total_simulation_months": 9,
          "num_simulations": 1
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let config = request.config;
        assert_approx(config.tax_rate, 0.29125);
        assert_approx(config.duration_jitter_ratio, 0.0);
        assert_eq!(config.total_months, 9);
        assert_eq!(config.num_simulations, 1);
        assert!(!request.include_paths);
    }

    #[test]
    fn api_request_from_json_uses_defaults_for_missing_fields() {
        let request = api_request_from_json("{}").expect("empty payload is valid");
        assert_approx(request.config.starting_capital, 60.0);
        assert_eq!(request.config.total_months, 60);
        assert_eq!(request.config.num_simulations, 50);
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let mut cli = sample_cli();
        cli.total_months = 12;
        cli.num_simulations = 3;

        let config = build_config(cli).expect("valid config");
        let response = simulate(&config, false).expect("valid config");
        assert_eq!(response.rows.len(), 12);
        assert_eq!(response.columns.len(), 49);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"summaryText\""));
        assert!(json.contains("\"project\""));
        assert!(json.contains("\"equityNeeded\""));
        assert!(json.contains("\"totalAssets\""));
        assert!(json.contains("\"cumulativeInterestCost\""));
        assert!(json.contains("\"p25\""));
        assert!(json.contains("\"agingPolicy\":\"same-month\""));
        assert!(!json.contains("\"paths\""));
    }

    #[test]
    fn simulate_includes_paths_only_when_requested() {
        let mut cli = sample_cli();
        cli.total_months = 6;
        cli.num_simulations = 4;
        let config = build_config(cli).expect("valid config");

        let with_paths = simulate(&config, true).expect("valid config");
        let paths = with_paths.paths.expect("paths requested");
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.len() == 6));

        let without = simulate(&config, false).expect("valid config");
        assert!(without.paths.is_none());
        assert_eq!(with_paths.rows, without.rows);
    }

    #[test]
    fn run_cli_simulation_prints_summary_json() {
        let output = run_cli_simulation([
            "flipfinity",
            "--total-months",
            "9",
            "--num-simulations",
            "1",
            "--tax-rate",
            "29.125",
            "--duration-jitter-ratio",
            "0",
            "--sale-price-jitter-ratio",
            "0",
        ])
        .expect("cli run should succeed");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(9));
        assert_eq!(value["numSimulations"], 1);
        assert_eq!(value["rows"][0]["totalAssets"]["std"], 0.0);
    }

    #[test]
    fn run_cli_simulation_rejects_unknown_flags() {
        let err = run_cli_simulation(["flipfinity", "--bogus", "1"]).expect_err("unknown flag");
        assert!(err.contains("--bogus"));
    }

    #[tokio::test]
    async fn simulate_handler_returns_bad_request_for_invalid_payload() {
        let payload = SimulatePayload {
            tax_rate: Some(150.0),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
        let body = read_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("--tax-rate"))
        );
    }

    #[tokio::test]
    async fn simulate_handler_rejects_capital_beyond_the_project_cap() {
        let payload = SimulatePayload {
            starting_capital: Some(1e18),
            total_months: Some(1),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.starts_with("--starting-capital"))
        );
    }

    #[tokio::test]
    async fn simulate_handler_runs_model_for_valid_payload() {
        let payload = SimulatePayload {
            total_months: Some(10),
            num_simulations: Some(5),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["rows"][9]["month"], 10);
        assert!(
            body["summaryText"]
                .as_str()
                .is_some_and(|text| text.starts_with("After 10 months"))
        );
    }

    #[tokio::test]
    async fn health_handler_reports_ok() {
        let body = read_json(health_handler().await).await;
        assert_eq!(body["status"], "ok");
    }
}
