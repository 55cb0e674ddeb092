use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use matricula_engine::config::{AppConfig, CatalogConfig};
use matricula_engine::enrollment::catalog::{self, CatalogError, Discount, InMemoryCatalog, Trilho};
use matricula_engine::enrollment::cep::{self, format_cep, CepRangeTable};
use matricula_engine::enrollment::router::enrollment_router;
use matricula_engine::enrollment::service::{
    QuoteOutcome, QuoteRequest, QuoteService, QuoteServiceError,
};
use matricula_engine::error::AppError;
use matricula_engine::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Matricula Discount Engine",
    about = "Evaluate tuition discount eligibility and pricing from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price a discount selection and print the breakdown
    Quote(QuoteArgs),
    /// Classify a CEP against the range table
    Cep(CepArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Student CEP, with or without formatting
    #[arg(long)]
    cep: Option<String>,
    /// Enrollment track (especial, combinado, comercial)
    #[arg(long, value_parser = parse_trilho)]
    trilho: Option<Trilho>,
    /// Base monthly tuition value
    #[arg(long)]
    base_value: f64,
    /// Monthly material cost, never discounted
    #[arg(long, default_value_t = 0.0)]
    material_value: f64,
    /// Discount code to apply (repeatable)
    #[arg(long = "discount")]
    discounts: Vec<String>,
    /// Discount catalog CSV overriding the built-in reference catalog
    #[arg(long)]
    catalog_csv: Option<PathBuf>,
    /// CEP range table CSV overriding the built-in reference table
    #[arg(long)]
    cep_ranges_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CepArgs {
    /// CEP to classify
    cep: String,
    /// CEP range table CSV overriding the built-in reference table
    #[arg(long)]
    cep_ranges_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Cep(args) => run_cep(args),
    }
}

fn parse_trilho(raw: &str) -> Result<Trilho, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "especial" => Ok(Trilho::Especial),
        "combinado" => Ok(Trilho::Combinado),
        "comercial" => Ok(Trilho::Comercial),
        other => Err(format!(
            "unknown track '{other}', expected especial, combinado, or comercial"
        )),
    }
}

fn load_catalog(override_csv: Option<&PathBuf>) -> Result<Vec<Discount>, AppError> {
    match override_csv {
        Some(path) => Ok(catalog::load_catalog_csv(path)?),
        None => Ok(Discount::reference_catalog()),
    }
}

fn load_ranges(override_csv: Option<&PathBuf>) -> Result<CepRangeTable, AppError> {
    match override_csv {
        Some(path) => Ok(cep::load_ranges_csv(path)?),
        None => Ok(CepRangeTable::reference()),
    }
}

fn build_quote_service(config: &CatalogConfig) -> Result<QuoteService<InMemoryCatalog>, AppError> {
    let discounts = load_catalog(config.discounts_csv.as_ref())?;
    let ranges = load_ranges(config.cep_ranges_csv.as_ref())?;
    Ok(QuoteService::new(
        Arc::new(InMemoryCatalog::new(discounts)),
        Arc::new(ranges),
    ))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_quote_service(&config.catalog)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(enrollment_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "matricula discount engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        cep,
        trilho,
        base_value,
        material_value,
        discounts,
        catalog_csv,
        cep_ranges_csv,
    } = args;

    let service = build_quote_service(&CatalogConfig {
        discounts_csv: catalog_csv,
        cep_ranges_csv,
    })?;

    let request = QuoteRequest {
        cep: cep.clone(),
        trilho,
        base_value,
        material_value,
        discounts,
    };

    let outcome = service.quote(&request, Utc::now()).map_err(|err| match err {
        QuoteServiceError::Catalog(inner) => AppError::Catalog(inner),
        other => AppError::Catalog(CatalogError::Unavailable(other.to_string())),
    })?;

    render_quote(cep.as_deref(), &outcome);
    Ok(())
}

fn run_cep(args: CepArgs) -> Result<(), AppError> {
    let ranges = load_ranges(args.cep_ranges_csv.as_ref())?;
    let classification = ranges.classify(&args.cep);

    println!("CEP {}", format_cep(&args.cep));
    println!("Category: {}", classification.category.label());
    if let Some(district) = &classification.district {
        println!("District: {district}");
    }
    if !classification.matched {
        println!("No range matched; the default category applies");
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_quote(cep: Option<&str>, outcome: &QuoteOutcome) {
    println!("Enrollment quote");
    match cep {
        Some(cep) => match outcome.category {
            Some(category) => println!(
                "CEP {} resolved to category {}",
                format_cep(cep),
                category.label()
            ),
            None => println!("CEP {} not resolved", format_cep(cep)),
        },
        None => println!("No CEP provided; category rules skipped"),
    }

    let pricing = &outcome.pricing;
    println!("\nPricing");
    println!("- Base value: {:.2}", pricing.base_value);
    for applied in &pricing.discounts {
        println!(
            "- {} ({}): {}% -> -{:.2}",
            applied.name, applied.code, applied.percentage, applied.value
        );
    }
    println!(
        "- Total discount: {}% (-{:.2})",
        pricing.total_discount_percentage, pricing.total_discount_value
    );
    println!("- Final monthly value: {:.2}", pricing.final_monthly_value);
    if pricing.material_value > 0.0 {
        println!(
            "- Material: {:.2} (total {:.2})",
            pricing.material_value,
            pricing.total_monthly_cost()
        );
    }
    println!("- Approval: {}", pricing.approval_level.description());

    if pricing.validation_errors.is_empty() {
        println!("\nValidation: ok");
    } else {
        println!("\nValidation errors");
        for error in &pricing.validation_errors {
            println!("- {error}");
        }
    }

    for warning in &pricing.warnings {
        println!("Warning: {warning}");
    }

    let ineligible: Vec<_> = outcome
        .eligibility
        .iter()
        .filter(|result| !result.eligible)
        .collect();
    if !ineligible.is_empty() {
        println!("\nIneligible discounts");
        for result in ineligible {
            let reason = result.reason.as_deref().unwrap_or("not available");
            println!(
                "- {} ({}): {}",
                result.discount.name, result.discount.code, reason
            );
        }
    }
}
