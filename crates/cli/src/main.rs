use clap::Parser;
use salescope_core::forecast::groq::GroqClient;
use salescope_core::pipeline::{self, ForecastRequest};
use salescope_core::table::SalesTable;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Debug, Parser)]
#[command(name = "salescope")]
struct Args {
    /// Path to the sales CSV export.
    #[arg(long)]
    csv: std::path::PathBuf,

    /// Forecast horizon in days.
    #[arg(long, default_value_t = 30)]
    horizon_days: usize,

    /// Restrict the forecast to a single product.
    #[arg(long)]
    product: Option<String>,

    /// Print the KPI report only; skip the forecast service call.
    #[arg(long)]
    kpis_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = salescope_core::config::Settings::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let table = SalesTable::from_csv_path(&args.csv)?;
    tracing::info!(
        rows = table.len(),
        dropped = table.dropped_rows,
        "loaded sales table"
    );

    let metrics = pipeline::run_dashboard(&table)?;
    report::print_metrics(&metrics);

    if args.kpis_only {
        return Ok(());
    }

    let client = GroqClient::from_settings(&settings)?;
    let request = ForecastRequest {
        horizon_days: args.horizon_days,
        product: args.product.clone(),
    };

    let run = pipeline::run_forecast(&table, &client, &request).await?;
    report::print_forecast(&run);

    Ok(())
}
