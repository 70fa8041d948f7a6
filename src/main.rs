// Command-line front end over the analytics pipeline.
//
// - `clean` validates a raw CSV and writes the cleaned table.
// - `analyze` extracts features, prints KPIs and insights, writes both out.
// - `forecast` projects one metric forward in weekly steps.
// - `template` emits the header-only upload template.
use business_insights::config::{ForecastConfig, InsightConfig};
use business_insights::error::{AnalyticsError, Result};
use business_insights::types::FeatureFilter;
use business_insights::{forecast, insights, loader, metrics, output, util};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "business-insights")]
#[command(about = "Clean, analyze and forecast business performance data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and clean a raw dataset
    Clean {
        /// Raw CSV file
        input: PathBuf,

        /// Destination of the cleaned table
        #[arg(long, default_value = "data/processed/cleaned_data.csv")]
        output: PathBuf,
    },

    /// Derive metrics, KPIs and insights
    Analyze {
        /// Raw CSV file
        input: PathBuf,

        #[arg(long, default_value = "data/processed/featured_data.csv")]
        features_out: PathBuf,

        #[arg(long, default_value = "data/processed/insights.json")]
        insights_out: PathBuf,

        /// Keep records on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,

        /// Keep records on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,

        #[arg(long)]
        min_revenue: Option<f64>,

        #[arg(long)]
        max_revenue: Option<f64>,
    },

    /// Weekly forecast of one metric
    Forecast {
        /// Raw CSV file
        input: PathBuf,

        /// Metric column to forecast
        #[arg(long, default_value = "revenue")]
        metric: String,

        /// Weeks to project past the last observation
        #[arg(long, default_value_t = 26)]
        horizon: usize,

        /// Destination CSV (defaults to data/processed/forecast_<metric>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print or save the upload template
    Template {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    util::parse_date_safe(Some(s)).ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", s))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("BUSINESS_INSIGHTS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        if e.is_input_error() {
            eprintln!("{}", e);
            if !matches!(e, AnalyticsError::Schema { .. }) {
                eprintln!("Required columns: {}", loader::REQUIRED_COLUMNS.join(", "));
            }
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Clean { input, output } => handle_clean(&input, &output),
        Commands::Analyze {
            input,
            features_out,
            insights_out,
            from,
            to,
            min_revenue,
            max_revenue,
        } => {
            let filter = FeatureFilter {
                date_range: (from.is_some() || to.is_some())
                    .then(|| (from.unwrap_or(NaiveDate::MIN), to.unwrap_or(NaiveDate::MAX))),
                revenue_range: (min_revenue.is_some() || max_revenue.is_some()).then(|| {
                    (
                        min_revenue.unwrap_or(f64::NEG_INFINITY),
                        max_revenue.unwrap_or(f64::INFINITY),
                    )
                }),
            };
            handle_analyze(&input, &features_out, &insights_out, &filter)
        }
        Commands::Forecast {
            input,
            metric,
            horizon,
            output,
        } => {
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("data/processed/forecast_{}.csv", metric))
            });
            handle_forecast(&input, &metric, horizon, &output)
        }
        Commands::Template { output } => {
            match output {
                Some(path) => {
                    output::write_template(&path)?;
                    println!("Template saved to {}", path.display());
                }
                None => print!("{}", loader::template_csv()),
            }
            Ok(())
        }
    }
}

fn load_clean(input: &Path) -> Result<business_insights::Table> {
    let raw = loader::read_csv(input)?;
    let (clean, report) = loader::validate_with_report(&raw)?;
    println!(
        "Processing dataset... ({} rows loaded, {} kept after cleaning)",
        util::format_int(report.total_rows as u64),
        util::format_int(report.filtered_rows as u64)
    );
    if report.dropped_incomplete > 0 {
        println!(
            "Note: {} rows skipped due to missing values.",
            util::format_int(report.dropped_incomplete as u64)
        );
    }
    if !report.text_columns.is_empty() {
        println!("Info: kept as text: {}", report.text_columns.join(", "));
    }
    println!();
    Ok(clean)
}

fn handle_clean(input: &Path, dest: &Path) -> Result<()> {
    let clean = load_clean(input)?;
    output::write_table_csv(dest, &clean)?;
    println!("Cleaned data saved to {}", dest.display());
    Ok(())
}

fn handle_analyze(
    input: &Path,
    features_out: &Path,
    insights_out: &Path,
    filter: &FeatureFilter,
) -> Result<()> {
    let clean = load_clean(input)?;
    let features = metrics::extract(&clean).filter(filter)?;
    if features.is_empty() {
        println!("No records match the selected filters.");
        return Ok(());
    }
    output::write_features_csv(features_out, &features)?;

    println!("Key Performance Indicators\n");
    let kpis = insights::kpis(&features)?;
    output::preview_table_rows(&output::kpi_rows(&kpis), 3);

    let config = InsightConfig::default();
    let set = insights::generate_insights_with(&features, &config)?;
    println!("Business Insights\n");
    let rows = output::insight_rows(&set);
    output::preview_table_rows(&rows, rows.len());
    output::write_json(insights_out, &set)?;

    println!("Revenue by Region");
    for (region, total) in insights::revenue_by_region(&features)? {
        println!("  {}: {}", region, util::format_number(total, 2));
    }
    println!("\nTop {} Products by Units Sold", config.top_products);
    for (product, units) in insights::top_products(&features, config.top_products)? {
        println!("  {}: {}", product, util::format_number(units, 0));
    }
    println!();
    println!("(Features exported to {})", features_out.display());
    println!("(Insights exported to {})\n", insights_out.display());
    Ok(())
}

fn handle_forecast(input: &Path, metric: &str, horizon: usize, dest: &Path) -> Result<()> {
    let clean = load_clean(input)?;
    let features = metrics::extract(&clean);
    let config = ForecastConfig {
        horizon_weeks: horizon,
        ..ForecastConfig::default()
    };
    let (table, model) = forecast::forecast_with(&features, metric, &config)?;
    output::write_forecast_csv(dest, &table)?;

    let cutoff = model.cutoff();
    println!("Forecast: {} ({} weeks past {})\n", metric, horizon, cutoff);
    output::preview_table_rows(&output::forecast_preview_rows(&table, cutoff), 5);
    if let Some(dip) = table.future_dip(cutoff) {
        println!(
            "Lowest projected week: {} ({})",
            dip.date,
            util::format_number(dip.yhat, 2)
        );
    }
    println!("(Full forecast exported to {})\n", dest.display());
    Ok(())
}
