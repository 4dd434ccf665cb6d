//! Statewide E-Rate network equipment report for one funding year.

use anyhow::{Context, Result};
use clap::Parser;
use erate_analyzer::analyzers::analyzer::{StateYearRequest, state_year};
use erate_analyzer::analyzers::types::{
    DEFAULT_LINE_ITEM_THRESHOLD, DEFAULT_STATE_GROUP_THRESHOLD, Thresholds,
};
use erate_analyzer::analyzers::utility::format_usd;
use erate_analyzer::analyzers::vendor::VendorFilter;
use erate_analyzer::config::ClientConfig;
use erate_analyzer::error::exit_code;
use erate_analyzer::infra::usac::UsacClient;
use erate_analyzer::logging;
use erate_analyzer::output::{
    ExportOptions, Palette, ReportHeading, render_report, state_year_file_stem,
};
use erate_analyzer::validate::{FundingYear, StateCode, parse_threshold};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "year_query")]
#[command(
    about = "Rank a state's organizations by E-Rate network equipment funding for one year",
    long_about = None
)]
struct Cli {
    /// 2-letter state code (e.g. OK, TX, CA)
    #[arg(value_name = "STATE")]
    state: StateCode,

    /// 4-digit funding year
    #[arg(value_name = "YEAR")]
    year: FundingYear,

    /// Show organizations totaling at least this many dollars
    #[arg(
        long,
        value_name = "DOLLARS",
        default_value_t = DEFAULT_STATE_GROUP_THRESHOLD,
        value_parser = parse_threshold
    )]
    school_threshold: Decimal,

    /// Show line items costing at least this many dollars
    #[arg(
        long,
        value_name = "DOLLARS",
        default_value_t = DEFAULT_LINE_ITEM_THRESHOLD,
        value_parser = parse_threshold
    )]
    sku_threshold: Decimal,

    /// Include every manufacturer, not only tracked network vendors
    #[arg(long)]
    all_vendors: bool,

    /// Save displayed line items to CSV
    #[arg(long)]
    save_csv: bool,

    /// Save the full report to JSON
    #[arg(long)]
    save_json: bool,

    /// Directory for saved files
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = match logging::init("info") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let request = StateYearRequest {
        state: cli.state,
        year: cli.year,
        thresholds: Thresholds::new(cli.school_threshold, cli.sku_threshold)?,
        vendors: if cli.all_vendors {
            VendorFilter::All
        } else {
            VendorFilter::NetworkEquipment
        },
    };

    let client = UsacClient::connect(ClientConfig::from_env()?)?;
    let report = state_year(&client, &request)?;

    let query = format!("state {}, funding year {}", request.state, request.year);
    let exports = ExportOptions {
        dir: cli.output_dir,
        csv: cli.save_csv,
        json: cli.save_json,
    };
    let saved = exports
        .save(
            &state_year_file_stem(request.state.as_str(), request.year.get()),
            &report,
            &query,
        )
        .context("saving exports")?;

    let heading = ReportHeading {
        title: format!(
            "{} E-RATE FUNDING YEAR {}: ORGANIZATIONS OVER {}",
            request.state,
            request.year,
            format_usd(request.thresholds.group, 0)
        ),
        subtitle: format!(
            "{} | Line items of at least {}",
            request.vendors.describe(),
            format_usd(request.thresholds.line_item, 0)
        ),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_report(&mut out, &heading, &report, Palette::for_stdout())?;
    for path in &saved {
        writeln!(out, "Saved: {}", path.display())?;
    }
    writeln!(out, "Analysis complete!")?;
    if saved.is_empty() && !report.is_empty() {
        writeln!(out, "Use --save-csv or --save-json to keep these results.")?;
    }
    Ok(())
}
