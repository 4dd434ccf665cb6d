//! Per-organization E-Rate history.
//!
//! Reports every funding year of network equipment for one organization,
//! or searches organization names with `--find-school`.

use anyhow::{Context, Result};
use clap::Parser;
use erate_analyzer::analyzers::analyzer::{HistoryRequest, school_history};
use erate_analyzer::analyzers::search::find_organizations;
use erate_analyzer::analyzers::types::{DEFAULT_LINE_ITEM_THRESHOLD, Thresholds};
use erate_analyzer::analyzers::utility::format_usd;
use erate_analyzer::analyzers::vendor::VendorFilter;
use erate_analyzer::config::ClientConfig;
use erate_analyzer::error::exit_code;
use erate_analyzer::infra::usac::UsacClient;
use erate_analyzer::output::{
    ExportOptions, Palette, ReportHeading, history_file_stem, render_report,
    render_search_results,
};
use erate_analyzer::services::funding_api::OrganizationSearch;
use erate_analyzer::validate::{self, FundingYear, StateCode, parse_threshold};
use erate_analyzer::{ErateError, logging};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "school_query")]
#[command(
    about = "Show E-Rate network equipment funding history for one organization",
    long_about = None
)]
struct Cli {
    /// Exact organization name as it appears in USAC data
    #[arg(
        value_name = "ORGANIZATION",
        required_unless_present = "find_school",
        conflicts_with = "find_school"
    )]
    organization: Option<String>,

    /// Search for organizations whose name contains TERM
    #[arg(long, value_name = "TERM")]
    find_school: Option<String>,

    /// Restrict --find-school to a 2-letter state code
    #[arg(
        long,
        value_name = "ST",
        requires = "find_school",
        conflicts_with = "organization"
    )]
    state: Option<StateCode>,

    /// Maximum organizations listed by --find-school
    #[arg(
        long,
        default_value_t = 50,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    limit: u32,

    /// Show line items costing at least this many dollars
    #[arg(
        long,
        value_name = "DOLLARS",
        default_value_t = DEFAULT_LINE_ITEM_THRESHOLD,
        value_parser = parse_threshold
    )]
    sku_threshold: Decimal,

    /// Show funding years totaling at least this many dollars
    #[arg(
        long,
        value_name = "DOLLARS",
        default_value_t = Decimal::ZERO,
        value_parser = parse_threshold
    )]
    school_threshold: Decimal,

    /// First funding year to include
    #[arg(long, value_name = "YEAR")]
    from_year: Option<FundingYear>,

    /// Last funding year to include
    #[arg(long, value_name = "YEAR")]
    to_year: Option<FundingYear>,

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
    if let Some(term) = cli.find_school {
        return find_school(&term, cli.state, cli.limit as usize);
    }

    let organization =
        validate::organization_name(cli.organization.as_deref().unwrap_or_default())?;
    let request = HistoryRequest {
        years: validate::history_years(cli.from_year, cli.to_year)?,
        thresholds: Thresholds::new(cli.school_threshold, cli.sku_threshold)?,
        vendors: if cli.all_vendors {
            VendorFilter::All
        } else {
            VendorFilter::NetworkEquipment
        },
        organization,
    };

    let client = UsacClient::connect(ClientConfig::from_env()?)?;
    let report = school_history(&client, &request)?;

    let query = format!(
        "organization '{}', funding years {}-{}",
        request.organization,
        request.years.start(),
        request.years.end()
    );
    let exports = ExportOptions {
        dir: cli.output_dir,
        csv: cli.save_csv,
        json: cli.save_json,
    };
    let saved = exports
        .save(&history_file_stem(&request.organization), &report, &query)
        .context("saving exports")?;

    let heading = ReportHeading {
        title: format!("E-RATE FUNDING HISTORY: {}", request.organization.to_uppercase()),
        subtitle: format!(
            "{} | Funding years {}-{} | Years of at least {}",
            request.vendors.describe(),
            request.years.start(),
            request.years.end(),
            format_usd(request.thresholds.group, 0)
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

fn find_school(term: &str, state: Option<StateCode>, limit: usize) -> Result<()> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ErateError::invalid("search term cannot be empty").into());
    }

    let search = OrganizationSearch {
        term: term.to_string(),
        state,
    };
    info!(term, state = ?search.state, limit, "Searching organizations");

    let client = UsacClient::connect(ClientConfig::from_env()?)?;
    let matches = find_organizations(&client, &search, limit)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_search_results(&mut out, term, &matches, Palette::for_stdout())?;
    Ok(())
}
