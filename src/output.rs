//! Console rendering and file exports for aggregated reports.
//!
//! Console output and CSV rows show only what passes the thresholds. The
//! JSON export keeps every group and item, flagged with `displayed`, so the
//! unfiltered totals survive for downstream use.

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::search::OrganizationMatch;
use crate::analyzers::types::{Report, Thresholds, VendorTotal};
use crate::analyzers::utility::{format_usd, percent, truncate};
use crate::error::Result;
use crate::record::LineItem;

const RULE_WIDTH: usize = 80;
const LABEL_WIDTH: usize = 45;
const DATA_SOURCE: &str = "USAC Open Data API - FRN Line Items";

/// ANSI styling for console output. A disabled palette passes text through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub const PLAIN: Palette = Palette { enabled: false };
    pub const ANSI: Palette = Palette { enabled: true };

    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn for_stdout() -> Self {
        Palette {
            enabled: io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn header(self, text: &str) -> String {
        self.paint("1;95", text)
    }

    fn bold(self, text: &str) -> String {
        self.paint("1", text)
    }

    fn money(self, text: &str) -> String {
        self.paint("32", text)
    }

    fn vendor(self, text: &str) -> String {
        self.paint("36", text)
    }

    fn note(self, text: &str) -> String {
        self.paint("33", text)
    }
}

/// Title lines printed above a report.
#[derive(Debug, Clone)]
pub struct ReportHeading {
    pub title: String,
    pub subtitle: String,
}

/// Writes the human-readable report.
pub fn render_report<W: Write>(
    out: &mut W,
    heading: &ReportHeading,
    report: &Report,
    palette: Palette,
) -> io::Result<()> {
    let thresholds = report.thresholds();
    let heavy = "=".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{}", palette.header(&heavy))?;
    writeln!(out, "{}", palette.header(&heading.title))?;
    writeln!(out, "{}", palette.bold(&heading.subtitle))?;
    writeln!(out, "{}", palette.header(&heavy))?;

    if report.is_empty() {
        let message = format!(
            "No matching E-Rate line items found (0 results from {} fetched records).",
            report.fetched_records()
        );
        writeln!(out, "{}", palette.note(&message))?;
        return render_footer(out);
    }

    let displayed: Vec<_> = report.displayed().collect();

    writeln!(out, "Records:             {} of {} fetched", report.record_count(), report.fetched_records())?;
    writeln!(out, "Organizations:       {}", report.organization_count())?;
    writeln!(out, "Total Funding:       {}", palette.money(&format_usd(report.total(), 2)))?;
    writeln!(out, "Group Threshold:     {}", format_usd(thresholds.group, 0))?;
    writeln!(out, "Line-Item Threshold: {}", format_usd(thresholds.line_item, 0))?;
    writeln!(
        out,
        "Groups Shown:        {} of {}",
        displayed.len(),
        report.groups().len()
    )?;
    writeln!(out)?;

    render_vendor_breakdown(out, report, palette)?;

    if displayed.is_empty() {
        let message = format!(
            "(No groups at or above the {} threshold)",
            format_usd(thresholds.group, 0)
        );
        writeln!(out, "{}", palette.note(&message))?;
        writeln!(out)?;
    }

    for (rank, view) in displayed.iter().enumerate() {
        let group = view.group;
        let name = match group.funding_year() {
            Some(year) => format!("{year} - {}", group.organization()),
            None => group.organization().to_string(),
        };
        let line = format!("#{:<3} {:<56}", rank + 1, truncate(&name, 56));
        writeln!(
            out,
            "{} {}",
            palette.bold(&line),
            palette.money(&format!("{:>16}", format_usd(group.total(), 0)))
        )?;
        writeln!(
            out,
            "      Vendors: {}",
            palette.vendor(&vendor_summary(group.vendors(), group.total()))
        )?;

        if view.items.is_empty() {
            let message = format!(
                "      * (no single line items over {})",
                format_usd(thresholds.line_item, 0)
            );
            writeln!(out, "{}", palette.note(&message))?;
        }
        for item in &view.items {
            let qty = item
                .quantity()
                .map_or_else(|| "Qty N/A".to_string(), |q| format!("Qty {q}"));
            writeln!(
                out,
                "      • {:<LABEL_WIDTH$} {:>8} {}",
                item_label(item),
                qty,
                palette.money(&format!("{:>14}", format_usd(item.cost, 0)))
            )?;
        }
        if view.hidden_items() > 0 {
            writeln!(
                out,
                "        ({} more below {})",
                view.hidden_items(),
                format_usd(thresholds.line_item, 0)
            )?;
        }
        writeln!(out)?;
    }

    render_footer(out)
}

/// Vendors ranked by spending across the whole report.
fn render_vendor_breakdown<W: Write>(
    out: &mut W,
    report: &Report,
    palette: Palette,
) -> io::Result<()> {
    writeln!(out, "{}", palette.bold("VENDOR BREAKDOWN"))?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (rank, v) in report.vendors().iter().enumerate() {
        let share = format!("{}%", percent(v.total, report.total()));
        writeln!(
            out,
            "{:2}. {} {} {share:>7} {:>6} items",
            rank + 1,
            palette.vendor(&format!("{:<30}", truncate(&v.vendor, 30))),
            palette.money(&format!("{:>16}", format_usd(v.total, 0))),
            v.items
        )?;
    }
    writeln!(out)
}

fn render_footer<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "Analysis completed at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Data source: {DATA_SOURCE}")
}

fn vendor_summary(vendors: &[VendorTotal], total: Decimal) -> String {
    vendors
        .iter()
        .map(|v| {
            format!(
                "{} {} ({}%, {} items)",
                v.vendor,
                format_usd(v.total, 0),
                percent(v.total, total),
                v.items
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// `(App N) model` label for a line item, cut to the label column width.
///
/// Falls back to the product name when the model is blank and skips the
/// application prefix when the model already carries a parenthesized note.
pub fn item_label(item: &LineItem) -> String {
    let model = if item.model.is_empty() {
        item.product.as_str()
    } else {
        item.model.as_str()
    };

    if item.application_number.is_empty() || (model.contains('(') && model.contains(')')) {
        return truncate(model, LABEL_WIDTH);
    }
    truncate(&format!("(App {}) {}", item.application_number, model), LABEL_WIDTH)
}

/// Writes organization search results.
pub fn render_search_results<W: Write>(
    out: &mut W,
    term: &str,
    matches: &[OrganizationMatch],
    palette: Palette,
) -> io::Result<()> {
    if matches.is_empty() {
        let message = format!("No organizations found matching '{term}'");
        writeln!(out, "{}", palette.note(&message))?;
        return Ok(());
    }

    let heavy = "=".repeat(RULE_WIDTH);
    let title = format!("SCHOOL SEARCH RESULTS FOR '{}'", term.to_uppercase());
    writeln!(out)?;
    writeln!(out, "{}", palette.header(&heavy))?;
    writeln!(out, "{}", palette.header(&title))?;
    writeln!(out, "{}", palette.header(&heavy))?;
    writeln!(out, "Found {} matching organizations:", matches.len())?;
    writeln!(out)?;

    for (i, m) in matches.iter().enumerate() {
        let state = m
            .state
            .as_deref()
            .map_or_else(|| "[State Unknown]".to_string(), |s| format!("[{s}]"));
        writeln!(out, "{:2}. {} {}", i + 1, palette.bold(&m.name), state)?;
        writeln!(out, "     E-Rate funding years: {}", years_label(m))?;
        writeln!(out)?;
    }

    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "Copy the exact organization name from above and run:")?;
    writeln!(out, "  school_query \"EXACT ORGANIZATION NAME\"")
}

fn years_label(m: &OrganizationMatch) -> String {
    let (Some(first), Some(last)) = (m.years.first(), m.years.last()) else {
        return "(no data found)".to_string();
    };
    let listed = format!(
        "({})",
        m.years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if listed.len() > 30 {
        format!("({} years: {first}-{last})", m.years.len())
    } else {
        listed
    }
}

/// One CSV row per displayed line item.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    organization: &'a str,
    state: &'a str,
    funding_year: Option<i32>,
    vendor: &'a str,
    manufacturer: &'a str,
    product: &'a str,
    model: &'a str,
    quantity: &'a str,
    application_number: &'a str,
    funding_request_number: &'a str,
    cost: Decimal,
    group_total: Decimal,
}

/// Writes displayed line items as CSV and returns the number of data rows.
///
/// The header is written even when no rows pass the thresholds.
pub fn write_csv<W: Write>(writer: W, report: &Report) -> Result<usize> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record([
        "organization",
        "state",
        "funding_year",
        "vendor",
        "manufacturer",
        "product",
        "model",
        "quantity",
        "application_number",
        "funding_request_number",
        "cost",
        "group_total",
    ])?;

    let mut rows = 0;
    for view in report.displayed() {
        for item in &view.items {
            csv.serialize(CsvRow {
                organization: &item.organization,
                state: &item.state,
                funding_year: item.funding_year,
                vendor: &item.vendor,
                manufacturer: &item.manufacturer,
                product: &item.product,
                model: &item.model,
                quantity: &item.quantity,
                application_number: &item.application_number,
                funding_request_number: &item.funding_request_number,
                cost: item.cost,
                group_total: view.group.total(),
            })?;
            rows += 1;
        }
    }
    csv.flush()?;
    Ok(rows)
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    query: &'a str,
    thresholds: Thresholds,
    fetched_records: usize,
    record_count: usize,
    total: Decimal,
    vendors: &'a [VendorTotal],
    groups: Vec<JsonGroup<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonGroup<'a> {
    organization: &'a str,
    funding_year: Option<i32>,
    state: &'a str,
    total: Decimal,
    displayed: bool,
    item_count: usize,
    vendors: &'a [VendorTotal],
    items: Vec<JsonItem<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonItem<'a> {
    #[serde(flatten)]
    item: &'a LineItem,
    displayed: bool,
}

/// Writes the whole report as pretty JSON, including groups and items
/// below the thresholds.
pub fn write_json<W: Write>(mut writer: W, report: &Report, query: &str) -> Result<()> {
    let thresholds = report.thresholds();
    let doc = JsonReport {
        generated_at: Utc::now(),
        query,
        thresholds,
        fetched_records: report.fetched_records(),
        record_count: report.record_count(),
        total: report.total(),
        vendors: report.vendors(),
        groups: report
            .groups()
            .iter()
            .map(|group| {
                let group_shown = thresholds.shows_group(group);
                JsonGroup {
                    organization: group.organization(),
                    funding_year: group.funding_year(),
                    state: group.state(),
                    total: group.total(),
                    displayed: group_shown,
                    item_count: group.items().len(),
                    vendors: group.vendors(),
                    items: group
                        .items()
                        .iter()
                        .map(|item| JsonItem {
                            item,
                            displayed: group_shown && thresholds.shows_item(item),
                        })
                        .collect(),
                }
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes the CSV export to `path`, replacing any existing file.
pub fn save_csv(path: &Path, report: &Report) -> Result<usize> {
    debug!(path = %path.display(), "Writing CSV export");
    let rows = write_csv(BufWriter::new(File::create(path)?), report)?;
    info!(path = %path.display(), rows, "CSV export saved");
    Ok(rows)
}

/// Writes the JSON export to `path`, replacing any existing file.
pub fn save_json(path: &Path, report: &Report, query: &str) -> Result<()> {
    debug!(path = %path.display(), "Writing JSON export");
    write_json(BufWriter::new(File::create(path)?), report, query)?;
    info!(path = %path.display(), groups = report.groups().len(), "JSON export saved");
    Ok(())
}

/// Which exports to write and where.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub dir: PathBuf,
    pub csv: bool,
    pub json: bool,
}

impl ExportOptions {
    /// Writes the requested files as `<dir>/<stem>.csv` and
    /// `<dir>/<stem>.json`, creating `dir` if needed. Returns the paths
    /// written.
    pub fn save(&self, stem: &str, report: &Report, query: &str) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();
        if !self.csv && !self.json {
            return Ok(saved);
        }
        fs::create_dir_all(&self.dir)?;

        if self.csv {
            let path = self.dir.join(format!("{stem}.csv"));
            save_csv(&path, report)?;
            saved.push(path);
        }
        if self.json {
            let path = self.dir.join(format!("{stem}.json"));
            save_json(&path, report, query)?;
            saved.push(path);
        }
        Ok(saved)
    }
}

/// File stem for an organization history export, e.g.
/// `tulsa_indep_school_district_1_erate_history`.
pub fn history_file_stem(organization: &str) -> String {
    let cleaned: String = organization
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    format!(
        "{}_erate_history",
        cleaned.trim_end().replace(' ', "_").to_lowercase()
    )
}

/// File stem for a state/year export, e.g. `ok_erate_filtered_2024`.
pub fn state_year_file_stem(state: &str, year: i32) -> String {
    format!("{}_erate_filtered_{year}", state.to_lowercase())
}
