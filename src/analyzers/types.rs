//! Data types produced by the aggregation pipeline.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{ErateError, Result};
use crate::record::LineItem;

/// Default line-item cutoff for both tools.
pub const DEFAULT_LINE_ITEM_THRESHOLD: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);
/// Default group cutoff for the state/year tool.
pub const DEFAULT_STATE_GROUP_THRESHOLD: Decimal = Decimal::from_parts(250_000, 0, 0, false, 0);

/// Identity of an aggregation group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub organization: String,
    pub funding_year: Option<i32>,
}

/// How line items are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One group per organization name.
    Organization,
    /// One group per organization name and funding year.
    OrganizationYear,
}

impl Grouping {
    pub fn key_for(&self, item: &LineItem) -> GroupKey {
        GroupKey {
            organization: item.organization.clone(),
            funding_year: match self {
                Grouping::Organization => None,
                Grouping::OrganizationYear => item.funding_year,
            },
        }
    }
}

/// Display cutoffs. Both are inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub group: Decimal,
    pub line_item: Decimal,
}

impl Thresholds {
    pub fn new(group: Decimal, line_item: Decimal) -> Result<Self> {
        for (name, value) in [("group", group), ("line-item", line_item)] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ErateError::invalid(format!(
                    "{name} threshold must be non-negative, got {value}"
                )));
            }
        }
        Ok(Self { group, line_item })
    }

    pub fn shows_group(&self, group: &Group) -> bool {
        group.total >= self.group
    }

    pub fn shows_item(&self, item: &LineItem) -> bool {
        item.cost >= self.line_item
    }
}

/// Spending with one vendor inside a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub total: Decimal,
    pub items: usize,
}

/// Line items sharing a [`GroupKey`].
///
/// Built only through aggregation: the total is computed once from every
/// constituent item and the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: GroupKey,
    total: Decimal,
    vendors: Vec<VendorTotal>,
    items: Vec<LineItem>,
}

/// Sums amounts, failing instead of panicking when the result leaves the
/// `Decimal` range.
fn checked_total(
    amounts: impl IntoIterator<Item = Decimal>,
    context: impl FnOnce() -> String,
) -> Result<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| ErateError::AmountOverflow { context: context() })
}

impl Group {
    pub(crate) fn from_items(key: GroupKey, mut items: Vec<LineItem>) -> Result<Self> {
        let context = || format!("organization '{}'", key.organization);
        let total = checked_total(items.iter().map(|item| item.cost), context)?;
        items.sort_by(|a, b| b.cost.cmp(&a.cost));
        let vendors = merge_vendor_totals(
            items.iter().map(|item| VendorTotal {
                vendor: item.vendor.clone(),
                total: item.cost,
                items: 1,
            }),
            context,
        )?;
        Ok(Self {
            key,
            total,
            vendors,
            items,
        })
    }

    pub fn organization(&self) -> &str {
        &self.key.organization
    }

    pub fn funding_year(&self) -> Option<i32> {
        self.key.funding_year
    }

    /// Sum of every item cost, regardless of thresholds.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Items by cost, highest first.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Vendor subtotals, highest first.
    pub fn vendors(&self) -> &[VendorTotal] {
        &self.vendors
    }

    /// State of the first item; groups are keyed by name so this is the
    /// state the API reported for that organization.
    pub fn state(&self) -> &str {
        self.items.first().map_or("", |item| item.state.as_str())
    }
}

/// Folds per-vendor partial totals by vendor name, keeping first-seen order
/// before a stable sort by total, highest first.
fn merge_vendor_totals(
    parts: impl IntoIterator<Item = VendorTotal>,
    context: impl Fn() -> String,
) -> Result<Vec<VendorTotal>> {
    let mut totals: Vec<VendorTotal> = Vec::new();
    for part in parts {
        match totals.iter_mut().find(|v| v.vendor == part.vendor) {
            Some(entry) => {
                entry.total = checked_total([entry.total, part.total], &context)?;
                entry.items += part.items;
            }
            None => totals.push(part),
        }
    }
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(totals)
}

/// A group together with the items that pass the line-item threshold.
#[derive(Debug)]
pub struct GroupView<'a> {
    pub group: &'a Group,
    pub items: Vec<&'a LineItem>,
}

impl GroupView<'_> {
    pub fn hidden_items(&self) -> usize {
        self.group.items().len() - self.items.len()
    }
}

/// Aggregated result of one query run.
#[derive(Debug, Clone)]
pub struct Report {
    groups: Vec<Group>,
    vendors: Vec<VendorTotal>,
    thresholds: Thresholds,
    fetched_records: usize,
    record_count: usize,
    total: Decimal,
}

impl Report {
    /// `groups` must already be in report order; see
    /// [`aggregate`](crate::analyzers::aggregate::aggregate).
    pub fn new(groups: Vec<Group>, thresholds: Thresholds, fetched_records: usize) -> Result<Self> {
        let record_count = groups.iter().map(|g| g.items().len()).sum();
        let total = checked_total(groups.iter().map(Group::total), || "the report".to_string())?;
        let vendors = merge_vendor_totals(
            groups.iter().flat_map(|g| g.vendors().iter().cloned()),
            || "the vendor breakdown".to_string(),
        )?;
        Ok(Self {
            groups,
            vendors,
            thresholds,
            fetched_records,
            record_count,
            total,
        })
    }

    /// Spending per vendor across every group, highest first. Vendors with
    /// equal totals keep the order in which they first appear in the report.
    pub fn vendors(&self) -> &[VendorTotal] {
        &self.vendors
    }

    /// Every group, displayed or not.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Raw records returned by the API, before the vendor filter.
    pub fn fetched_records(&self) -> usize {
        self.fetched_records
    }

    /// Line items that were aggregated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Grand total across every group.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups at or above the group threshold, each with its items at or
    /// above the line-item threshold. Order follows [`Report::groups`].
    pub fn displayed(&self) -> impl Iterator<Item = GroupView<'_>> + '_ {
        self.groups
            .iter()
            .filter(|group| self.thresholds.shows_group(group))
            .map(|group| GroupView {
                group,
                items: group
                    .items()
                    .iter()
                    .filter(|item| self.thresholds.shows_item(item))
                    .collect(),
            })
    }

    /// Distinct organization names across all groups.
    pub fn organization_count(&self) -> usize {
        let mut names: Vec<&str> = self.groups.iter().map(Group::organization).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}
