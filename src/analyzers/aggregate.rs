use std::collections::HashMap;

use crate::analyzers::types::{Group, GroupKey, Grouping};
use crate::error::Result;
use crate::record::LineItem;

/// Buckets line items into [`Group`]s and orders them by total, highest first.
///
/// Keys compare by exact organization string. Groups with equal totals keep
/// the order in which their first item was seen.
///
/// Fails only when a group total does not fit in a `Decimal`.
pub fn aggregate(items: Vec<LineItem>, grouping: Grouping) -> Result<Vec<Group>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut buckets: Vec<(GroupKey, Vec<LineItem>)> = Vec::new();

    for item in items {
        let key = grouping.key_for(&item);
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(item),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![item]));
            }
        }
    }

    let mut groups: Vec<Group> = buckets
        .into_iter()
        .map(|(key, items)| Group::from_items(key, items))
        .collect::<Result<_>>()?;
    groups.sort_by(|a, b| b.total().cmp(&a.total()));
    Ok(groups)
}
