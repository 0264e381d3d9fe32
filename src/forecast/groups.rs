//! Group partitioning.
//!
//! A group (all records sharing one troop + cookie type pair) is the unit
//! of independent model fitting everywhere in this crate. Partitioning is a
//! pure reduction into a `BTreeMap` so iteration order is deterministic.

use std::collections::BTreeMap;

use crate::domain::{GroupKey, SalesRecord};

/// Partition records by (troop, cookie type).
pub fn partition_by_group<'a, I>(records: I) -> BTreeMap<GroupKey, Vec<&'a SalesRecord>>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut groups: BTreeMap<GroupKey, Vec<&SalesRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.group_key()).or_default().push(record);
    }
    groups
}

/// Partition records by cookie type only (used within a single troop's history).
pub fn partition_by_cookie_type<'a, I>(records: I) -> BTreeMap<String, Vec<&'a SalesRecord>>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut groups: BTreeMap<String, Vec<&SalesRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.cookie_type.clone())
            .or_default()
            .push(record);
    }
    groups
}
