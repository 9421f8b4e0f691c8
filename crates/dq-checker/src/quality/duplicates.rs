//! Full-row and key duplicate detection.
//!
//! Rows are grouped by hashing their values, so detection is linear in the
//! number of rows and groups are equivalence classes: membership is
//! symmetric and transitive by construction.
//!
//! Unlike SQL, a missing value equals every other missing value here. Null,
//! NaN and blank strings all compare equal, and strings compare after
//! trimming.

use super::CheckContext;
use crate::dataset::ValueKey;
use crate::types::{Finding, FindingKind};
use std::collections::HashMap;
use std::hash::Hash;

/// One `duplicate_row` finding per group of identical rows, listing every
/// member but the first occurrence.
pub(crate) fn duplicate_rows(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let columns = &ctx.schema.columns;
    let groups = group_rows(ctx.dataset.len(), |idx| {
        let row = &ctx.dataset.rows()[idx];
        Some(
            columns
                .iter()
                .map(|c| ctx.key(row.get(&c.name)))
                .collect::<Vec<Option<ValueKey>>>(),
        )
    });

    groups
        .into_iter()
        .map(|members| {
            let first = members[0];
            let repeats = members[1..].to_vec();
            let detail = format!(
                "{} row(s) identical to row {} across all {} columns",
                repeats.len(),
                first,
                columns.len()
            );
            Finding::new(FindingKind::DuplicateRow, None, repeats, detail)
        })
        .collect()
}

/// One `duplicate_key` finding per key value shared by several rows.
///
/// Rows with any missing key component form a single "missing key" group;
/// when it has more than one member it yields a `duplicate_key` finding and
/// a key-level `missing_value` finding over the same rows.
pub(crate) fn duplicate_keys(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let key = ctx.schema.key();
    if key.is_empty() {
        return Vec::new();
    }

    let names = key
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    // a composite key has no single column to attach to
    let column = match key.as_slice() {
        [single] => Some(single.name.as_str()),
        _ => None,
    };

    let mut missing_key_rows = Vec::new();
    let groups = group_rows(ctx.dataset.len(), |idx| {
        let row = &ctx.dataset.rows()[idx];
        let parts: Option<Vec<ValueKey>> = key.iter().map(|c| ctx.key(row.get(&c.name))).collect();
        if parts.is_none() {
            missing_key_rows.push(idx);
        }
        parts
    });

    let mut findings: Vec<Finding> = groups
        .into_iter()
        .map(|members| {
            let first = &ctx.dataset.rows()[members[0]];
            let value = key
                .iter()
                .map(|c| first.get(&c.name).to_string().trim().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let detail = format!(
                "key ({}) value ({}) is shared by {} rows",
                names,
                value,
                members.len()
            );
            Finding::new(FindingKind::DuplicateKey, column, members, detail)
        })
        .collect();

    if missing_key_rows.len() > 1 {
        findings.push(Finding::new(
            FindingKind::DuplicateKey,
            column,
            missing_key_rows.clone(),
            format!(
                "{} rows share a missing key ({})",
                missing_key_rows.len(),
                names
            ),
        ));
        findings.push(Finding::new(
            FindingKind::MissingValue,
            None,
            missing_key_rows.clone(),
            format!(
                "key ({}) is missing in {} rows",
                names,
                missing_key_rows.len()
            ),
        ));
    }

    findings
}

/// Groups of more than one row sharing the same key, ordered by first member.
/// Rows for which `key_of` returns `None` are left out.
fn group_rows<K, F>(len: usize, mut key_of: F) -> Vec<Vec<usize>>
where
    K: Hash + Eq,
    F: FnMut(usize) -> Option<K>,
{
    let mut groups: HashMap<K, Vec<usize>> = HashMap::new();
    for idx in 0..len {
        if let Some(key) = key_of(idx) {
            groups.entry(key).or_default().push(idx);
        }
    }

    let mut duplicated: Vec<Vec<usize>> = groups
        .into_values()
        .filter(|members| members.len() > 1)
        .collect();
    duplicated.sort_by_key(|members| members[0]);
    duplicated
}
