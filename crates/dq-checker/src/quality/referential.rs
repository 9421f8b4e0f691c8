//! Foreign-key checks against reference datasets.

use super::CheckContext;
use crate::dataset::{Dataset, References, ValueKey};
use crate::error::ReferenceError;
use crate::schema::{ForeignKey, ForeignKeys};
use crate::types::{Finding, FindingKind};
use std::collections::HashSet;
use tracing::debug;

/// A foreign key with its reference dataset looked up.
pub(crate) struct Link<'a> {
    pub column: &'a str,
    pub target: &'a ForeignKey,
    pub dataset: &'a Dataset,
}

/// Look up the reference dataset of every foreign key, in column order.
pub(crate) fn resolve<'a>(
    foreign_keys: &'a ForeignKeys,
    references: &References<'a>,
) -> Result<Vec<Link<'a>>, ReferenceError> {
    foreign_keys
        .iter()
        .map(|(column, target)| match references.get(&target.reference_dataset) {
            Some(dataset) => Ok(Link {
                column,
                target,
                dataset,
            }),
            None => Err(ReferenceError::MissingDataset {
                column: column.to_string(),
                dataset: target.reference_dataset.clone(),
            }),
        })
        .collect()
}

/// One `referential_violation` finding per foreign key whose non-missing
/// values are not all present in the referenced column.
pub(crate) fn referential_violations(ctx: &CheckContext<'_>, links: &[Link<'_>]) -> Vec<Finding> {
    links
        .iter()
        .filter_map(|link| unmatched(ctx, link))
        .collect()
}

fn unmatched(ctx: &CheckContext<'_>, link: &Link<'_>) -> Option<Finding> {
    let reference_column = link.target.reference_column.as_str();
    let index: HashSet<ValueKey> = link
        .dataset
        .rows()
        .iter()
        .map(|row| row.get(reference_column))
        .filter(|value| !ctx.is_missing(value))
        .filter_map(|value| value.join_key())
        .collect();
    debug!(
        "Indexed {} distinct values of {}.{}",
        index.len(),
        link.dataset.name(),
        reference_column
    );

    let rows: Vec<usize> = ctx
        .dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let value = row.get(link.column);
            !ctx.is_missing(value) && value.join_key().is_none_or(|key| !index.contains(&key))
        })
        .map(|(idx, _)| idx)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let detail = format!(
        "{} values in '{}' have no match in {}.{} (e.g. {})",
        rows.len(),
        link.column,
        link.dataset.name(),
        reference_column,
        ctx.examples(link.column, &rows)
    );
    Some(Finding::new(
        FindingKind::ReferentialViolation,
        Some(link.column),
        rows,
        detail,
    ))
}
