//! Domain rules: allowed value sets, future dates, and date ordering.

use super::CheckContext;
use super::coercion::{coerce_date, coerce_datetime};
use crate::schema::{ColumnSpec, DateOrder};
use crate::types::{Finding, FindingKind};
use std::collections::HashSet;

pub(crate) fn domain_violations(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for spec in &ctx.schema.columns {
        if let Some(allowed) = &spec.allowed_values {
            findings.extend(outside_allowed(ctx, spec, allowed));
        }
        if spec.not_in_future {
            findings.extend(future_dates(ctx, spec));
        }
    }
    for order in &ctx.schema.date_orders {
        findings.extend(out_of_order(ctx, order));
    }

    findings
}

fn outside_allowed(ctx: &CheckContext<'_>, spec: &ColumnSpec, allowed: &[String]) -> Option<Finding> {
    let allowed: HashSet<&str> = allowed.iter().map(|v| v.trim()).collect();
    let rows: Vec<usize> = ctx
        .dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let value = row.get(&spec.name);
            !ctx.is_missing(value) && !allowed.contains(value.to_string().trim())
        })
        .map(|(idx, _)| idx)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let detail = format!(
        "{} values in '{}' are outside the allowed set of {} (e.g. {})",
        rows.len(),
        spec.name,
        allowed.len(),
        ctx.examples(&spec.name, &rows)
    );
    Some(Finding::new(
        FindingKind::DomainViolation,
        Some(spec.name.as_str()),
        rows,
        detail,
    ))
}

fn future_dates(ctx: &CheckContext<'_>, spec: &ColumnSpec) -> Option<Finding> {
    let now = ctx.generated_at.naive_utc();
    let rows: Vec<usize> = ctx
        .dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let value = row.get(&spec.name);
            !ctx.is_missing(value) && coerce_datetime(value).is_some_and(|dt| dt > now)
        })
        .map(|(idx, _)| idx)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let detail = format!(
        "{} values in '{}' are later than {} (e.g. {})",
        rows.len(),
        spec.name,
        ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ctx.examples(&spec.name, &rows)
    );
    Some(Finding::new(
        FindingKind::DomainViolation,
        Some(spec.name.as_str()),
        rows,
        detail,
    ))
}

/// Compared by calendar date; rows where either side is missing or unreadable are skipped.
fn out_of_order(ctx: &CheckContext<'_>, order: &DateOrder) -> Option<Finding> {
    let rows: Vec<usize> = ctx
        .dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let earlier = row.get(&order.earlier);
            let later = row.get(&order.later);
            if ctx.is_missing(earlier) || ctx.is_missing(later) {
                return false;
            }
            matches!(
                (coerce_date(earlier), coerce_date(later)),
                (Some(e), Some(l)) if l < e
            )
        })
        .map(|(idx, _)| idx)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let detail = format!(
        "'{}' falls before '{}' in {} rows",
        order.later,
        order.earlier,
        rows.len()
    );
    Some(Finding::new(
        FindingKind::DomainViolation,
        Some(order.later.as_str()),
        rows,
        detail,
    ))
}
