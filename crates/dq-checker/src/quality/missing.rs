use super::CheckContext;
use crate::types::{Finding, FindingKind};

/// One `missing_value` finding per schema column with at least one missing value.
pub(crate) fn missing_values(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let total = ctx.dataset.len();
    let mut findings = Vec::new();

    for spec in &ctx.schema.columns {
        if spec.nullable && !ctx.config.flag_missing_in_nullable {
            continue;
        }
        let rows = ctx.missing_rows(&spec.name);
        if rows.is_empty() {
            continue;
        }

        let nullability = if spec.nullable {
            "nullable"
        } else {
            "non-nullable"
        };
        let detail = if rows.len() == total {
            format!(
                "all {} values missing in {} column '{}'",
                total, nullability, spec.name
            )
        } else {
            format!(
                "{} of {} values missing in {} column '{}'",
                rows.len(),
                total,
                nullability,
                spec.name
            )
        };
        findings.push(Finding::new(
            FindingKind::MissingValue,
            Some(spec.name.as_str()),
            rows,
            detail,
        ));
    }

    findings
}
