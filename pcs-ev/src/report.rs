//! Human-readable metrics summary

use crate::aggregator::{CellStats, MetricsReport};
use pcs_common::labels::Labels;

/// CLI output formatter for metrics
pub struct SummaryFormatter;

impl SummaryFormatter {
    /// `66.7% (2/3)`, or `n/a` for an empty cell
    pub fn format_cell(stats: &CellStats) -> String {
        match stats.pct {
            Some(pct) => format!("{:.1}% ({}/{})", pct, stats.success, stats.total),
            None => "n/a".to_string(),
        }
    }

    /// One line per field
    ///
    /// Example: `fd_ours: 50.0% (1/2) - Force direction`
    pub fn format_fields(report: &MetricsReport) -> String {
        let mut output = String::from("\n=== Field-level Metrics ===\n");
        for (id, field) in &report.fields {
            let pct = match field.stats.pct {
                Some(pct) => format!("{:.1}%", pct),
                None => "n/a".to_string(),
            };
            output.push_str(&format!(
                "{}: {} ({}/{}) - {}\n",
                id, pct, field.stats.success, field.stats.total, field.label
            ));
        }
        output
    }

    /// Axis blocks with one line per method, using summary aliases
    pub fn format_table(report: &MetricsReport, labels: &Labels) -> String {
        let mut output = String::from("\n=== Table View ===\n");
        for (axis, methods) in &report.table {
            output.push_str(&format!("\n{}:\n", axis.to_uppercase()));
            for (method, attributes) in methods {
                let cells: Vec<String> = attributes
                    .iter()
                    .map(|(attribute, stats)| {
                        format!("{}: {}", attribute, Self::format_cell(stats))
                    })
                    .collect();
                output.push_str(&format!(
                    "  {} -> {}\n",
                    labels.alias(method),
                    cells.join(", ")
                ));
            }
        }
        output
    }

    pub fn format_summary(report: &MetricsReport, labels: &Labels) -> String {
        let mut output = Self::format_fields(report);
        output.push_str(&Self::format_table(report, labels));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{FieldStats, MetricsTable};
    use std::collections::BTreeMap;

    fn report() -> MetricsReport {
        let stats = CellStats {
            success: 2,
            total: 3,
            pct: Some(200.0 / 3.0),
        };
        let empty = CellStats {
            success: 0,
            total: 0,
            pct: None,
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "pp_friction".to_string(),
            FieldStats {
                label: "Friction realism".to_string(),
                axis: "Physical realism".to_string(),
                method: "physpropprior".to_string(),
                attribute: "friction".to_string(),
                dataset: "physical_plausibility".to_string(),
                stats: stats.clone(),
            },
        );
        fields.insert(
            "pp_bounce".to_string(),
            FieldStats {
                label: "Bounce realism".to_string(),
                axis: "Physical realism".to_string(),
                method: "cosmos2B".to_string(),
                attribute: "restitution".to_string(),
                dataset: "physical_plausibility".to_string(),
                stats: empty.clone(),
            },
        );

        let mut table = MetricsTable::new();
        let axis = table.entry("Physical realism".to_string()).or_default();
        axis.entry("physpropprior".to_string())
            .or_default()
            .insert("friction".to_string(), stats);
        axis.entry("cosmos2B".to_string())
            .or_default()
            .insert("restitution".to_string(), empty);

        MetricsReport { fields, table }
    }

    #[test]
    fn test_format_fields() {
        let formatted = SummaryFormatter::format_fields(&report());
        assert!(formatted.contains("pp_friction: 66.7% (2/3) - Friction realism"));
        assert!(formatted.contains("pp_bounce: n/a (0/0) - Bounce realism"));
    }

    #[test]
    fn test_format_table_uses_aliases() {
        let formatted = SummaryFormatter::format_table(&report(), &Labels::default());
        assert!(formatted.contains("PHYSICAL REALISM:"));
        assert!(formatted.contains("  Ours (ControlNet) -> friction: 66.7% (2/3)"));
        assert!(formatted.contains("  Base Model (zero-shot) -> restitution: n/a"));
    }
}
