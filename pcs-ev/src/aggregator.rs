//! Response aggregation
//!
//! Folds response bundles into per-field counters and an
//! `axis → method → attribute` cross-tab. Percentages are derived once in
//! [`Aggregator::finish`], never kept as running values.

use crate::catalog::FieldCatalog;
use crate::error::{EvalError, Result};
use crate::evaluator::evaluate;
use pcs_common::json_io::read_json;
use pcs_common::{Field, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Running success/total pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub success: u64,
    pub total: u64,
}

impl Counter {
    pub fn record(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.success += 1;
        }
    }

    /// `100 * success / total`, or `None` for an empty counter
    pub fn pct(&self) -> Option<f64> {
        (self.total > 0).then(|| 100.0 * self.success as f64 / self.total as f64)
    }

    pub fn stats(&self) -> CellStats {
        CellStats {
            success: self.success,
            total: self.total,
            pct: self.pct(),
        }
    }
}

/// Final counters of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStats {
    pub success: u64,
    pub total: u64,
    pub pct: Option<f64>,
}

/// Final counters of one field, with its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub label: String,
    pub axis: String,
    pub method: String,
    pub attribute: String,
    pub dataset: String,
    #[serde(flatten)]
    pub stats: CellStats,
}

/// `axis → method → attribute → stats`
pub type MetricsTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, CellStats>>>;

/// Aggregated metrics file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub fields: BTreeMap<String, FieldStats>,
    pub table: MetricsTable,
}

/// Counts from one aggregation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files: usize,
    pub folded: usize,
    pub skipped: usize,
}

/// Decode a response bundle: `{"responses": [...]}` or a bare array
///
/// Every object entry is a response; anything else is logged and dropped.
pub fn read_bundle(path: &Path) -> Result<Vec<Response>> {
    let payload: Value = read_json(path)?;
    let entries = match payload {
        Value::Object(mut object) => match object.remove("responses") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(EvalError::MalformedBundle(path.to_path_buf())),
        },
        Value::Array(entries) => entries,
        _ => return Err(EvalError::MalformedBundle(path.to_path_buf())),
    };

    let mut responses = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Response>(entry) {
            Ok(response) => responses.push(response),
            Err(e) => warn!(
                "[skip] Entry {} of {} is not a response: {}",
                position,
                path.display(),
                e
            ),
        }
    }
    Ok(responses)
}

/// Every `*.json` file directly inside `dir`, sorted by name
pub fn response_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(pcs_common::Error::NotFound(dir.display().to_string()).into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                let is_json = entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false);
                if entry.file_type().is_file() && is_json {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!("Error accessing entry: {}", e),
        }
    }
    Ok(files)
}

/// Streaming fold of responses against a field catalog
pub struct Aggregator<'a> {
    catalog: &'a FieldCatalog,
    reference_method: String,
    fields: BTreeMap<String, Counter>,
    cells: BTreeMap<(String, String, String), Counter>,
    stats: RunStats,
}

impl<'a> Aggregator<'a> {
    /// Every catalog field starts at 0/0 so it appears in the report
    pub fn new(catalog: &'a FieldCatalog, reference_method: impl Into<String>) -> Self {
        Self {
            catalog,
            reference_method: reference_method.into(),
            fields: catalog
                .fields()
                .iter()
                .map(|f| (f.id.clone(), Counter::default()))
                .collect(),
            cells: BTreeMap::new(),
            stats: RunStats::default(),
        }
    }

    /// Field a response belongs to
    ///
    /// An explicit id wins; without one, the unique field matching the
    /// response's dataset, axis, method, and attribute is used. Dataset and
    /// axis narrow the match only when the response carries them.
    pub fn resolve_field(&self, response: &Response) -> Option<&'a Field> {
        if let Some(id) = response.declared_field_id() {
            return self.catalog.get(id);
        }
        let method = response.declared_method()?;
        let attribute = response.declared_attribute()?;
        self.catalog
            .find_unique(
                response.dataset.as_deref(),
                response.declared_axis(),
                method,
                attribute,
            )
    }

    /// Fold one response; returns its outcome, or `None` if skipped
    pub fn fold(&mut self, response: &Response) -> Option<bool> {
        let Some(field) = self.resolve_field(response) else {
            debug!(
                field_id = response.declared_field_id().unwrap_or("-"),
                "[skip] Response does not resolve to a known field"
            );
            self.stats.skipped += 1;
            return None;
        };

        let dataset = response
            .dataset
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(field.dataset.as_str());
        let success = evaluate(response, dataset, &self.reference_method);

        self.fields.entry(field.id.clone()).or_default().record(success);
        self.cells
            .entry((
                field.axis.clone(),
                field.method.clone(),
                field.attribute.clone(),
            ))
            .or_default()
            .record(success);
        self.stats.folded += 1;
        Some(success)
    }

    pub fn fold_file(&mut self, path: &Path) -> Result<()> {
        let responses = read_bundle(path)?;
        debug!(file = %path.display(), count = responses.len(), "Folding responses");
        for response in &responses {
            self.fold(response);
        }
        self.stats.files += 1;
        Ok(())
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Derive percentages and build the report
    pub fn finish(self) -> MetricsReport {
        let mut fields = BTreeMap::new();
        for field in self.catalog.fields() {
            let counter = self.fields.get(&field.id).copied().unwrap_or_default();
            fields.insert(
                field.id.clone(),
                FieldStats {
                    label: field.label.clone(),
                    axis: field.axis.clone(),
                    method: field.method.clone(),
                    attribute: field.attribute.clone(),
                    dataset: field.dataset.clone(),
                    stats: counter.stats(),
                },
            );
        }

        let mut table = MetricsTable::new();
        for ((axis, method, attribute), counter) in self.cells {
            table
                .entry(axis)
                .or_default()
                .entry(method)
                .or_default()
                .insert(attribute, counter.stats());
        }

        MetricsReport { fields, table }
    }
}

/// Aggregate every response file in a directory
pub fn aggregate(
    responses_dir: &Path,
    catalog: &FieldCatalog,
    reference_method: &str,
) -> Result<MetricsReport> {
    let files = response_files(responses_dir)?;
    let mut aggregator = Aggregator::new(catalog, reference_method);
    for file in &files {
        aggregator.fold_file(file)?;
    }

    let stats = aggregator.stats();
    info!(
        files = stats.files,
        folded = stats.folded,
        skipped = stats.skipped,
        "Aggregated responses"
    );
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> FieldCatalog {
        let fields = serde_json::from_value(json!([
            {"id": "pp_cosmos", "label": "PP vs Cosmos", "axis": "Physical realism",
             "method": "cosmos2B", "attribute": "friction", "dataset": "physical_plausibility"},
            {"id": "fd_ours", "label": "Force dir", "axis": "Force adherence",
             "method": "physpropprior", "attribute": "force", "dataset": "force_direction"},
            {"id": "unused", "label": "Unused", "axis": "Control fidelity",
             "method": "physpropprior", "attribute": "friction", "dataset": "control_fidelity"}
        ]))
        .unwrap();
        FieldCatalog::new(fields).unwrap()
    }

    fn response(value: Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_counter_pct() {
        let mut counter = Counter::default();
        assert_eq!(counter.pct(), None);
        counter.record(true);
        counter.record(false);
        counter.record(true);
        assert_eq!(counter.success, 2);
        assert_eq!(counter.total, 3);
        assert!((counter.pct().unwrap() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_paths() {
        let catalog = catalog();
        let aggregator = Aggregator::new(&catalog, "physpropprior");

        let by_id = response(json!({"fieldId": "fd_ours"}));
        assert_eq!(aggregator.resolve_field(&by_id).unwrap().id, "fd_ours");

        let by_field = response(json!({"field": {"id": "pp_cosmos"}}));
        assert_eq!(aggregator.resolve_field(&by_field).unwrap().id, "pp_cosmos");

        let by_meta = response(json!({"meta": {"fieldId": "fd_ours"}}));
        assert_eq!(aggregator.resolve_field(&by_meta).unwrap().id, "fd_ours");

        let by_match = response(json!({
            "dataset": "force_direction",
            "meta": {"method": "physpropprior", "attribute": "force"}
        }));
        assert_eq!(aggregator.resolve_field(&by_match).unwrap().id, "fd_ours");

        let unknown = response(json!({"fieldId": "ghost"}));
        assert!(aggregator.resolve_field(&unknown).is_none());
    }

    #[test]
    fn test_axis_picks_between_fields_sharing_method_and_attribute() {
        let fields = serde_json::from_value(json!([
            {"id": "cf", "label": "CF", "axis": "Control fidelity",
             "method": "physpropprior", "attribute": "friction", "dataset": "control_fidelity"},
            {"id": "pp", "label": "PP", "axis": "Physical realism",
             "method": "physpropprior", "attribute": "friction", "dataset": "physical_plausibility"}
        ]))
        .unwrap();
        let catalog = FieldCatalog::new(fields).unwrap();
        let mut aggregator = Aggregator::new(&catalog, "physpropprior");

        let answer = response(json!({
            "choice": "A",
            "field": {"axis": "Control fidelity", "method": "physpropprior", "attribute": "friction"},
            "targetLevel": "high",
            "videoA": {"level": "high"}, "videoB": {"level": "low"}
        }));
        assert_eq!(aggregator.resolve_field(&answer).unwrap().id, "cf");
        assert_eq!(aggregator.fold(&answer), Some(true));

        let no_axis = response(json!({
            "choice": "A",
            "field": {"method": "physpropprior", "attribute": "friction"}
        }));
        assert!(aggregator.resolve_field(&no_axis).is_none());

        let report = aggregator.finish();
        assert_eq!(report.fields["cf"].stats.total, 1);
        assert_eq!(report.fields["pp"].stats.total, 0);
    }

    #[test]
    fn test_wrongly_typed_entries_still_count() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("p1.json");
        fs::write(
            &bundle,
            r#"[
                {"fieldId": "fd_ours", "choice": "A", "videoA": {"role": "target"}},
                {"fieldId": "fd_ours", "choice": 1, "videoA": {"role": "target"}},
                {"fieldId": "fd_ours", "field": "fd_ours", "choice": ["B"]}
            ]"#,
        )
        .unwrap();

        let catalog = catalog();
        let report = aggregate(dir.path(), &catalog, "physpropprior").unwrap();
        let stats = &report.fields["fd_ours"].stats;
        assert_eq!((stats.success, stats.total), (1, 3));
    }

    #[test]
    fn test_fold_counts_and_skips() {
        let catalog = catalog();
        let mut aggregator = Aggregator::new(&catalog, "physpropprior");

        let right = response(json!({
            "fieldId": "pp_cosmos", "choice": "A",
            "optionA": {"method": "physpropprior"}, "optionB": {"method": "cosmos2B"}
        }));
        let wrong = response(json!({
            "fieldId": "pp_cosmos", "choice": "B",
            "optionA": {"method": "physpropprior"}, "optionB": {"method": "cosmos2B"}
        }));
        let unanswered = response(json!({"fieldId": "pp_cosmos"}));
        let stray = response(json!({"fieldId": "ghost", "choice": "A"}));

        assert_eq!(aggregator.fold(&right), Some(true));
        assert_eq!(aggregator.fold(&wrong), Some(false));
        assert_eq!(aggregator.fold(&unanswered), Some(false));
        assert_eq!(aggregator.fold(&stray), None);

        let stats = aggregator.stats();
        assert_eq!(stats.folded, 3);
        assert_eq!(stats.skipped, 1);

        let report = aggregator.finish();
        let field = &report.fields["pp_cosmos"];
        assert_eq!((field.stats.success, field.stats.total), (1, 3));
        assert_eq!(field.dataset, "physical_plausibility");

        let unused = &report.fields["unused"];
        assert_eq!(unused.stats.total, 0);
        assert_eq!(unused.stats.pct, None);

        let cell = &report.table["Physical realism"]["cosmos2B"]["friction"];
        assert_eq!((cell.success, cell.total), (1, 3));
        assert!(!report.table.contains_key("Control fidelity"));
    }

    #[test]
    fn test_invariants_hold_for_every_counter() {
        let catalog = catalog();
        let mut aggregator = Aggregator::new(&catalog, "physpropprior");
        for (i, choice) in ["A", "B", "A", "x", "B"].iter().enumerate() {
            let role = if i % 2 == 0 { "target" } else { "distractor" };
            aggregator.fold(&response(json!({
                "fieldId": "fd_ours", "choice": choice,
                "videoA": {"role": role}, "videoB": {"role": "distractor"}
            })));
        }
        let report = aggregator.finish();

        let cells = report
            .table
            .values()
            .flat_map(|m| m.values())
            .flat_map(|a| a.values())
            .chain(report.fields.values().map(|f| &f.stats));
        for stats in cells {
            assert!(stats.success <= stats.total);
            match stats.pct {
                None => assert_eq!(stats.total, 0),
                Some(pct) => {
                    let expected = 100.0 * stats.success as f64 / stats.total as f64;
                    assert!((pct - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_bundle_shapes() {
        let dir = TempDir::new().unwrap();
        let object = dir.path().join("a.json");
        let array = dir.path().join("b.json");
        let scalar = dir.path().join("c.json");
        let wrong_key = dir.path().join("d.json");
        fs::write(&object, r#"{"responses": [{"choice": "A"}, 5]}"#).unwrap();
        fs::write(&array, r#"[{"choice": "B"}]"#).unwrap();
        fs::write(&scalar, "42").unwrap();
        fs::write(&wrong_key, r#"{"answers": []}"#).unwrap();

        assert_eq!(read_bundle(&object).unwrap().len(), 1);
        assert_eq!(read_bundle(&array).unwrap().len(), 1);
        assert!(matches!(read_bundle(&scalar), Err(EvalError::MalformedBundle(_))));
        assert!(matches!(read_bundle(&wrong_key), Err(EvalError::MalformedBundle(_))));
    }

    #[test]
    fn test_aggregate_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("response_p1.json"),
            json!({"responses": [
                {"fieldId": "fd_ours", "choice": "A", "videoA": {"role": "target"}},
                {"fieldId": "fd_ours", "choice": "B", "videoB": {"role": "distractor"}}
            ]})
            .to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = aggregate(dir.path(), &catalog(), "physpropprior").unwrap();
        let stats = &report.fields["fd_ours"].stats;
        assert_eq!((stats.success, stats.total), (1, 2));
        assert_eq!(stats.pct, Some(50.0));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fields"]["fd_ours"]["pct"], json!(50.0));
        assert!(json["fields"]["unused"]["pct"].is_null());
    }
}
