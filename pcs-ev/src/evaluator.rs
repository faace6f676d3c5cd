//! Response evaluator
//!
//! Pure per-dataset correctness rules:
//!
//! | dataset | success when |
//! |---|---|
//! | control_fidelity | chosen video's `level` equals `targetLevel` |
//! | force_direction | chosen video's `role` is `target` |
//! | physical_plausibility, force_baseline | chosen option's `method` is the reference method |
//! | anything else | never |
//!
//! A missing or unrecognized choice is a failure.

use pcs_common::{Dataset, Response};
use serde_json::Value;

fn slot_str<'a>(slot: Option<&'a Value>, key: &str) -> Option<&'a str> {
    slot.and_then(|s| s.get(key)).and_then(Value::as_str)
}

/// Whether a response picked the correct option
pub fn evaluate(response: &Response, dataset: &str, reference_method: &str) -> bool {
    if response.choice().is_none() {
        return false;
    }

    match Dataset::parse(dataset) {
        Some(Dataset::ControlFidelity) => {
            let target = response
                .target_level
                .as_deref()
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();
            let chosen = slot_str(response.selected("video"), "level")
                .map(|l| l.trim().to_ascii_lowercase())
                .unwrap_or_default();
            !target.is_empty() && chosen == target
        }
        Some(Dataset::ForceDirection) => {
            slot_str(response.selected("video"), "role") == Some("target")
        }
        Some(Dataset::PhysicalPlausibility) | Some(Dataset::ForceBaseline) => {
            // bundle questions carry optionA/B, clip questions videoA/B
            let chosen = response
                .selected("option")
                .or_else(|| response.selected("video"));
            slot_str(chosen, "method") == Some(reference_method)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REFERENCE: &str = "physpropprior";

    fn response(value: Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_control_fidelity_matches_target_level() {
        let answer = response(json!({
            "choice": "B",
            "targetLevel": "HIGH",
            "videoA": {"src": "a.mp4", "level": "low"},
            "videoB": {"src": "b.mp4", "level": "high"}
        }));
        assert!(evaluate(&answer, "control_fidelity", REFERENCE));

        let wrong = response(json!({
            "choice": "a",
            "targetLevel": "high",
            "videoA": {"src": "a.mp4", "level": "low"},
            "videoB": {"src": "b.mp4", "level": "high"}
        }));
        assert!(!evaluate(&wrong, "control_fidelity", REFERENCE));
    }

    #[test]
    fn test_control_fidelity_needs_target() {
        let answer = response(json!({
            "choice": "A",
            "videoA": {"src": "a.mp4", "level": "low"}
        }));
        assert!(!evaluate(&answer, "control_fidelity", REFERENCE));
    }

    #[test]
    fn test_force_direction_role() {
        let answer = response(json!({
            "choice": "A",
            "videoA": {"src": "a.mp4", "role": "target", "angle": "45"},
            "videoB": {"src": "b.mp4", "role": "distractor", "angle": "90"}
        }));
        assert!(evaluate(&answer, "force_direction", REFERENCE));

        let wrong = response(json!({
            "choice": "B",
            "videoA": {"src": "a.mp4", "role": "target"},
            "videoB": {"src": "b.mp4", "role": "distractor"}
        }));
        assert!(!evaluate(&wrong, "force_direction", REFERENCE));
    }

    #[test]
    fn test_method_datasets_check_option_then_video() {
        let bundle = response(json!({
            "choice": "B",
            "optionA": {"method": "cosmos2B"},
            "optionB": {"method": "physpropprior"}
        }));
        assert!(evaluate(&bundle, "physical_plausibility", REFERENCE));
        assert!(!evaluate(&bundle, "physical_plausibility", "cosmos2B"));

        let clips = response(json!({
            "choice": "A",
            "videoA": {"src": "a.mp4", "method": "physpropprior"},
            "videoB": {"src": "b.mp4", "method": "cosmos2B"}
        }));
        assert!(evaluate(&clips, "force_baseline", REFERENCE));
        assert!(evaluate(&clips, "physical_plausibility", REFERENCE));
    }

    #[test]
    fn test_non_answers_and_unknown_datasets_fail() {
        let no_choice = response(json!({
            "videoA": {"src": "a.mp4", "role": "target"}
        }));
        assert!(!evaluate(&no_choice, "force_direction", REFERENCE));

        let bad_choice = response(json!({
            "choice": "C",
            "videoA": {"src": "a.mp4", "role": "target"}
        }));
        assert!(!evaluate(&bad_choice, "force_direction", REFERENCE));

        let answer = response(json!({
            "choice": "A",
            "videoA": {"src": "a.mp4", "role": "target"}
        }));
        assert!(!evaluate(&answer, "realism_survey", REFERENCE));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let answer = response(json!({
            "choice": "A",
            "optionA": {"method": "physpropprior"}
        }));
        let first = evaluate(&answer, "physical_plausibility", REFERENCE);
        assert_eq!(first, evaluate(&answer, "physical_plausibility", REFERENCE));
    }
}
