//! Force baseline questions
//!
//! Each baseline force clip is matched by `(scenario, angle)` against the
//! reference method's clip and diagram. Keys missing either are dropped.

use super::{QuestionPolicy, SynthContext, FORCE_ATTRIBUTE, FORCE_CAPTION};
use crate::error::SynthError;
use pcs_common::labels::{question_id, slugify};
use pcs_common::rng::shuffle_options;
use pcs_common::schema::{meta_map, QuestionOptions, SlotLabel, VideoRef};
use pcs_common::{Dataset, Question};
use rand::rngs::StdRng;
use std::path::Path;
use tracing::debug;

pub const AXIS: &str = "Force adherence";
pub const AXIS_DETAIL: &str = "Baseline comparison";
const PROMPT: &str = "Which video better obeys the applied force direction?";

/// Reference-versus-baseline force policy
#[derive(Debug, Clone)]
pub struct ForceBaseline {
    pub reference_method: String,
    pub baselines: Vec<String>,
    /// Method folder holding the force diagrams
    pub context_method: String,
}

impl ForceBaseline {
    #[allow(clippy::too_many_arguments)]
    fn make_question(
        &self,
        ctx: &SynthContext,
        rng: &mut StdRng,
        baseline: &str,
        scenario: &str,
        angle: &str,
        reference: &Path,
        candidate: &Path,
        diagram: &Path,
    ) -> Question {
        let [(method_a, path_a), (method_b, path_b)] = shuffle_options(
            rng,
            [
                (self.reference_method.as_str(), reference),
                (baseline, candidate),
            ],
        );
        let slot = |method: &str, path: &Path| VideoRef {
            src: ctx.relative_src(path),
            label: SlotLabel::Method {
                method: method.to_string(),
            },
            angle: Some(angle.to_string()),
        };

        let scenario_slug = slugify(scenario, "scenario");
        Question {
            id: question_id("fb", &[baseline, scenario_slug.as_str(), angle]),
            axis: AXIS.to_string(),
            axis_detail: AXIS_DETAIL.to_string(),
            prompt: PROMPT.to_string(),
            target_level: None,
            meta: meta_map([
                ("method", self.reference_method.as_str()),
                ("baseline", baseline),
                ("attribute", FORCE_ATTRIBUTE),
                ("scenario", scenario),
                ("angle", angle),
            ]),
            options: QuestionOptions::VideoPair {
                video_a: slot(method_a, path_a),
                video_b: slot(method_b, path_b),
            },
            context_image: Some(ctx.relative_src(diagram)),
            context_caption: Some(FORCE_CAPTION.to_string()),
            extra: Default::default(),
        }
    }
}

impl QuestionPolicy for ForceBaseline {
    fn dataset(&self) -> Dataset {
        Dataset::ForceBaseline
    }

    fn generate(&self, ctx: &SynthContext, rng: &mut StdRng) -> Result<Vec<Question>, SynthError> {
        let reference_dir = ctx.asset_dir(&self.reference_method, FORCE_ATTRIBUTE);
        if !reference_dir.is_dir() {
            return Err(SynthError::MissingDirectory(reference_dir));
        }
        let context_dir = ctx.asset_dir(&self.context_method, FORCE_ATTRIBUTE);
        if !context_dir.is_dir() {
            return Err(SynthError::MissingDirectory(context_dir));
        }

        let reference_clips = ctx.pairer.angle_clips(&reference_dir)?;
        let diagrams = ctx.pairer.diagrams(&context_dir)?;

        let mut questions = Vec::new();
        for baseline in &self.baselines {
            let baseline_dir = ctx.asset_dir(baseline, FORCE_ATTRIBUTE);
            if !ctx.present_or_warn(&baseline_dir, "baseline force") {
                continue;
            }

            for (key, candidate) in ctx.pairer.angle_clips(&baseline_dir)? {
                let (Some(reference), Some(diagram)) =
                    (reference_clips.get(&key), diagrams.get(&key))
                else {
                    debug!("[skip] {} at {}° lacks a reference clip or diagram", key.0, key.1);
                    continue;
                };
                let (scenario, angle) = &key;
                questions.push(self.make_question(
                    ctx, rng, baseline, scenario, angle, reference, &candidate, diagram,
                ));
            }
        }

        Ok(questions)
    }
}
