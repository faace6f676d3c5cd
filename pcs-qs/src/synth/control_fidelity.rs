//! Control fidelity questions
//!
//! For every high/low pair of one method and attribute, a random target
//! level is drawn and the two clips are shuffled into slots A/B. The
//! participant should pick the clip whose level matches the target.

use super::{QuestionPolicy, SynthContext};
use crate::error::SynthError;
use pcs_common::labels::question_id;
use pcs_common::rng::shuffle_options;
use pcs_common::schema::{meta_map, QuestionOptions, SlotLabel, VideoRef};
use pcs_common::{Dataset, Level, Question};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;
use tracing::debug;

pub const AXIS: &str = "Control fidelity";

/// Control fidelity policy over every `method × attribute` folder
#[derive(Debug, Clone)]
pub struct ControlFidelity {
    pub methods: Vec<String>,
    pub attributes: Vec<String>,
}

impl ControlFidelity {
    #[allow(clippy::too_many_arguments)]
    fn make_question(
        &self,
        ctx: &SynthContext,
        rng: &mut StdRng,
        method: &str,
        attribute: &str,
        scenario_slug: &str,
        high: &Path,
        low: &Path,
    ) -> Question {
        let target = *Level::ALL.choose(rng).unwrap_or(&Level::High);
        let [(level_a, path_a), (level_b, path_b)] =
            shuffle_options(rng, [(Level::High, high), (Level::Low, low)]);

        let attribute_label = ctx.labels.attribute(attribute);
        let slot = |level: Level, path: &Path| VideoRef {
            src: ctx.relative_src(path),
            label: SlotLabel::Level { level },
            angle: None,
        };

        Question {
            id: question_id("cf", &[method, attribute, scenario_slug, target.as_str()]),
            axis: AXIS.to_string(),
            axis_detail: attribute_label.clone(),
            prompt: format!(
                "Which video better matches the {} {} target?",
                target.shout(),
                attribute_label
            ),
            target_level: Some(target),
            meta: meta_map([
                ("method", method),
                ("attribute", attribute),
                ("scenario", scenario_slug),
            ]),
            options: QuestionOptions::VideoPair {
                video_a: slot(level_a, path_a),
                video_b: slot(level_b, path_b),
            },
            context_image: None,
            context_caption: None,
            extra: Default::default(),
        }
    }
}

impl QuestionPolicy for ControlFidelity {
    fn dataset(&self) -> Dataset {
        Dataset::ControlFidelity
    }

    fn generate(&self, ctx: &SynthContext, rng: &mut StdRng) -> Result<Vec<Question>, SynthError> {
        let mut questions = Vec::new();

        for method in &self.methods {
            for attribute in &self.attributes {
                let dir = ctx.asset_dir(method, attribute);
                if !ctx.present_or_warn(&dir, "attribute") {
                    continue;
                }

                for (key, pair) in ctx.pairer.level_buckets(&dir)? {
                    let Some((high, low)) = pair.complete() else {
                        debug!("[skip] {} has no high/low counterpart", key.as_str());
                        continue;
                    };
                    questions.push(self.make_question(
                        ctx,
                        rng,
                        method,
                        attribute,
                        &key.scenario_slug(),
                        high,
                        low,
                    ));
                }
            }
        }

        Ok(questions)
    }
}
