//! Force direction questions
//!
//! Every clip whose `(scenario, angle)` has a context diagram becomes a
//! target; a different angle of the same scenario, drawn at random, is the
//! distractor.

use super::{QuestionPolicy, SynthContext, FORCE_ATTRIBUTE, FORCE_CAPTION};
use crate::error::SynthError;
use pcs_common::labels::{question_id, slugify};
use pcs_common::rng::shuffle_options;
use pcs_common::schema::{meta_map, QuestionOptions, Role, SlotLabel, VideoRef};
use pcs_common::{Dataset, Question};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;
use tracing::{debug, warn};

pub const AXIS: &str = "Force adherence";
pub const AXIS_DETAIL: &str = "Direction compliance";
const PROMPT: &str = "Which video best follows the applied force direction shown?";

/// Force direction policy
#[derive(Debug, Clone)]
pub struct ForceDirection {
    pub methods: Vec<String>,
    /// Method folder holding the force diagrams
    pub context_method: String,
}

struct Candidate<'a> {
    method: &'a str,
    scenario: &'a str,
    target_angle: &'a str,
    target: &'a Path,
    distractor_angle: &'a str,
    distractor: &'a Path,
    diagram: &'a Path,
}

fn make_question(ctx: &SynthContext, rng: &mut StdRng, c: Candidate<'_>) -> Question {
    let [(role_a, path_a, angle_a), (role_b, path_b, angle_b)] = shuffle_options(
        rng,
        [
            (Role::Target, c.target, c.target_angle),
            (Role::Distractor, c.distractor, c.distractor_angle),
        ],
    );
    let slot = |role: Role, path: &Path, angle: &str| VideoRef {
        src: ctx.relative_src(path),
        label: SlotLabel::Role { role },
        angle: Some(angle.to_string()),
    };

    let scenario_slug = slugify(c.scenario, "scenario");
    Question {
        id: question_id("fd", &[c.method, scenario_slug.as_str(), c.target_angle]),
        axis: AXIS.to_string(),
        axis_detail: AXIS_DETAIL.to_string(),
        prompt: PROMPT.to_string(),
        target_level: None,
        meta: meta_map([
            ("method", c.method),
            ("attribute", FORCE_ATTRIBUTE),
            ("scenario", c.scenario),
            ("angle", c.target_angle),
            ("targetAngle", c.target_angle),
            ("distractorAngle", c.distractor_angle),
        ]),
        options: QuestionOptions::VideoPair {
            video_a: slot(role_a, path_a, angle_a),
            video_b: slot(role_b, path_b, angle_b),
        },
        context_image: Some(ctx.relative_src(c.diagram)),
        context_caption: Some(FORCE_CAPTION.to_string()),
        extra: Default::default(),
    }
}

impl QuestionPolicy for ForceDirection {
    fn dataset(&self) -> Dataset {
        Dataset::ForceDirection
    }

    fn generate(&self, ctx: &SynthContext, rng: &mut StdRng) -> Result<Vec<Question>, SynthError> {
        let context_dir = ctx.asset_dir(&self.context_method, FORCE_ATTRIBUTE);
        if !context_dir.is_dir() {
            return Err(SynthError::MissingDirectory(context_dir));
        }
        let diagrams = ctx.pairer.diagrams(&context_dir)?;
        if diagrams.is_empty() {
            warn!("No force diagrams found in {}", context_dir.display());
        }

        let mut questions = Vec::new();
        for method in &self.methods {
            let force_dir = ctx.asset_dir(method, FORCE_ATTRIBUTE);
            if !ctx.present_or_warn(&force_dir, "force") {
                continue;
            }

            for (scenario, by_angle) in ctx.pairer.angle_buckets(&force_dir)? {
                if by_angle.len() < 2 {
                    debug!("[skip] {} has a single angle", scenario);
                    continue;
                }
                for (target_angle, target) in &by_angle {
                    let Some(diagram) = diagrams.get(&(scenario.clone(), target_angle.clone()))
                    else {
                        debug!("[skip] No diagram for {} at {}°", scenario, target_angle);
                        continue;
                    };
                    let others: Vec<&String> =
                        by_angle.keys().filter(|a| *a != target_angle).collect();
                    let Some(distractor_angle) = others.choose(rng).copied() else {
                        continue;
                    };
                    let Some(distractor) = by_angle.get(distractor_angle) else {
                        continue;
                    };

                    questions.push(make_question(
                        ctx,
                        rng,
                        Candidate {
                            method,
                            scenario: &scenario,
                            target_angle,
                            target,
                            distractor_angle,
                            distractor,
                            diagram,
                        },
                    ));
                }
            }
        }

        Ok(questions)
    }
}
