//! Physical plausibility questions
//!
//! Two variants compare the reference method against each baseline:
//! - [`PlausibilityVariant::Bundle`]: both methods' high/low pairs of one
//!   scenario become two options of two clips each; the participant picks
//!   the method showing the clearer contrast.
//! - [`PlausibilityVariant::SingleClip`]: one reference clip at a known level
//!   against the baseline clip with the identical filename.

use super::{QuestionPolicy, SynthContext};
use crate::error::SynthError;
use crate::services::asset_scanner::AssetKind;
use crate::services::pairing::complete_pairs;
use crate::services::token_parser::level_key;
use clap::ValueEnum;
use pcs_common::labels::question_id;
use pcs_common::rng::shuffle_options;
use pcs_common::schema::{meta_map, Clip, OptionBundle, QuestionOptions, SlotLabel, VideoRef};
use pcs_common::{Dataset, Level, Question};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const AXIS: &str = "Physical realism";

/// Physical plausibility question shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlausibilityVariant {
    /// Two bundles of high + low clips
    #[default]
    Bundle,
    /// Two single clips at one level
    SingleClip,
}

/// Reference-versus-baseline realism policy
#[derive(Debug, Clone)]
pub struct PhysicalPlausibility {
    pub reference_method: String,
    pub baselines: Vec<String>,
    pub attributes: Vec<String>,
    pub variant: PlausibilityVariant,
}

impl PhysicalPlausibility {
    fn bundle(
        &self,
        ctx: &SynthContext,
        method: &str,
        attribute_label: &str,
        high: &Path,
        low: &Path,
    ) -> OptionBundle {
        let clip = |path: &Path, level: Level| Clip {
            src: ctx.relative_src(path),
            level,
            label: format!("{} {}", level.shout(), attribute_label),
        };
        OptionBundle {
            method: method.to_string(),
            label: ctx.labels.method(method),
            clips: vec![clip(high, Level::High), clip(low, Level::Low)],
        }
    }

    fn generate_bundles(
        &self,
        ctx: &SynthContext,
        rng: &mut StdRng,
    ) -> Result<Vec<Question>, SynthError> {
        let mut questions = Vec::new();

        for attribute in &self.attributes {
            let attribute_label = ctx.labels.attribute(attribute);
            let reference_dir = ctx.asset_dir(&self.reference_method, attribute);
            if !ctx.present_or_warn(&reference_dir, "reference") {
                continue;
            }
            let reference_pairs = complete_pairs(&ctx.pairer.level_buckets(&reference_dir)?);
            if reference_pairs.is_empty() {
                debug!("[skip] No complete reference pairs for {}", attribute);
                continue;
            }

            for baseline in &self.baselines {
                let baseline_dir = ctx.asset_dir(baseline, attribute);
                if !ctx.present_or_warn(&baseline_dir, "baseline") {
                    continue;
                }
                let baseline_pairs = complete_pairs(&ctx.pairer.level_buckets(&baseline_dir)?);

                for (key, (ref_high, ref_low)) in &reference_pairs {
                    let Some((base_high, base_low)) = baseline_pairs.get(key) else {
                        continue;
                    };
                    let [option_a, option_b] = shuffle_options(
                        rng,
                        [
                            self.bundle(
                                ctx,
                                &self.reference_method,
                                &attribute_label,
                                ref_high,
                                ref_low,
                            ),
                            self.bundle(ctx, baseline, &attribute_label, base_high, base_low),
                        ],
                    );

                    let scenario_slug = key.scenario_slug();
                    questions.push(Question {
                        id: question_id(
                            "ppset",
                            &[baseline.as_str(), attribute.as_str(), scenario_slug.as_str()],
                        ),
                        axis: AXIS.to_string(),
                        axis_detail: attribute_label.clone(),
                        prompt: format!(
                            "Which method better distinguishes HIGH vs LOW {}?",
                            attribute_label
                        ),
                        target_level: None,
                        meta: meta_map([
                            ("method", self.reference_method.as_str()),
                            ("baseline", baseline.as_str()),
                            ("attribute", attribute.as_str()),
                            ("scenario", scenario_slug.as_str()),
                            ("scenarioKey", key.as_str()),
                        ]),
                        options: QuestionOptions::BundlePair { option_a, option_b },
                        context_image: None,
                        context_caption: None,
                        extra: Default::default(),
                    });
                }
            }
        }

        Ok(questions)
    }

    fn generate_single_clips(
        &self,
        ctx: &SynthContext,
        rng: &mut StdRng,
    ) -> Result<Vec<Question>, SynthError> {
        let mut questions = Vec::new();

        for attribute in &self.attributes {
            let attribute_label = ctx.labels.attribute(attribute);
            let reference_dir = ctx.asset_dir(&self.reference_method, attribute);
            if !ctx.present_or_warn(&reference_dir, "reference") {
                continue;
            }
            let reference_clips = ctx
                .pairer
                .scanner()
                .scan(&reference_dir, AssetKind::Video)?;

            for baseline in &self.baselines {
                let baseline_dir = ctx.asset_dir(baseline, attribute);
                if !ctx.present_or_warn(&baseline_dir, "baseline") {
                    continue;
                }

                for reference in &reference_clips {
                    let Some(name) = reference.file_name() else {
                        continue;
                    };
                    let name = name.to_string_lossy();
                    let Some((level, key)) = level_key(&name) else {
                        debug!("[skip] No high/low token in {}", name);
                        continue;
                    };
                    let candidate = baseline_dir.join(&*name);
                    if !candidate.is_file() {
                        debug!("[skip] {} has no {} counterpart", name, baseline);
                        continue;
                    }

                    let [(method_a, path_a), (method_b, path_b)] = shuffle_options(
                        rng,
                        [
                            (self.reference_method.as_str(), reference.as_path()),
                            (baseline.as_str(), candidate.as_path()),
                        ],
                    );
                    let slot = |method: &str, path: &Path| VideoRef {
                        src: ctx.relative_src(path),
                        label: SlotLabel::MethodLevel {
                            method: method.to_string(),
                            level,
                        },
                        angle: None,
                    };

                    let scenario_slug = key.scenario_slug();
                    questions.push(Question {
                        id: question_id(
                            "pp",
                            &[baseline.as_str(), attribute.as_str(), scenario_slug.as_str(), level.as_str()],
                        ),
                        axis: AXIS.to_string(),
                        axis_detail: attribute_label.clone(),
                        prompt: format!(
                            "Which video better shows {} {}?",
                            level.shout(),
                            attribute_label
                        ),
                        target_level: Some(level),
                        meta: meta_map([
                            ("method", self.reference_method.as_str()),
                            ("baseline", baseline.as_str()),
                            ("attribute", attribute.as_str()),
                            ("scenario", scenario_slug.as_str()),
                            ("level", level.as_str()),
                        ]),
                        options: QuestionOptions::VideoPair {
                            video_a: slot(method_a, path_a),
                            video_b: slot(method_b, path_b),
                        },
                        context_image: None,
                        context_caption: None,
                        extra: Default::default(),
                    });
                }
            }
        }

        Ok(questions)
    }
}

impl QuestionPolicy for PhysicalPlausibility {
    fn dataset(&self) -> Dataset {
        Dataset::PhysicalPlausibility
    }

    fn generate(&self, ctx: &SynthContext, rng: &mut StdRng) -> Result<Vec<Question>, SynthError> {
        match self.variant {
            PlausibilityVariant::Bundle => self.generate_bundles(ctx, rng),
            PlausibilityVariant::SingleClip => self.generate_single_clips(ctx, rng),
        }
    }
}
