//! Question synthesis
//!
//! Each comparison type is a [`QuestionPolicy`]. Policies share the asset
//! pairer, the display labels, and one seeded generator threaded through
//! every draw, so a fixed seed and a fixed asset tree always produce the
//! same bank.
//!
//! Missing per-method folders, unpaired clips, and missing diagrams drop
//! only the affected item. [`synthesize`] fails only when the whole bank
//! would be empty.

mod control_fidelity;
mod force_baseline;
mod force_direction;
mod physical_plausibility;

pub use control_fidelity::ControlFidelity;
pub use force_baseline::ForceBaseline;
pub use force_direction::ForceDirection;
pub use physical_plausibility::{PhysicalPlausibility, PlausibilityVariant};

use crate::error::SynthError;
use crate::services::pairing::AssetPairer;
use pcs_common::labels::Labels;
use pcs_common::{Dataset, Question};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Caption attached to every force diagram
pub const FORCE_CAPTION: &str = "Arrow indicates the intended force direction.";

/// Attribute folder holding force clips and diagrams
pub const FORCE_ATTRIBUTE: &str = "force";

/// Shared inputs for every policy
pub struct SynthContext {
    /// Asset root (`<root>/<method>/<attribute>/`)
    pub root: PathBuf,
    pub labels: Labels,
    pub pairer: AssetPairer,
}

impl SynthContext {
    pub fn new(root: impl Into<PathBuf>, labels: Labels) -> Self {
        Self {
            root: root.into(),
            labels,
            pairer: AssetPairer::new(),
        }
    }

    /// `<root>/<method>/<attribute>`
    pub fn asset_dir(&self, method: &str, attribute: &str) -> PathBuf {
        self.root.join(method).join(attribute)
    }

    /// Asset path relative to the root, with forward slashes
    pub fn relative_src(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// True when the directory exists; logs a skip otherwise
    pub(crate) fn present_or_warn(&self, dir: &Path, what: &str) -> bool {
        if dir.is_dir() {
            true
        } else {
            warn!("Missing {} directory: {}", what, dir.display());
            false
        }
    }
}

/// One comparison-type generation policy
pub trait QuestionPolicy {
    /// Bank this policy fills
    fn dataset(&self) -> Dataset;

    /// Generate every question the inputs support (possibly none)
    fn generate(&self, ctx: &SynthContext, rng: &mut StdRng) -> Result<Vec<Question>, SynthError>;
}

/// Run a policy, enforce unique ids, and reject an empty bank
pub fn synthesize(
    policy: &dyn QuestionPolicy,
    ctx: &SynthContext,
    rng: &mut StdRng,
) -> Result<Vec<Question>, SynthError> {
    let mut questions = policy.generate(ctx, rng)?;
    if questions.is_empty() {
        return Err(SynthError::NoQuestions(policy.dataset()));
    }
    ensure_unique_ids(&mut questions);
    info!(
        dataset = %policy.dataset(),
        count = questions.len(),
        "Synthesized questions"
    );
    Ok(questions)
}

/// Suffix later duplicates with `_2`, `_3`, ... in bank order
pub fn ensure_unique_ids(questions: &mut [Question]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(questions.len());
    for question in questions.iter_mut() {
        if seen.insert(question.id.clone()) {
            continue;
        }
        let mut n = 2;
        let unique = loop {
            let candidate = format!("{}_{}", question.id, n);
            if !seen.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        warn!("Duplicate question id {} renamed to {}", question.id, unique);
        seen.insert(unique.clone());
        question.id = unique;
    }
}
