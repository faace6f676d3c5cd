//! Participant pack sampler
//!
//! Every field draws its quota, without replacement, from the questions of
//! its bank that pass its filters. Each participant gets an independent
//! draw of every field, shuffled into one flat pack. Banks are decoded once
//! and shared across fields.
//!
//! All packs are built in memory before any file is written, so an
//! under-provisioned field never leaves a partial set of packs behind.

use crate::catalog::FieldCatalog;
use crate::error::{EvalError, Result};
use pcs_common::config::StudyConfig;
use pcs_common::filters::matches_filters;
use pcs_common::json_io::{read_json, write_json_atomic};
use pcs_common::schema::FieldIdentity;
use pcs_common::{Field, Question};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default prefix for generated participant ids
pub const DEFAULT_PREFIX: &str = "user";

/// Question banks by dataset name, decoded on first use
pub struct BankRegistry {
    data_root: PathBuf,
    files: BTreeMap<String, String>,
    cache: BTreeMap<String, Vec<Question>>,
}

impl BankRegistry {
    pub fn new(data_root: impl Into<PathBuf>, files: BTreeMap<String, String>) -> Self {
        Self {
            data_root: data_root.into(),
            files,
            cache: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &StudyConfig) -> Self {
        Self::new(config.data_root.clone(), config.dataset_files())
    }

    pub fn path(&self, dataset: &str) -> Result<PathBuf> {
        self.files
            .get(dataset)
            .map(|file| self.data_root.join(file))
            .ok_or_else(|| EvalError::UnknownDataset {
                name: dataset.to_string(),
                available: self.files.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    /// Decoded bank, reading it on first request
    pub fn load(&mut self, dataset: &str) -> Result<&[Question]> {
        if !self.cache.contains_key(dataset) {
            let path = self.path(dataset)?;
            if !path.is_file() {
                return Err(EvalError::MissingBank {
                    dataset: dataset.to_string(),
                    path,
                });
            }
            let questions: Vec<Question> = read_json(&path)?;
            debug!(dataset, count = questions.len(), "Loaded question bank");
            self.cache.insert(dataset.to_string(), questions);
        }
        Ok(self.cache.get(dataset).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Candidate questions and effective quota of one field
#[derive(Debug, Clone)]
pub struct FieldPool {
    pub field: Field,
    pub quota: usize,
    pub candidates: Vec<Question>,
}

/// Filter every field's bank down to its pool
///
/// `quota_override` replaces every field's own quota. Fails on the first
/// field whose pool is smaller than its quota.
pub fn build_pools(
    catalog: &FieldCatalog,
    banks: &mut BankRegistry,
    quota_override: Option<usize>,
) -> Result<Vec<FieldPool>> {
    for field in catalog.fields() {
        banks.path(&field.dataset)?;
    }

    let mut pools = Vec::with_capacity(catalog.len());
    for field in catalog.fields() {
        let quota = quota_override.filter(|&n| n > 0).unwrap_or(field.questions);
        let mut candidates = Vec::new();
        for question in banks.load(&field.dataset)? {
            let record = serde_json::to_value(question).map_err(pcs_common::Error::from)?;
            if matches_filters(&record, &field.filters) {
                candidates.push(question.clone());
            }
        }

        if candidates.len() < quota {
            return Err(EvalError::InsufficientPool {
                field: field.id.clone(),
                wanted: quota,
                found: candidates.len(),
            });
        }
        debug!(field = %field.id, quota, pool = candidates.len(), "Built field pool");
        pools.push(FieldPool {
            field: field.clone(),
            quota,
            candidates,
        });
    }
    Ok(pools)
}

/// Explicit ids, else `<prefix>_<i>` for `1..=count`
///
/// Generated ids are zero-padded to at least two digits.
pub fn participant_ids(explicit: &[String], count: usize, prefix: &str) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    if count == 0 {
        return Err(EvalError::NoParticipants);
    }
    let width = count.to_string().len().max(2);
    Ok((1..=count)
        .map(|i| format!("{}_{:0width$}", prefix, i, width = width))
        .collect())
}

/// Top-level keys a packed question sets itself
const PACK_KEYS: [&str; 4] = ["field", "fieldId", "fieldLabel", "dataset"];

/// A bank question stamped with the field it was drawn for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub field: FieldIdentity,
    pub field_id: String,
    pub field_label: String,
    pub dataset: String,
}

impl PackedQuestion {
    pub fn new(question: &Question, field: &Field) -> Self {
        let mut question = question.clone();
        for key in PACK_KEYS {
            question.extra.remove(key);
        }
        question
            .meta
            .insert("fieldId".to_string(), Value::String(field.id.clone()));
        Self {
            question,
            field: field.identity(),
            field_id: field.id.clone(),
            field_label: field.label.clone(),
            dataset: field.dataset.clone(),
        }
    }
}

/// One participant's pack: every field's sample, shuffled together
pub fn assemble_pack(pools: &[FieldPool], rng: &mut StdRng) -> Vec<PackedQuestion> {
    let mut pack: Vec<PackedQuestion> = Vec::with_capacity(pools.iter().map(|p| p.quota).sum());
    for pool in pools {
        pack.extend(
            pool.candidates
                .choose_multiple(rng, pool.quota)
                .map(|question| PackedQuestion::new(question, &pool.field)),
        );
    }
    pack.shuffle(rng);
    pack
}

/// Packs for every participant, in participant order
pub fn sample_packs(
    participants: &[String],
    pools: &[FieldPool],
    rng: &mut StdRng,
) -> Vec<(String, Vec<PackedQuestion>)> {
    participants
        .iter()
        .map(|id| (id.clone(), assemble_pack(pools, rng)))
        .collect()
}

/// Write `<output_dir>/<participant>.json` for each pack
pub fn write_packs(
    packs: &[(String, Vec<PackedQuestion>)],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(packs.len());
    for (participant, pack) in packs {
        let path = output_dir.join(format!("{}.json", participant));
        write_json_atomic(pack, &path)?;
        info!(participant = %participant, count = pack.len(), "Wrote pack");
        written.push(path);
    }
    Ok(written)
}

/// Questions each participant receives
pub fn pack_size(pools: &[FieldPool]) -> usize {
    pools.iter().map(|p| p.quota).sum()
}
