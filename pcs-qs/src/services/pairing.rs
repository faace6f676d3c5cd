//! Asset pairing engine
//!
//! Groups scanned assets into buckets keyed by canonical scenario:
//! - level buckets: canonical key → {high, low}; a bucket qualifies for a
//!   pair only when both levels are present
//! - angle buckets: scenario → {angle → clip}; a bucket qualifies when it
//!   holds at least two angles
//! - flat `(scenario, angle)` lookups, used to match one method's clip
//!   against another method's clip or diagram at the same key
//!
//! Files without a recognizable token are logged and skipped.

use crate::error::ScanError;
use crate::services::asset_scanner::{AssetKind, AssetScanner};
use crate::services::token_parser::{level_key, split_angle_stem, CanonicalKey};
use pcs_common::Level;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Stem suffix that marks a force diagram
pub const DIAGRAM_SUFFIX: &str = "_force";

/// `(scenario, angle)`
pub type AngleKey = (String, String);

/// High/low slots of one level bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelPair {
    pub high: Option<PathBuf>,
    pub low: Option<PathBuf>,
}

impl LevelPair {
    /// Store a path, returning the one it replaced
    pub fn insert(&mut self, level: Level, path: PathBuf) -> Option<PathBuf> {
        match level {
            Level::High => self.high.replace(path),
            Level::Low => self.low.replace(path),
        }
    }

    pub fn get(&self, level: Level) -> Option<&Path> {
        match level {
            Level::High => self.high.as_deref(),
            Level::Low => self.low.as_deref(),
        }
    }

    /// `(high, low)` when both are present
    pub fn complete(&self) -> Option<(&Path, &Path)> {
        Some((self.high.as_deref()?, self.low.as_deref()?))
    }
}

pub type LevelBuckets = BTreeMap<CanonicalKey, LevelPair>;

/// scenario → angle → clip
pub type AngleBuckets = BTreeMap<String, BTreeMap<String, PathBuf>>;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Bucket files by canonical level key
pub fn bucket_by_level(files: &[PathBuf]) -> LevelBuckets {
    let mut buckets = LevelBuckets::new();
    for path in files {
        let name = file_name(path);
        let Some((level, key)) = level_key(&name) else {
            warn!("[skip] No high/low token in {}", path.display());
            continue;
        };
        if let Some(previous) = buckets.entry(key).or_default().insert(level, path.clone()) {
            warn!(
                "Duplicate {} clip for one scenario: {} replaces {}",
                level,
                path.display(),
                previous.display()
            );
        }
    }
    buckets
}

/// Only the buckets holding both levels
pub fn complete_pairs(buckets: &LevelBuckets) -> BTreeMap<CanonicalKey, (PathBuf, PathBuf)> {
    buckets
        .iter()
        .filter_map(|(key, pair)| {
            let (high, low) = pair.complete()?;
            Some((key.clone(), (high.to_path_buf(), low.to_path_buf())))
        })
        .collect()
}

/// Bucket files by scenario, then angle
pub fn bucket_by_angle(files: &[PathBuf]) -> AngleBuckets {
    let mut buckets = AngleBuckets::new();
    for path in files {
        let Some((scenario, angle)) = split_angle_stem(&file_stem(path)) else {
            warn!("[skip] {} lacks angle token", file_name(path));
            continue;
        };
        buckets
            .entry(scenario)
            .or_default()
            .insert(angle, path.clone());
    }
    buckets
}

/// Flat `(scenario, angle)` → clip lookup
pub fn index_by_angle(files: &[PathBuf]) -> BTreeMap<AngleKey, PathBuf> {
    bucket_by_angle(files)
        .into_iter()
        .flat_map(|(scenario, by_angle)| {
            by_angle
                .into_iter()
                .map(move |(angle, path)| ((scenario.clone(), angle), path))
        })
        .collect()
}

/// `(scenario, angle)` → diagram for `<scenario>_angle_<deg>_force.png` files
///
/// Images that do not follow the naming are ignored.
pub fn index_diagrams(images: &[PathBuf]) -> BTreeMap<AngleKey, PathBuf> {
    images
        .iter()
        .filter_map(|path| {
            let stem = file_stem(path);
            let base = stem.strip_suffix(DIAGRAM_SUFFIX)?;
            let key = split_angle_stem(base)?;
            Some((key, path.clone()))
        })
        .collect()
}

/// Scan-and-bucket helpers over one directory
pub struct AssetPairer {
    scanner: AssetScanner,
}

impl AssetPairer {
    pub fn new() -> Self {
        Self {
            scanner: AssetScanner::new(),
        }
    }

    pub fn scanner(&self) -> &AssetScanner {
        &self.scanner
    }

    pub fn level_buckets(&self, dir: &Path) -> Result<LevelBuckets, ScanError> {
        let files = self.scanner.scan(dir, AssetKind::Video)?;
        Ok(bucket_by_level(&files))
    }

    pub fn angle_buckets(&self, dir: &Path) -> Result<AngleBuckets, ScanError> {
        let files = self.scanner.scan(dir, AssetKind::Video)?;
        Ok(bucket_by_angle(&files))
    }

    pub fn angle_clips(&self, dir: &Path) -> Result<BTreeMap<AngleKey, PathBuf>, ScanError> {
        let files = self.scanner.scan(dir, AssetKind::Video)?;
        Ok(index_by_angle(&files))
    }

    pub fn diagrams(&self, dir: &Path) -> Result<BTreeMap<AngleKey, PathBuf>, ScanError> {
        let images = self.scanner.scan(dir, AssetKind::Image)?;
        Ok(index_diagrams(&images))
    }
}

impl Default for AssetPairer {
    fn default() -> Self {
        Self::new()
    }
}
