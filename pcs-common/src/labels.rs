//! Display labels, scenario slugs, and question ids

use crate::config::LabelConfig;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Attribute titles used in prompts and axis details
static ATTRIBUTE_TITLES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("friction", "Friction"),
        ("deformation", "Deformation"),
        ("restitution", "Bounce"),
    ])
});

/// Method names shown on bundle options
static METHOD_NAMES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("physpropprior", "PhysPropPrior"),
        ("baseline_text_conditioned", "Baseline (Text)"),
        ("cogvideox5B", "CogVideoX5B"),
        ("cosmos2B", "Cosmos2B"),
        ("force_prompting", "Force Prompting"),
    ])
});

/// Method names used in the metrics summary table
static SUMMARY_ALIASES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("physpropprior", "Ours (ControlNet)"),
        ("baseline_text_conditioned", "Ours (Text only)"),
        ("cosmos2B", "Base Model (zero-shot)"),
        ("force_prompting", "Force Prompting"),
    ])
});

/// Label tables: compiled defaults with config overrides on top
#[derive(Debug, Clone)]
pub struct Labels {
    attributes: BTreeMap<String, String>,
    methods: BTreeMap<String, String>,
    aliases: BTreeMap<String, String>,
}

impl Labels {
    pub fn from_config(config: &LabelConfig) -> Self {
        fn merge(
            defaults: &BTreeMap<&'static str, &'static str>,
            overrides: &BTreeMap<String, String>,
        ) -> BTreeMap<String, String> {
            let mut merged: BTreeMap<String, String> = defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
        }

        Self {
            attributes: merge(&ATTRIBUTE_TITLES, &config.attributes),
            methods: merge(&METHOD_NAMES, &config.methods),
            aliases: merge(&SUMMARY_ALIASES, &config.aliases),
        }
    }

    pub fn attribute(&self, attribute: &str) -> String {
        self.attributes
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| title_case(attribute))
    }

    pub fn method(&self, method: &str) -> String {
        self.methods
            .get(method)
            .cloned()
            .unwrap_or_else(|| title_case(method))
    }

    /// Summary alias, or the raw method name
    pub fn alias(&self, method: &str) -> String {
        self.aliases
            .get(method)
            .cloned()
            .unwrap_or_else(|| method.to_string())
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::from_config(&LabelConfig::default())
    }
}

/// Underscores to spaces, then capitalize every letter that follows a
/// non-letter and lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Lowercase, collapse runs of non-alphanumerics to `_`, trim `_`
///
/// Returns `fallback` when nothing alphanumeric remains.
pub fn slugify(text: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            slug.push(ch);
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// `<prefix>_<part>_<part>...`, skipping empty parts
pub fn question_id(prefix: &str, parts: &[&str]) -> String {
    std::iter::once(prefix)
        .chain(parts.iter().copied().filter(|p| !p.is_empty()))
        .collect::<Vec<_>>()
        .join("_")
}
