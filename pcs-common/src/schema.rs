//! Shared study record types
//!
//! Question banks, field catalogs, and response bundles are flat JSON files
//! exchanged with the evaluation UI. These types fix their shape:
//!
//! - [`Question`]: one comparison task, with exactly one option shape
//!   ([`QuestionOptions::VideoPair`] or [`QuestionOptions::BundlePair`])
//! - [`Field`]: one cell of the results table with its sampling quota
//! - [`Response`]: one recorded participant answer
//!
//! JSON keys use camelCase to match the UI.

use crate::filters::FilterValue;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ========================================
// Tokens and choices
// ========================================

/// Control level encoded in an asset filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Low,
}

impl Level {
    /// Both levels, high first
    pub const ALL: [Level; 2] = [Level::High, Level::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Low => "low",
        }
    }

    /// Uppercase form used in prompts and clip labels
    pub fn shout(&self) -> &'static str {
        match self {
            Level::High => "HIGH",
            Level::Low => "LOW",
        }
    }

    /// Case-insensitive parse; `None` for anything but high/low
    pub fn parse(value: &str) -> Option<Level> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Level::High),
            "low" => Some(Level::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Force-direction slot role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Target,
    Distractor,
}

/// Participant's selected slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
        }
    }

    /// Case-insensitive parse of a recorded choice
    pub fn parse(value: &str) -> Option<Choice> {
        match value.trim() {
            "A" | "a" => Some(Choice::A),
            "B" | "b" => Some(Choice::B),
            _ => None,
        }
    }
}

// ========================================
// Datasets
// ========================================

/// Comparison type, which is also the name of its question bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    ControlFidelity,
    ForceDirection,
    ForceBaseline,
    PhysicalPlausibility,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::ControlFidelity,
        Dataset::ForceDirection,
        Dataset::ForceBaseline,
        Dataset::PhysicalPlausibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::ControlFidelity => "control_fidelity",
            Dataset::ForceDirection => "force_direction",
            Dataset::ForceBaseline => "force_baseline",
            Dataset::PhysicalPlausibility => "physical_plausibility",
        }
    }

    pub fn parse(value: &str) -> Option<Dataset> {
        Dataset::ALL.into_iter().find(|d| d.as_str() == value)
    }

    /// Bank filename used when the config does not override it
    pub fn default_bank_file(&self) -> String {
        format!("{}_questions.json", self.as_str())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dataset::parse(s).ok_or_else(|| Error::InvalidInput(format!("Unknown dataset '{}'", s)))
    }
}

// ========================================
// Questions
// ========================================

/// How a single video slot is labeled
///
/// Variant order matters for untagged decoding: the two-key form must be
/// tried before the single-key forms it overlaps with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotLabel {
    /// Method-labeled clip at a known level (single-clip plausibility)
    MethodLevel { method: String, level: Level },
    /// Method-labeled clip (force baseline)
    Method { method: String },
    /// Target/distractor clip (force direction)
    Role { role: Role },
    /// Level-labeled clip (control fidelity)
    Level { level: Level },
}

/// One video slot of a two-video question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Path relative to the asset root, forward slashes
    pub src: String,

    #[serde(flatten)]
    pub label: SlotLabel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
}

impl VideoRef {
    pub fn level(&self) -> Option<Level> {
        match &self.label {
            SlotLabel::Level { level } | SlotLabel::MethodLevel { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match &self.label {
            SlotLabel::Role { role } => Some(*role),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match &self.label {
            SlotLabel::Method { method } | SlotLabel::MethodLevel { method, .. } => Some(method),
            _ => None,
        }
    }
}

/// One clip inside a bundle option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub src: String,
    pub level: Level,
    pub label: String,
}

/// A multi-clip option (one method's high and low clips)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBundle {
    pub method: String,
    pub label: String,
    pub clips: Vec<Clip>,
}

/// The two option shapes a question can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOptions {
    VideoPair {
        #[serde(rename = "videoA")]
        video_a: VideoRef,
        #[serde(rename = "videoB")]
        video_b: VideoRef,
    },
    BundlePair {
        #[serde(rename = "optionA")]
        option_a: OptionBundle,
        #[serde(rename = "optionB")]
        option_b: OptionBundle,
    },
}

impl QuestionOptions {
    /// Video slot for a choice, if this is a video-pair question
    pub fn video(&self, choice: Choice) -> Option<&VideoRef> {
        match (self, choice) {
            (QuestionOptions::VideoPair { video_a, .. }, Choice::A) => Some(video_a),
            (QuestionOptions::VideoPair { video_b, .. }, Choice::B) => Some(video_b),
            _ => None,
        }
    }

    /// Bundle for a choice, if this is a bundle-pair question
    pub fn bundle(&self, choice: Choice) -> Option<&OptionBundle> {
        match (self, choice) {
            (QuestionOptions::BundlePair { option_a, .. }, Choice::A) => Some(option_a),
            (QuestionOptions::BundlePair { option_b, .. }, Choice::B) => Some(option_b),
            _ => None,
        }
    }
}

/// Slot keys owned by [`QuestionOptions`]
const OPTION_KEYS: [&str; 4] = ["videoA", "videoB", "optionA", "optionB"];

/// One comparison task shown to a participant
///
/// Keys outside the schema are kept in `extra` and written back out, so
/// filters can address them and packed copies stay complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "QuestionRecord")]
pub struct Question {
    pub id: String,
    pub axis: String,
    pub axis_detail: String,
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_level: Option<Level>,

    /// Free-form provenance used by field filters
    #[serde(default)]
    pub meta: Map<String, Value>,

    #[serde(flatten)]
    pub options: QuestionOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_caption: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of [`Question`]; the flattened catch-all also sees the slot keys
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: String,
    axis: String,
    axis_detail: String,
    prompt: String,
    #[serde(default)]
    target_level: Option<Level>,
    #[serde(default)]
    meta: Map<String, Value>,
    #[serde(flatten)]
    options: QuestionOptions,
    #[serde(default)]
    context_image: Option<String>,
    #[serde(default)]
    context_caption: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let mut extra = record.extra;
        for key in OPTION_KEYS {
            extra.remove(key);
        }
        Self {
            id: record.id,
            axis: record.axis,
            axis_detail: record.axis_detail,
            prompt: record.prompt,
            target_level: record.target_level,
            meta: record.meta,
            options: record.options,
            context_image: record.context_image,
            context_caption: record.context_caption,
            extra,
        }
    }
}

impl Question {
    /// Meta value as a string, if present and a string
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }
}

/// Build a meta map from string pairs
pub fn meta_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

// ========================================
// Fields
// ========================================

fn default_quota() -> usize {
    2
}

/// One results-table cell and its per-participant quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    pub axis: String,
    pub method: String,
    pub attribute: String,
    /// Name of the question bank this field samples from
    pub dataset: String,

    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,

    /// Questions per participant
    #[serde(default = "default_quota")]
    pub questions: usize,
}

impl Field {
    pub fn identity(&self) -> FieldIdentity {
        FieldIdentity {
            id: self.id.clone(),
            label: self.label.clone(),
            axis: self.axis.clone(),
            method: self.method.clone(),
            attribute: self.attribute.clone(),
        }
    }
}

/// Field identity stamped onto packed questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIdentity {
    pub id: String,
    pub label: String,
    pub axis: String,
    pub method: String,
    pub attribute: String,
}

// ========================================
// Responses
// ========================================

/// Any JSON scalar as text; `null` counts as absent
///
/// A wrongly typed value still decodes, so the answer is scored as a
/// failure instead of vanishing from the totals.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// `field` as an object, or a bare string naming the field id
fn lenient_field_ref<'de, D>(deserializer: D) -> std::result::Result<Option<FieldRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(FieldRef::from_map(&map)),
        Value::String(id) => Some(FieldRef {
            id: Some(id),
            ..FieldRef::default()
        }),
        _ => None,
    })
}

/// `meta` when it is an object; anything else is ignored
fn lenient_object<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

/// Field reference embedded in a response (every key optional)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub axis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub attribute: Option<String>,
}

impl FieldRef {
    fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: text("id"),
            axis: text("axis"),
            method: text("method"),
            attribute: text("attribute"),
        }
    }
}

/// One recorded participant answer
///
/// The answered question is embedded, so the chosen slot's payload
/// (`videoA`, `optionB`, ...) is kept in `payload` and read on demand.
/// Known keys decode leniently: any entry that is a JSON object is a
/// response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, deserialize_with = "lenient_string")]
    pub choice: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub field_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_field_ref")]
    pub field: Option<FieldRef>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub dataset: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub target_level: Option<String>,

    #[serde(default, deserialize_with = "lenient_object")]
    pub meta: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// Parsed choice; `None` for a non-answer or unrecognized value
    pub fn choice(&self) -> Option<Choice> {
        self.choice.as_deref().and_then(Choice::parse)
    }

    /// Payload for the chosen slot under `<prefix><A|B>`
    pub fn selected(&self, prefix: &str) -> Option<&Value> {
        let choice = self.choice()?;
        self.payload.get(&format!("{}{}", prefix, choice.as_str()))
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Explicit field id: `fieldId`, then `field.id`, then `meta.fieldId`
    pub fn declared_field_id(&self) -> Option<&str> {
        self.field_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.field
                    .as_ref()
                    .and_then(|f| f.id.as_deref())
                    .filter(|s| !s.is_empty())
            })
            .or_else(|| self.meta_str("fieldId"))
    }

    /// Axis from the embedded field, else from meta
    pub fn declared_axis(&self) -> Option<&str> {
        self.field
            .as_ref()
            .and_then(|f| f.axis.as_deref())
            .or_else(|| self.meta_str("axis"))
    }

    /// Method from the embedded field, else from meta
    pub fn declared_method(&self) -> Option<&str> {
        self.field
            .as_ref()
            .and_then(|f| f.method.as_deref())
            .or_else(|| self.meta_str("method"))
    }

    /// Attribute from the embedded field, else from meta
    pub fn declared_attribute(&self) -> Option<&str> {
        self.field
            .as_ref()
            .and_then(|f| f.attribute.as_deref())
            .or_else(|| self.meta_str("attribute"))
    }
}
