//! Filename token parser
//!
//! Two token schemes classify an asset filename:
//! - **Level**: `_high` / `_low` (case-insensitive), delimited on the right
//!   by `_`, `-`, `.` or the end of the name. `drop_high_friction.mp4`
//!   carries `high`; `drop_highway.mp4` carries nothing.
//! - **Angle**: a stem ending in `_angle_<digits>`, e.g.
//!   `push_box_angle_225`.
//!
//! Canonicalization replaces the token span with a fixed placeholder and
//! keeps everything else verbatim. Two files pair when their canonical keys
//! are byte-equal and their tokens differ.

use once_cell::sync::Lazy;
use pcs_common::labels::slugify;
use pcs_common::Level;
use regex::Regex;
use std::ops::Range;

/// Replaces a level token in a canonical key
pub const LEVEL_PLACEHOLDER: &str = "_{lvl}";

/// Replaces an angle token in a canonical key
pub const ANGLE_PLACEHOLDER: &str = "_{angle}";

/// Slug used when a scenario name has no alphanumerics
pub const SCENARIO_FALLBACK: &str = "scenario";

static LEVEL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)_(high|low)(?:[_.\-]|$)").expect("level token pattern is valid")
});

static ANGLE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.+)_angle_(?P<angle>\d+)$").expect("angle token pattern is valid")
});

/// Classification carried by a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Level(Level),
    /// Angle in degrees, as written in the filename
    Angle(String),
}

/// A token and its byte span within the scanned name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: TokenValue,
    pub span: Range<usize>,
}

impl Token {
    fn placeholder(&self) -> &'static str {
        match self.value {
            TokenValue::Level(_) => LEVEL_PLACEHOLDER,
            TokenValue::Angle(_) => ANGLE_PLACEHOLDER,
        }
    }
}

/// First well-delimited level token in a filename
pub fn find_level_token(filename: &str) -> Option<Token> {
    let caps = LEVEL_TOKEN.captures(filename)?;
    let whole = caps.get(0)?;
    let word = caps.get(1)?;
    let level = Level::parse(word.as_str())?;
    Some(Token {
        value: TokenValue::Level(level),
        span: whole.start()..word.end(),
    })
}

/// Trailing angle token of a file stem
///
/// The span also applies to the full filename, since the stem is its prefix.
pub fn find_angle_token(stem: &str) -> Option<Token> {
    let caps = ANGLE_TOKEN.captures(stem)?;
    let base = caps.name("base")?;
    let angle = caps.name("angle")?;
    Some(Token {
        value: TokenValue::Angle(angle.as_str().to_string()),
        span: base.end()..angle.end(),
    })
}

/// Split an angle-suffixed stem into `(scenario, angle)`
pub fn split_angle_stem(stem: &str) -> Option<(String, String)> {
    let token = find_angle_token(stem)?;
    match token.value {
        TokenValue::Angle(angle) => Some((stem[..token.span.start].to_string(), angle)),
        TokenValue::Level(_) => None,
    }
}

/// Filename with its token masked
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key stem with placeholders removed (`drop_{lvl}_friction.mp4` → `drop_friction`)
    pub fn scenario(&self) -> String {
        let stem = match self.0.rfind('.') {
            Some(dot) if dot > 0 => &self.0[..dot],
            _ => self.0.as_str(),
        };
        stem.replace(LEVEL_PLACEHOLDER, "")
            .replace(ANGLE_PLACEHOLDER, "")
    }

    /// Id-safe scenario slug
    pub fn scenario_slug(&self) -> String {
        slugify(&self.scenario(), SCENARIO_FALLBACK)
    }
}

/// Prefix + placeholder + suffix
pub fn canonicalize(name: &str, token: &Token) -> CanonicalKey {
    CanonicalKey(format!(
        "{}{}{}",
        &name[..token.span.start],
        token.placeholder(),
        &name[token.span.end..]
    ))
}

/// Level and canonical key of a level-tokenized filename
pub fn level_key(filename: &str) -> Option<(Level, CanonicalKey)> {
    let token = find_level_token(filename)?;
    let key = canonicalize(filename, &token);
    match token.value {
        TokenValue::Level(level) => Some((level, key)),
        TokenValue::Angle(_) => None,
    }
}

/// True when two filenames differ only in their level token
pub fn level_pairable(a: &str, b: &str) -> bool {
    match (level_key(a), level_key(b)) {
        (Some((level_a, key_a)), Some((level_b, key_b))) => key_a == key_b && level_a != level_b,
        _ => false,
    }
}
