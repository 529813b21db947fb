//! Stylesheet loading
//!
//! A stylesheet is a YAML document mapping cell keywords to colors:
//!
//! ```yaml
//! headers:
//!   fg: "FFFFFF"
//!   bg: "808080"
//!   bold: true
//! keywords:
//!   ERROR:
//!     fg: "FFFFFF"
//!     bg: "FF0000"
//!   ++warn++:
//!     fg: "000000"
//!     bg: "FFFF00"
//!     whole_row: true
//! ```
//!
//! Keywords wrapped in `++` match any cell containing them, other keywords
//! must equal the whole cell text. Both comparisons ignore case. Keyword
//! order is kept: when several keywords match a cell the last one wins.
//!
//! Colors are `RRGGBB` or `AARRGGBB` hex, optionally prefixed with `#`. Any
//! other scalar is kept as written and ends up verbatim in the workbook.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use xlscolors_core::Color;

use crate::error::{Error, Result};

/// Marker wrapped around a keyword to turn it into a substring match
const CONTAINS_SENTINEL: &str = "++";

/// Name used in errors about the `headers` entry
const HEADERS_KEY: &str = "headers";

/// Problems found while parsing a stylesheet document
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML, or its top level is not a mapping
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// No `keywords` mapping at the top level
    #[error("missing 'keywords' mapping")]
    MissingKeywords,

    /// A keyword that is not a scalar
    #[error("keyword {0} is not a scalar")]
    InvalidPattern(String),

    /// A keyword whose style entry has the wrong shape
    #[error("invalid style for '{pattern}': {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A style entry without `fg` or `bg`
    #[error("'{pattern}' has no '{key}' color")]
    MissingColor { pattern: String, key: &'static str },

    /// A color given as a sequence or mapping
    #[error("'{pattern}' has an invalid '{key}' color: {value}")]
    InvalidColor {
        pattern: String,
        key: &'static str,
        value: String,
    },
}

/// Colors and flags applied to a matched cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpec {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    /// Style every cell of the row instead of the matched cell only
    pub whole_row: bool,
}

impl StyleSpec {
    /// Create a style with the given colors, not bold, single cell
    pub fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            whole_row: false,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn whole_row(mut self, whole_row: bool) -> Self {
        self.whole_row = whole_row;
        self
    }
}

/// How a rule compares its pattern with cell text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The whole cell text equals the pattern
    Exact,
    /// The cell text contains the pattern
    Contains,
}

/// A single keyword rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    keyword: String,
    pattern: String,
    mode: MatchMode,
    style: StyleSpec,
}

impl Rule {
    /// Build a rule from a stylesheet keyword.
    ///
    /// `++text++` becomes a [`MatchMode::Contains`] rule on `text`. Every
    /// leading and trailing `+` is stripped, so `++++` matches any text.
    pub fn new<S: Into<String>>(keyword: S, style: StyleSpec) -> Self {
        let keyword = keyword.into();
        let (mode, pattern) = if keyword.starts_with(CONTAINS_SENTINEL)
            && keyword.ends_with(CONTAINS_SENTINEL)
        {
            (MatchMode::Contains, keyword.trim_matches('+').to_lowercase())
        } else {
            (MatchMode::Exact, keyword.to_lowercase())
        };

        Self {
            keyword,
            pattern,
            mode,
            style,
        }
    }

    /// The keyword as written in the stylesheet
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The lowercased pattern compared against cell text
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The match mode derived from the keyword
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The style applied on a match
    pub fn style(&self) -> &StyleSpec {
        &self.style
    }
}

/// Rules in stylesheet order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; later rules take precedence over earlier ones
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in stylesheet order
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A loaded stylesheet: keyword rules plus an optional header style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: RuleSet,
    /// Style for the first row of every sheet
    pub header: Option<StyleSpec>,
}

impl Stylesheet {
    /// Load a stylesheet from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::StylesheetRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source).map_err(|source| Error::Stylesheet {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a stylesheet from YAML text
    pub fn from_yaml_str(source: &str) -> std::result::Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Err(ConfigError::MissingKeywords);
        }
        let document: Value = serde_yaml::from_str(source)?;
        if document.is_null() {
            return Err(ConfigError::MissingKeywords);
        }
        let raw: RawStylesheet = serde_yaml::from_value(document)?;

        let keywords = raw.keywords.ok_or(ConfigError::MissingKeywords)?;
        let mut rules = RuleSet::new();
        for (key, value) in keywords {
            let keyword = keyword_text(&key)?;
            let raw_style: RawStyle =
                serde_yaml::from_value(value).map_err(|source| ConfigError::InvalidRule {
                    pattern: keyword.clone(),
                    source,
                })?;
            let style = raw_style.into_spec(&keyword)?;
            rules.push(Rule::new(keyword, style));
        }

        let header = raw
            .headers
            .map(|raw_style| raw_style.into_spec(HEADERS_KEY))
            .transpose()?;

        Ok(Self { rules, header })
    }
}

impl FromStr for Stylesheet {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}

#[derive(Debug, Deserialize)]
struct RawStylesheet {
    #[serde(default)]
    headers: Option<RawStyle>,
    #[serde(default)]
    keywords: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
struct RawStyle {
    #[serde(default)]
    fg: Option<Value>,
    #[serde(default)]
    bg: Option<Value>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    whole_row: bool,
}

impl RawStyle {
    fn into_spec(self, pattern: &str) -> std::result::Result<StyleSpec, ConfigError> {
        Ok(StyleSpec {
            fg: parse_color(pattern, "fg", self.fg)?,
            bg: parse_color(pattern, "bg", self.bg)?,
            bold: self.bold,
            whole_row: self.whole_row,
        })
    }
}

fn keyword_text(key: &Value) -> std::result::Result<String, ConfigError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConfigError::InvalidPattern(describe(other))),
    }
}

fn parse_color(
    pattern: &str,
    key: &'static str,
    value: Option<Value>,
) -> std::result::Result<Color, ConfigError> {
    let value = match value {
        Some(Value::Null) | None => {
            return Err(ConfigError::MissingColor {
                pattern: pattern.to_string(),
                key,
            })
        }
        Some(value) => value,
    };

    // Unquoted all-digit colors such as 123456 arrive as integers
    let text = match &value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_u64() {
            Some(n) => format!("{:06}", n),
            None => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(ConfigError::InvalidColor {
                pattern: pattern.to_string(),
                key,
                value: describe(other),
            })
        }
    };
    Ok(Color::from_hex_or_raw(&text))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Sequence(_) => "a sequence".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}
