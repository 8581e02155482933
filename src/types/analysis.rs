//! Final analysis record delivered by the `complete` event and sent back for export.

use super::lenient;
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Complete analysis result.
///
/// Decoding is tolerant: off-type scalars are stringified and `null` means absent.
/// The document the server sent is retained and is what [`AnalysisResult::export_payload`]
/// returns, so export posts back exactly what was received. `Serialize` produces the
/// normalized typed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_risk_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub risk_factors: Vec<RiskFactor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<NaiveDateTime>,
    pub thinking_traces: Vec<ThinkingTrace>,
    /// Server-reported analysis failure carried inside an otherwise normal payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Fields the client does not model (e.g. `text_length`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    received: Option<Value>,
}

impl AnalysisResult {
    /// Non-empty server error, if the payload carries one.
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Body for the export endpoint: the document as received, or the typed view for
    /// records built locally.
    pub fn export_payload(&self) -> Value {
        match &self.received {
            Some(raw) => raw.clone(),
            None => serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }
}

const MODELED_FIELDS: &[&str] = &[
    "overall_risk_score",
    "summary",
    "risk_factors",
    "filename",
    "upload_time",
    "thinking_traces",
    "error",
];

#[derive(Deserialize)]
struct ResultFields {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    overall_risk_score: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    risk_factors: Vec<RiskFactor>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "deserialize_upload_time")]
    upload_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::list")]
    thinking_traces: Vec<ThinkingTrace>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    error: Option<String>,
}

impl TryFrom<Value> for AnalysisResult {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = &raw else {
            return Err(serde::de::Error::custom(
                "analysis result must be a JSON object",
            ));
        };
        let extra = map
            .iter()
            .filter(|(k, _)| !MODELED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let fields: ResultFields = serde_json::from_value(raw.clone())?;
        Ok(Self {
            overall_risk_score: fields.overall_risk_score,
            summary: fields.summary,
            risk_factors: fields.risk_factors,
            filename: fields.filename,
            upload_time: fields.upload_time,
            thinking_traces: fields.thinking_traces,
            error: fields.error,
            extra,
            received: Some(raw),
        })
    }
}

/// The server emits Python `isoformat()` timestamps (no offset); RFC 3339 is accepted too.
/// Anything unparseable becomes `None` instead of failing the whole frame.
fn deserialize_upload_time<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient::opt_string(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<NaiveDateTime>() {
        return Some(ts);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.naive_utc()),
        Err(e) => {
            tracing::debug!(value = raw, error = %e, "unparseable upload_time");
            None
        }
    }
}

/// One structured finding in the final result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Display label as sent by the server; classify with [`RiskFactor::category_kind`].
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendation: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_impact: Option<String>,
}

impl RiskFactor {
    pub fn category_kind(&self) -> RiskCategory {
        RiskCategory::from_label(&self.category)
    }
}

/// Per-section reasoning trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkingTrace {
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub issues_found: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reasoning: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evidence: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub severity_assessment: Option<String>,
}

/// Severity of a risk factor. Parsed case-insensitively; unrecognised labels map to `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient::opt_string(deserializer)?;
        Ok(raw.map(|s| Severity::from_label(&s)).unwrap_or_default())
    }
}

/// Known risk categories produced by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Structural,
    Electrical,
    Plumbing,
    Roofing,
    Hvac,
    Safety,
    Environmental,
    Accessibility,
    PropertyCondition,
    Unknown,
}

/// Server-side labels for each known category.
pub const CATEGORY_LABELS: &[(&str, RiskCategory)] = &[
    ("Structural Issues", RiskCategory::Structural),
    ("Electrical Hazards", RiskCategory::Electrical),
    ("Plumbing Problems", RiskCategory::Plumbing),
    ("Roofing Issues", RiskCategory::Roofing),
    ("HVAC Concerns", RiskCategory::Hvac),
    ("Safety Violations", RiskCategory::Safety),
    ("Environmental Hazards", RiskCategory::Environmental),
    ("Accessibility Issues", RiskCategory::Accessibility),
    ("Property Condition", RiskCategory::PropertyCondition),
];

static CATEGORY_BY_LABEL: Lazy<HashMap<&'static str, RiskCategory>> =
    Lazy::new(|| CATEGORY_LABELS.iter().copied().collect());

impl RiskCategory {
    /// Exact label match, the same lookup the web page used.
    pub fn from_label(label: &str) -> Self {
        CATEGORY_BY_LABEL
            .get(label)
            .copied()
            .unwrap_or(RiskCategory::Unknown)
    }

    pub fn label(self) -> Option<&'static str> {
        CATEGORY_LABELS
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(label, _)| *label)
    }
}
