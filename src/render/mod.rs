//! 结果渲染模块：将最终分析结果转换为可显示的视图模型（纯函数）。
//!
//! # Result Renderer
//!
//! Pure transforms from the analysis record to display models. Nothing here mutates the
//! [`AnalysisResult`]; every card keeps the index of the factor it came from so a later
//! "show details" lookup resolves back into `risk_factors[index]`.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`render_result`] | Report view: summary tiles, cards, footer |
//! | [`risk_detail`] | Detail view for one factor |
//! | [`thinking_report`] | All recorded per-section traces |
//!
//! Text output for terminals comes from the `Display` impls in `text.rs`.

pub mod style;
mod text;

pub use style::{category_style, severity_style, CategoryStyle, SeverityStyle};

use crate::types::{AnalysisResult, RiskFactor, Severity, ThinkingTrace};
use chrono::NaiveDateTime;

pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_RISKS_NOTICE: &str = "No significant risk factors identified in this report.";

/// One summary number with its caption.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTile {
    pub value: String,
    pub label: &'static str,
}

/// Card for one risk factor.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCard {
    /// Position in `risk_factors`
    pub index: usize,
    pub category: String,
    pub style: CategoryStyle,
    pub severity: Severity,
    pub severity_style: SeverityStyle,
    pub description: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub filename: String,
    pub analyzed_at: Option<NaiveDateTime>,
}

/// Static display representation of a finished analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub score: SummaryTile,
    pub factor_count: SummaryTile,
    pub summary: Option<String>,
    pub cards: Vec<RiskCard>,
    /// Shown instead of cards when nothing was found
    pub empty_notice: Option<&'static str>,
    pub footer: Footer,
    pub has_thinking_traces: bool,
}

impl DisplayModel {
    pub fn card(&self, index: usize) -> Option<&RiskCard> {
        self.cards.iter().find(|c| c.index == index)
    }
}

pub fn render_result(result: &AnalysisResult) -> DisplayModel {
    let cards: Vec<RiskCard> = result
        .risk_factors
        .iter()
        .enumerate()
        .map(|(index, factor)| risk_card(index, factor))
        .collect();

    DisplayModel {
        score: SummaryTile {
            value: non_empty(&result.overall_risk_score).unwrap_or_else(|| UNKNOWN.to_string()),
            label: "Overall Risk Score",
        },
        factor_count: SummaryTile {
            value: result.risk_factors.len().to_string(),
            label: "Risk Factors Found",
        },
        summary: non_empty(&result.summary),
        empty_notice: cards.is_empty().then_some(NO_RISKS_NOTICE),
        cards,
        footer: Footer {
            filename: non_empty(&result.filename).unwrap_or_else(|| UNKNOWN.to_string()),
            analyzed_at: result.upload_time,
        },
        has_thinking_traces: !result.thinking_traces.is_empty(),
    }
}

fn risk_card(index: usize, factor: &RiskFactor) -> RiskCard {
    RiskCard {
        index,
        category: or_default(&factor.category, UNKNOWN_CATEGORY),
        style: category_style(factor.category_kind()),
        severity: factor.severity,
        severity_style: severity_style(factor.severity),
        description: or_default(&factor.description, NO_DESCRIPTION),
        location: non_empty(&factor.location),
    }
}

/// Everything known about one risk factor.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskDetail {
    pub index: usize,
    pub category: String,
    pub severity: Severity,
    pub severity_style: SeverityStyle,
    pub location: Option<String>,
    pub description: String,
    pub recommendation: Option<String>,
    pub cost_impact: Option<String>,
}

/// Resolve a card index back into its factor. `None` if out of range.
pub fn risk_detail(result: &AnalysisResult, index: usize) -> Option<RiskDetail> {
    let factor = result.risk_factors.get(index)?;
    Some(RiskDetail {
        index,
        category: or_default(&factor.category, UNKNOWN),
        severity: factor.severity,
        severity_style: severity_style(factor.severity),
        location: non_empty(&factor.location),
        description: or_default(&factor.description, NO_DESCRIPTION),
        recommendation: non_empty(&factor.recommendation),
        cost_impact: non_empty(&factor.cost_impact),
    })
}

/// A section trace reduced to its non-empty fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceView {
    pub title: String,
    pub issues: Vec<String>,
    pub reasoning: Option<String>,
    pub evidence: Option<String>,
    pub severity: Option<String>,
}

impl TraceView {
    pub fn for_section(section: &str, trace: &ThinkingTrace) -> Self {
        Self {
            title: section.to_string(),
            issues: trace
                .issues_found
                .iter()
                .filter(|i| !i.trim().is_empty())
                .cloned()
                .collect(),
            reasoning: non_empty(&trace.reasoning),
            evidence: non_empty(&trace.evidence),
            severity: non_empty(&trace.severity_assessment),
        }
    }

    /// True when no field would be shown.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
            && self.reasoning.is_none()
            && self.evidence.is_none()
            && self.severity.is_none()
    }
}

/// Every recorded trace, titled by section (or by position when the section is missing).
pub fn thinking_report(result: &AnalysisResult) -> Vec<TraceView> {
    result
        .thinking_traces
        .iter()
        .enumerate()
        .map(|(i, trace)| {
            let title = non_empty(&trace.section).unwrap_or_else(|| format!("Section {}", i + 1));
            TraceView::for_section(&title, trace)
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
