//! Style lookup tables. Data, not branching: each table has an explicit default.

use crate::types::{RiskCategory, Severity};

/// Icon and CSS class for a risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub icon: &'static str,
    pub class: &'static str,
}

pub const DEFAULT_CATEGORY_STYLE: CategoryStyle = CategoryStyle {
    icon: "fas fa-exclamation-circle",
    class: "condition",
};

pub const CATEGORY_STYLES: &[(RiskCategory, CategoryStyle)] = &[
    (RiskCategory::Structural, CategoryStyle { icon: "fas fa-building", class: "structural" }),
    (RiskCategory::Electrical, CategoryStyle { icon: "fas fa-bolt", class: "electrical" }),
    (RiskCategory::Plumbing, CategoryStyle { icon: "fas fa-tint", class: "plumbing" }),
    (RiskCategory::Roofing, CategoryStyle { icon: "fas fa-home", class: "roofing" }),
    (RiskCategory::Hvac, CategoryStyle { icon: "fas fa-snowflake", class: "hvac" }),
    (RiskCategory::Safety, CategoryStyle { icon: "fas fa-exclamation-triangle", class: "safety" }),
    (RiskCategory::Environmental, CategoryStyle { icon: "fas fa-leaf", class: "environmental" }),
    (RiskCategory::Accessibility, CategoryStyle { icon: "fas fa-wheelchair", class: "accessibility" }),
    (RiskCategory::PropertyCondition, CategoryStyle { icon: "fas fa-tools", class: "condition" }),
];

pub fn category_style(category: RiskCategory) -> CategoryStyle {
    CATEGORY_STYLES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, style)| *style)
        .unwrap_or(DEFAULT_CATEGORY_STYLE)
}

/// Badge and card classes for a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    pub badge: &'static str,
    pub card: &'static str,
}

pub const DEFAULT_SEVERITY_STYLE: SeverityStyle = SeverityStyle {
    badge: "badge-secondary",
    card: "unknown",
};

pub const SEVERITY_STYLES: &[(Severity, SeverityStyle)] = &[
    (Severity::Critical, SeverityStyle { badge: "badge-critical", card: "critical" }),
    (Severity::High, SeverityStyle { badge: "badge-high", card: "high" }),
    (Severity::Medium, SeverityStyle { badge: "badge-medium", card: "medium" }),
    (Severity::Low, SeverityStyle { badge: "badge-low", card: "low" }),
];

pub fn severity_style(severity: Severity) -> SeverityStyle {
    SEVERITY_STYLES
        .iter()
        .find(|(s, _)| *s == severity)
        .map(|(_, style)| *style)
        .unwrap_or(DEFAULT_SEVERITY_STYLE)
}
