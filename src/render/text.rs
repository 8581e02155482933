use super::{DisplayModel, RiskCard, RiskDetail, SummaryTile, TraceView, UNKNOWN};
use std::fmt;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl fmt::Display for SummaryTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.label)
    }
}

impl fmt::Display for RiskCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {} ({})", self.index + 1, self.category, self.severity)?;
        write!(f, "    {}", self.description)?;
        if let Some(location) = &self.location {
            write!(f, "\n    Location: {location}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Risk Report ==")?;
        writeln!(f, "{}: {}", self.score.label, self.score.value)?;
        writeln!(f, "{}", self.factor_count)?;

        if let Some(summary) = &self.summary {
            writeln!(f)?;
            writeln!(f, "Analysis Summary")?;
            writeln!(f, "  {summary}")?;
        }

        writeln!(f)?;
        match self.empty_notice {
            Some(notice) => writeln!(f, "✓ {notice}")?,
            None => {
                writeln!(f, "Identified Risk Factors ({})", self.cards.len())?;
                for card in &self.cards {
                    writeln!(f, "{card}")?;
                }
            }
        }

        writeln!(f)?;
        let analyzed = self
            .footer
            .analyzed_at
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        write!(f, "File: {} | Analyzed: {}", self.footer.filename, analyzed)
    }
}

impl fmt::Display for RiskDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Category: {}", self.category)?;
        writeln!(f, "Severity: {}", self.severity)?;
        if let Some(location) = &self.location {
            writeln!(f, "Location: {location}")?;
        }
        write!(f, "Description: {}", self.description)?;
        if let Some(recommendation) = &self.recommendation {
            write!(f, "\nRecommendation: {recommendation}")?;
        }
        if let Some(cost) = &self.cost_impact {
            write!(f, "\nCost Impact: {cost}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TraceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.issues.is_empty() {
            write!(f, "\nIssues Found:")?;
            for issue in &self.issues {
                write!(f, "\n  - {issue}")?;
            }
        }
        if let Some(reasoning) = &self.reasoning {
            write!(f, "\nReasoning: {reasoning}")?;
        }
        if let Some(evidence) = &self.evidence {
            write!(f, "\nEvidence: {evidence}")?;
        }
        if let Some(severity) = &self.severity {
            write!(f, "\nSeverity: {severity}")?;
        }
        Ok(())
    }
}
