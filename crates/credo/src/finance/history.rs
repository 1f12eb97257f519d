use serde::Serialize;

use super::domain::CreditHistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    StrongImprovement,
    Improving,
    Stable,
    Declining,
    SignificantDecline,
}

impl TrendLabel {
    fn of(trend: f64) -> Self {
        if trend > 20.0 {
            Self::StrongImprovement
        } else if trend > 0.0 {
            Self::Improving
        } else if trend < -20.0 {
            Self::SignificantDecline
        } else if trend < 0.0 {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

/// Summary statistics over the recorded credit score timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryAnalysis {
    pub entries: usize,
    pub current: u16,
    pub average: f64,
    pub highest: u16,
    pub lowest: u16,
    pub overall_trend: f64,
    pub recent_change: f64,
    pub std_dev: f64,
    pub volatility: Volatility,
    pub trend: TrendLabel,
}

/// Returns `None` for an empty history. Entries are ordered by date before analysis.
pub fn analyze_history(history: &[CreditHistoryEntry]) -> Option<HistoryAnalysis> {
    let mut ordered: Vec<&CreditHistoryEntry> = history.iter().collect();
    ordered.sort_by_key(|entry| entry.date);

    let first = ordered.first()?;
    let last = ordered.last()?;
    let scores: Vec<f64> = ordered
        .iter()
        .map(|entry| f64::from(entry.credit_score))
        .collect();
    let count = scores.len() as f64;
    let average = scores.iter().sum::<f64>() / count;

    let std_dev = if scores.len() > 1 {
        let variance = scores
            .iter()
            .map(|score| (score - average).powi(2))
            .sum::<f64>()
            / (count - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    let volatility = if std_dev < 20.0 {
        Volatility::Low
    } else if std_dev < 40.0 {
        Volatility::Medium
    } else {
        Volatility::High
    };

    let overall_trend = f64::from(last.credit_score) - f64::from(first.credit_score);
    let recent_change = match ordered.len() {
        0 | 1 => 0.0,
        len => f64::from(last.credit_score) - f64::from(ordered[len - 2].credit_score),
    };

    Some(HistoryAnalysis {
        entries: ordered.len(),
        current: last.credit_score,
        average,
        highest: ordered.iter().map(|e| e.credit_score).max().unwrap_or(last.credit_score),
        lowest: ordered.iter().map(|e| e.credit_score).min().unwrap_or(last.credit_score),
        overall_trend,
        recent_change,
        std_dev,
        volatility,
        trend: TrendLabel::of(overall_trend),
    })
}
