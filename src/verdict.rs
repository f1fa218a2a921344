use crate::tables::ForensicRow;
use serde::Serialize;

/// Beneish M-Score cut-off between likely and unlikely manipulators
pub const M_SCORE_THRESHOLD: f64 = -2.22;

/// Altman Z-Score above which a company sits in the safe zone
pub const Z_SCORE_SAFE: f64 = 3.0;

/// Altman Z-Score below which a company sits in the distress zone
pub const Z_SCORE_DISTRESS: f64 = 1.8;

/// The three possible closing verdicts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Strong,
    HighRisk,
    Moderate,
}

impl VerdictKind {
    pub fn message(&self) -> &'static str {
        match self {
            VerdictKind::Strong => "Strong financial position with low risk of manipulation.",
            VerdictKind::HighRisk => "High risk of manipulation and financial distress.",
            VerdictKind::Moderate => "Moderate financial health with mixed indicators.",
        }
    }
}

/// Arithmetic mean of the finite values, `None` when there are none
///
/// # Examples
/// ```
/// use fsa_dashboard::verdict::mean;
///
/// assert_eq!(mean([1.0, 2.0, 6.0]), Some(3.0));
/// assert_eq!(mean(Vec::<f64>::new()), None);
/// assert_eq!(mean([f64::NAN, 4.0]), Some(4.0));
/// ```
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Maps mean M-Score and mean Z-Score to a verdict
///
/// Rules are tried in order and the first match wins. The two explicit rules
/// do not cover every input (an M-Score of exactly -2.22, or a low M-Score
/// with a grey-zone Z-Score); everything they leave out is `Moderate`.
///
/// # Examples
/// ```
/// use fsa_dashboard::verdict::{classify, VerdictKind};
///
/// assert_eq!(classify(-3.0, 4.0), VerdictKind::Strong);
/// assert_eq!(classify(-1.0, 1.0), VerdictKind::HighRisk);
/// assert_eq!(classify(-2.22, 2.0), VerdictKind::Moderate);
/// ```
pub fn classify(mean_m: f64, mean_z: f64) -> VerdictKind {
    if mean_m < M_SCORE_THRESHOLD && mean_z > Z_SCORE_SAFE {
        VerdictKind::Strong
    } else if mean_m > M_SCORE_THRESHOLD && mean_z < Z_SCORE_DISTRESS {
        VerdictKind::HighRisk
    } else {
        VerdictKind::Moderate
    }
}

/// Closing verdict for one company together with the means behind it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub message: &'static str,
    pub mean_m_score: Option<f64>,
    pub mean_z_score: Option<f64>,
}

impl Verdict {
    /// Averages the company's forensic rows and classifies the result
    ///
    /// Blank scores do not take part in the means. With no scores at all
    /// (an empty view, or a column left blank) the verdict is `Moderate`.
    pub fn evaluate(rows: &[ForensicRow]) -> Self {
        let mean_m_score = mean(rows.iter().filter_map(|r| r.m_score));
        let mean_z_score = mean(rows.iter().filter_map(|r| r.z_score));

        let kind = match (mean_m_score, mean_z_score) {
            (Some(m), Some(z)) => classify(m, z),
            _ => VerdictKind::Moderate,
        };

        Self {
            kind,
            message: kind.message(),
            mean_m_score,
            mean_z_score,
        }
    }
}
