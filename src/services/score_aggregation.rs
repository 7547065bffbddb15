use crate::db::models::QuestionResult;
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreSummary {
    pub(crate) manual_score: f64,
    pub(crate) total_score: f64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
}

/// Derives the stored score fields from per-question results.
///
/// Missing `points_awarded` counts as zero. The percentage is clamped to
/// `[0, 100]` but never rounded.
pub(crate) fn aggregate(
    results: &[QuestionResult],
    auto_score: Option<f64>,
    passing_score: f64,
    total_points: f64,
) -> ServiceResult<ScoreSummary> {
    if !total_points.is_finite() || total_points <= 0.0 {
        return Err(ServiceError::validation("total_points must be a positive number"));
    }

    let manual_score: f64 = results.iter().filter_map(|result| result.points_awarded).sum();
    let total_score = match auto_score {
        Some(auto) => auto + manual_score,
        None => manual_score,
    };
    let percentage = (total_score / total_points * 100.0).clamp(0.0, 100.0);

    Ok(ScoreSummary { manual_score, total_score, percentage, passed: total_score >= passing_score })
}
