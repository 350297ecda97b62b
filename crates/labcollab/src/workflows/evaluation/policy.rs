use serde::{Deserialize, Serialize};

use super::domain::{EvaluationPayload, ScoreCard};

/// Relative weight of each scored dimension in the composite final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical_skills: f64,
    pub communication: f64,
    pub teamwork: f64,
    pub punctuality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            technical_skills: 0.25,
            communication: 0.25,
            teamwork: 0.25,
            punctuality: 0.25,
        }
    }
}

/// Boundary validation rules and scoring weights applied by the evaluation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    pub min_score: f64,
    pub max_score: f64,
    pub feedback_max_chars: usize,
    pub weights: ScoreWeights,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_score: 10.0,
            feedback_max_chars: 2000,
            weights: ScoreWeights::default(),
        }
    }
}

/// Payload rejected before reaching the record store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("feedback must not be blank")]
    BlankFeedback,
    #[error("feedback exceeds {limit} characters")]
    FeedbackTooLong { limit: usize },
    #[error("{field} must not be blank")]
    BlankIdentifier { field: &'static str },
    #[error("{0}")]
    Unsupported(&'static str),
}

impl EvaluationPolicy {
    pub fn validate(&self, payload: &EvaluationPayload) -> Result<(), ValidationError> {
        for (field, value) in payload
            .scores
            .dimensions()
            .into_iter()
            .chain(std::iter::once(("rating", payload.rating)))
        {
            self.check_score(field, value)?;
        }

        let feedback = payload.feedback.trim();
        if feedback.is_empty() {
            return Err(ValidationError::BlankFeedback);
        }
        if feedback.chars().count() > self.feedback_max_chars {
            return Err(ValidationError::FeedbackTooLong {
                limit: self.feedback_max_chars,
            });
        }

        Ok(())
    }

    fn check_score(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value < self.min_score || value > self.max_score {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: self.min_score,
                max: self.max_score,
            });
        }
        Ok(())
    }

    /// Weighted mean of the four dimensions, rounded to two decimals.
    pub fn composite(&self, scores: &ScoreCard) -> f64 {
        let weights = &self.weights;
        let pairs = [
            (scores.technical_skills, weights.technical_skills),
            (scores.communication, weights.communication),
            (scores.teamwork, weights.teamwork),
            (scores.punctuality, weights.punctuality),
        ];

        let total_weight: f64 = pairs.iter().map(|(_, weight)| weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }

        let weighted: f64 = pairs.iter().map(|(score, weight)| score * weight).sum();
        round_two(weighted / total_weight)
    }
}

pub(crate) fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
