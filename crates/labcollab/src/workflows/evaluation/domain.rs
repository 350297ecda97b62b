use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::ProjectId;

/// Store-assigned identifier for persisted evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub u64);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eval-{:06}", self.0)
    }
}

/// Identifier of whoever authored an evaluation (lab admin, mentor, or peer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluatorId(pub String);

/// What an evaluation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluatedType {
    Project,
    Talent,
}

impl EvaluatedType {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluatedType::Project => "PROJECT",
            EvaluatedType::Talent => "TALENT",
        }
    }
}

/// Role of the evaluation author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluatorType {
    LabAdmin,
    Mentor,
    Peer,
}

impl EvaluatorType {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluatorType::LabAdmin => "LAB_ADMIN",
            EvaluatorType::Mentor => "MENTOR",
            EvaluatorType::Peer => "PEER",
        }
    }
}

/// The four scored dimensions shared by every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub technical_skills: f64,
    pub communication: f64,
    pub teamwork: f64,
    pub punctuality: f64,
}

impl ScoreCard {
    pub fn dimensions(&self) -> [(&'static str, f64); 4] {
        [
            ("technical_skills", self.technical_skills),
            ("communication", self.communication),
            ("teamwork", self.teamwork),
            ("punctuality", self.punctuality),
        ]
    }
}

/// Caller-supplied scores and feedback, validated before anything is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    #[serde(flatten)]
    pub scores: ScoreCard,
    pub rating: f64,
    pub feedback: String,
}

/// Individual evaluation of a talent within a project, authored by a mentor or a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentEvaluationSubmission {
    pub talent_id: String,
    pub evaluator_id: EvaluatorId,
    pub evaluator_type: EvaluatorType,
    #[serde(flatten)]
    pub payload: EvaluationPayload,
}

/// Evaluation fields prior to the store assigning an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub project_id: ProjectId,
    pub evaluated_id: String,
    pub evaluated_type: EvaluatedType,
    pub evaluator_id: EvaluatorId,
    pub evaluator_type: EvaluatorType,
    pub scores: ScoreCard,
    pub rating: f64,
    pub feedback: String,
    pub evaluation_date: NaiveDate,
}

impl NewEvaluation {
    pub fn is_final(&self) -> bool {
        self.evaluated_type == EvaluatedType::Project
    }

    pub fn into_evaluation(self, id: EvaluationId) -> Evaluation {
        Evaluation {
            id,
            project_id: self.project_id,
            evaluated_id: self.evaluated_id,
            evaluated_type: self.evaluated_type,
            evaluator_id: self.evaluator_id,
            evaluator_type: self.evaluator_type,
            scores: self.scores,
            rating: self.rating,
            feedback: self.feedback,
            evaluation_date: self.evaluation_date,
        }
    }
}

/// Persisted evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub project_id: ProjectId,
    pub evaluated_id: String,
    pub evaluated_type: EvaluatedType,
    pub evaluator_id: EvaluatorId,
    pub evaluator_type: EvaluatorType,
    #[serde(flatten)]
    pub scores: ScoreCard,
    pub rating: f64,
    pub feedback: String,
    pub evaluation_date: NaiveDate,
}

impl Evaluation {
    pub fn is_final(&self) -> bool {
        self.evaluated_type == EvaluatedType::Project
    }
}

/// Summary of a project's evaluations alongside its lock status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub project_id: ProjectId,
    pub technical_skills: f64,
    pub communication: f64,
    pub teamwork: f64,
    pub punctuality: f64,
    pub final_score: f64,
    pub total_evaluations: u64,
    pub locked: bool,
}
