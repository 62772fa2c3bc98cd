//! Request and response shapes of the HTTP API.
//!
//! The web client keeps task state in camelCase while the query strings
//! and submission bodies use flat snake_case fields. Every shape has
//! explicit conversions to and from the domain types so no handler
//! translates fields by hand.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rapport_core::model::{
    Criterion, CriterionId, EvaluationSummary, EvaluationSummaryItem, EvaluationTask, GatingState,
    Submission, SubmissionReceipt, TaskPage, UserId,
};
use rapport_core::EvaluationError;

/// A queued rating request as the client stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub subject_id: UserId,
    pub subject_name: String,
    pub criterion_id: CriterionId,
    pub criterion_name: String,
    pub first_time: bool,
}

impl From<EvaluationTask> for TaskDto {
    fn from(task: EvaluationTask) -> Self {
        Self {
            subject_id: task.subject_id,
            subject_name: task.subject_name,
            criterion_id: task.criterion_id,
            criterion_name: task.criterion_name,
            first_time: task.first_time,
        }
    }
}

impl From<TaskDto> for EvaluationTask {
    fn from(dto: TaskDto) -> Self {
        Self {
            subject_id: dto.subject_id,
            subject_name: dto.subject_name,
            criterion_id: dto.criterion_id,
            criterion_name: dto.criterion_name,
            first_time: dto.first_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPageDto {
    pub tasks: Vec<TaskDto>,
    pub next_offset: Option<usize>,
}

impl From<TaskPage> for TaskPageDto {
    fn from(page: TaskPage) -> Self {
        Self {
            tasks: page.tasks.into_iter().map(TaskDto::from).collect(),
            next_offset: page.next_offset,
        }
    }
}

impl From<TaskPageDto> for TaskPage {
    fn from(dto: TaskPageDto) -> Self {
        Self {
            tasks: dto.tasks.into_iter().map(EvaluationTask::from).collect(),
            next_offset: dto.next_offset,
        }
    }
}

/// `?offset=<n>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasksQuery {
    #[serde(default)]
    pub offset: usize,
}

/// `?subject_id=<id>`, required.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectQuery {
    pub subject_id: UserId,
}

/// `?subject_id=<id>` on a submission, where the body may carry it
/// instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitQuery {
    pub subject_id: Option<UserId>,
}

/// Body of `POST /evaluations/evaluations/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<UserId>,
    pub criterion_id: CriterionId,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub familiarity: Option<i64>,
}

impl SubmissionBody {
    /// Merge with the query string. The query's `subject_id` wins when
    /// both are present.
    pub fn into_submission(self, query: SubmitQuery) -> Result<Submission, EvaluationError> {
        let subject_id = query
            .subject_id
            .or(self.subject_id)
            .ok_or_else(|| EvaluationError::validation("subject_id", "is required"))?;
        Ok(Submission {
            subject_id,
            criterion_id: self.criterion_id,
            score: self.score,
            familiarity: self.familiarity,
        })
    }
}

impl From<Submission> for SubmissionBody {
    fn from(submission: Submission) -> Self {
        Self {
            subject_id: Some(submission.subject_id),
            criterion_id: submission.criterion_id,
            score: submission.score,
            familiarity: submission.familiarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDto {
    pub evaluation_id: Uuid,
    pub created: bool,
    pub first_time: bool,
}

impl From<SubmissionReceipt> for ReceiptDto {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            evaluation_id: receipt.evaluation_id,
            created: receipt.created,
            first_time: receipt.first_time,
        }
    }
}

impl From<ReceiptDto> for SubmissionReceipt {
    fn from(dto: ReceiptDto) -> Self {
        Self {
            evaluation_id: dto.evaluation_id,
            created: dto.created,
            first_time: dto.first_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionDto {
    pub id: CriterionId,
    pub name: String,
}

impl From<Criterion> for CriterionDto {
    fn from(criterion: Criterion) -> Self {
        Self {
            id: criterion.id,
            name: criterion.name,
        }
    }
}

impl From<CriterionDto> for Criterion {
    fn from(dto: CriterionDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItemDto {
    pub criterion_id: CriterionId,
    pub criterion_name: String,
    pub average_score: f64,
    pub count: usize,
}

impl From<EvaluationSummaryItem> for SummaryItemDto {
    fn from(item: EvaluationSummaryItem) -> Self {
        Self {
            criterion_id: item.criterion_id,
            criterion_name: item.criterion_name,
            average_score: item.average_score,
            count: item.count,
        }
    }
}

impl From<SummaryItemDto> for EvaluationSummaryItem {
    fn from(dto: SummaryItemDto) -> Self {
        Self {
            criterion_id: dto.criterion_id,
            criterion_name: dto.criterion_name,
            average_score: dto.average_score,
            count: dto.count,
        }
    }
}

/// Gate state plus the number of ratings still missing, for the
/// "rate N more people" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingDto {
    pub eligible: bool,
    pub threshold: usize,
    pub outbound_count: usize,
    pub remaining: usize,
}

impl From<GatingState> for GatingDto {
    fn from(gating: GatingState) -> Self {
        Self {
            eligible: gating.eligible,
            threshold: gating.threshold,
            outbound_count: gating.outbound_count,
            remaining: gating.remaining(),
        }
    }
}

impl From<GatingDto> for GatingState {
    fn from(dto: GatingDto) -> Self {
        GatingState::new(dto.outbound_count, dto.threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDto {
    pub subject_id: UserId,
    pub criteria: Vec<SummaryItemDto>,
    pub gating: GatingDto,
}

impl From<EvaluationSummary> for SummaryDto {
    fn from(summary: EvaluationSummary) -> Self {
        Self {
            subject_id: summary.subject_id,
            criteria: summary.criteria.into_iter().map(Into::into).collect(),
            gating: summary.gating.into(),
        }
    }
}

impl From<SummaryDto> for EvaluationSummary {
    fn from(dto: SummaryDto) -> Self {
        Self {
            subject_id: dto.subject_id,
            criteria: dto.criteria.into_iter().map(Into::into).collect(),
            gating: dto.gating.into(),
        }
    }
}

/// `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// `{"errors": [{"field": "...", "message": "..."}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_fields_are_camel_case() {
        let dto = TaskDto::from(EvaluationTask {
            subject_id: 2,
            subject_name: "sam".into(),
            criterion_id: 1,
            criterion_name: "Humor".into(),
            first_time: true,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["subjectId"], 2);
        assert_eq!(json["criterionName"], "Humor");
        assert_eq!(json["firstTime"], true);

        let back: EvaluationTask = serde_json::from_value::<TaskDto>(json).unwrap().into();
        assert_eq!(back.subject_name, "sam");
    }

    #[test]
    fn page_keeps_snake_case_cursor() {
        let dto = TaskPageDto::from(TaskPage {
            tasks: vec![],
            next_offset: None,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json["next_offset"].is_null());
    }

    #[test]
    fn query_subject_overrides_body() {
        let body: SubmissionBody =
            serde_json::from_str(r#"{"subject_id": 3, "criterion_id": 1, "score": 7}"#).unwrap();
        let submission = body
            .clone()
            .into_submission(SubmitQuery {
                subject_id: Some(5),
            })
            .unwrap();
        assert_eq!(submission.subject_id, 5);
        assert_eq!(submission.familiarity, None);

        let from_body = body.into_submission(SubmitQuery::default()).unwrap();
        assert_eq!(from_body.subject_id, 3);
        assert_eq!(SubmissionBody::from(from_body).subject_id, Some(3));
    }

    #[test]
    fn missing_subject_is_a_validation_error() {
        let body: SubmissionBody =
            serde_json::from_str(r#"{"criterion_id": 1, "score": 7, "familiarity": 4}"#).unwrap();
        let err = body.into_submission(SubmitQuery::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::Validation { ref field, .. } if field == "subject_id"));
    }

    #[test]
    fn gating_reports_remaining() {
        let dto = GatingDto::from(GatingState::new(3, 10));
        assert_eq!(dto.remaining, 7);
        assert!(!dto.eligible);
        assert_eq!(GatingState::from(dto), GatingState::new(3, 10));
    }
}
