use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quiz configuration as served by the marketing backend. Wire names are
/// camelCase because the backend is JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default = "default_required_selections")]
    pub required_selections: usize,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Normal,
    Strategic,
}

fn default_required_selections() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub style_category: Option<String>,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Style metadata from `GET /api/styles`, used only for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleInfo {
    pub category: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One recorded selection. Immutable once recorded; re-selecting on the same
/// question replaces the recorded set, it never merges into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub option_id: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResult {
    pub category: String,
    pub score: i32,
    pub percentage: f64,
}

/// Computed once at quiz completion, persisted whole, read-only until a
/// retake clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub primary_style: StyleResult,
    pub secondary_styles: Vec<StyleResult>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Attribution parameters captured by the backend for the current visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmParams {
    #[serde(default, alias = "utm_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, alias = "utm_medium", skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, alias = "utm_campaign", skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, alias = "utm_term", skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, alias = "utm_content", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Body of `POST /api/quiz/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub quiz_id: String,
    pub session_id: Uuid,
    pub participant_data: Participant,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm: Option<UtmParams>,
    pub completed_at: DateTime<Utc>,
}

impl SubmitRequest {
    pub fn new(
        quiz_id: String,
        session_id: Uuid,
        participant_data: Participant,
        answers: Vec<Answer>,
        utm: Option<UtmParams>,
    ) -> Self {
        Self {
            quiz_id,
            session_id,
            participant_data,
            answers,
            utm,
            completed_at: Utc::now(),
        }
    }
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn is_strategic(&self) -> bool {
        self.kind == QuestionKind::Strategic
    }

    /// Selections needed before the question is eligible to advance.
    /// Strategic questions take exactly one selection by definition.
    pub fn requirement(&self) -> usize {
        match self.kind {
            QuestionKind::Strategic => 1,
            QuestionKind::Normal => self.required_selections.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_wire_shape_uses_camel_case_and_defaults() {
        let raw = r#"{
            "id": "q1",
            "text": "Qual look te representa?",
            "options": [
                {"id": "o1", "text": "Fluido e leve", "styleCategory": "Romântico", "points": 3},
                {"id": "o2", "text": "Reto e sóbrio"}
            ]
        }"#;

        let question: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(question.kind, QuestionKind::Normal);
        assert_eq!(question.required_selections, 3);
        assert_eq!(question.requirement(), 3);
        assert_eq!(
            question.options[0].style_category.as_deref(),
            Some("Romântico")
        );
        assert_eq!(question.options[1].points, 0);
        assert!(question.options[1].style_category.is_none());
    }

    #[test]
    fn strategic_questions_take_exactly_one_selection() {
        let raw = r#"{"id": "s1", "text": "Já investiu em consultoria?", "type": "strategic", "requiredSelections": 3}"#;

        let question: Question = serde_json::from_str(raw).unwrap();
        assert!(question.is_strategic());
        assert_eq!(question.requirement(), 1);
    }

    #[test]
    fn submit_request_carries_participant_data_key() {
        let request = SubmitRequest::new(
            "quiz-estilo".to_string(),
            Uuid::new_v4(),
            Participant {
                name: "Ana".to_string(),
                email: Some("ana@example.com".to_string()),
            },
            vec![Answer {
                question_id: "q1".to_string(),
                option_id: "o1".to_string(),
                points: 3,
            }],
            None,
        );

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("participantData").is_some());
        assert_eq!(body["answers"][0]["questionId"], "q1");
        assert!(body.get("utm").is_none());
    }

    #[test]
    fn utm_accepts_snake_case_aliases() {
        let raw = r#"{"utm_source": "instagram", "utm_medium": "bio", "campaign": "lancamento"}"#;

        let utm: UtmParams = serde_json::from_str(raw).unwrap();
        assert_eq!(utm.source.as_deref(), Some("instagram"));
        assert_eq!(utm.medium.as_deref(), Some("bio"));
        assert_eq!(utm.campaign.as_deref(), Some("lancamento"));
        assert!(utm.term.is_none());
    }
}
