use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FunnelError;
use crate::models::{Question, QuestionOption, Quiz, StyleInfo, SubmitRequest, UtmParams};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin client for the quiz backend. Non-2xx statuses map to a generic
/// backend error and nothing here retries.
pub struct QuizApi {
    base: String,
    client: Client,
}

impl QuizApi {
    pub fn new(base_url: &str) -> Result<Self, FunnelError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FunnelError> {
        let url = format!("{}{}", self.base, path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FunnelError::BackendStatus { status, url });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn quiz(&self, quiz_id: &str) -> Result<Quiz, FunnelError> {
        self.get_json(&format!("/api/quiz/{}", quiz_id)).await
    }

    pub async fn questions(&self, quiz_id: &str) -> Result<Vec<Question>, FunnelError> {
        self.get_json(&format!("/api/quiz/{}/questions", quiz_id))
            .await
    }

    pub async fn questions_with_options(
        &self,
        quiz_id: &str,
    ) -> Result<Vec<Question>, FunnelError> {
        self.get_json(&format!("/api/quiz/{}/questions-with-options", quiz_id))
            .await
    }

    pub async fn styles(&self) -> Result<Vec<StyleInfo>, FunnelError> {
        self.get_json("/api/styles").await
    }

    pub async fn question_options(
        &self,
        question_id: &str,
    ) -> Result<Vec<QuestionOption>, FunnelError> {
        self.get_json(&format!("/api/question/{}/options", question_id))
            .await
    }

    pub async fn utm(&self) -> Result<UtmParams, FunnelError> {
        self.get_json("/api/analytics/utm").await
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<(), FunnelError> {
        let url = format!("{}/api/quiz/submit", self.base);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FunnelError::BackendStatus { status, url });
        }
        Ok(())
    }

    /// Loads the quiz with questions and options fully assembled. Prefers
    /// the combined questions endpoint; deployments that only serve the
    /// split endpoints get stitched together per question.
    pub async fn load_quiz(&self, quiz_id: &str) -> Result<Quiz, FunnelError> {
        let mut quiz = self.quiz(quiz_id).await?;

        if quiz.questions.is_empty() {
            match self.questions_with_options(quiz_id).await {
                Ok(questions) => quiz.questions = questions,
                Err(FunnelError::BackendStatus { status, .. }) => {
                    debug!(
                        "combined questions endpoint unavailable ({}), assembling from parts",
                        status
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if quiz.questions.is_empty() {
            let mut questions = self.questions(quiz_id).await?;
            for question in &mut questions {
                if question.options.is_empty() {
                    question.options = self.question_options(&question.id).await?;
                }
            }
            quiz.questions = questions;
        }

        if quiz.questions.is_empty() {
            return Err(FunnelError::EmptyQuiz(quiz_id.to_string()));
        }

        info!(
            "Loaded quiz {} with {} questions",
            quiz.id,
            quiz.questions.len()
        );
        Ok(quiz)
    }
}
