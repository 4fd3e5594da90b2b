use std::collections::HashMap;

use chrono::Utc;
use log::debug;

use crate::error::FunnelError;
use crate::models::{Answer, Quiz, QuizResult, StyleResult};

/// Style categories in the order they were first selected during the
/// session. First click ever: an entry is never removed or reordered, even
/// when the answers that introduced it are later replaced or deselected.
#[derive(Debug, Clone, Default)]
pub struct ClickOrder {
    categories: Vec<String>,
}

impl ClickOrder {
    /// Records a category the first time it is seen; later calls are no-ops.
    pub fn note(&mut self, category: &str) {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
    }

    pub fn position(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.categories
    }
}

/// Option-id to style-category mapping extracted from quiz configuration.
/// Options without a category (strategic answers) are simply absent.
#[derive(Debug, Clone, Default)]
pub struct OptionIndex {
    categories: HashMap<String, String>,
}

impl OptionIndex {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        let mut categories = HashMap::new();
        for question in &quiz.questions {
            for option in &question.options {
                if let Some(category) = &option.style_category {
                    categories.insert(option.id.clone(), category.clone());
                }
            }
        }
        Self { categories }
    }

    pub fn category_of(&self, option_id: &str) -> Option<&str> {
        self.categories.get(option_id).map(String::as_str)
    }
}

/// Aggregates the recorded answers into a ranked result.
///
/// Scores are summed per style category; percentages are each category's
/// share of the total. Ties are broken by first-click order, so a category
/// selected earlier outranks one with the same score selected later. The
/// category name is the last resort so the ranking is deterministic even
/// without click data.
pub fn compute_result(
    answers: &[Answer],
    index: &OptionIndex,
    clicks: &ClickOrder,
) -> Result<QuizResult, FunnelError> {
    if answers.is_empty() {
        return Err(FunnelError::NoAnswers);
    }

    let mut scores: HashMap<String, i32> = HashMap::new();
    for answer in answers {
        match index.category_of(&answer.option_id) {
            Some(category) => *scores.entry(category.to_string()).or_insert(0) += answer.points,
            None => debug!(
                "option {} carries no style category, skipping",
                answer.option_id
            ),
        }
    }

    let total: i32 = scores.values().sum();
    if total <= 0 {
        return Err(FunnelError::ZeroScore);
    }

    let mut ranked: Vec<StyleResult> = scores
        .into_iter()
        .map(|(category, score)| StyleResult {
            percentage: score as f64 * 100.0 / total as f64,
            category,
            score,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| {
                let a_pos = clicks.position(&a.category).unwrap_or(usize::MAX);
                let b_pos = clicks.position(&b.category).unwrap_or(usize::MAX);
                a_pos.cmp(&b_pos)
            })
            .then_with(|| a.category.cmp(&b.category))
    });

    let mut ranked = ranked.into_iter();
    let primary_style = ranked.next().ok_or(FunnelError::ZeroScore)?;
    let secondary_styles = ranked.filter(|s| s.score > 0).collect();

    Ok(QuizResult {
        primary_style,
        secondary_styles,
        computed_at: Utc::now(),
    })
}
