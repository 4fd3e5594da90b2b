pub mod nav;

use std::collections::HashMap;

use log::warn;
use uuid::Uuid;

use crate::error::FunnelError;
use crate::models::{Answer, Question, Quiz};
use crate::scoring::ClickOrder;

use self::nav::{AdvanceToken, Directive, NavState, NavigationController};

/// Selections collected so far, keyed by question id, plus the order in
/// which style categories were first clicked. Nothing here is persisted
/// until the quiz completes.
#[derive(Debug, Default)]
pub struct AnswerSheet {
    answers: HashMap<String, Vec<Answer>>,
    clicks: ClickOrder,
}

impl AnswerSheet {
    pub fn count(&self, question_id: &str) -> usize {
        self.answers.get(question_id).map_or(0, Vec::len)
    }

    pub fn selected(&self, question_id: &str, option_id: &str) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(|picks| picks.iter().any(|a| a.option_id == option_id))
    }

    /// Multi-select semantics: an unselected option is added, a selected one
    /// is removed. Returns the new count for the question.
    pub fn toggle(&mut self, question: &Question, option_id: &str) -> usize {
        let Some(option) = question.option(option_id) else {
            warn!("unknown option {} on question {}", option_id, question.id);
            return self.count(&question.id);
        };

        let picks = self.answers.entry(question.id.clone()).or_default();
        if let Some(i) = picks.iter().position(|a| a.option_id == option_id) {
            // Picking a selected option again deselects it. The click order
            // keeps whatever the original pick established.
            picks.remove(i);
        } else {
            picks.push(Answer {
                question_id: question.id.clone(),
                option_id: option.id.clone(),
                points: option.points,
            });
            if let Some(category) = &option.style_category {
                self.clicks.note(category);
            }
        }
        picks.len()
    }

    /// Single-select semantics: the new pick supersedes whatever the
    /// question held before.
    pub fn replace(&mut self, question: &Question, option_id: &str) -> usize {
        let Some(option) = question.option(option_id) else {
            warn!("unknown option {} on question {}", option_id, question.id);
            return self.count(&question.id);
        };

        if let Some(category) = &option.style_category {
            self.clicks.note(category);
        }
        self.answers.insert(
            question.id.clone(),
            vec![Answer {
                question_id: question.id.clone(),
                option_id: option.id.clone(),
                points: option.points,
            }],
        );
        1
    }

    /// Every recorded answer, flattened in quiz question order.
    pub fn ordered(&self, quiz: &Quiz) -> Vec<Answer> {
        quiz.questions
            .iter()
            .flat_map(|q| self.answers.get(&q.id).cloned().unwrap_or_default())
            .collect()
    }

    pub fn clicks(&self) -> &ClickOrder {
        &self.clicks
    }

    pub fn clear(&mut self) {
        self.answers.clear();
        self.clicks.clear();
    }
}

/// Where a finished transition lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Question(usize),
    Completed,
}

/// One attempt at the quiz: the loaded configuration, everything picked so
/// far and the navigation state driving the flow.
pub struct QuizSession {
    quiz: Quiz,
    sheet: AnswerSheet,
    nav: NavigationController,
    session_id: Uuid,
    current: usize,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Result<Self, FunnelError> {
        let Some(first) = quiz.questions.first() else {
            return Err(FunnelError::EmptyQuiz(quiz.id.clone()));
        };
        let nav = NavigationController::new(first.kind);
        Ok(Self {
            quiz,
            sheet: AnswerSheet::default(),
            nav,
            session_id: Uuid::new_v4(),
            current: 0,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current]
    }

    pub fn selected_count(&self) -> usize {
        self.sheet.count(&self.current_question().id)
    }

    pub fn is_selected(&self, option_id: &str) -> bool {
        self.sheet.selected(&self.current_question().id, option_id)
    }

    pub fn is_answering(&self) -> bool {
        matches!(
            self.nav.state(),
            NavState::AnsweringNormal(_)
                | NavState::AnsweringStrategic(_)
                | NavState::AwaitingManualAdvance(_)
        )
    }

    /// Route a pick to the current question. Picks addressed to any other
    /// question, or arriving outside the answering states, are ignored.
    pub fn toggle(&mut self, question_id: &str, option_id: &str) -> Directive {
        if !self.is_answering() {
            warn!("pick ignored, no question is being answered");
            return Directive::None;
        }
        let question = &self.quiz.questions[self.current];
        if question.id != question_id {
            warn!(
                "pick for question {} ignored, current question is {}",
                question_id, question.id
            );
            return Directive::None;
        }

        let count = if question.is_strategic() {
            self.sheet.replace(question, option_id)
        } else {
            self.sheet.toggle(question, option_id)
        };
        self.nav
            .selection_changed(self.current, question.kind, question.requirement(), count)
    }

    pub fn proceed(&mut self) -> Directive {
        let count = self.sheet.count(&self.quiz.questions[self.current].id);
        self.nav.proceed(count)
    }

    pub fn advance_elapsed(&mut self, token: AdvanceToken) -> Directive {
        self.nav.advance_elapsed(token)
    }

    /// The transition screen is done; land on the next question or wrap up.
    pub fn finish_transition(&mut self) -> Landing {
        let next = self.current + 1;
        if next < self.quiz.questions.len() {
            self.current = next;
            self.nav.enter_question(next, self.quiz.questions[next].kind);
            Landing::Question(next)
        } else {
            self.nav.enter_result();
            Landing::Completed
        }
    }

    pub fn ordered_answers(&self) -> Vec<Answer> {
        self.sheet.ordered(&self.quiz)
    }

    pub fn clicks(&self) -> &ClickOrder {
        self.sheet.clicks()
    }

    /// Jump straight to the result state, used when a persisted result is
    /// rehydrated instead of walking the questions again.
    pub fn land_on_result(&mut self) {
        self.nav.enter_result();
    }

    /// Wipe the attempt for a retake. A fresh session id is minted so the
    /// retake submits as its own participation.
    pub fn reset(&mut self) {
        self.sheet.clear();
        self.current = 0;
        self.session_id = Uuid::new_v4();
        self.nav.reset(self.quiz.questions[0].kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionKind, QuestionOption};

    fn option(id: &str, category: Option<&str>, points: i32) -> QuestionOption {
        QuestionOption {
            id: id.to_string(),
            text: id.to_string(),
            style_category: category.map(str::to_string),
            points,
            image_url: None,
        }
    }

    fn two_question_quiz() -> Quiz {
        Quiz {
            id: "quiz-estilo".to_string(),
            title: "Descubra seu estilo".to_string(),
            description: None,
            questions: vec![
                Question {
                    id: "q1".to_string(),
                    text: "Escolha 3 looks".to_string(),
                    kind: QuestionKind::Normal,
                    required_selections: 3,
                    options: vec![
                        option("a", Some("Natural"), 1),
                        option("b", Some("Sexy"), 2),
                        option("c", Some("Romântico"), 3),
                        option("d", Some("Elegante"), 1),
                    ],
                },
                Question {
                    id: "q2".to_string(),
                    text: "Qual seu maior desafio?".to_string(),
                    kind: QuestionKind::Strategic,
                    required_selections: 3,
                    options: vec![option("s1", None, 0), option("s2", None, 0)],
                },
            ],
        }
    }

    fn session() -> QuizSession {
        QuizSession::new(two_question_quiz()).unwrap()
    }

    /// Answers q1 and lands on q2.
    fn walk_past_first_question(session: &mut QuizSession) {
        session.toggle("q1", "a");
        session.toggle("q1", "b");
        let token = match session.toggle("q1", "c") {
            Directive::ScheduleAutoAdvance(token) => token,
            other => panic!("expected a scheduled advance, got {:?}", other),
        };
        assert_eq!(session.advance_elapsed(token), Directive::EnterTransition(0));
        assert_eq!(session.finish_transition(), Landing::Question(1));
    }

    #[test]
    fn quiz_without_questions_is_rejected() {
        let quiz = Quiz {
            id: "vazio".to_string(),
            title: "".to_string(),
            description: None,
            questions: vec![],
        };
        assert!(matches!(
            QuizSession::new(quiz),
            Err(FunnelError::EmptyQuiz(id)) if id == "vazio"
        ));
    }

    #[test]
    fn toggling_the_same_option_twice_deselects_it() {
        let mut session = session();

        session.toggle("q1", "a");
        assert_eq!(session.selected_count(), 1);
        assert!(session.is_selected("a"));

        session.toggle("q1", "a");
        assert_eq!(session.selected_count(), 0);
        assert!(!session.is_selected("a"));
        assert!(session.ordered_answers().is_empty());
    }

    #[test]
    fn strategic_pick_replaces_the_previous_one() {
        let mut session = session();
        walk_past_first_question(&mut session);

        session.toggle("q2", "s1");
        session.toggle("q2", "s2");

        let q2_answers: Vec<Answer> = session
            .ordered_answers()
            .into_iter()
            .filter(|a| a.question_id == "q2")
            .collect();
        assert_eq!(q2_answers.len(), 1);
        assert_eq!(q2_answers[0].option_id, "s2");
    }

    #[test]
    fn click_order_survives_deselection_and_reselection() {
        let mut session = session();

        session.toggle("q1", "b"); // Sexy
        session.toggle("q1", "b"); // deselected again
        session.toggle("q1", "c"); // Romântico

        assert_eq!(session.clicks().as_slice(), ["Sexy", "Romântico"]);
    }

    #[test]
    fn picks_for_inactive_questions_are_ignored() {
        let mut session = session();

        assert_eq!(session.toggle("q2", "s1"), Directive::None);
        assert!(session.ordered_answers().is_empty());
    }

    #[test]
    fn unknown_options_are_ignored() {
        let mut session = session();

        assert_eq!(session.toggle("q1", "zz"), Directive::None);
        assert_eq!(session.selected_count(), 0);
    }

    #[test]
    fn answers_flatten_in_question_order() {
        let mut session = session();
        walk_past_first_question(&mut session);
        session.toggle("q2", "s1");

        let pairs: Vec<(String, String)> = session
            .ordered_answers()
            .into_iter()
            .map(|a| (a.question_id, a.option_id))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("q1".to_string(), "a".to_string()),
                ("q1".to_string(), "b".to_string()),
                ("q1".to_string(), "c".to_string()),
                ("q2".to_string(), "s1".to_string()),
            ]
        );
    }

    #[test]
    fn full_walk_reaches_completed() {
        let mut session = session();
        walk_past_first_question(&mut session);

        session.toggle("q2", "s1");
        assert_eq!(session.proceed(), Directive::EnterTransition(1));
        assert_eq!(session.finish_transition(), Landing::Completed);
        assert_eq!(session.nav_state(), NavState::Result);
    }

    #[test]
    fn reset_mints_a_fresh_attempt() {
        let mut session = session();
        let first_id = session.session_id();
        walk_past_first_question(&mut session);

        session.reset();

        assert_ne!(session.session_id(), first_id);
        assert_eq!(session.selected_count(), 0);
        assert!(session.ordered_answers().is_empty());
        assert!(session.clicks().as_slice().is_empty());
        assert_eq!(session.nav_state(), NavState::AnsweringNormal(0));
    }
}
