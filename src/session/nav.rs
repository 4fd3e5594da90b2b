use std::collections::HashSet;

use log::debug;

use crate::models::QuestionKind;

/// Identifies one armed auto-advance timer. A token that no longer matches
/// the controller's pending slot is stale and gets ignored when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    question: usize,
    generation: u64,
}

impl AdvanceToken {
    pub fn question(&self) -> usize {
        self.question
    }
}

/// Where the session currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AnsweringNormal(usize),
    AnsweringStrategic(usize),
    AwaitingManualAdvance(usize),
    Transitioning(usize),
    Result,
}

/// What the caller has to do after feeding the controller an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    None,
    ScheduleAutoAdvance(AdvanceToken),
    EnterTransition(usize),
}

/// Decides when the funnel moves forward. Normal questions arm a single
/// auto-advance timer once enough options are picked; strategic questions
/// wait for an explicit proceed. The timer fires at most once per question,
/// and losing eligibility before it fires invalidates it.
pub struct NavigationController {
    state: NavState,
    pending: Option<AdvanceToken>,
    fired: HashSet<usize>,
    generation: u64,
}

fn answering(question: usize, kind: QuestionKind) -> NavState {
    match kind {
        QuestionKind::Normal => NavState::AnsweringNormal(question),
        QuestionKind::Strategic => NavState::AnsweringStrategic(question),
    }
}

impl NavigationController {
    pub fn new(first_kind: QuestionKind) -> Self {
        Self {
            state: answering(0, first_kind),
            pending: None,
            fired: HashSet::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// The selection count on a question changed.
    pub fn selection_changed(
        &mut self,
        question: usize,
        kind: QuestionKind,
        required: usize,
        selected: usize,
    ) -> Directive {
        match self.state {
            NavState::AnsweringNormal(q)
            | NavState::AnsweringStrategic(q)
            | NavState::AwaitingManualAdvance(q)
                if q == question => {}
            _ => {
                debug!("selection change for question {} arrived out of turn", question);
                return Directive::None;
            }
        }

        match kind {
            QuestionKind::Strategic => {
                // One pick opens the manual gate. Strategic questions never
                // get a timer.
                self.state = if selected >= required {
                    NavState::AwaitingManualAdvance(question)
                } else {
                    NavState::AnsweringStrategic(question)
                };
                Directive::None
            }
            QuestionKind::Normal => {
                if selected < required {
                    // Eligibility lost: whatever timer was armed is stale now
                    self.pending = None;
                    self.state = NavState::AnsweringNormal(question);
                    return Directive::None;
                }
                if self.fired.contains(&question) {
                    // Auto-advance is spent for this question
                    self.state = NavState::AwaitingManualAdvance(question);
                    return Directive::None;
                }
                if self.pending.is_some() {
                    // Extra picks while armed do not add a second timer
                    return Directive::None;
                }
                self.generation += 1;
                let token = AdvanceToken {
                    question,
                    generation: self.generation,
                };
                self.pending = Some(token);
                Directive::ScheduleAutoAdvance(token)
            }
        }
    }

    /// A scheduled timer elapsed. Stale tokens are no-ops.
    pub fn advance_elapsed(&mut self, token: AdvanceToken) -> Directive {
        if self.pending != Some(token) {
            debug!("ignoring stale auto-advance for question {}", token.question);
            return Directive::None;
        }
        self.pending = None;
        self.fired.insert(token.question);
        self.state = NavState::Transitioning(token.question);
        Directive::EnterTransition(token.question)
    }

    /// Manual proceed. Always honored while answering, whatever the timer
    /// is doing, as long as something is selected.
    pub fn proceed(&mut self, selected: usize) -> Directive {
        let question = match self.state {
            NavState::AnsweringNormal(q)
            | NavState::AnsweringStrategic(q)
            | NavState::AwaitingManualAdvance(q) => q,
            _ => return Directive::None,
        };
        if selected == 0 {
            debug!("proceed ignored, nothing selected on question {}", question);
            return Directive::None;
        }
        self.pending = None;
        self.state = NavState::Transitioning(question);
        Directive::EnterTransition(question)
    }

    /// The transition screen finished and a new question is up.
    pub fn enter_question(&mut self, question: usize, kind: QuestionKind) {
        self.pending = None;
        self.state = answering(question, kind);
    }

    /// The transition after the last question finished.
    pub fn enter_result(&mut self) {
        self.pending = None;
        self.state = NavState::Result;
    }

    pub fn reset(&mut self, first_kind: QuestionKind) {
        *self = Self::new(first_kind);
    }
}
