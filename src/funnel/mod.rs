use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::api::QuizApi;
use crate::db::Database;
use crate::error::FunnelError;
use crate::models::{Participant, Quiz, QuizResult, StyleInfo, SubmitRequest, UtmParams};
use crate::scoring::{self, OptionIndex};
use crate::session::nav::{AdvanceToken, Directive};
use crate::session::{Landing, QuizSession};
use crate::tasks::auto_advance;

/// Everything that can happen to a running attempt, funneled through one
/// channel so all state lives on a single consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunnelEvent {
    Toggle {
        question_id: String,
        option_id: String,
    },
    Proceed,
    Retake,
    AdvanceElapsed(AdvanceToken),
    Quit,
}

/// Presentation seam. The engine pushes everything the user has to see
/// through here and stays ignorant of how it gets rendered.
#[async_trait]
pub trait FunnelView: Send + Sync {
    async fn show_question(&self, session: &QuizSession);
    async fn show_transition(&self, from_question: usize);
    async fn show_result(&self, result: &QuizResult, styles: &[StyleInfo]);
    async fn show_no_result(&self);
}

/// Drives one quiz attempt from the first question to the persisted result:
/// receives events, feeds them to the session, schedules auto-advance
/// timers and runs scoring plus persistence when the walk completes.
pub struct Funnel<V: FunnelView> {
    session: QuizSession,
    index: OptionIndex,
    db: Database,
    api: QuizApi,
    view: V,
    events: Receiver<FunnelEvent>,
    timers: Sender<FunnelEvent>,
    participant: Participant,
    utm: Option<UtmParams>,
    styles: Vec<StyleInfo>,
    auto_advance: Duration,
}

impl<V: FunnelView> Funnel<V> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quiz: Quiz,
        db: Database,
        api: QuizApi,
        view: V,
        events: Receiver<FunnelEvent>,
        timers: Sender<FunnelEvent>,
        participant: Participant,
        auto_advance: Duration,
    ) -> Result<Self, FunnelError> {
        let index = OptionIndex::from_quiz(&quiz);
        let session = QuizSession::new(quiz)?;
        Ok(Self {
            session,
            index,
            db,
            api,
            view,
            events,
            timers,
            participant,
            utm: None,
            styles: Vec::new(),
            auto_advance,
        })
    }

    /// Runs the attempt until the event channel closes or a quit arrives.
    /// Returns the last computed result, if the walk got that far.
    pub async fn run(
        &mut self,
        start_at_result: bool,
    ) -> Result<Option<QuizResult>, FunnelError> {
        let mut last = None;

        // Attribution and the style catalog are nice to have; a dead
        // backend must not stop the quiz
        self.utm = match self.api.utm().await {
            Ok(utm) => Some(utm),
            Err(e) => {
                info!("attribution lookup unavailable: {}", e);
                None
            }
        };
        self.styles = match self.api.styles().await {
            Ok(styles) => styles,
            Err(e) => {
                info!("backend style catalog unavailable: {}", e);
                Vec::new()
            }
        };

        if start_at_result {
            match self.db.load_result().await? {
                Some(result) => {
                    info!("rehydrated result persisted by a previous attempt");
                    self.session.land_on_result();
                    self.view.show_result(&result, &self.styles).await;
                    last = Some(result);
                }
                None => {
                    self.view.show_no_result().await;
                    self.view.show_question(&self.session).await;
                }
            }
        } else {
            self.view.show_question(&self.session).await;
        }

        while let Some(event) = self.events.recv().await {
            debug!("handling {:?} in state {:?}", event, self.session.nav_state());
            match event {
                FunnelEvent::Toggle {
                    question_id,
                    option_id,
                } => {
                    let directive = self.session.toggle(&question_id, &option_id);
                    if self.session.is_answering() {
                        self.view.show_question(&self.session).await;
                    }
                    self.apply(directive, &mut last).await?;
                }
                FunnelEvent::Proceed => {
                    let directive = self.session.proceed();
                    self.apply(directive, &mut last).await?;
                }
                FunnelEvent::AdvanceElapsed(token) => {
                    let directive = self.session.advance_elapsed(token);
                    self.apply(directive, &mut last).await?;
                }
                FunnelEvent::Retake => {
                    self.db.clear_result().await?;
                    self.session.reset();
                    last = None;
                    info!("retake requested, previous result cleared");
                    self.view.show_question(&self.session).await;
                }
                FunnelEvent::Quit => break,
            }
        }

        Ok(last)
    }

    async fn apply(
        &mut self,
        directive: Directive,
        last: &mut Option<QuizResult>,
    ) -> Result<(), FunnelError> {
        match directive {
            Directive::None => Ok(()),
            Directive::ScheduleAutoAdvance(token) => {
                auto_advance::schedule(self.timers.clone(), token, self.auto_advance);
                Ok(())
            }
            Directive::EnterTransition(from) => {
                self.view.show_transition(from).await;
                match self.session.finish_transition() {
                    Landing::Question(_) => {
                        self.view.show_question(&self.session).await;
                        Ok(())
                    }
                    Landing::Completed => self.finalize(last).await,
                }
            }
        }
    }

    /// Scores the attempt, persists the outcome locally and pushes the
    /// participation to the backend. The push is fire-and-forget: a backend
    /// failure is logged and the local result stands.
    async fn finalize(&mut self, last: &mut Option<QuizResult>) -> Result<(), FunnelError> {
        let answers = self.session.ordered_answers();
        debug!(
            "scoring {} answers, categories first clicked as {:?}",
            answers.len(),
            self.session.clicks().as_slice()
        );
        let result = match scoring::compute_result(&answers, &self.index, self.session.clicks()) {
            Ok(result) => result,
            Err(e) if e.is_insufficient_data() => {
                warn!("attempt finished without scorable answers: {}", e);
                self.view.show_no_result().await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.db.save_result(&result).await?;

        let request = SubmitRequest::new(
            self.session.quiz().id.clone(),
            self.session.session_id(),
            self.participant.clone(),
            answers,
            self.utm.clone(),
        );
        if let Err(e) = self.api.submit(&request).await {
            error!("could not submit participation: {}", e);
        }

        *last = Some(result.clone());
        self.view.show_result(&result, &self.styles).await;
        Ok(())
    }
}
