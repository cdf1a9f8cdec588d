//! Quiz Wizard state machine.
//!
//! `transition` is a pure function of (session, event); it never talks to the
//! network. The returned `Effect` tells the caller what to do next, and
//! `QuizController` carries those effects out against the backend port and a
//! render port.
//!
//! Back navigation keeps answers: returning to a step shows the option picked
//! there earlier, and advancing again keeps it.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::api::GhibliApi;
use crate::config::AnimationConfig;
use crate::export::{ExportError, Exporter};
use crate::models::{Question, QuizResult, TraitTag, QUESTIONS};
use crate::particles::{self, BurstScope, FrameClock, ParticleBurst};
use crate::render::{
    ExportControl, OptionView, QuestionView, RenderPort, ResultView, WizardView,
    SUBMIT_FAILED_MESSAGE,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Answering { step: usize },
    Submitting,
    Result(QuizResult),
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    Select(TraitTag),
    Advance,
    Retreat,
    SubmitSucceeded(QuizResult),
    SubmitFailed,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the complete answer vector to the backend.
    Submit(Vec<TraitTag>),
    /// Run the confetti burst over the page.
    Celebrate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: &'static [Question],
    answers: Vec<Option<TraitTag>>,
    phase: Phase,
}

/// Sessions always run the fixed question set, which is never empty.
impl Default for QuizSession {
    fn default() -> Self {
        Self {
            questions: &QUESTIONS,
            answers: vec![None; QUESTIONS.len()],
            phase: Phase::Answering { step: 0 },
        }
    }
}

impl QuizSession {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn answers(&self) -> &[Option<TraitTag>] {
        &self.answers
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.phase {
            Phase::Answering { step } => Some(step),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        let questions = self.questions;
        self.current_step().and_then(|step| questions.get(step))
    }

    /// Trait highlighted on the current step.
    pub fn selected(&self) -> Option<TraitTag> {
        self.current_step().and_then(|step| self.answers[step])
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            Phase::Result(result) => Some(result),
            _ => None,
        }
    }

    /// The answer vector, only if every slot is filled.
    fn complete_answers(&self) -> Option<Vec<TraitTag>> {
        self.answers.iter().copied().collect()
    }

    pub fn view(&self) -> WizardView {
        match &self.phase {
            Phase::Answering { step } => {
                let step = *step;
                let question = &self.questions[step];
                let selected = self.answers[step];
                let last = step + 1 == self.questions.len();
                WizardView::Question(QuestionView {
                    step_number: step + 1,
                    total: self.questions.len(),
                    prompt: question.prompt,
                    options: question
                        .options
                        .iter()
                        .map(|o| OptionView {
                            label: o.label,
                            tag: o.tag,
                            selected: selected == Some(o.tag),
                        })
                        .collect(),
                    show_back: step > 0,
                    advance_label: if last { "See my result" } else { "Next" },
                    advance_enabled: selected.is_some(),
                })
            }
            Phase::Submitting => WizardView::Submitting,
            Phase::Result(result) => WizardView::Result(ResultView::from_result(result)),
            Phase::Error => WizardView::Error {
                message: SUBMIT_FAILED_MESSAGE,
            },
        }
    }
}

/// Apply `event` to `session`. Events that are not valid in the current
/// phase leave the session untouched and produce no effect.
pub fn transition(mut session: QuizSession, event: QuizEvent) -> (QuizSession, Option<Effect>) {
    let last = session.questions.len().saturating_sub(1);
    let phase = std::mem::replace(&mut session.phase, Phase::Error);

    let (next, effect) = match (phase, event) {
        (Phase::Answering { step }, QuizEvent::Select(tag)) => {
            if session.questions[step].offers(tag) {
                session.answers[step] = Some(tag);
            } else {
                tracing::debug!(step, tag = %tag, "Ignoring tag not offered on this step");
            }
            (Phase::Answering { step }, None)
        }
        (Phase::Answering { step }, QuizEvent::Advance) => {
            if session.answers[step].is_none() {
                (Phase::Answering { step }, None)
            } else if step < last {
                (Phase::Answering { step: step + 1 }, None)
            } else {
                match session.complete_answers() {
                    Some(answers) => (Phase::Submitting, Some(Effect::Submit(answers))),
                    None => {
                        tracing::debug!("Submit blocked: answer vector has unset slots");
                        (Phase::Answering { step }, None)
                    }
                }
            }
        }
        (Phase::Answering { step }, QuizEvent::Retreat) if step > 0 => {
            (Phase::Answering { step: step - 1 }, None)
        }
        (Phase::Submitting, QuizEvent::SubmitSucceeded(result)) => {
            (Phase::Result(result), Some(Effect::Celebrate))
        }
        (Phase::Submitting, QuizEvent::SubmitFailed) => (Phase::Error, None),
        (Phase::Result(_) | Phase::Error, QuizEvent::Reset) => {
            session.answers.iter_mut().for_each(|a| *a = None);
            (Phase::Answering { step: 0 }, None)
        }
        (phase, event) => {
            tracing::debug!(?phase, ?event, "Ignoring event not valid in this phase");
            (phase, None)
        }
    };

    session.phase = next;
    (session, effect)
}

/// Drives a `QuizSession` against the backend and a render port.
pub struct QuizController {
    api: Arc<dyn GhibliApi>,
    session: QuizSession,
    export: ExportControl,
    animation: AnimationConfig,
    clock: Box<dyn FrameClock>,
    rng: SmallRng,
    /// Size of the page the confetti covers.
    surface: (f32, f32),
}

impl QuizController {
    pub fn new(
        api: Arc<dyn GhibliApi>,
        animation: AnimationConfig,
        clock: Box<dyn FrameClock>,
    ) -> Self {
        Self {
            api,
            session: QuizSession::default(),
            export: ExportControl::disabled(),
            animation,
            clock,
            rng: SmallRng::from_entropy(),
            surface: (800.0, 600.0),
        }
    }

    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn export_control(&self) -> &ExportControl {
        &self.export
    }

    /// Draw the current state without changing it.
    pub fn render(&self, port: &mut dyn RenderPort) {
        port.wizard(&self.session.view());
        port.export_control(&self.export);
    }

    /// Apply a user event and carry out whatever it triggers: a backend
    /// round-trip on the final advance, the celebration on success.
    pub async fn dispatch(&mut self, event: QuizEvent, port: &mut dyn RenderPort) {
        let mut pending = Some(event);
        while let Some(event) = pending.take() {
            let resetting = matches!(event, QuizEvent::Reset);
            let session = std::mem::take(&mut self.session);
            let (session, effect) = transition(session, event);
            self.session = session;

            if resetting && matches!(self.session.phase, Phase::Answering { step: 0 }) {
                self.export = ExportControl::disabled();
            }
            self.render(port);

            match effect {
                Some(Effect::Submit(answers)) => {
                    pending = Some(self.submit(&answers).await);
                }
                Some(Effect::Celebrate) => {
                    self.export = ExportControl::ready();
                    port.export_control(&self.export);
                    let (width, height) = self.surface;
                    let burst = ParticleBurst::new(
                        BurstScope::Page,
                        width,
                        height,
                        self.animation.particles,
                        &mut self.rng,
                    );
                    particles::animate(burst, self.animation.frames, self.clock.as_mut(), port)
                        .await;
                }
                None => {}
            }
        }
    }

    async fn submit(&self, answers: &[TraitTag]) -> QuizEvent {
        tracing::info!(answers = ?answers, "Submitting quiz answers");
        match self.api.submit_quiz(answers).await {
            Ok(result) => {
                tracing::info!(name = ?result.name, film = ?result.film, "Quiz result received");
                QuizEvent::SubmitSucceeded(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Quiz submission failed");
                QuizEvent::SubmitFailed
            }
        }
    }

    /// Save the current result as a PNG keepsake. Only meaningful in the
    /// Result phase; the export control is restored on every exit path.
    pub async fn export(
        &mut self,
        exporter: &Exporter,
        port: &mut dyn RenderPort,
    ) -> Result<std::path::PathBuf, ExportError> {
        let result = match self.session.result() {
            Some(result) => result.clone(),
            None => return Err(ExportError::NothingToExport),
        };
        exporter.export(&result, &mut self.export, port).await
    }
}
