//! Test doubles shared by the unit test modules.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, GhibliApi};
use crate::models::{Film, QuizResult, TraitTag, WorldSnapshot};
use crate::particles::{BurstScope, FrameClock};
use crate::render::{ExportControl, OracleView, ParticleFrame, RenderPort, WizardView};

#[derive(Debug, Default)]
pub struct RecordingPort {
    pub wizards: Vec<WizardView>,
    pub oracles: Vec<OracleView>,
    pub controls: Vec<ExportControl>,
    pub alerts: Vec<String>,
    pub particle_frames: u32,
    pub hidden: Vec<BurstScope>,
}

impl RenderPort for RecordingPort {
    fn wizard(&mut self, view: &WizardView) {
        self.wizards.push(view.clone());
    }

    fn oracle(&mut self, view: &OracleView) {
        self.oracles.push(view.clone());
    }

    fn export_control(&mut self, control: &ExportControl) {
        self.controls.push(control.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn particles(&mut self, _frame: &ParticleFrame<'_>) {
        self.particle_frames += 1;
    }

    fn particles_hidden(&mut self, scope: BurstScope) {
        self.hidden.push(scope);
    }
}

#[derive(Debug, Default)]
pub struct InstantClock {
    pub ticks: u32,
}

#[async_trait]
impl FrameClock for InstantClock {
    async fn next_frame(&mut self) {
        self.ticks += 1;
    }
}

/// Canned backend: one quiz result (or failure) and a record of submissions.
#[derive(Default)]
pub struct StubApi {
    result: Option<QuizResult>,
    submissions: Mutex<Vec<Vec<TraitTag>>>,
}

impl StubApi {
    pub fn with_result(result: QuizResult) -> Self {
        Self {
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<Vec<TraitTag>> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl GhibliApi for StubApi {
    async fn movies(&self) -> Result<Vec<Film>, ApiError> {
        Ok(Vec::new())
    }

    async fn world(&self) -> Result<WorldSnapshot, ApiError> {
        Ok(WorldSnapshot::default())
    }

    async fn submit_quiz(&self, answers: &[TraitTag]) -> Result<QuizResult, ApiError> {
        self.submissions.lock().unwrap().push(answers.to_vec());
        self.result.clone().ok_or(ApiError::Status {
            status: 500,
            body: "stub failure".to_string(),
        })
    }
}
