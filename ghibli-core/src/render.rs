//! Render port: plain descriptions of what the pages should display.
//!
//! The quiz, oracle and export logic only ever produce these values; a
//! concrete adapter (the terminal renderer in the CLI, a recorder in tests)
//! decides how to draw them.

use crate::models::{QuizResult, Quote, Recommendation, TraitTag};
use crate::particles::{BurstScope, Particle};

pub const RESULT_TITLE_FALLBACK: &str = "Your Ghibli Match";
pub const RECOMMENDATIONS_HEADING: &str = "You might also like";
pub const UNTITLED: &str = "Untitled";
pub const META_SEPARATOR: &str = " • ";
pub const SUBMIT_FAILED_MESSAGE: &str = "Something went wrong. Try again later.";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub label: &'static str,
    pub tag: TraitTag,
    pub selected: bool,
}

/// One question step of the wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    /// 1-based, as shown in the progress indicator.
    pub step_number: usize,
    pub total: usize,
    pub prompt: &'static str,
    pub options: Vec<OptionView>,
    pub show_back: bool,
    pub advance_label: &'static str,
    pub advance_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardView {
    Question(QuestionView),
    Submitting,
    Result(ResultView),
    Error { message: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCard {
    pub image: Option<ImageView>,
    pub title: String,
    /// Non-empty year and director joined by ` • `; absent when both are missing.
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSection {
    pub heading: &'static str,
    pub cards: Vec<RecommendationCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub avatar: Option<ImageView>,
    pub title: String,
    pub subtitle: Option<String>,
    pub quote: Option<String>,
    /// None when the backend recommended nothing; no heading is drawn then.
    pub recommendations: Option<RecommendationSection>,
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl RecommendationCard {
    pub fn from_recommendation(item: &Recommendation) -> Self {
        let title = non_empty(item.title.as_deref())
            .unwrap_or(UNTITLED)
            .to_string();

        let meta_parts: Vec<String> = [
            item.year
                .as_ref()
                .filter(|y| !y.is_blank())
                .map(|y| y.to_string()),
            non_empty(item.director.as_deref()).map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            image: non_empty(item.image.as_deref()).map(|src| ImageView {
                src: src.to_string(),
                alt: non_empty(item.title.as_deref())
                    .unwrap_or("Film poster")
                    .to_string(),
            }),
            title,
            meta: (!meta_parts.is_empty()).then(|| meta_parts.join(META_SEPARATOR)),
        }
    }
}

impl ResultView {
    pub fn from_result(result: &QuizResult) -> Self {
        let name = non_empty(result.name.as_deref());
        let cards: Vec<RecommendationCard> = result
            .recommendations()
            .iter()
            .map(RecommendationCard::from_recommendation)
            .collect();

        Self {
            avatar: result.avatar().map(|src| ImageView {
                src: src.to_string(),
                alt: name.unwrap_or("Result").to_string(),
            }),
            title: name.unwrap_or(RESULT_TITLE_FALLBACK).to_string(),
            subtitle: non_empty(result.film.as_deref()).map(str::to_string),
            quote: non_empty(result.quote.as_deref()).map(|q| Quote::new(q, None).display_text()),
            recommendations: (!cards.is_empty()).then(|| RecommendationSection {
                heading: RECOMMENDATIONS_HEADING,
                cards,
            }),
        }
    }

    /// Every image URL the view would load, avatar first.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.avatar.iter().map(|i| i.src.as_str()).collect();
        if let Some(section) = &self.recommendations {
            sources.extend(
                section
                    .cards
                    .iter()
                    .filter_map(|c| c.image.as_ref().map(|i| i.src.as_str())),
            );
        }
        sources
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OracleCard {
    pub title: String,
    pub image: Option<ImageView>,
    pub description: String,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotePanel {
    pub text: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OracleView {
    /// Placeholder shown before a mood is generated, or when nothing can be shown.
    /// The hero background is cleared.
    Idle { message: &'static str },
    Suggestion {
        title: &'static str,
        blurb: &'static str,
        cards: Vec<OracleCard>,
        background: &'static str,
        quote: Option<QuotePanel>,
    },
}

/// Label and enabled state of the keepsake download control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportControl {
    pub enabled: bool,
    pub label: String,
}

impl ExportControl {
    pub const IDLE_LABEL: &'static str = "Download keepsake";
    pub const BUSY_LABEL: &'static str = "Preparing image…";

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            label: Self::IDLE_LABEL.to_string(),
        }
    }

    pub fn ready() -> Self {
        Self {
            enabled: true,
            label: Self::IDLE_LABEL.to_string(),
        }
    }
}

impl Default for ExportControl {
    fn default() -> Self {
        Self::disabled()
    }
}

/// One animation frame of a particle burst.
#[derive(Debug)]
pub struct ParticleFrame<'a> {
    pub scope: BurstScope,
    pub frame: u32,
    pub width: f32,
    pub height: f32,
    pub particles: &'a [Particle],
}

pub trait RenderPort: Send {
    fn wizard(&mut self, view: &WizardView);

    fn oracle(&mut self, view: &OracleView);

    fn export_control(&mut self, control: &ExportControl);

    /// Blocking, user-visible message.
    fn alert(&mut self, message: &str);

    fn particles(&mut self, frame: &ParticleFrame<'_>);

    /// The burst finished; the surface for `scope` should be hidden.
    fn particles_hidden(&mut self, scope: BurstScope);
}
