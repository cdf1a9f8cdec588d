//! Mood Oracle: pick up to three films for a mood.
//!
//! Matching runs in two passes:
//! 1. the mood's three canonical titles, resolved by normalized exact title
//! 2. if fewer than three resolved, a keyword scan of film descriptions using
//!    the long words of the mood blurb, in snapshot order, skipping titles
//!    already picked

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use regex::Regex;

use crate::catalog::{find_by_title, normalize, CatalogSnapshot};
use crate::config::AnimationConfig;
use crate::models::film::truncate_chars;
use crate::models::{Film, MoodEntry, MoodKey, Quote, WorldSnapshot};
use crate::particles::{self, BurstScope, FrameClock, ParticleBurst};
use crate::render::{ImageView, OracleCard, OracleView, QuotePanel, RenderPort};

pub const MAX_PICKS: usize = 3;
pub const DESCRIPTION_LIMIT: usize = 220;
/// Blurb words must be longer than this to be used as keywords.
pub const MIN_KEYWORD_LEN: usize = 5;
pub const IDLE_MESSAGE: &str = "Pick a mood and spin the sky to see what the spirits suggest.";

/// Normalized blurb tokens longer than `MIN_KEYWORD_LEN` characters.
pub fn keywords(blurb: &str) -> Vec<String> {
    let tokens: Vec<&str> = match Regex::new(r"[,\s]+") {
        Ok(re) => re.split(blurb).collect(),
        Err(_) => blurb
            .split(|c: char| c == ',' || c.is_whitespace())
            .collect(),
    };

    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(normalize)
        .filter(|t| t.chars().count() > MIN_KEYWORD_LEN)
        .collect()
}

/// Resolve the films to show for `entry`, at most `MAX_PICKS`.
pub fn match_films<'a>(entry: &MoodEntry, films: &'a [Film]) -> Vec<&'a Film> {
    let mut picks: Vec<&Film> = Vec::with_capacity(MAX_PICKS);
    let mut seen: Vec<String> = Vec::with_capacity(MAX_PICKS);

    for title in entry.picks {
        match find_by_title(films, title) {
            Some(film) => {
                let key = normalize(&film.title);
                if !seen.contains(&key) {
                    picks.push(film);
                    seen.push(key);
                }
            }
            None => tracing::debug!(mood = %entry.key, title, "Canonical pick not in snapshot"),
        }
    }

    if picks.len() < MAX_PICKS {
        let keywords = keywords(entry.blurb);
        for film in films {
            if picks.len() >= MAX_PICKS {
                break;
            }
            let title = normalize(&film.title);
            if seen.contains(&title) {
                continue;
            }
            let description = normalize(&film.description);
            if keywords.iter().any(|k| description.contains(k.as_str())) {
                picks.push(film);
                seen.push(title);
            }
        }
    }

    picks.truncate(MAX_PICKS);
    picks
}

/// The mood's own quote, else a uniformly random world quote.
pub fn pick_quote<R: Rng + ?Sized>(
    entry: &MoodEntry,
    world: Option<&WorldSnapshot>,
    rng: &mut R,
) -> Option<Quote> {
    if let Some(quote) = entry.quote {
        return Some(quote.into());
    }
    let quotes = &world?.quotes;
    if quotes.is_empty() {
        return None;
    }
    Some(quotes[rng.gen_range(0..quotes.len())].clone())
}

fn card(film: &Film) -> OracleCard {
    OracleCard {
        title: film.title.clone(),
        image: film.image_url().map(|src| ImageView {
            src: src.to_string(),
            alt: film.title.clone(),
        }),
        description: truncate_chars(&film.description, DESCRIPTION_LIMIT),
        chips: film.chips(),
    }
}

/// Build the oracle view for `mood`. Unknown moods and an empty snapshot
/// produce the idle placeholder.
pub fn build_view<R: Rng + ?Sized>(mood: &str, catalog: &CatalogSnapshot, rng: &mut R) -> OracleView {
    let key = match mood.parse::<MoodKey>() {
        Ok(key) if !catalog.is_empty() => key,
        _ => return OracleView::Idle { message: IDLE_MESSAGE },
    };
    let entry = key.entry();

    let cards = match_films(entry, catalog.films())
        .into_iter()
        .map(card)
        .collect();

    let quote = pick_quote(entry, catalog.world(), rng)
        .filter(|q| !q.body().is_empty())
        .map(|q| QuotePanel {
            text: q.display_text(),
            source: q.display_source(),
        });

    OracleView::Suggestion {
        title: entry.title,
        blurb: entry.blurb,
        cards,
        background: entry.palette,
        quote,
    }
}

/// The oracle page: an active mood chip plus generate / reset actions.
pub struct OracleSession {
    catalog: CatalogSnapshot,
    active: Option<MoodKey>,
    rng: Box<dyn RngCore + Send>,
    animation: AnimationConfig,
    clock: Box<dyn FrameClock>,
    hero: (f32, f32),
}

impl OracleSession {
    pub fn new(catalog: CatalogSnapshot, animation: AnimationConfig, clock: Box<dyn FrameClock>) -> Self {
        Self {
            catalog,
            active: Some(MoodKey::Cozy),
            rng: Box::new(SmallRng::from_entropy()),
            animation,
            clock,
            hero: (640.0, 240.0),
        }
    }

    /// Replace the random source (quote choice, sparkle placement).
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn active_mood(&self) -> Option<MoodKey> {
        self.active
    }

    pub fn select_mood(&mut self, mood: MoodKey) {
        self.active = Some(mood);
    }

    /// Show the idle placeholder and clear the hero background.
    pub fn show_idle(&self, port: &mut dyn RenderPort) {
        port.oracle(&OracleView::Idle { message: IDLE_MESSAGE });
    }

    /// Render suggestions for the active mood and play the sparkle burst.
    /// Repeated calls are not serialized against a running burst.
    pub async fn generate(&mut self, port: &mut dyn RenderPort) -> OracleView {
        let mood = *self.active.get_or_insert(MoodKey::Cozy);
        let view = build_view(mood.as_str(), &self.catalog, self.rng.as_mut());
        port.oracle(&view);

        if let OracleView::Suggestion { cards, .. } = &view {
            tracing::info!(mood = %mood, picks = cards.len(), "Oracle suggestion rendered");
            let (width, height) = self.hero;
            let burst = ParticleBurst::new(
                BurstScope::OracleHero,
                width,
                height,
                self.animation.particles,
                self.rng.as_mut(),
            );
            particles::animate(burst, self.animation.frames, self.clock.as_mut(), port).await;
        }
        view
    }

    pub fn reset(&mut self, port: &mut dyn RenderPort) {
        self.active = Some(MoodKey::Cozy);
        self.show_idle(port);
    }
}
