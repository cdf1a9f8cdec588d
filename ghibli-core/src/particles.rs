//! Celebratory particle burst: a small time-stepped simulation of falling
//! confetti with sinusoidal horizontal drift.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::AnimationConfig;
use crate::render::{ParticleFrame, RenderPort};

pub const COLORS: [&str; 4] = ["#ffd1dc", "#a2cdb0", "#f7e1ae", "#9ed0ff"];

/// Where a burst is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstScope {
    /// Full viewport overlay behind the quiz result.
    Page,
    /// The oracle's hero banner.
    OracleHero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: &'static str,
    pub speed: f32,
}

impl Particle {
    fn step(&mut self) {
        self.y += self.speed * 2.0;
        self.x += ((self.y + self.radius) / 30.0).sin();
    }
}

#[derive(Debug, Clone)]
pub struct ParticleBurst {
    scope: BurstScope,
    width: f32,
    height: f32,
    particles: Vec<Particle>,
    frame: u32,
}

impl ParticleBurst {
    /// Scatter `count` particles across the top of a `width`×`height` surface,
    /// starting above the visible area.
    pub fn new<R: Rng + ?Sized>(
        scope: BurstScope,
        width: f32,
        height: f32,
        count: usize,
        rng: &mut R,
    ) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                x: rng.gen::<f32>() * width,
                y: -20.0 - rng.gen::<f32>() * height / 2.0,
                radius: 3.0 + rng.gen::<f32>() * 4.0,
                color: COLORS[rng.gen_range(0..COLORS.len())],
                speed: 1.0 + rng.gen::<f32>() * 2.0,
            })
            .collect();

        Self {
            scope,
            width,
            height,
            particles,
            frame: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.step();
        }
        self.frame += 1;
    }

    fn as_frame(&self) -> ParticleFrame<'_> {
        ParticleFrame {
            scope: self.scope,
            frame: self.frame,
            width: self.width,
            height: self.height,
            particles: &self.particles,
        }
    }
}

/// Source of animation-frame ticks. Adapters that stop ticking while hidden
/// pause the animation with them.
#[async_trait]
pub trait FrameClock: Send {
    async fn next_frame(&mut self);
}

/// Fixed-rate frame clock for terminal output.
pub struct IntervalClock {
    interval: tokio::time::Interval,
}

impl IntervalClock {
    pub fn new(frame: Duration) -> Self {
        let mut interval = tokio::time::interval(frame.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(Duration::from_millis(config.frame_millis))
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

/// Step and draw the burst once per frame for `frames` frames, then hide it.
pub async fn animate(
    mut burst: ParticleBurst,
    frames: u32,
    clock: &mut dyn FrameClock,
    port: &mut dyn RenderPort,
) {
    tracing::debug!(scope = ?burst.scope, particles = burst.particles.len(), frames, "Particle burst started");
    while burst.frame < frames {
        burst.step();
        port.particles(&burst.as_frame());
        if burst.frame < frames {
            clock.next_frame().await;
        }
    }
    port.particles_hidden(burst.scope);
}
