//! Terminal adapter for the render port.

use std::io::Write;

use ghibli_core::particles::BurstScope;
use ghibli_core::render::{
    ExportControl, OracleView, ParticleFrame, RenderPort, ResultView, WizardView,
};

const SPARKLE_COLUMNS: usize = 60;

/// Writes views to stdout; particle frames become a one-line sparkle strip on stderr.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    /// Suppresses particle output (pipes, `--no-animation`).
    pub quiet_particles: bool,
}

impl TerminalRenderer {
    fn result(view: &ResultView) {
        println!();
        if let Some(avatar) = &view.avatar {
            println!("  [{}]({})", avatar.alt, avatar.src);
        }
        println!("  ✦ {}", view.title);
        if let Some(film) = &view.subtitle {
            println!("    {}", film);
        }
        if let Some(quote) = &view.quote {
            println!("    {}", quote);
        }
        if let Some(section) = &view.recommendations {
            println!();
            println!("  {}", section.heading);
            for card in &section.cards {
                match &card.meta {
                    Some(meta) => println!("   • {} ({})", card.title, meta),
                    None => println!("   • {}", card.title),
                }
            }
        }
        println!();
    }
}

impl RenderPort for TerminalRenderer {
    fn wizard(&mut self, view: &WizardView) {
        match view {
            WizardView::Question(q) => {
                println!();
                println!("Question {}/{}: {}", q.step_number, q.total, q.prompt);
                for (i, option) in q.options.iter().enumerate() {
                    let marker = if option.selected { "●" } else { "○" };
                    println!("  {} {}. {}", marker, i + 1, option.label);
                }
                let back = if q.show_back { "[b] Back  " } else { "" };
                let next = if q.advance_enabled {
                    format!("[n] {}", q.advance_label)
                } else {
                    format!("({}: pick an option first)", q.advance_label)
                };
                println!("  {}{}", back, next);
            }
            WizardView::Submitting => println!("Asking the spirits…"),
            WizardView::Result(result) => Self::result(result),
            WizardView::Error { message } => println!("{}", message),
        }
    }

    fn oracle(&mut self, view: &OracleView) {
        match view {
            OracleView::Idle { message } => println!("{}", message),
            OracleView::Suggestion {
                title,
                blurb,
                cards,
                quote,
                ..
            } => {
                println!();
                println!("{}", title);
                println!("{}", blurb);
                for card in cards {
                    println!();
                    println!("  ✦ {}", card.title);
                    if !card.description.is_empty() {
                        println!("    {}", card.description);
                    }
                    if !card.chips.is_empty() {
                        println!("    {}", card.chips.join(" | "));
                    }
                }
                if let Some(quote) = quote {
                    println!();
                    println!("  {}", quote.text);
                    if let Some(source) = &quote.source {
                        println!("    {}", source);
                    }
                }
                println!();
            }
        }
    }

    fn export_control(&mut self, control: &ExportControl) {
        tracing::debug!(enabled = control.enabled, label = %control.label, "Export control updated");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("! {}", message);
    }

    fn particles(&mut self, frame: &ParticleFrame<'_>) {
        if self.quiet_particles || frame.width <= 0.0 {
            return;
        }
        let mut row = vec![' '; SPARKLE_COLUMNS];
        for p in frame.particles.iter().filter(|p| p.y >= 0.0 && p.y <= frame.height) {
            let col = ((p.x / frame.width) * SPARKLE_COLUMNS as f32) as isize;
            if (0..SPARKLE_COLUMNS as isize).contains(&col) {
                row[col as usize] = '*';
            }
        }
        let line: String = row.into_iter().collect();
        eprint!("\r{}", line);
        let _ = std::io::stderr().flush();
    }

    fn particles_hidden(&mut self, scope: BurstScope) {
        if self.quiet_particles {
            return;
        }
        tracing::debug!(?scope, "Particle burst finished");
        eprint!("\r{}\r", " ".repeat(SPARKLE_COLUMNS));
        let _ = std::io::stderr().flush();
    }
}
