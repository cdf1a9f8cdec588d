//! ghibli-world — terminal companion for the Ghibli World catalog
//!
//! # Subcommands
//! - `quiz [--answers calm,kind,...] [--export]` — personality quiz
//! - `oracle [--mood cozy]`                        — mood oracle suggestions
//! - `movies [--search text] [--filter rt90]`      — filtered film grid
//! - `status`                                      — backend snapshot summary

mod terminal;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ghibli_core::explorer::{filter_films, GridCard, GridFilter, EMPTY_MESSAGE};
use ghibli_core::models::{MoodKey, TraitTag};
use ghibli_core::particles::IntervalClock;
use ghibli_core::quiz::Phase;
use ghibli_core::{
    CatalogSnapshot, Exporter, GhibliApi, GhibliConfig, HttpGhibliApi, OracleSession,
    QuizController, QuizEvent, RenderPort,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{fmt, EnvFilter};

use crate::terminal::TerminalRenderer;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "ghibli-world",
    version,
    about = "Ghibli World in the terminal: personality quiz, mood oracle and film grid"
)]
struct Cli {
    /// Config file (TOML). Missing files fall back to defaults.
    #[arg(short, long, default_value = "ghibli.toml")]
    config: String,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "GHIBLI_API_URL")]
    server: Option<String>,

    /// Skip particle animations
    #[arg(long)]
    no_animation: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Take the personality quiz
    Quiz {
        /// Answer every question up front, comma separated (e.g. calm,kind,calm,calm,calm,kind)
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<String>>,

        /// Save the result as a PNG keepsake
        #[arg(long)]
        export: bool,
    },

    /// Ask the oracle for films matching a mood
    Oracle {
        /// cozy, adventure, whimsical, melancholy or uplifting
        #[arg(short, long, default_value = "cozy")]
        mood: String,
    },

    /// List films, optionally filtered
    Movies {
        /// Case-insensitive text search over title, description, director and year
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, rt90, classic or modern
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Output the matching films as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the backend currently serves
    Status,
}

// ============================================================================
// Quiz
// ============================================================================

fn parse_answers(raw: &[String]) -> anyhow::Result<Vec<TraitTag>> {
    raw.iter()
        .map(|s| s.parse::<TraitTag>().map_err(anyhow::Error::msg))
        .collect()
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    use std::io::Write;
    print!("> ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_lowercase()))
}

/// Map a typed line to a wizard event for the current question.
fn parse_command(line: &str, controller: &QuizController) -> Option<QuizEvent> {
    match line {
        "b" | "back" => Some(QuizEvent::Retreat),
        "n" | "next" | "" => Some(QuizEvent::Advance),
        other => {
            let index: usize = other.parse().ok()?;
            let question = controller.session().current_question()?;
            let option = question.options.get(index.checked_sub(1)?)?;
            Some(QuizEvent::Select(option.tag))
        }
    }
}

async fn run_quiz(
    config: &GhibliConfig,
    api: Arc<dyn GhibliApi>,
    answers: Option<Vec<String>>,
    export: bool,
    port: &mut TerminalRenderer,
) -> anyhow::Result<()> {
    let clock = IntervalClock::from_config(&config.animation);
    let mut controller = QuizController::new(api, config.animation.clone(), Box::new(clock));

    let exporter = Exporter::from_config(config)?;

    if let Some(raw) = answers {
        let tags = parse_answers(&raw)?;
        if tags.len() != controller.session().question_count() {
            anyhow::bail!(
                "expected {} answers, got {}",
                controller.session().question_count(),
                tags.len()
            );
        }
        for tag in tags {
            controller.dispatch(QuizEvent::Select(tag), port).await;
            controller.dispatch(QuizEvent::Advance, port).await;
        }
        if controller.session().current_step().is_some() {
            anyhow::bail!("answers do not match the options offered by each question");
        }
        if export && controller.session().result().is_some() {
            // Alerts already reported the failure; the exit code carries it too.
            let path = controller.export(&exporter, port).await?;
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    controller.render(port);
    loop {
        match controller.session().phase() {
            Phase::Answering { .. } => {
                let Some(line) = read_line(&mut lines).await? else {
                    return Ok(());
                };
                match parse_command(&line, &controller) {
                    Some(event) => controller.dispatch(event, port).await,
                    None => println!("Type 1-4 to pick, n for next, b for back."),
                }
            }
            // dispatch() awaits the submission, so the loop never observes this phase
            Phase::Submitting => anyhow::bail!("quiz stopped while submitting"),
            Phase::Result(_) | Phase::Error => {
                let can_export = controller.export_control().enabled;
                if can_export {
                    println!("[d] {}  [r] Retry  [q] Quit", controller.export_control().label);
                } else {
                    println!("[r] Retry  [q] Quit");
                }
                let Some(line) = read_line(&mut lines).await? else {
                    return Ok(());
                };
                match line.as_str() {
                    "d" if can_export => {
                        if let Ok(path) = controller.export(&exporter, port).await {
                            println!("Saved {}", path.display());
                        }
                    }
                    "r" | "retry" => controller.dispatch(QuizEvent::Reset, port).await,
                    "q" | "quit" => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

// ============================================================================
// Oracle / Movies / Status
// ============================================================================

async fn run_oracle(
    config: &GhibliConfig,
    api: &dyn GhibliApi,
    mood: &str,
    port: &mut dyn RenderPort,
) -> anyhow::Result<()> {
    let catalog = CatalogSnapshot::load(api, &config.api).await;
    let clock = IntervalClock::from_config(&config.animation);
    let mut oracle = OracleSession::new(catalog, config.animation.clone(), Box::new(clock));

    match mood.parse::<MoodKey>() {
        Ok(key) => {
            oracle.select_mood(key);
            oracle.generate(port).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unknown mood");
            oracle.show_idle(port);
        }
    }
    Ok(())
}

async fn run_movies(
    config: &GhibliConfig,
    api: &dyn GhibliApi,
    search: &str,
    filter: &str,
    json: bool,
) -> anyhow::Result<()> {
    let filter: GridFilter = filter.parse().map_err(anyhow::Error::msg)?;
    let catalog = CatalogSnapshot::load(api, &config.api).await;
    let films = filter_films(catalog.films(), search, filter);

    if json {
        let films: Vec<_> = films.into_iter().cloned().collect();
        println!("{}", serde_json::to_string_pretty(&films)?);
        return Ok(());
    }

    if films.is_empty() {
        println!("{}", EMPTY_MESSAGE);
        return Ok(());
    }
    for film in films {
        let card = GridCard::from(film);
        println!("✦ {}", card.title);
        if !card.chips.is_empty() {
            println!("  {}", card.chips.join(" | "));
        }
        if !card.description.is_empty() {
            println!("  {}", card.description);
        }
        println!();
    }
    Ok(())
}

async fn run_status(config: &GhibliConfig, api: &HttpGhibliApi) -> anyhow::Result<()> {
    let catalog = CatalogSnapshot::load(api, &config.api).await;
    println!("Backend:  {}", api.base_url());
    println!("Films:    {}", catalog.films().len());
    match catalog.world() {
        Some(world) => println!("Quotes:   {}", world.quotes.len()),
        None => println!("Quotes:   unavailable"),
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let mut config = GhibliConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(server) = cli.server {
        config.api.base_url = server;
    }

    let api = Arc::new(HttpGhibliApi::new(&config.api)?);
    let mut port = TerminalRenderer {
        quiet_particles: cli.no_animation,
    };

    match cli.command {
        Commands::Quiz { answers, export } => {
            run_quiz(&config, api, answers, export, &mut port).await
        }
        Commands::Oracle { mood } => run_oracle(&config, &*api, &mood, &mut port).await,
        Commands::Movies {
            search,
            filter,
            json,
        } => run_movies(&config, &*api, &search, &filter, json).await,
        Commands::Status => run_status(&config, &api).await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ghibli_core::config::AnimationConfig;
    use ghibli_core::particles::FrameClock;

    struct NoWait;

    #[async_trait::async_trait]
    impl FrameClock for NoWait {
        async fn next_frame(&mut self) {}
    }

    fn controller() -> QuizController {
        let api = Arc::new(HttpGhibliApi::new(&Default::default()).unwrap());
        QuizController::new(api, AnimationConfig::default(), Box::new(NoWait))
    }

    #[test]
    fn answers_parse_in_order() {
        let raw: Vec<String> = ["calm", "Kind", " brave "].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            parse_answers(&raw).unwrap(),
            vec![TraitTag::Calm, TraitTag::Kind, TraitTag::Brave]
        );
        assert!(parse_answers(&["nope".to_string()]).is_err());
    }

    #[test]
    fn typed_numbers_select_current_options() {
        let c = controller();
        assert_eq!(parse_command("1", &c), Some(QuizEvent::Select(TraitTag::Calm)));
        assert_eq!(parse_command("4", &c), Some(QuizEvent::Select(TraitTag::Mysterious)));
        assert_eq!(parse_command("0", &c), None);
        assert_eq!(parse_command("5", &c), None);
        assert_eq!(parse_command("b", &c), Some(QuizEvent::Retreat));
        assert_eq!(parse_command("", &c), Some(QuizEvent::Advance));
    }
}
