pub mod film;
pub mod mood;
pub mod quiz;
pub mod world;

pub use film::{Film, Loose};
pub use mood::{MoodEntry, MoodKey, MOODS};
pub use quiz::{Question, QuizOption, QuizResult, Recommendation, TraitTag, QUESTIONS};
pub use world::{Quote, WorldSnapshot};
