use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A value the backend may send either as a number or as a string
/// (`"1988"`, `1988`, `"unknown"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    /// Leading-integer parse, so `"124 min"` yields 124 and `"n/a"` yields None.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Loose::Int(v) => Some(*v),
            Loose::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Loose::Float(_) => None,
            Loose::Text(s) => {
                let s = s.trim();
                let end = s
                    .char_indices()
                    .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
                    .map(|(i, _)| i)
                    .unwrap_or(s.len());
                s[..end].parse().ok()
            }
        }
    }

    /// Empty strings count as absent, matching how the page treats falsy values.
    pub fn is_blank(&self) -> bool {
        matches!(self, Loose::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Loose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loose::Int(v) => write!(f, "{}", v),
            Loose::Float(v) => write!(f, "{}", v),
            Loose::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of the Catalog Snapshot as served by `GET /api/movies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Film {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub year: Option<Loose>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub rt_score: Option<Loose>,
    #[serde(default)]
    pub running_time: Option<Loose>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub movie_banner: Option<String>,
}

/// The backend sends `null` for records upstream left without a title or
/// description; treat it like a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

fn present_loose(v: &Option<Loose>) -> Option<&Loose> {
    v.as_ref().filter(|l| !l.is_blank())
}

impl Film {
    /// First non-empty of `image`, `poster`, `movie_banner`.
    pub fn image_url(&self) -> Option<&str> {
        present(&self.image)
            .or_else(|| present(&self.poster))
            .or_else(|| present(&self.movie_banner))
    }

    pub fn director(&self) -> Option<&str> {
        present(&self.director)
    }

    pub fn year(&self) -> Option<&Loose> {
        present_loose(&self.year)
    }

    pub fn rt_score(&self) -> Option<&Loose> {
        present_loose(&self.rt_score)
    }

    pub fn running_time(&self) -> Option<&Loose> {
        present_loose(&self.running_time)
    }

    /// Display chips shown under a film card: year, director, score, runtime.
    pub fn chips(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if let Some(year) = self.year() {
            chips.push(year.to_string());
        }
        if let Some(director) = self.director() {
            chips.push(format!("Director: {}", director));
        }
        if let Some(score) = self.rt_score() {
            chips.push(format!("RT {}", score));
        }
        if let Some(runtime) = self.running_time() {
            chips.push(format!("{} min", runtime));
        }
        chips
    }
}

/// Cut `text` to at most `max` characters, appending `…` when something was dropped.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
