use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trait tag attached to every quiz option and accumulated into the answer vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitTag {
    Calm,
    Curious,
    Romantic,
    Mysterious,
    Kind,
    Brave,
    Determined,
}

impl TraitTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitTag::Calm => "calm",
            TraitTag::Curious => "curious",
            TraitTag::Romantic => "romantic",
            TraitTag::Mysterious => "mysterious",
            TraitTag::Kind => "kind",
            TraitTag::Brave => "brave",
            TraitTag::Determined => "determined",
        }
    }
}

impl fmt::Display for TraitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Ok(TraitTag::Calm),
            "curious" => Ok(TraitTag::Curious),
            "romantic" => Ok(TraitTag::Romantic),
            "mysterious" => Ok(TraitTag::Mysterious),
            "kind" => Ok(TraitTag::Kind),
            "brave" => Ok(TraitTag::Brave),
            "determined" => Ok(TraitTag::Determined),
            other => Err(format!("unknown trait tag: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOption {
    pub label: &'static str,
    pub tag: TraitTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: [QuizOption; 4],
}

impl Question {
    pub fn offers(&self, tag: TraitTag) -> bool {
        self.options.iter().any(|o| o.tag == tag)
    }
}

const fn opt(label: &'static str, tag: TraitTag) -> QuizOption {
    QuizOption { label, tag }
}

pub static QUESTIONS: [Question; 6] = [
    Question {
        prompt: "Pick a cozy setting:",
        options: [
            opt("Mossy forest path", TraitTag::Calm),
            opt("Windy seaside cliff", TraitTag::Curious),
            opt("Floating above the town", TraitTag::Romantic),
            opt("Hidden alley with lanterns", TraitTag::Mysterious),
        ],
    },
    Question {
        prompt: "What calls to you right now?",
        options: [
            opt("A small adventure", TraitTag::Curious),
            opt("Helping someone quietly", TraitTag::Kind),
            opt("Trying something a bit scary", TraitTag::Brave),
            opt("Finishing a promise", TraitTag::Determined),
        ],
    },
    Question {
        prompt: "Pick a companion:",
        options: [
            opt("Forest spirit", TraitTag::Calm),
            opt("Talking cat", TraitTag::Curious),
            opt("Fire demon", TraitTag::Romantic),
            opt("Soot sprite", TraitTag::Mysterious),
        ],
    },
    Question {
        prompt: "A sound you love:",
        options: [
            opt("Bamboo leaves in the wind", TraitTag::Calm),
            opt("Waves and gulls", TraitTag::Curious),
            opt("Distant music", TraitTag::Romantic),
            opt("Night city hum", TraitTag::Determined),
        ],
    },
    Question {
        prompt: "Choose a treat:",
        options: [
            opt("Steamy onigiri", TraitTag::Kind),
            opt("Warm bread from a tiny bakery", TraitTag::Romantic),
            opt("Street food under paper lanterns", TraitTag::Curious),
            opt("Tea on a porch in the rain", TraitTag::Calm),
        ],
    },
    Question {
        prompt: "What energy do you want to carry this week?",
        options: [
            opt("Gentle and steady", TraitTag::Kind),
            opt("Brave and bright", TraitTag::Brave),
            opt("Curious and open", TraitTag::Curious),
            opt("Dreamy and warm", TraitTag::Romantic),
        ],
    },
];

/// A film summary inside a quiz result. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<super::Loose>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Response of `POST /api/quiz`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub film: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub film_image: Option<String>,
    #[serde(default)]
    pub recommended: Option<Vec<Recommendation>>,
}

impl QuizResult {
    pub fn recommendations(&self) -> &[Recommendation] {
        self.recommended.as_deref().unwrap_or(&[])
    }

    /// Avatar falls back from `image` to `film_image`.
    pub fn avatar(&self) -> Option<&str> {
        self.image
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.film_image.as_deref().filter(|s| !s.is_empty()))
    }
}
