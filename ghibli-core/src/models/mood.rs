use std::fmt;
use std::str::FromStr;

use super::world::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodKey {
    Cozy,
    Adventure,
    Whimsical,
    Melancholy,
    Uplifting,
}

impl MoodKey {
    pub const ALL: [MoodKey; 5] = [
        MoodKey::Cozy,
        MoodKey::Adventure,
        MoodKey::Whimsical,
        MoodKey::Melancholy,
        MoodKey::Uplifting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodKey::Cozy => "cozy",
            MoodKey::Adventure => "adventure",
            MoodKey::Whimsical => "whimsical",
            MoodKey::Melancholy => "melancholy",
            MoodKey::Uplifting => "uplifting",
        }
    }

    pub fn entry(&self) -> &'static MoodEntry {
        match self {
            MoodKey::Cozy => &MOODS[0],
            MoodKey::Adventure => &MOODS[1],
            MoodKey::Whimsical => &MOODS[2],
            MoodKey::Melancholy => &MOODS[3],
            MoodKey::Uplifting => &MOODS[4],
        }
    }
}

impl fmt::Display for MoodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MoodKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("unknown mood: {}", s))
    }
}

/// Static copy, canonical picks and palette for one mood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodEntry {
    pub key: MoodKey,
    pub title: &'static str,
    pub blurb: &'static str,
    pub picks: [&'static str; 3],
    /// CSS-style gradient applied behind the oracle hero.
    pub palette: &'static str,
    pub quote: Option<StaticQuote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticQuote {
    pub text: &'static str,
    pub source: &'static str,
}

impl From<StaticQuote> for Quote {
    fn from(q: StaticQuote) -> Self {
        Quote::new(q.text, Some(q.source.to_string()))
    }
}

pub static MOODS: [MoodEntry; 5] = [
    MoodEntry {
        key: MoodKey::Cozy,
        title: "A blanket, some tea, and…",
        blurb: "Wholesome comfort stories full of warm kitchens, gentle friendships, and sleepy forest naps.",
        picks: ["My Neighbor Totoro", "Kiki's Delivery Service", "Whisper of the Heart"],
        palette: "linear-gradient(135deg, rgba(244,212,140,0.45), rgba(124,197,179,0.4))",
        quote: Some(StaticQuote {
            text: "Whenever someone creates something with all of their heart, then that creation is given a soul.",
            source: "The Cat Returns",
        }),
    },
    MoodEntry {
        key: MoodKey::Adventure,
        title: "Pack a satchel for adventure",
        blurb: "Airships, daring rescues, and windswept horizons await in these adventurous epics.",
        picks: ["Castle in the Sky", "Nausicaä of the Valley of the Wind", "Porco Rosso"],
        palette: "linear-gradient(135deg, rgba(148,183,226,0.55), rgba(124,197,179,0.45))",
        quote: Some(StaticQuote {
            text: "You cannot change fate. However, you can rise to meet it.",
            source: "Princess Mononoke",
        }),
    },
    MoodEntry {
        key: MoodKey::Whimsical,
        title: "Lose yourself in magic",
        blurb: "Slip into dreamlike worlds where trains run through the sea and castles roam the clouds.",
        picks: ["Spirited Away", "Howl's Moving Castle", "Ponyo"],
        palette: "linear-gradient(135deg, rgba(148,183,226,0.6), rgba(219,173,255,0.4))",
        quote: Some(StaticQuote {
            text: "Life is a winking light in the darkness.",
            source: "The Tale of the Princess Kaguya",
        }),
    },
    MoodEntry {
        key: MoodKey::Melancholy,
        title: "Bittersweet reflections",
        blurb: "Tender, thoughtful stories that linger with you long after the credits roll.",
        picks: ["When Marnie Was There", "Grave of the Fireflies", "The Wind Rises"],
        palette: "linear-gradient(135deg, rgba(148,183,226,0.4), rgba(102,119,163,0.45))",
        quote: Some(StaticQuote {
            text: "Nothing that happens is ever forgotten, even if you can’t remember it.",
            source: "Spirited Away",
        }),
    },
    MoodEntry {
        key: MoodKey::Uplifting,
        title: "Hope takes flight",
        blurb: "Optimistic tales that celebrate courage, community, and the kindness of small moments.",
        picks: ["From Up on Poppy Hill", "The Secret World of Arrietty", "The Tale of the Princess Kaguya"],
        palette: "linear-gradient(135deg, rgba(124,197,179,0.55), rgba(244,212,140,0.5))",
        quote: Some(StaticQuote {
            text: "Always believe in yourself. Do this and no matter where you are, you will have nothing to fear.",
            source: "The Cat Returns",
        }),
    },
];
