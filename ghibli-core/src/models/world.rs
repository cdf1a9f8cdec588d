use serde::{Deserialize, Serialize};

/// A quote as found in the world snapshot. The backend uses either `text`
/// or `quote` for the body, occasionally both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Quote {
    pub fn new(text: impl Into<String>, source: Option<String>) -> Self {
        Self {
            text: Some(text.into()),
            quote: None,
            source,
        }
    }

    /// `text` if non-empty, else `quote`, else the empty string.
    pub fn body(&self) -> &str {
        [self.text.as_deref(), self.quote.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Body wrapped in curly quotes unless it already opens with one.
    pub fn display_text(&self) -> String {
        let text = self.body();
        if text.starts_with('“') {
            text.to_string()
        } else {
            format!("“{}”", text)
        }
    }

    /// Source prefixed with an em dash unless it already carries one.
    pub fn display_source(&self) -> Option<String> {
        let src = self.source.as_deref()?.trim();
        if src.is_empty() {
            return None;
        }
        if src.starts_with('—') {
            Some(src.to_string())
        } else {
            Some(format!("— {}", src))
        }
    }
}

/// Subset of `GET /api/world` the client consumes. Everything else in the
/// payload (timeline, averages) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_accepts_both_body_keys() {
        let world: WorldSnapshot = serde_json::from_str(
            r#"{
                "counts": {"films": 22},
                "quotes": [
                    {"quote": "See with eyes unclouded by hate.", "source": "Princess Mononoke"},
                    {"text": "Life is a winking light in the darkness."}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(world.quotes.len(), 2);
        assert_eq!(world.quotes[0].body(), "See with eyes unclouded by hate.");
        assert_eq!(world.quotes[1].body(), "Life is a winking light in the darkness.");
        assert!(world.quotes[1].source.is_none());
    }

    #[test]
    fn quote_with_both_keys_prefers_text() {
        let world: WorldSnapshot = serde_json::from_str(
            r#"{"quotes": [{"text": "from text", "quote": "from quote", "source": "Ponyo"}]}"#,
        )
        .unwrap();
        assert_eq!(world.quotes[0].body(), "from text");

        let q = Quote {
            text: Some("  ".to_string()),
            quote: Some("fallback body".to_string()),
            source: None,
        };
        assert_eq!(q.body(), "fallback body");
    }

    #[test]
    fn quote_without_body_keeps_the_snapshot() {
        let world: WorldSnapshot = serde_json::from_str(
            r#"{"quotes": [
                {"source": "Nobody"},
                {"text": null, "quote": null},
                {"quote": "Still here.", "source": "Kiki"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(world.quotes.len(), 3);
        assert_eq!(world.quotes[0].body(), "");
        assert_eq!(world.quotes[1].body(), "");
        assert_eq!(world.quotes[2].display_text(), "“Still here.”");
    }

    #[test]
    fn display_helpers_do_not_double_wrap() {
        let q = Quote::new("“Already quoted”", Some("— Spirited Away".to_string()));
        assert_eq!(q.display_text(), "“Already quoted”");
        assert_eq!(q.display_source().as_deref(), Some("— Spirited Away"));

        let q = Quote::new("Plain", Some("Ponyo".to_string()));
        assert_eq!(q.display_text(), "“Plain”");
        assert_eq!(q.display_source().as_deref(), Some("— Ponyo"));
    }
}
