use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::GhibliError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GhibliConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Retries for the startup snapshot fetches. Quiz submission never retries.
    pub max_retries: usize,
    /// Wait before the first retry; each later retry doubles it, up to 5s.
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
    /// Hex colour painted behind the keepsake, e.g. `#f0f6f9`.
    pub background: String,
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            background: "#f0f6f9".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnimationConfig {
    pub particles: usize,
    pub frames: u32,
    pub frame_millis: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            particles: 80,
            frames: 180,
            frame_millis: 16,
        }
    }
}

impl GhibliConfig {
    /// Load `path` if it exists, then apply `GHIBLI_`-prefixed environment
    /// overrides (`GHIBLI_API__BASE_URL=...`).
    pub fn load(path: &str) -> Result<Self, GhibliError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("GHIBLI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(s.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GhibliConfig::load("definitely-not-here.toml").unwrap();
        assert_eq!(config.api.max_retries, 2);
        assert_eq!(config.animation.particles, 80);
        assert_eq!(config.animation.frames, 180);
        assert_eq!(config.export.background, "#f0f6f9");
    }

    #[test]
    fn file_sections_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://films.local\"\ntimeout_seconds = 3\nmax_retries = 0\nretry_delay_ms = 5\n\n[animation]\nparticles = 10\nframes = 20\nframe_millis = 1"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = GhibliConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "http://films.local");
        assert_eq!(config.api.max_retries, 0);
        assert_eq!(config.animation.particles, 10);
        // Untouched section keeps its defaults
        assert_eq!(config.export.output_dir, ".");
    }

    #[test]
    fn mistyped_value_is_a_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[animation]\nparticles = \"lots\"").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let err = GhibliConfig::load(&path).unwrap_err();
        assert!(matches!(err, GhibliError::Config(_)));
    }
}
