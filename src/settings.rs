use crate::draw::model::{Color, LineCap, SurfaceStyle};
use crate::draw::palette::{Palette, Swatch};
use crate::draw::save::DEFAULT_EXPORT_SUBDIR;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the evaluator base URL.
pub const API_URL_ENV: &str = "SKETCH_API_URL";
pub const CALCULATE_PATH: &str = "calculate";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output in addition to stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub line_cap: LineCap,
    /// Seconds before an outstanding `/calculate` request is abandoned.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Folder receiving saved snapshots.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Stroke color selected at startup, as `#rrggbb` or `rgb(r, g, b)`.
    #[serde(default)]
    pub default_swatch: Option<String>,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_stroke_width() -> u32 {
    3
}

fn default_background() -> Color {
    Color::BLACK
}

fn default_request_timeout() -> u64 {
    30
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_SUBDIR)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            stroke_width: default_stroke_width(),
            background: default_background(),
            line_cap: LineCap::default(),
            request_timeout_secs: default_request_timeout(),
            export_dir: default_export_dir(),
            default_swatch: None,
            window_size: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parse settings file {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn surface_style(&self) -> SurfaceStyle {
        if self.stroke_width == 0 {
            tracing::warn!("stroke_width of 0 is invalid; using {}", default_stroke_width());
        }
        SurfaceStyle {
            background: self.background,
            line_cap: self.line_cap,
            line_width: if self.stroke_width == 0 {
                default_stroke_width()
            } else {
                self.stroke_width
            },
        }
    }

    /// Resolves `default_swatch` against the palette. Unknown colors fall
    /// back to the palette default.
    pub fn initial_swatch(&self) -> Swatch {
        let fallback = Palette::default().current();
        match self.default_swatch.as_deref() {
            None => fallback,
            Some(text) => Swatch::parse(text).unwrap_or_else(|| {
                tracing::warn!(color = text, "default_swatch is not a palette color");
                fallback
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Location of the evaluation service, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: url::Url,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var(API_URL_ENV)
            .map_err(|_| anyhow!("{API_URL_ENV} must be set to the evaluator base URL"))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(anyhow!("{API_URL_ENV} is empty"));
        }
        let mut base_url =
            url::Url::parse(raw).with_context(|| format!("invalid {API_URL_ENV} value '{raw}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("{API_URL_ENV} '{raw}' cannot be used as a base URL"));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    pub fn calculate_url(&self) -> anyhow::Result<url::Url> {
        self.base_url
            .join(CALCULATE_PATH)
            .context("build calculate endpoint url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_url_preserves_base_path() {
        let config = ApiConfig::parse("http://localhost:8900/api").unwrap();
        assert_eq!(
            config.calculate_url().unwrap().as_str(),
            "http://localhost:8900/api/calculate"
        );

        let config = ApiConfig::parse("http://localhost:8900/").unwrap();
        assert_eq!(
            config.calculate_url().unwrap().as_str(),
            "http://localhost:8900/calculate"
        );
    }

    #[test]
    fn parse_rejects_empty_and_relative_values() {
        assert!(ApiConfig::parse("   ").is_err());
        assert!(ApiConfig::parse("localhost-without-scheme").is_err());
        assert!(ApiConfig::parse("mailto:someone@example.com").is_err());
    }

    #[test]
    fn zero_stroke_width_falls_back_to_default() {
        let settings = Settings {
            stroke_width: 0,
            ..Settings::default()
        };
        assert_eq!(settings.surface_style().line_width, 3);
    }

    #[test]
    fn initial_swatch_parses_palette_colors() {
        let with = |text: &str| Settings {
            default_swatch: Some(text.into()),
            ..Settings::default()
        };
        assert_eq!(Settings::default().initial_swatch(), Swatch::White);
        assert_eq!(with("#228be6").initial_swatch(), Swatch::Blue);
        assert_eq!(with("rgb(255, 0, 0)").initial_swatch(), Swatch::Red);
        assert_eq!(with("#123456").initial_swatch(), Swatch::White);
        assert_eq!(with("teal").initial_swatch(), Swatch::White);
    }
}
