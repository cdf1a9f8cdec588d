//! Keepsake export: rasterize the result view to a PNG once every image in
//! it has either loaded or failed.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use image::{ImageFormat, Rgba, RgbaImage};
use reqwest::Client;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::{ExportConfig, GhibliConfig};
use crate::error::GhibliError;
use crate::models::QuizResult;
use crate::render::{ExportControl, RenderPort, ResultView};

pub const UNSUPPORTED_MESSAGE: &str = "Image capture not supported right now.";
pub const FAILED_MESSAGE: &str = "Could not create an image. Please try again.";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No result to export")]
    NothingToExport,

    #[error("Image capture is not available")]
    Unsupported,

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Loaded,
    Failed,
}

/// Resolves once a single image has settled, either way.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn settle(&self, src: &str) -> ImageState;
}

/// Rasterizes a result view.
#[async_trait]
pub trait Capture: Send + Sync {
    async fn capture(&self, view: &ResultView) -> Result<RgbaImage, ExportError>;
}

/// Wait for every image in `view`. Each image settles independently; with
/// no images this returns immediately.
pub async fn wait_for_images(view: &ResultView, probe: &dyn ImageProbe) -> Vec<ImageState> {
    let sources = view.image_sources();
    if sources.is_empty() {
        return Vec::new();
    }
    join_all(sources.into_iter().map(|src| probe.settle(src))).await
}

/// `ghibli-world-<type or "result">.png`, with path separators replaced.
pub fn file_name(result: &QuizResult) -> String {
    let kind = result
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or("result");
    let kind: String = kind
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!("ghibli-world-{}.png", kind)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub struct Exporter {
    capture: Option<Arc<dyn Capture>>,
    probe: Arc<dyn ImageProbe>,
    output_dir: PathBuf,
}

impl Exporter {
    /// `capture` is `None` when no rasterizer is available; exports are then refused.
    pub fn new(
        capture: Option<Arc<dyn Capture>>,
        probe: Arc<dyn ImageProbe>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            capture,
            probe,
            output_dir: output_dir.into(),
        }
    }

    /// The binary's exporter: block rasterizer on the configured background,
    /// HTTP image probe sharing the backend timeout.
    pub fn from_config(config: &GhibliConfig) -> Result<Self, GhibliError> {
        let probe = HttpImageProbe::new(Duration::from_secs(config.api.timeout_seconds))
            .map_err(ApiError::from)?;
        let capture: Arc<dyn Capture> = Arc::new(BlockCapture::new(&config.export));
        Ok(Self::new(Some(capture), Arc::new(probe), &config.export.output_dir))
    }

    /// Export `result` to `<output_dir>/ghibli-world-<type>.png`.
    ///
    /// The control is disabled and relabelled while running and restored
    /// afterwards whatever the outcome. Failures raise an alert on `port`.
    pub async fn export(
        &self,
        result: &QuizResult,
        control: &mut ExportControl,
        port: &mut dyn RenderPort,
    ) -> Result<PathBuf, ExportError> {
        let capture = match &self.capture {
            Some(capture) => capture.clone(),
            None => {
                tracing::warn!("Export refused: no capture capability");
                port.alert(UNSUPPORTED_MESSAGE);
                return Err(ExportError::Unsupported);
            }
        };

        let original = control.clone();
        control.enabled = false;
        control.label = ExportControl::BUSY_LABEL.to_string();
        port.export_control(control);

        let outcome = self.run(result, capture.as_ref()).await;

        *control = original;
        port.export_control(control);

        match outcome {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Keepsake exported");
                Ok(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to capture result");
                port.alert(FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    async fn run(&self, result: &QuizResult, capture: &dyn Capture) -> Result<PathBuf, ExportError> {
        let view = ResultView::from_result(result);
        let states = wait_for_images(&view, self.probe.as_ref()).await;
        let failed = states.iter().filter(|s| **s == ImageState::Failed).count();
        if failed > 0 {
            tracing::debug!(failed, total = states.len(), "Some images failed to load");
        }

        let image = capture.capture(&view).await?;
        let png = encode_png(&image)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(file_name(result));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

/// Probes images over HTTP; any transport error or non-success status counts
/// as a failed image.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn settle(&self, src: &str) -> ImageState {
        match self.client.get(src).send().await {
            Ok(r) if r.status().is_success() => match r.bytes().await {
                Ok(_) => ImageState::Loaded,
                Err(_) => ImageState::Failed,
            },
            Ok(r) => {
                tracing::debug!(src, status = r.status().as_u16(), "Image failed to load");
                ImageState::Failed
            }
            Err(e) => {
                tracing::debug!(src, error = %e, "Image failed to load");
                ImageState::Failed
            }
        }
    }
}

/// Block-layout rasterizer: paints the keepsake card as coloured panels
/// (header, avatar, quote band, one tile per recommendation) on the
/// configured background.
#[derive(Debug, Clone)]
pub struct BlockCapture {
    background: Rgba<u8>,
    scale: f32,
}

const CARD_WIDTH: u32 = 600;
const HEADER_HEIGHT: u32 = 160;
const QUOTE_HEIGHT: u32 = 60;
const TILE_SIZE: u32 = 180;
const GAP: u32 = 15;
const TILES_PER_ROW: u32 = 3;

const HEADER_COLOR: Rgba<u8> = Rgba([162, 205, 176, 255]);
const AVATAR_COLOR: Rgba<u8> = Rgba([247, 225, 174, 255]);
const QUOTE_COLOR: Rgba<u8> = Rgba([255, 209, 220, 255]);
const TILE_COLOR: Rgba<u8> = Rgba([158, 208, 255, 255]);

/// Parse `#rrggbb`.
pub fn parse_hex_color(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

impl BlockCapture {
    pub fn new(config: &ExportConfig) -> Self {
        let background = parse_hex_color(&config.background).unwrap_or_else(|| {
            tracing::warn!(background = %config.background, "Invalid export background, using default");
            Rgba([240, 246, 249, 255])
        });
        Self {
            background,
            scale: config.scale.clamp(1.0, 2.0),
        }
    }

    fn layout_height(view: &ResultView) -> u32 {
        let mut height = GAP + HEADER_HEIGHT + GAP;
        if view.quote.is_some() {
            height += QUOTE_HEIGHT + GAP;
        }
        if let Some(section) = &view.recommendations {
            let rows = (section.cards.len() as u32).div_ceil(TILES_PER_ROW);
            height += rows * (TILE_SIZE + GAP);
        }
        height
    }

    fn fill(&self, img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let s = self.scale;
        let (x0, y0) = ((x as f32 * s) as u32, (y as f32 * s) as u32);
        let (x1, y1) = (
            (((x + w) as f32 * s) as u32).min(img.width()),
            (((y + h) as f32 * s) as u32).min(img.height()),
        );
        for py in y0..y1 {
            for px in x0..x1 {
                img.put_pixel(px, py, color);
            }
        }
    }
}

#[async_trait]
impl Capture for BlockCapture {
    async fn capture(&self, view: &ResultView) -> Result<RgbaImage, ExportError> {
        let width = (CARD_WIDTH as f32 * self.scale) as u32;
        let height = (Self::layout_height(view) as f32 * self.scale) as u32;
        let mut img = RgbaImage::from_pixel(width, height, self.background);

        let mut y = GAP;
        self.fill(&mut img, GAP, y, CARD_WIDTH - 2 * GAP, HEADER_HEIGHT, HEADER_COLOR);
        if view.avatar.is_some() {
            self.fill(&mut img, 2 * GAP, y + GAP, HEADER_HEIGHT - 2 * GAP, HEADER_HEIGHT - 2 * GAP, AVATAR_COLOR);
        }
        y += HEADER_HEIGHT + GAP;

        if view.quote.is_some() {
            self.fill(&mut img, GAP, y, CARD_WIDTH - 2 * GAP, QUOTE_HEIGHT, QUOTE_COLOR);
            y += QUOTE_HEIGHT + GAP;
        }

        if let Some(section) = &view.recommendations {
            for (i, _) in section.cards.iter().enumerate() {
                let i = i as u32;
                let col = i % TILES_PER_ROW;
                let row = i / TILES_PER_ROW;
                self.fill(
                    &mut img,
                    GAP + col * (TILE_SIZE + GAP),
                    y + row * (TILE_SIZE + GAP),
                    TILE_SIZE,
                    TILE_SIZE,
                    TILE_COLOR,
                );
            }
        }

        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recommendation;
    use crate::testing::RecordingPort;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageProbe for CountingProbe {
        async fn settle(&self, _src: &str) -> ImageState {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                ImageState::Failed
            } else {
                ImageState::Loaded
            }
        }
    }

    fn probe(fail: bool) -> Arc<CountingProbe> {
        Arc::new(CountingProbe {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    struct BrokenCapture;

    #[async_trait]
    impl Capture for BrokenCapture {
        async fn capture(&self, _view: &ResultView) -> Result<RgbaImage, ExportError> {
            Err(ExportError::Capture("canvas tainted".to_string()))
        }
    }

    fn block_capture() -> Option<Arc<dyn Capture>> {
        Some(Arc::new(BlockCapture::new(&ExportConfig::default())))
    }

    #[test]
    fn file_name_uses_type_or_result() {
        let mut result = QuizResult::default();
        assert_eq!(file_name(&result), "ghibli-world-result.png");
        result.kind = Some("totoro".to_string());
        assert_eq!(file_name(&result), "ghibli-world-totoro.png");
        result.kind = Some("../evil".to_string());
        assert_eq!(file_name(&result), "ghibli-world-..-evil.png");
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#f0f6f9"), Some(Rgba([240, 246, 249, 255])));
        assert_eq!(parse_hex_color("f0f6f9"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[tokio::test]
    async fn export_without_images_completes_and_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let probe = probe(false);
        let exporter = Exporter::new(block_capture(), probe.clone(), dir.path());
        let result = QuizResult {
            kind: Some("kiki".to_string()),
            name: Some("Kiki".to_string()),
            ..Default::default()
        };
        let mut control = ExportControl::ready();
        let mut port = RecordingPort::default();

        let path = exporter.export(&result, &mut control, &mut port).await.unwrap();

        assert_eq!(path, dir.path().join("ghibli-world-kiki.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(control, ExportControl::ready());
        assert!(port.alerts.is_empty());
        assert_eq!(port.controls[0].label, ExportControl::BUSY_LABEL);
        assert!(!port.controls[0].enabled);
    }

    #[tokio::test]
    async fn export_waits_for_every_image_even_failed_ones() {
        let dir = tempfile::tempdir().unwrap();
        let probe = probe(true);
        let exporter = Exporter::new(block_capture(), probe.clone(), dir.path());
        let result = QuizResult {
            image: Some("https://img/avatar.png".to_string()),
            recommended: Some(vec![
                Recommendation {
                    title: Some("Ponyo".to_string()),
                    image: Some("https://img/ponyo.png".to_string()),
                    ..Default::default()
                };
                4
            ]),
            ..Default::default()
        };
        let mut control = ExportControl::ready();
        let mut port = RecordingPort::default();

        let path = exporter.export(&result, &mut control, &mut port).await.unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 5);

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), CARD_WIDTH);
        // Header, no quote band, two rows of tiles
        assert_eq!(decoded.height(), GAP + HEADER_HEIGHT + GAP + 2 * (TILE_SIZE + GAP));
    }

    #[tokio::test]
    async fn configured_exporter_writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GhibliConfig::default();
        config.export.output_dir = dir.path().join("keepsakes").to_string_lossy().into_owned();
        let exporter = Exporter::from_config(&config).unwrap();
        let result = QuizResult {
            kind: Some("howl".to_string()),
            quote: Some("A heart's a heavy burden.".to_string()),
            ..Default::default()
        };
        let mut control = ExportControl::ready();
        let mut port = RecordingPort::default();

        let path = exporter.export(&result, &mut control, &mut port).await.unwrap();

        assert_eq!(path, dir.path().join("keepsakes").join("ghibli-world-howl.png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.height(), GAP + HEADER_HEIGHT + GAP + QUOTE_HEIGHT + GAP);
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([240, 246, 249, 255]));
    }

    #[tokio::test]
    async fn export_without_capture_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(None, probe(false), dir.path());
        let mut control = ExportControl::ready();
        let mut port = RecordingPort::default();

        let err = exporter
            .export(&QuizResult::default(), &mut control, &mut port)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Unsupported));
        assert_eq!(port.alerts, vec![UNSUPPORTED_MESSAGE]);
        assert_eq!(control, ExportControl::ready());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn capture_failure_alerts_and_restores_control() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Some(Arc::new(BrokenCapture)), probe(false), dir.path());
        let mut control = ExportControl::ready();
        let mut port = RecordingPort::default();

        let err = exporter
            .export(&QuizResult::default(), &mut control, &mut port)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
        assert_eq!(port.alerts, vec![FAILED_MESSAGE]);
        assert_eq!(control, ExportControl::ready());
        assert_eq!(port.controls.last(), Some(&ExportControl::ready()));
    }
}
