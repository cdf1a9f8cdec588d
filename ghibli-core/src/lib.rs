pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod explorer;
pub mod export;
pub mod models;
pub mod oracle;
pub mod particles;
pub mod quiz;
pub mod render;

#[cfg(test)]
mod testing;

pub use api::{ApiError, GhibliApi, HttpGhibliApi};
pub use catalog::{normalize, CatalogSnapshot};
pub use config::GhibliConfig;
pub use error::GhibliError;
pub use export::{BlockCapture, Capture, ExportError, Exporter, HttpImageProbe, ImageProbe};
pub use oracle::OracleSession;
pub use quiz::{QuizController, QuizEvent, QuizSession};
pub use render::RenderPort;
