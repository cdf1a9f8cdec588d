use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhibliError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("API error: {0}")]
    Api(#[from] crate::api::ApiError),
}
