use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config value `{key}`: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
