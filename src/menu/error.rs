use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Failed to read menu definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON menu definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML menu definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported menu file format: '{0}'")]
    UnsupportedFormat(String),
}
