use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("container daemon error: {0}")]
    Daemon(String),
    #[error("invalid resource limits")]
    InvalidLimits,
    #[error("container image not available: {0}")]
    ImageMissing(String),
}

impl From<bollard::errors::Error> for EngineError {
    fn from(err: bollard::errors::Error) -> Self {
        if let bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } = err
        {
            return EngineError::ImageMissing(err.to_string());
        }
        EngineError::Daemon(err.to_string())
    }
}
