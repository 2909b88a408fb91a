use thiserror::Error;

pub type ScrollResult<T> = Result<T, ScrollError>;

#[derive(Debug, Error)]
pub enum ScrollError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
