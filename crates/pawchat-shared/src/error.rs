use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Handle is empty")]
    Empty,

    #[error("Handle contains an invalid character: {0:?}")]
    InvalidChar(char),

    #[error("Handle cannot be {0:?}")]
    DotSegment(String),
}
