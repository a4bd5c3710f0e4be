use crate::finder;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("serializer inference error: {0}")]
    SerializerInference(#[from] finder::Error),
}
