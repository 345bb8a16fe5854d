use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("PIN hashing error: {0}")]
    PinHash(String),
}
