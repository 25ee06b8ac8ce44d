use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, Error>;
