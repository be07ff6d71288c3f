//! Error types for the reconfigure registry.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parameter name cannot be empty")]
    EmptyName,

    #[error("parameter '{0}' is already registered")]
    DuplicateName(String),

    #[error("reconfigure channel closed")]
    ChannelClosed,
}
