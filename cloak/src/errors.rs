use crate::config::ValidationError;
use std::io;

#[derive(thiserror::Error, Debug)]
pub enum CloakError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid site configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}
