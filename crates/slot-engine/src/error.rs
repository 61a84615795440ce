//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid availability table: {0}")]
    InvalidTable(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Malformed feed: {0}")]
    FeedFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A time slot must be selected for {location} (specialty {specialty})")]
    SlotRequired { location: String, specialty: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
