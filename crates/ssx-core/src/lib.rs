pub mod combine;
pub mod config;
pub mod error;
pub mod filter_dose;
pub mod find_hits;
pub mod split_sequence;

pub use error::{ErrorKind, Result, SsxError};
