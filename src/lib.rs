//! Uncertainty-aware explanation evaluation for length-of-stay prediction from clinical notes.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod explain;
pub mod llm;
pub mod logging;
pub mod model;
pub mod nlp;

pub use error::{LosError, Result};
