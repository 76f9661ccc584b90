//! Note ingestion and artefact export.

pub mod export;
pub mod notes;

pub use notes::{load_notes, Note, NoteColumns};
