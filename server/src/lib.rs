//! Local HTTP server that keeps a Kokoro pipeline warm and writes each
//! synthesized utterance to a temporary WAV file.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod handle;
pub mod routes;
pub mod synthesis;
pub mod validation;

pub use routes::{build_router, AppState};
