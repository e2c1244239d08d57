//! Reference key/value backend.
//!
//! Wires one catch-all route over an injected storage collaborator and
//! implements the four operation handlers with real storage I/O.

pub mod backend;
pub mod handlers;
pub mod telemetry;

pub use backend::{KvBackend, BACKEND_HELP};
