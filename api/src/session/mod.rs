//! Per-browser conversation state.
//!
//! A session holds the processed document, the conversation over it and the
//! transcript. Sessions live in a [`SessionRegistry`] keyed by a cookie; each
//! one sits behind its own mutex so a browser's interactions run one at a time.
//! Idle sessions expire and the registry is capped, evicting the least
//! recently used.

mod cookie;
mod process;
mod registry;
mod state;
mod transcript;
mod turn;

pub use cookie::{SESSION_COOKIE, session_cookie, session_id_from_headers};
pub use process::{DONE_PROCESSING, ProcessReport, process_document};
pub use registry::{SessionLimits, SessionRegistry};
pub use state::Session;
pub use transcript::Transcript;
pub use turn::{TurnOutcome, handle_turn};
