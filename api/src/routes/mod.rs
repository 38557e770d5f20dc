//! HTTP handlers. HTML routes render the page; `/api/*` routes return the
//! JSON envelope.

pub mod ask;
pub mod current_session;
pub mod document;
pub mod health;
pub mod index;
pub mod page;
pub mod process;
pub mod session;
