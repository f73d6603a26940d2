//! # Sleuth UI
//!
//! A single web page: enter a topic, run the research pipeline, read the
//! sections, download the report as a PDF.

pub mod page;
pub mod server;
pub mod session;

pub use server::{AppState, SESSION_COOKIE, SharedState, app_router, run};
pub use session::SessionStore;
