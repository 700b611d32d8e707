//! Web presentation layer.
//!
//! Serves the todo page, turns form submissions into store calls and
//! redirects back to a freshly queried page after every write.

mod render;
mod server;
pub mod templates;

pub use render::{FormState, Notice, html_escape, render_page};
pub use server::{ServerHandle, TodoListResponse, build_router, start_server};
