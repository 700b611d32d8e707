//! HTML templates for the todo page.
//!
//! Templates are embedded at compile time using `include_str!` and filled in
//! with plain `{{placeholder}}` substitution.

/// The single-page layout: sidebar form plus the todo panel.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");
