//! Tests for the app module.
//!
//! - `flow` - upload lifecycle, fallbacks and reset
//! - `helpers` - shared test utilities
//! - `input` - key bindings, paste handling and the bundle picker
//! - `integration` - startup from CLI arguments and full round trips
//! - `ui` - rendering of both screens and activity log scrolling

#[allow(clippy::unwrap_used, clippy::expect_used)]
pub mod helpers;
