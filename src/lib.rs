//! `App On The Go` - simulated mobile build distribution
//!
//! Pick an app bundle, watch it "upload", and get AI generated release notes,
//! a security summary, marketing copy and a share link.

pub mod app;
pub mod bundle_search;
pub mod cli;
pub mod core;
pub mod fs;
pub mod tui;
