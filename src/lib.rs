//! Social post studio backed by Google's generative-language API
//!
//! Turns a post topic and an image description into a finished Facebook post
//! and a set of matching images, with templates, tone presets and image-prompt
//! suggestions along the way.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod prompts;
pub mod templates;

pub use error::{Error, Result};
