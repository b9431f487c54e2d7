//! HTTP middleware
//!
//! Cross-cutting request handling: logging.

pub mod logging;
