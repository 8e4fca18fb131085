//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the text engine:
//! - Math types and operations
//! - Colour literal parsing
//! - Pooled collections
//! - Logging utilities

pub mod math;
pub mod color;
pub mod collections;
pub mod logging;
