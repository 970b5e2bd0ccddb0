/**
 * Paths Module
 *
 * Unified path management for configuration and persisted settings.
 */
mod app_dirs;

pub use app_dirs::*;
