//! Command handlers

pub mod config;
pub mod notes;
pub mod render;
