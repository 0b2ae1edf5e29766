//! # Engine Module
//!
//! Shared machinery for running the preparation pipeline.
//!
//! - **Configuration** ([`config`]) - Deployment settings and their builder
//! - **Error Handling** ([`error`]) - The pipeline error taxonomy
//! - **Progress Monitoring** ([`progress`]) - Stage and task events for front ends
//! - **State Tracking** ([`state`]) - Pipeline stages and terminal outcomes
//! - **External Tools** ([`tools`]) - Structured, blocking invocation of external programs

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub mod tools;
