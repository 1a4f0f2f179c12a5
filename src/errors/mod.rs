//! Error types and error handling for the front end.
//!
//! This module defines the diagnostics produced while lexing and parsing:
//!
//! - Error structures with source position information
//! - Specific error variants for each failure the parser recovers from
//! - Error names and suggestions used when rendering diagnostics

pub mod errors;
