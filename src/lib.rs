//! `slideflow` - Beamer slide-deck build tool.
//!
//! This crate drives partial and full builds of Beamer lecture decks from a
//! `content.tex` source: page-band annotation, frame range extraction,
//! themed template assembly, and the `latexmk` compiler run.

// Re-export public modules for use in integration tests and as a library
pub mod bands;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod error;
pub mod frames;
pub mod range;
pub mod template;
pub mod titles;
