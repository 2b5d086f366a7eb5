//! cam2ascii library crate.
//!
//! Streams a V4L2 camera to the terminal as ASCII art. The modules are
//! exposed for the binary and for integration testing.

pub mod ascii;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod quit;
pub mod shutdown;
pub mod terminal;
