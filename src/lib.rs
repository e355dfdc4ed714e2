//! HTMLx: a markup compiler that turns brace- or indentation-structured
//! source into an HTML page with a source map, a stylesheet and a client
//! script.
//!
//! [`compiler`] holds the pure, synchronous core. [`build`] and [`config`]
//! drive it over a project directory.

pub mod build;
pub mod compiler;
pub mod config;
mod util;

pub use compiler::{Bundle, CompileError, CompileOptions, compile};
