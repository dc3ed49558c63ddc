//! `headerguard` - Uniform include-guard naming for C/C++ header trees
//!
//! This library walks a directory of headers and prefixes the first
//! `#ifndef`/`#define` guard pair of every `.h`/`.hpp` file with a fixed
//! project tag, rewriting the files in place.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod rewriter;
pub mod walker;

pub use config::Config;
pub use error::{Error, Result};
pub use guard::{GuardChange, GuardRewriter, Rewrite};
pub use logging::init_logging;
pub use rewriter::{FileReport, HeaderRewriter, RunReport, WriteMode};
