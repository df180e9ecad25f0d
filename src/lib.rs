//! Corex - comment extraction for code review
//!
//! Corex pulls comments out of Python, C, C++, CUDA and Objective-C++ sources and
//! pairs each one with the code it describes, ready for a downstream quality check.
//! Comment syntax is recognized by a lexical scanner, so comment markers inside string
//! literals, `#if 0` blocks, raw strings and docstrings are all handled correctly.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (scanner, aggregation, context association, records)

pub mod cli;
pub mod config;
pub mod core;
