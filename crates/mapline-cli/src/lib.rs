//! Command-line front end for mapline.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;
pub mod summary;
