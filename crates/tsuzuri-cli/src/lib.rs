//! Library half of `tzctl`: key-spec parsing and the subcommand bodies.

pub mod commands;
pub mod keyspec;
