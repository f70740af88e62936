//! Argument parsing and reporting for the `satlp` binary.

pub(crate) mod cli;
