//! Core types: configuration, errors, file-system glue

pub mod config;
pub mod error;
pub mod fsutil;
