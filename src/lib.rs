// src/lib.rs
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod util;
pub mod relation;

pub mod ingest;
pub mod tree_view;

pub mod sparql;
pub mod config;
pub mod commands;
