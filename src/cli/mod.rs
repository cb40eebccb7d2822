//! CLI module for the sketchy-dataset tool
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{
    main, parse_bool, Cli, CliLogFormat, Command, EvaluateArgs, PrepareArgs, TripletArgs,
    DEFAULT_SOURCE_PHOTO_ROOT, DEFAULT_SOURCE_SKETCH_ROOT,
};
