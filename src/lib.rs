#![doc = include_str!("../README.md")]

pub mod commands;
pub mod easy;
pub mod mac;
pub mod models;
pub mod parser;
pub mod session;
pub mod ssh;
pub mod statistics;
pub mod tree;
pub mod utilities;
pub mod walker;

pub use session::*;
pub use tree::*;
pub use walker::*;
