//! CLI subcommands.

pub mod common;
pub mod effects;
pub mod init;
pub mod modules;
pub mod process;
pub mod route;
pub mod validate;
