//! CLI command implementations

pub mod completions;
pub mod init;
pub mod lab;
pub mod mat;
pub mod validate;
pub mod work;
