//! 配置管理
//!
//! 静态配置来自 `config.toml`、按环境的覆盖文件以及环境变量。

mod r#impl;
mod structs;

pub use structs::*;
