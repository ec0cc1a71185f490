//! Application Commands - 登录流程命令及处理器

pub mod handlers;
mod login_commands;

pub use login_commands::*;
