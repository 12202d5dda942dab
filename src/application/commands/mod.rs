//! 应用层 - 命令
//!
//! 书籍读取、处理与结果保存

mod book_commands;

pub mod handlers;

pub use book_commands::*;
