//! Command Handlers 实现

mod book_handlers;
mod pipeline_handlers;

pub use book_handlers::*;
pub use pipeline_handlers::*;
