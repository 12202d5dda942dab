//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 书籍聚合管理
//! - 章节与实体时间线
//! - 全局实体表（按名称唯一）

mod aggregate;
mod entities;
mod errors;
mod registry;
mod value_objects;

pub use aggregate::Book;
pub use entities::{Chapter, ChapterDescription, Entity};
pub use errors::BookError;
pub use registry::EntityRegistry;
pub use value_objects::{BookId, EntityKind, Title};
