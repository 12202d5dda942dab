//! Domain Layer - 领域层
//!
//! 包含:
//! - Book Context: 书籍、章节与实体时间线
//! - 描述记录: 与外部协作方交换的结构化数据
//! - 分节器: 章节原文切分

pub mod book;
pub mod description;

mod sectioner;

pub use description::{DescriptionRecord, NamedDescription};
pub use sectioner::{
    split_into_sections, split_into_sections_default, SectionConfig, DEFAULT_MAX_SECTION_CHARS,
};
