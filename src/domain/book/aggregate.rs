//! Book Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookError, BookId, Chapter, Entity, EntityRegistry, Title};
use crate::domain::description::DescriptionRecord;

/// Book 聚合根
///
/// 不变量:
/// - 全局实体表中名称唯一
/// - chapters 按插入顺序即章节顺序，允许重复的章节编号
/// - 章节只按名称引用实体，实体归全局实体表所有
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: Title,
    chapters: Vec<Chapter>,
    global_entities: EntityRegistry,
    created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(title: Title) -> Self {
        Self {
            id: BookId::new(),
            title,
            chapters: Vec::new(),
            global_entities: EntityRegistry::new(),
            created_at: Utc::now(),
        }
    }

    /// 从章节原文创建书籍，章节编号按顺序从 1 开始
    pub fn from_chapter_texts<I, S>(title: Title, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut book = Self::new(title);
        for (index, text) in texts.into_iter().enumerate() {
            book.chapters.push(Chapter::from_index(index, text));
        }
        book
    }

    /// 追加章节（不检查章节编号是否重复）
    pub fn add_chapter(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    /// 注册全局实体，同名时替换并返回旧实体
    pub fn add_global_entity(&mut self, entity: Entity) -> Option<Entity> {
        self.global_entities.insert_or_replace(entity)
    }

    /// 获取某章节出现的全部实体
    ///
    /// 按章节顺序拼接所有编号为 `chapter_number` 的章节的实体；
    /// 已不在全局实体表中的名称被跳过。
    pub fn get_entities_for_chapter(&self, chapter_number: usize) -> Vec<&Entity> {
        self.chapters
            .iter()
            .filter(|c| c.chapter_number() == chapter_number)
            .flat_map(|c| c.entity_names())
            .filter_map(|name| self.global_entities.get(name))
            .collect()
    }

    /// 将 `old_name` 合并进 `new_name`，然后从全局实体表移除 `old_name`
    ///
    /// 任一名称不存在时返回 `EntityNotFound`，实体表保持不变。
    /// 章节中对 `old_name` 的引用会改写为 `new_name`。
    pub fn merge_entities(&mut self, old_name: &str, new_name: &str) -> Result<(), BookError> {
        for name in [old_name, new_name] {
            if !self.global_entities.contains(name) {
                return Err(BookError::EntityNotFound(name.to_string()));
            }
        }
        if old_name == new_name {
            return Ok(());
        }

        let old = self
            .global_entities
            .remove(old_name)
            .ok_or_else(|| BookError::EntityNotFound(old_name.to_string()))?;
        let target = self
            .global_entities
            .get_mut(new_name)
            .ok_or_else(|| BookError::EntityNotFound(new_name.to_string()))?;
        target.merge(&old);

        for chapter in &mut self.chapters {
            chapter.rename_entity(old_name, new_name);
        }

        tracing::debug!(
            old = %old_name,
            new = %new_name,
            merged_descriptions = old.descriptions().len(),
            "Entities merged"
        );

        Ok(())
    }

    /// 将一章的描述记录写入实体时间线
    ///
    /// 首次出现的名称会创建新实体；所有条目都记入该章节的实体列表。
    pub fn record_chapter_record(
        &mut self,
        chapter_number: usize,
        record: &DescriptionRecord,
    ) -> Result<(), BookError> {
        let chapter = self
            .chapters
            .iter_mut()
            .find(|c| c.chapter_number() == chapter_number)
            .ok_or_else(|| BookError::InvalidChapter(chapter_number.to_string()))?;

        for (kind, entry) in record.entries() {
            self.global_entities
                .get_or_insert(&entry.name, kind)
                .add_description(entry.description.clone(), chapter_number);
            chapter.add_entity(&entry.name);
        }

        Ok(())
    }

    /// 用最终合并记录设置实体的 summary
    ///
    /// 只在最终记录中出现的名称会以空时间线创建。
    pub fn apply_summaries(&mut self, record: &DescriptionRecord) {
        for (kind, entry) in record.entries() {
            self.global_entities
                .get_or_insert(&entry.name, kind)
                .set_summary(entry.description.clone());
        }
    }

    // Getters
    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn global_entities(&self) -> &EntityRegistry {
        &self.global_entities
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.global_entities.get(name)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
