//! Book Context - Entities

use serde::{Deserialize, Serialize};

use super::EntityKind;

/// 某一章节中对实体的描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDescription {
    pub chapter: usize,
    pub text: String,
}

/// 实体（人物 / 道具 / 地点）
///
/// 不变量:
/// - descriptions 始终按 chapter 升序排列（相同章节保持插入顺序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    kind: EntityKind,
    descriptions: Vec<ChapterDescription>,
    /// 无可用章节描述时的回退文本，可以为空
    summary: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            descriptions: Vec::new(),
            summary: String::new(),
        }
    }

    /// 追加一条章节描述
    ///
    /// 插入到所有 chapter <= 新章节的描述之后，等价于追加后稳定排序。
    pub fn add_description(&mut self, text: impl Into<String>, chapter: usize) {
        let position = self
            .descriptions
            .partition_point(|d| d.chapter <= chapter);
        self.descriptions.insert(
            position,
            ChapterDescription {
                chapter,
                text: text.into(),
            },
        );
    }

    /// 获取截至第 `chapter` 章为止最新的描述
    ///
    /// 返回 chapter 编号 `<= chapter` 的最后一条描述，之后章节的描述被忽略，
    /// 这样为第 N 章配图时不会用到后文才出现的外貌。都不满足时返回 summary。
    pub fn get_description_for_chapter(&self, chapter: usize) -> &str {
        self.descriptions
            .iter()
            .rev()
            .find(|d| d.chapter <= chapter)
            .map(|d| d.text.as_str())
            .unwrap_or(self.summary.as_str())
    }

    /// 吸收另一个实体的描述，然后按章节稳定排序
    ///
    /// `other` 不会被修改，由调用方负责丢弃。
    pub fn merge(&mut self, other: &Entity) {
        self.descriptions.extend(other.descriptions.iter().cloned());
        self.descriptions.sort_by_key(|d| d.chapter);
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn descriptions(&self) -> &[ChapterDescription] {
        &self.descriptions
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// 出现过描述的章节编号（升序，可能重复）
    pub fn chapters(&self) -> impl Iterator<Item = usize> + '_ {
        self.descriptions.iter().map(|d| d.chapter)
    }
}

/// 章节
///
/// 不变量:
/// - chapter_number 从 1 开始
/// - text 创建后不可修改
/// - entities 只保存实体名称，实体本身归 Book 的注册表所有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    chapter_number: usize,
    text: String,
    entities: Vec<String>,
}

impl Chapter {
    pub fn new(chapter_number: usize, text: impl Into<String>) -> Result<Self, &'static str> {
        if chapter_number == 0 {
            return Err("章节编号从 1 开始");
        }
        Ok(Self {
            chapter_number,
            text: text.into(),
            entities: Vec::new(),
        })
    }

    /// 以 0 起始的下标创建章节，章节编号为 index + 1
    pub(super) fn from_index(index: usize, text: impl Into<String>) -> Self {
        Self {
            chapter_number: index + 1,
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// 记录本章出现的实体（同名只记录一次）
    pub fn add_entity(&mut self, name: &str) {
        if !self.entities.iter().any(|n| n == name) {
            self.entities.push(name.to_string());
        }
    }

    /// 将对 `old` 的引用改写为 `new`，并去重
    pub(super) fn rename_entity(&mut self, old: &str, new: &str) {
        if !self.entities.iter().any(|n| n == old) {
            return;
        }
        let already_has_new = self.entities.iter().any(|n| n == new);
        if already_has_new {
            self.entities.retain(|n| n != old);
        } else if let Some(slot) = self.entities.iter_mut().find(|n| *n == old) {
            *slot = new.to_string();
        }
    }

    pub fn chapter_number(&self) -> usize {
        self.chapter_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entity_names(&self) -> &[String] {
        &self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_with(chapters: &[usize]) -> Entity {
        let mut entity = Entity::new("Ahab", EntityKind::Character);
        for chapter in chapters {
            entity.add_description(format!("ch{}", chapter), *chapter);
        }
        entity
    }

    #[test]
    fn test_description_as_of_chapter() {
        let mut entity = entity_with(&[2, 5, 9]);
        entity.set_summary("captain of the Pequod");

        assert_eq!(entity.get_description_for_chapter(1), "captain of the Pequod");
        assert_eq!(entity.get_description_for_chapter(2), "ch2");
        assert_eq!(entity.get_description_for_chapter(4), "ch2");
        assert_eq!(entity.get_description_for_chapter(5), "ch5");
        assert_eq!(entity.get_description_for_chapter(9), "ch9");
        assert_eq!(entity.get_description_for_chapter(12), "ch9");
    }

    #[test]
    fn test_empty_summary_fallback() {
        let entity = entity_with(&[3]);
        assert_eq!(entity.get_description_for_chapter(2), "");
    }

    #[test]
    fn test_add_description_keeps_order() {
        let entity = entity_with(&[5, 2, 9, 2]);
        let chapters: Vec<usize> = entity.chapters().collect();
        assert_eq!(chapters, vec![2, 2, 5, 9]);

        // 相同章节保持插入顺序，后插入的在后
        assert_eq!(entity.get_description_for_chapter(2), "ch2");
        assert_eq!(entity.descriptions()[0].text, "ch2");
    }

    #[test]
    fn test_same_chapter_latest_wins() {
        let mut entity = Entity::new("Ishmael", EntityKind::Character);
        entity.add_description("first", 1);
        entity.add_description("second", 1);
        assert_eq!(entity.get_description_for_chapter(1), "second");
    }

    #[test]
    fn test_merge_sorts_by_chapter() {
        let mut a = entity_with(&[2]);
        let mut b = Entity::new("The Old Man", EntityKind::Character);
        b.add_description("ch3", 3);
        b.add_description("ch1", 1);

        a.merge(&b);

        let chapters: Vec<usize> = a.chapters().collect();
        assert_eq!(chapters, vec![1, 2, 3]);
        // b 保持不变
        assert_eq!(b.descriptions().len(), 2);
    }

    #[test]
    fn test_merge_ties_keep_relative_order() {
        let mut a = Entity::new("a", EntityKind::Prop);
        a.add_description("a4", 4);
        let mut b = Entity::new("b", EntityKind::Prop);
        b.add_description("b4", 4);

        a.merge(&b);

        let texts: Vec<&str> = a.descriptions().iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["a4", "b4"]);
    }

    #[test]
    fn test_chapter_rejects_zero() {
        assert!(Chapter::new(0, "text").is_err());
        assert!(Chapter::new(1, "text").is_ok());
    }

    #[test]
    fn test_chapter_entities_deduplicated() {
        let mut chapter = Chapter::new(1, "text").unwrap();
        chapter.add_entity("Ahab");
        chapter.add_entity("Ahab");
        chapter.add_entity("Pequod");
        assert_eq!(chapter.entity_names(), &["Ahab".to_string(), "Pequod".to_string()]);
    }

    #[test]
    fn test_chapter_rename_entity() {
        let mut chapter = Chapter::new(1, "text").unwrap();
        chapter.add_entity("old");
        chapter.add_entity("other");
        chapter.rename_entity("old", "new");
        assert_eq!(chapter.entity_names(), &["new".to_string(), "other".to_string()]);

        let mut chapter = Chapter::new(2, "text").unwrap();
        chapter.add_entity("old");
        chapter.add_entity("new");
        chapter.rename_entity("old", "new");
        assert_eq!(chapter.entity_names(), &["new".to_string()]);
    }
}
