//! 描述记录
//!
//! 提取 / 合并 / 场景提示三类协作方之间交换的结构化记录。
//! 字段缺失时取默认值；名称为空的条目在解码边界被拒绝。

use serde::{Deserialize, Serialize};

use super::book::EntityKind;

/// 单个命名实体的描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NamedDescription {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// 描述记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRecord {
    #[serde(default)]
    pub characters: Vec<NamedDescription>,
    #[serde(default)]
    pub locations: Vec<NamedDescription>,
    #[serde(default)]
    pub props: Vec<NamedDescription>,
    #[serde(default)]
    pub artstyle: String,
}

impl DescriptionRecord {
    /// 离线模式下使用的固定记录
    pub fn canned() -> Self {
        Self {
            characters: vec![NamedDescription::new(
                "The Captain",
                "A sea captain with a rugged face, gray beard and deep-set blue eyes, \
                 wearing a weathered tricorn hat and a dark blue coat.",
            )],
            locations: vec![NamedDescription::new(
                "The Ship",
                "A wooden whaling ship with a worn deck, tall masts and patched sails.",
            )],
            props: vec![NamedDescription::new(
                "Harpoon",
                "A long iron harpoon with a barbed head and a rope-wrapped wooden shaft.",
            )],
            artstyle: "Oil painting".to_string(),
        }
    }

    /// 按 characters, props, locations 顺序遍历所有条目
    pub fn entries(&self) -> impl Iterator<Item = (EntityKind, &NamedDescription)> {
        self.characters
            .iter()
            .map(|d| (EntityKind::Character, d))
            .chain(self.props.iter().map(|d| (EntityKind::Prop, d)))
            .chain(self.locations.iter().map(|d| (EntityKind::Location, d)))
    }

    pub fn entry_count(&self) -> usize {
        self.characters.len() + self.locations.len() + self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0 && self.artstyle.is_empty()
    }

    /// 校验记录：所有条目名称不能为空
    pub fn validate(&self) -> Result<(), String> {
        for (kind, entry) in self.entries() {
            if entry.name.trim().is_empty() {
                return Err(format!("{} entry with empty name", kind.as_str()));
            }
        }
        Ok(())
    }
}
