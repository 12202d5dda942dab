//! Entity Registry - 书籍全局实体表
//!
//! 以实体名称为唯一键。同名注册采用 last-write-wins：
//! 新实体替换旧实体，旧实体作为返回值交给调用方。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入实体；同名时替换并返回被替换的实体
    pub fn insert_or_replace(&mut self, entity: Entity) -> Option<Entity> {
        let replaced = self.entities.insert(entity.name().to_string(), entity);
        if let Some(previous) = &replaced {
            tracing::warn!(
                name = %previous.name(),
                dropped_descriptions = previous.descriptions().len(),
                "Entity replaced in registry"
            );
        }
        replaced
    }

    /// 获取实体，不存在时用给定类别创建
    pub fn get_or_insert(&mut self, name: &str, kind: EntityKind) -> &mut Entity {
        self.entities
            .entry(name.to_string())
            .or_insert_with(|| Entity::new(name, kind))
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.entities.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// 按名称排序的实体名列表
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
