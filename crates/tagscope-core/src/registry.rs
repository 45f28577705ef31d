//! 实体注册表
//!
//! 会话内所有存活实体的竞技场。实体按标识符存放，同时记录注册顺序，
//! 用于确定性的列表展示和最近邻查询的平局裁决。

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::layout::Layout;
use crate::math::{distance, Point2};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Entity>,
    /// 注册顺序
    order: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册实体
    pub fn register(&mut self, entity: Entity) -> CoreResult<EntityId> {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return Err(CoreError::IdentifierUnavailable(id));
        }
        self.entities.insert(id, entity);
        self.order.push(id);
        Ok(id)
    }

    /// 注销实体
    pub fn unregister(&mut self, id: EntityId) -> CoreResult<Entity> {
        let entity = self.entities.remove(&id).ok_or(CoreError::NotFound(id))?;
        self.order.retain(|other| *other != id);
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> CoreResult<&Entity> {
        self.entities.get(&id).ok_or(CoreError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.entities.get_mut(&id).ok_or(CoreError::NotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// 按注册顺序遍历所有实体
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// 按注册顺序遍历未隐藏的实体
    pub fn visible(&self) -> impl Iterator<Item = &Entity> {
        self.all().filter(|entity| !entity.is_hidden())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 查找距离 `origin` 最近且满足条件的实体
    ///
    /// 只考虑距离严格小于 `max_distance` 的候选；没有布局信息的实体被跳过。
    /// 距离相同时先注册的实体优先。
    pub fn nearest<L, P>(
        &self,
        origin: Point2,
        layout: &L,
        predicate: P,
        max_distance: f64,
    ) -> Option<EntityId>
    where
        L: Layout + ?Sized,
        P: Fn(&Entity) -> bool,
    {
        let mut best: Option<(EntityId, f64)> = None;
        for entity in self.all().filter(|entity| predicate(entity)) {
            let Some(center) = layout.center(entity.id()) else {
                continue;
            };
            let dist = distance(&origin, &center);
            if dist >= max_distance {
                continue;
            }
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((entity.id(), dist));
            }
        }
        best.map(|(id, _)| id)
    }
}
