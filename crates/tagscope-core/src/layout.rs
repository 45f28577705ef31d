//! 位置访问接口
//!
//! 实体的位置和尺寸归展示层所有，核心只在最近邻查询中读取。

use crate::entity::EntityId;
use crate::math::{BoundingBox2, Point2, Vector2};
use std::collections::HashMap;

/// 由展示层实现的位置访问器
pub trait Layout {
    /// 实体的包围盒，尚未布局时返回 `None`
    fn bounds(&self, id: EntityId) -> Option<BoundingBox2>;

    /// 实体的中心点
    fn center(&self, id: EntityId) -> Option<Point2> {
        self.bounds(id).map(|bounds| bounds.center())
    }
}

/// 基于哈希表的简单布局
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    bounds: HashMap<EntityId, BoundingBox2>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以中心点放置实体
    pub fn place(&mut self, id: EntityId, center: Point2, width: f64, height: f64) {
        self.bounds
            .insert(id, BoundingBox2::from_center(center, width, height));
    }

    /// 移动到新的中心点，保持尺寸；未布局的实体返回 `false`
    pub fn move_to(&mut self, id: EntityId, center: Point2) -> bool {
        match self.bounds.get_mut(&id) {
            Some(bounds) => {
                *bounds = BoundingBox2::from_center(center, bounds.width(), bounds.height());
                true
            }
            None => false,
        }
    }

    /// 平移
    pub fn translate(&mut self, id: EntityId, offset: Vector2) -> bool {
        match self.bounds.get_mut(&id) {
            Some(bounds) => {
                *bounds = bounds.translated(offset);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<BoundingBox2> {
        self.bounds.remove(&id)
    }
}

impl Layout for StaticLayout {
    fn bounds(&self, id: EntityId) -> Option<BoundingBox2> {
        self.bounds.get(&id).copied()
    }
}
