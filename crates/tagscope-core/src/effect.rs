//! 展示层效果
//!
//! 命令执行成功后返回有序的效果列表，展示层按顺序应用到绘制表面上。
//! 核心不持有任何渲染句柄，也不计算具体位置。

use crate::entity::EntityId;
use crate::math::Vector2;
use crate::properties::{Color, OutlineState};

/// 重新显示实体时的定位参考
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// 放在参考实体附近（例如从包里取出的物品）
    Near(EntityId),
    /// 放在参考实体旁边，不与之重叠（例如从包上拆下的扫描器）
    Beside(EntityId),
    /// 相对参考实体偏移
    Offset { from: EntityId, offset: Vector2 },
}

impl Anchor {
    /// 参考实体
    pub fn reference(&self) -> EntityId {
        match self {
            Anchor::Near(id) | Anchor::Beside(id) => *id,
            Anchor::Offset { from, .. } => *from,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// 显示实体
    Show { entity: EntityId, anchor: Anchor },
    /// 隐藏实体
    Hide(EntityId),
    /// 修改轮廓
    SetOutline(EntityId, OutlineState),
    /// 显示名称已修改
    LabelChanged(EntityId, String),
    /// 颜色已修改
    Recolor(EntityId, Color),
    /// 实体已从注册表移除，展示层应删除对应图形
    Removed(EntityId),
}

impl Effect {
    /// 效果作用的实体
    pub fn entity(&self) -> EntityId {
        match self {
            Effect::Show { entity, .. } => *entity,
            Effect::Hide(id)
            | Effect::SetOutline(id, _)
            | Effect::LabelChanged(id, _)
            | Effect::Recolor(id, _)
            | Effect::Removed(id) => *id,
        }
    }
}
