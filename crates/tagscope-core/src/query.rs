//! 附着建议查询
//!
//! 为上下文菜单中的"附着到 X"/"放入包 Y"提供候选。查询是当前状态的纯函数，
//! 不缓存结果。

use crate::entity::EntityId;
use crate::error::CoreResult;
use crate::layout::Layout;
use crate::session::Session;

impl Session {
    /// 离标签最近、尚未附着标签的可见物品
    pub fn nearest_item_for_tag<L: Layout + ?Sized>(
        &self,
        tag_id: EntityId,
        layout: &L,
    ) -> CoreResult<Option<EntityId>> {
        if self.tag(tag_id)?.attached_item().is_some() {
            return Ok(None);
        }
        let Some(origin) = layout.center(tag_id) else {
            return Ok(None);
        };
        Ok(self.registry().nearest(
            origin,
            layout,
            |entity| {
                !entity.is_hidden()
                    && entity
                        .as_item()
                        .is_some_and(|item| item.attached_tag().is_none())
            },
            self.config().radii.tag_to_item,
        ))
    }

    /// 离扫描器最近的包（不论开合，挂接时才要求打开）
    pub fn nearest_bag_for_scanner<L: Layout + ?Sized>(
        &self,
        scanner_id: EntityId,
        layout: &L,
    ) -> CoreResult<Option<EntityId>> {
        if self.scanner(scanner_id)?.attached_bag().is_some() {
            return Ok(None);
        }
        let Some(origin) = layout.center(scanner_id) else {
            return Ok(None);
        };
        Ok(self.registry().nearest(
            origin,
            layout,
            |entity| entity.as_bag().is_some(),
            self.config().radii.scanner_to_bag,
        ))
    }

    /// 离物品最近的打开的包
    pub fn nearest_open_bag_for_item<L: Layout + ?Sized>(
        &self,
        item_id: EntityId,
        layout: &L,
    ) -> CoreResult<Option<EntityId>> {
        if self.item(item_id)?.bag().is_some() {
            return Ok(None);
        }
        let Some(origin) = layout.center(item_id) else {
            return Ok(None);
        };
        Ok(self.registry().nearest(
            origin,
            layout,
            |entity| entity.as_bag().is_some_and(|bag| bag.is_open()),
            self.config().radii.item_to_bag,
        ))
    }
}
