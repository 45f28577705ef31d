//! 级联删除
//!
//! 删除包会连带删除包里的物品及其标签；挂接的扫描器只被拆下，不会删除。
//! 所有删除路径都先解除关系、再注销实体并归还标识符。

use crate::effect::Effect;
use crate::entity::{EntityId, EntityKind};
use crate::error::CoreResult;
use crate::session::Session;
use tracing::debug;

impl Session {
    /// 删除实体
    pub fn delete(&mut self, id: EntityId) -> CoreResult<Vec<Effect>> {
        match self.get(id)?.kind() {
            EntityKind::Bag => self.delete_bag(id),
            EntityKind::Item => self.delete_item(id),
            EntityKind::Tag => self.delete_tag(id),
            EntityKind::Scanner => self.delete_scanner(id),
        }
    }

    fn delete_bag(&mut self, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag = self.bag(bag_id)?;
        let items = bag.items().to_vec();
        let scanner = bag.attached_scanner();
        let mut effects = Vec::new();

        for item_id in items {
            if let Some(tag_id) = self.item(item_id)?.attached_tag() {
                self.release_tag(tag_id, item_id)?;
                effects.push(self.discard(tag_id)?);
            }
            effects.push(self.discard(item_id)?);
        }

        if let Some(scanner_id) = scanner {
            effects.extend(self.release_scanner(scanner_id, bag_id)?);
        }

        // 标识符即将被回收，清除所有扫描器上该包的贡献
        let scanners: Vec<EntityId> = self
            .all()
            .filter(|entity| entity.as_scanner().is_some())
            .map(|entity| entity.id())
            .collect();
        for scanner_id in scanners {
            let dropped = self.scanner_mut(scanner_id)?.ledger.purge(bag_id);
            if !dropped.is_empty() {
                debug!("{} forgot {:?} from deleted {}", scanner_id, dropped, bag_id);
            }
        }

        effects.push(self.discard(bag_id)?);
        Ok(effects)
    }

    fn delete_item(&mut self, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        let item = self.item(item_id)?;
        let holder = item.bag();
        let tag = item.attached_tag();
        let mut effects = Vec::new();

        if let Some(tag_id) = tag {
            effects.extend(self.release_tag(tag_id, item_id)?);
        }
        if let Some(bag_id) = holder {
            // 标签的扫描记录已在拆下标签时撤销
            self.bag_mut(bag_id)?.items.retain(|id| *id != item_id);
        }

        effects.push(self.discard(item_id)?);
        Ok(effects)
    }

    fn delete_tag(&mut self, tag_id: EntityId) -> CoreResult<Vec<Effect>> {
        if let Some(item_id) = self.tag(tag_id)?.attached_item() {
            // 标签随即被移除，不需要重新显示
            self.release_tag(tag_id, item_id)?;
        }
        Ok(vec![self.discard(tag_id)?])
    }

    fn delete_scanner(&mut self, scanner_id: EntityId) -> CoreResult<Vec<Effect>> {
        if let Some(bag_id) = self.scanner(scanner_id)?.attached_bag() {
            self.bag_mut(bag_id)?.attached_scanner = None;
        }
        Ok(vec![self.discard(scanner_id)?])
    }
}
