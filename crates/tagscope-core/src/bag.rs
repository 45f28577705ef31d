//! 包的开合状态机和物品收纳
//!
//! 包初始为关闭状态。只有放入物品和挂接/拆卸扫描器受开合状态限制，
//! 关闭装有物品的包不会把物品取出。

use crate::effect::{Anchor, Effect};
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::session::Session;
use tracing::debug;

impl Session {
    /// 打开包（已打开时无效果）
    pub fn open(&mut self, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag = self.bag_mut(bag_id)?;
        if !bag.is_open {
            bag.is_open = true;
            debug!("{} opened", bag_id);
        }
        Ok(Vec::new())
    }

    /// 关闭包（已关闭时无效果）
    pub fn close(&mut self, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag = self.bag_mut(bag_id)?;
        if bag.is_open {
            bag.is_open = false;
            debug!("{} closed", bag_id);
        }
        Ok(Vec::new())
    }

    /// 修改容量，不能小于当前物品数
    pub fn set_max_items(&mut self, bag_id: EntityId, max_items: usize) -> CoreResult<()> {
        let bag = self.bag_mut(bag_id)?;
        if max_items < bag.items.len() {
            return Err(CoreError::InvalidCapacity {
                bag: bag_id,
                requested: max_items,
                current: bag.items.len(),
            });
        }
        bag.max_items = max_items;
        Ok(())
    }

    /// 把物品放进包里
    ///
    /// 物品被隐藏；如果包上挂着扫描器且物品带有标签，扫描器记录该标签的 RFID。
    pub fn add_item(&mut self, bag_id: EntityId, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag = self.bag(bag_id)?;
        let item = self.item(item_id)?;
        if !bag.is_open() {
            return Err(CoreError::ClosedContainer(bag_id));
        }
        if bag.is_full() {
            return Err(CoreError::CapacityExceeded {
                bag: bag_id,
                max_items: bag.max_items(),
            });
        }
        if let Some(holder) = item.bag() {
            return Err(CoreError::AlreadyContained {
                item: item_id,
                bag: holder,
            });
        }
        let scanner = bag.attached_scanner();
        let rfid = item.rfid().map(str::to_string);

        self.bag_mut(bag_id)?.items.push(item_id);
        self.item_mut(item_id)?.bag = Some(bag_id);
        self.set_hidden(item_id, true)?;
        debug!("{} added to {}", item_id, bag_id);

        if let (Some(scanner_id), Some(rfid)) = (scanner, rfid) {
            self.scanner_mut(scanner_id)?.ledger.record(&rfid, bag_id);
            debug!("{} scanned {} via {}", scanner_id, rfid, bag_id);
        }

        Ok(vec![Effect::Hide(item_id)])
    }

    /// 从包里取出物品，物品重新显示在包附近
    ///
    /// 挂接的扫描器撤销该物品标签的记录，包里其他物品的记录不变。
    pub fn remove_item(&mut self, bag_id: EntityId, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag = self.bag(bag_id)?;
        let rfid = self.item(item_id)?.rfid().map(str::to_string);
        let Some(index) = bag.items().iter().position(|id| *id == item_id) else {
            return Err(CoreError::NotContained {
                item: item_id,
                bag: bag_id,
            });
        };

        self.bag_mut(bag_id)?.items.remove(index);
        self.item_mut(item_id)?.bag = None;
        self.set_hidden(item_id, false)?;
        debug!("{} removed from {}", item_id, bag_id);

        if let Some(rfid) = rfid {
            self.unscan(bag_id, &rfid)?;
        }

        Ok(vec![Effect::Show {
            entity: item_id,
            anchor: Anchor::Near(bag_id),
        }])
    }

    /// 取出包里的所有物品
    pub fn remove_all_items(&mut self, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let snapshot = self.bag(bag_id)?.items().to_vec();
        let mut effects = Vec::with_capacity(snapshot.len());
        for item_id in snapshot {
            effects.extend(self.remove_item(bag_id, item_id)?);
        }
        Ok(effects)
    }

    /// 从包这一侧挂接扫描器
    pub fn add_scanner(&mut self, bag_id: EntityId, scanner_id: EntityId) -> CoreResult<Vec<Effect>> {
        self.attach_scanner(scanner_id, bag_id)
    }

    /// 从包这一侧拆下扫描器，没有挂接时无效果
    pub fn remove_scanner(&mut self, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        match self.bag(bag_id)?.attached_scanner() {
            Some(scanner_id) => self.detach_scanner(scanner_id),
            None => Ok(Vec::new()),
        }
    }

    /// 撤销包上挂接的扫描器对 `rfid` 的记录（物品离开包或标签离开物品时）
    pub(crate) fn unscan(&mut self, bag_id: EntityId, rfid: &str) -> CoreResult<()> {
        let Some(scanner_id) = self.bag(bag_id)?.attached_scanner() else {
            return Ok(());
        };
        if self.scanner_mut(scanner_id)?.ledger.forget(rfid, bag_id) {
            debug!("{} dropped {} for {}", scanner_id, rfid, bag_id);
        }
        Ok(())
    }
}
