//! 一对一附着关系：标签↔物品、扫描器↔包
//!
//! 两端的指针总是同时设置、同时清除。所有检查在修改之前完成，
//! 失败的调用不会留下半修改的状态。

use crate::effect::{Anchor, Effect};
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::session::Session;
use tracing::debug;

impl Session {
    /// 把标签附着到物品上，标签随之隐藏
    pub fn attach_tag(&mut self, tag_id: EntityId, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        let tag = self.tag(tag_id)?;
        let item = self.item(item_id)?;
        if tag.attached_item().is_some() {
            return Err(CoreError::AlreadyAttached(tag_id));
        }
        if item.attached_tag().is_some() {
            return Err(CoreError::AlreadyAttached(item_id));
        }
        let rfid = tag.rfid().to_string();

        self.tag_mut(tag_id)?.attached_item = Some(item_id);
        let item = self.item_mut(item_id)?;
        item.attached_tag = Some(tag_id);
        item.rfid = Some(rfid);
        self.set_hidden(tag_id, true)?;
        debug!("{} attached to {}", tag_id, item_id);

        Ok(vec![Effect::Hide(tag_id)])
    }

    /// 把标签从物品上拆下，标签重新显示在物品附近
    pub fn detach_tag(&mut self, tag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let item_id = self
            .tag(tag_id)?
            .attached_item()
            .ok_or(CoreError::NotAttached(tag_id))?;
        if self.item(item_id)?.attached_tag() != Some(tag_id) {
            return Err(CoreError::NotAttached(tag_id));
        }
        self.release_tag(tag_id, item_id)
    }

    /// 从物品这一侧拆下标签
    pub fn detach_item_tag(&mut self, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        let tag_id = self
            .item(item_id)?
            .attached_tag()
            .ok_or(CoreError::NotAttached(item_id))?;
        self.detach_tag(tag_id)
    }

    /// 拆下标签；物品在挂有扫描器的包里时，扫描器撤销该 RFID 的记录
    pub(crate) fn release_tag(&mut self, tag_id: EntityId, item_id: EntityId) -> CoreResult<Vec<Effect>> {
        self.tag_mut(tag_id)?.attached_item = None;
        let item = self.item_mut(item_id)?;
        item.attached_tag = None;
        let rfid = item.rfid.take();
        let holder = item.bag;
        self.set_hidden(tag_id, false)?;
        debug!("{} detached from {}", tag_id, item_id);

        if let (Some(bag_id), Some(rfid)) = (holder, rfid) {
            self.unscan(bag_id, &rfid)?;
        }

        Ok(vec![Effect::Show {
            entity: tag_id,
            anchor: Anchor::Near(item_id),
        }])
    }

    /// 把扫描器挂到打开的包上，扫描器随之隐藏
    pub fn attach_scanner(&mut self, scanner_id: EntityId, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        let scanner = self.scanner(scanner_id)?;
        let bag = self.bag(bag_id)?;
        if !bag.is_open() {
            return Err(CoreError::ClosedContainer(bag_id));
        }
        if bag.attached_scanner().is_some() {
            return Err(CoreError::AlreadyAttached(bag_id));
        }
        if scanner.attached_bag().is_some() {
            return Err(CoreError::AlreadyAttached(scanner_id));
        }

        let scanner = self.scanner_mut(scanner_id)?;
        scanner.attached_bag = Some(bag_id);
        // 重新挂接时从空记录开始，之前拆下期间的变化无从得知
        scanner.ledger.purge(bag_id);
        self.bag_mut(bag_id)?.attached_scanner = Some(scanner_id);
        self.set_hidden(scanner_id, true)?;
        debug!("{} attached to {}", scanner_id, bag_id);

        Ok(vec![Effect::Hide(scanner_id)])
    }

    /// 从包上拆下扫描器，要求包处于打开状态
    ///
    /// 扫描器保留已记录的 RFID。
    pub fn detach_scanner(&mut self, scanner_id: EntityId) -> CoreResult<Vec<Effect>> {
        let bag_id = self
            .scanner(scanner_id)?
            .attached_bag()
            .ok_or(CoreError::NotAttached(scanner_id))?;
        let bag = self.bag(bag_id)?;
        if bag.attached_scanner() != Some(scanner_id) {
            return Err(CoreError::NotAttached(scanner_id));
        }
        if !bag.is_open() {
            return Err(CoreError::ClosedContainer(bag_id));
        }
        self.release_scanner(scanner_id, bag_id)
    }

    /// 不检查开合状态的拆卸（级联删除使用）
    pub(crate) fn release_scanner(&mut self, scanner_id: EntityId, bag_id: EntityId) -> CoreResult<Vec<Effect>> {
        self.scanner_mut(scanner_id)?.attached_bag = None;
        self.bag_mut(bag_id)?.attached_scanner = None;
        self.set_hidden(scanner_id, false)?;
        debug!("{} detached from {}", scanner_id, bag_id);

        Ok(vec![Effect::Show {
            entity: scanner_id,
            anchor: Anchor::Beside(bag_id),
        }])
    }
}
