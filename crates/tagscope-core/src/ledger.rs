//! 扫描器的 RFID 账本
//!
//! 账本按贡献的包记录每个 RFID。一个 RFID 只要还有任何包在贡献它，
//! 就仍然算作已扫描；清除某个包的贡献不会影响其他包记录的同一个 RFID。
//! 记录只能逐个撤销（[`ScanLedger::forget`]）或按包整体清除，从不根据包的当前内容重建。
//!
//! 不变量：
//! - `rfids_for(bag)` 总是 `scanned()` 的子集
//! - 账本中不保留空的包条目

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLedger {
    /// 每个包贡献的 RFID
    by_bag: BTreeMap<EntityId, BTreeSet<String>>,
    /// 每个 RFID 的贡献包数量
    counts: BTreeMap<String, usize>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录由 `bag` 产生的一次扫描
    ///
    /// 返回 `true` 表示该 RFID 此前未被扫描过。
    pub fn record(&mut self, rfid: &str, bag: EntityId) -> bool {
        let contributed = self.by_bag.entry(bag).or_default().insert(rfid.to_string());
        if !contributed {
            return false;
        }
        let count = self.counts.entry(rfid.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// 清除 `bag` 的全部贡献，返回因此不再被扫描的 RFID
    pub fn purge(&mut self, bag: EntityId) -> Vec<String> {
        let Some(rfids) = self.by_bag.remove(&bag) else {
            return Vec::new();
        };

        rfids
            .into_iter()
            .filter(|rfid| self.release(rfid))
            .collect()
    }

    /// 撤销 `bag` 对单个 RFID 的贡献
    ///
    /// 返回 `true` 表示该 RFID 因此不再被扫描。
    pub fn forget(&mut self, rfid: &str, bag: EntityId) -> bool {
        let Some(rfids) = self.by_bag.get_mut(&bag) else {
            return false;
        };
        if !rfids.remove(rfid) {
            return false;
        }
        if rfids.is_empty() {
            self.by_bag.remove(&bag);
        }
        self.release(rfid)
    }

    /// 贡献计数减一，归零时移除
    fn release(&mut self, rfid: &str) -> bool {
        let Some(count) = self.counts.get_mut(rfid) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(rfid);
            return true;
        }
        false
    }

    /// 已扫描的 RFID（有序）
    pub fn scanned(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn contains(&self, rfid: &str) -> bool {
        self.counts.contains_key(rfid)
    }

    /// 某个包贡献的 RFID
    pub fn rfids_for(&self, bag: EntityId) -> Option<&BTreeSet<String>> {
        self.by_bag.get(&bag)
    }

    /// 有贡献的包
    pub fn bags(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.by_bag.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
