//! 按类型分配的整数名称池
//!
//! 每种实体类型维护一组已分配的整数，分配时总是取最小的空闲正整数，
//! 释放后的整数可被后续分配复用。不同类型的池互不影响。

use crate::entity::EntityKind;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    outstanding: HashMap<EntityKind, BTreeSet<u32>>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配最小的空闲正整数
    pub fn allocate(&mut self, kind: EntityKind) -> u32 {
        let used = self.outstanding.entry(kind).or_default();
        // 有序集合中第一个与序号不连续的位置就是最小空位
        let number = used
            .iter()
            .zip(1u32..)
            .find(|(used, expected)| **used != *expected)
            .map(|(_, expected)| expected)
            .unwrap_or(used.len() as u32 + 1);
        used.insert(number);
        number
    }

    /// 占用指定整数（加载或显式指定标识符时使用）
    ///
    /// 整数为 0 或已被占用时返回 `false`。
    pub fn claim(&mut self, kind: EntityKind, number: u32) -> bool {
        number != 0 && self.outstanding.entry(kind).or_default().insert(number)
    }

    /// 归还整数；未分配的整数直接忽略
    pub fn release(&mut self, kind: EntityKind, number: u32) {
        if let Some(used) = self.outstanding.get_mut(&kind) {
            used.remove(&number);
        }
    }

    pub fn is_outstanding(&self, kind: EntityKind, number: u32) -> bool {
        self.outstanding
            .get(&kind)
            .is_some_and(|used| used.contains(&number))
    }

    /// 某类型当前已分配的整数（升序）
    pub fn outstanding(&self, kind: EntityKind) -> impl Iterator<Item = u32> + '_ {
        self.outstanding
            .get(&kind)
            .into_iter()
            .flat_map(|used| used.iter().copied())
    }
}
