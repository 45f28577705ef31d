//! 核心操作错误定义
//!
//! 所有错误都可恢复，由调用方（展示层）决定如何提示用户。

use crate::entity::{EntityId, EntityKind};
use thiserror::Error;

/// 核心操作结果
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Bag {0} is closed")]
    ClosedContainer(EntityId),

    #[error("Bag {bag} is full ({max_items} items)")]
    CapacityExceeded { bag: EntityId, max_items: usize },

    #[error("{0} is already attached")]
    AlreadyAttached(EntityId),

    #[error("{0} is not attached")]
    NotAttached(EntityId),

    #[error("{item} is already in bag {bag}")]
    AlreadyContained { item: EntityId, bag: EntityId },

    #[error("{item} is not in bag {bag}")]
    NotContained { item: EntityId, bag: EntityId },

    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Identifier unavailable: {0}")]
    IdentifierUnavailable(EntityId),

    #[error("{id} is not a {expected}")]
    WrongKind { id: EntityId, expected: EntityKind },

    #[error("Bag {bag} holds {current} items, cannot shrink capacity to {requested}")]
    InvalidCapacity {
        bag: EntityId,
        requested: usize,
        current: usize,
    },
}
