//! Tagscope 核心：RFID 资产追踪的领域模型
//!
//! 提供实体注册表、可回收的名称分配、实体间的附着关系、
//! 包的开合状态机、扫描器的 RFID 账本以及级联删除。
//!
//! # 架构设计
//!
//! 所有实体存放在 [`EntityRegistry`](registry::EntityRegistry) 这一竞技场中，
//! 实体之间只通过 [`EntityId`](entity::EntityId) 互相引用：
//! - `Session`: 显式构造的会话，持有注册表、名称池和配置
//! - `Entity`: 共享字段（名称、颜色、可见性）+ 变体数据
//! - `Effect`: 命令执行后交给展示层处理的效果（显示/隐藏/重命名……）
//!
//! 核心从不回调渲染层，也不计算位置；位置由展示层通过 [`Layout`](layout::Layout) 提供。
//!
//! # 示例
//!
//! ```rust
//! use tagscope_core::prelude::*;
//!
//! let mut session = Session::default();
//! let bag = session.create(EntityKind::Bag).unwrap();
//! let item = session.create(EntityKind::Item).unwrap();
//!
//! // 关闭的包不能放入物品
//! assert_eq!(session.add_item(bag, item), Err(CoreError::ClosedContainer(bag)));
//!
//! session.open(bag).unwrap();
//! let effects = session.add_item(bag, item).unwrap();
//! assert_eq!(effects, vec![Effect::Hide(item)]);
//! ```

pub mod attach;
pub mod bag;
pub mod cascade;
pub mod config;
pub mod effect;
pub mod entity;
pub mod error;
pub mod layout;
pub mod ledger;
pub mod math;
pub mod menu;
pub mod naming;
pub mod properties;
pub mod query;
pub mod registry;
pub mod session;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::SessionConfig;
    pub use crate::effect::{Anchor, Effect};
    pub use crate::entity::{Bag, Entity, EntityData, EntityId, EntityKind, Item, Scanner, Tag};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::layout::{Layout, StaticLayout};
    pub use crate::ledger::ScanLedger;
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::menu::{Dispatch, MenuAction, MenuExtensible};
    pub use crate::properties::{Color, OutlineState};
    pub use crate::session::{EntityInfo, Session};
}
