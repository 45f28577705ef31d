//! 实体标识和数据模型
//!
//! 四种实体（包、物品、标签、扫描器）共享名称、颜色和可见性，
//! 变体数据放在 [`EntityData`] 中。实体之间只保存 [`EntityId`]，
//! 由注册表解析，不持有彼此的所有权。

use crate::ledger::ScanLedger;
use crate::properties::{Color, OutlineState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Bag,
    Item,
    Tag,
    Scanner,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Bag,
        EntityKind::Item,
        EntityKind::Tag,
        EntityKind::Scanner,
    ];

    /// 类型标签，同时作为默认名称前缀
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Bag => "Bag",
            EntityKind::Item => "Item",
            EntityKind::Tag => "Tag",
            EntityKind::Scanner => "Scanner",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

/// 实体唯一标识符（类型 + 整数后缀）
///
/// 同一类型的存活实体之间唯一；实体删除后整数会被回收。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub number: u32,
}

impl EntityId {
    pub const fn new(kind: EntityKind, number: u32) -> Self {
        Self { kind, number }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.label(), self.number)
    }
}

/// 标识符解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identifier: {0}")]
pub struct ParseIdError(String);

impl FromStr for EntityId {
    type Err = ParseIdError;

    /// 解析 `Bag3`、`tag12` 之类的标识符
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ParseIdError(s.to_string()))?;
        let (prefix, digits) = s.split_at(split);
        let kind = prefix.parse::<EntityKind>()?;
        let number = digits
            .parse::<u32>()
            .map_err(|_| ParseIdError(s.to_string()))?;
        Ok(EntityId::new(kind, number))
    }
}

/// 包：有开合状态和容量限制的容器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bag {
    pub(crate) is_open: bool,
    pub(crate) max_items: usize,
    /// 按放入顺序排列（界面按此顺序展示）
    pub(crate) items: Vec<EntityId>,
    pub(crate) attached_scanner: Option<EntityId>,
}

impl Bag {
    pub fn new(max_items: usize) -> Self {
        Self {
            is_open: false,
            max_items,
            items: Vec::new(),
            attached_scanner: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn items(&self) -> &[EntityId] {
        &self.items
    }

    pub fn contains(&self, item: EntityId) -> bool {
        self.items.contains(&item)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    pub fn attached_scanner(&self) -> Option<EntityId> {
        self.attached_scanner
    }
}

/// 物品：可以附着一个标签，可以放进一个包
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub(crate) attached_tag: Option<EntityId>,
    /// 附着标签的 RFID 副本，未附着时为 `None`
    pub(crate) rfid: Option<String>,
    pub(crate) bag: Option<EntityId>,
}

impl Item {
    /// 未附着标签时显示的占位值
    pub const NO_RFID: &'static str = "none";

    pub fn attached_tag(&self) -> Option<EntityId> {
        self.attached_tag
    }

    pub fn rfid(&self) -> Option<&str> {
        self.rfid.as_deref()
    }

    /// 用于显示的 RFID
    pub fn display_rfid(&self) -> &str {
        self.rfid().unwrap_or(Self::NO_RFID)
    }

    /// 所在的包
    pub fn bag(&self) -> Option<EntityId> {
        self.bag
    }
}

/// RFID 标签，RFID 在创建时确定且不可修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    rfid: String,
    pub(crate) attached_item: Option<EntityId>,
}

impl Tag {
    pub fn new(rfid: impl Into<String>) -> Self {
        Self {
            rfid: rfid.into(),
            attached_item: None,
        }
    }

    pub fn rfid(&self) -> &str {
        &self.rfid
    }

    pub fn attached_item(&self) -> Option<EntityId> {
        self.attached_item
    }
}

/// RFID 扫描器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scanner {
    pub(crate) attached_bag: Option<EntityId>,
    pub(crate) ledger: ScanLedger,
}

impl Scanner {
    pub fn attached_bag(&self) -> Option<EntityId> {
        self.attached_bag
    }

    pub fn ledger(&self) -> &ScanLedger {
        &self.ledger
    }

    /// 已扫描的 RFID
    pub fn scanned_rfids(&self) -> impl Iterator<Item = &str> {
        self.ledger.scanned()
    }
}

/// 变体数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityData {
    Bag(Bag),
    Item(Item),
    Tag(Tag),
    Scanner(Scanner),
}

impl EntityData {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityData::Bag(_) => EntityKind::Bag,
            EntityData::Item(_) => EntityKind::Item,
            EntityData::Tag(_) => EntityKind::Tag,
            EntityData::Scanner(_) => EntityKind::Scanner,
        }
    }
}

/// 实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub(crate) id: EntityId,

    /// 显示名称（可随意修改，与标识符无关）
    pub name: String,

    /// 颜色
    pub color: Color,

    /// 是否隐藏（被放进包里或附着到其他实体上）
    pub(crate) hidden: bool,

    /// 轮廓状态
    pub(crate) outline: OutlineState,

    pub(crate) data: EntityData,
}

impl Entity {
    /// 创建新实体，名称默认为标识符
    pub fn new(id: EntityId, color: Color, data: EntityData) -> Self {
        debug_assert_eq!(id.kind, data.kind());
        Self {
            id,
            name: id.to_string(),
            color,
            hidden: false,
            outline: OutlineState::Normal,
            data,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.id.kind
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn outline(&self) -> OutlineState {
        self.outline
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn as_bag(&self) -> Option<&Bag> {
        match &self.data {
            EntityData::Bag(bag) => Some(bag),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.data {
            EntityData::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match &self.data {
            EntityData::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_scanner(&self) -> Option<&Scanner> {
        match &self.data {
            EntityData::Scanner(scanner) => Some(scanner),
            _ => None,
        }
    }

    pub(crate) fn as_bag_mut(&mut self) -> Option<&mut Bag> {
        match &mut self.data {
            EntityData::Bag(bag) => Some(bag),
            _ => None,
        }
    }

    pub(crate) fn as_item_mut(&mut self) -> Option<&mut Item> {
        match &mut self.data {
            EntityData::Item(item) => Some(item),
            _ => None,
        }
    }

    pub(crate) fn as_tag_mut(&mut self) -> Option<&mut Tag> {
        match &mut self.data {
            EntityData::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn as_scanner_mut(&mut self) -> Option<&mut Scanner> {
        match &mut self.data {
            EntityData::Scanner(scanner) => Some(scanner),
            _ => None,
        }
    }
}
