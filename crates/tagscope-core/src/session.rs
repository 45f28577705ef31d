//! 会话：核心操作的入口
//!
//! 会话显式持有注册表、名称池和配置，每个测试或每次程序运行各自构造一个，
//! 互不共享状态。命令在 `bag`、`attach`、`cascade` 等模块中以 `impl Session`
//! 的形式实现。

use crate::config::SessionConfig;
use crate::effect::{Anchor, Effect};
use crate::entity::{Bag, Entity, EntityData, EntityId, EntityKind, Item, Scanner, Tag};
use crate::error::{CoreError, CoreResult};
use crate::math::Vector2;
use crate::naming::NameAllocator;
use crate::properties::{Color, OutlineState};
use crate::registry::EntityRegistry;
use std::fmt;
use tracing::{debug, info};

/// 复制实体时新实体相对原实体的偏移
pub const DUPLICATE_OFFSET: (f64, f64) = (20.0, 20.0);

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    names: NameAllocator,
    registry: EntityRegistry,
    /// 自动生成 RFID 的计数器，不回收
    rfid_counter: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn names(&self) -> &NameAllocator {
        &self.names
    }

    /// 创建实体，分配最小的空闲标识符
    pub fn create(&mut self, kind: EntityKind) -> CoreResult<EntityId> {
        let id = EntityId::new(kind, self.names.allocate(kind));
        let data = self.default_data(kind);
        self.insert(id, data)
    }

    /// 使用指定的标识符创建实体
    pub fn create_with_id(&mut self, id: EntityId) -> CoreResult<EntityId> {
        if !self.names.claim(id.kind, id.number) {
            return Err(CoreError::IdentifierUnavailable(id));
        }
        let data = self.default_data(id.kind);
        self.insert(id, data)
    }

    /// 创建带有指定 RFID 的标签
    pub fn create_tag(&mut self, rfid: impl Into<String>) -> CoreResult<EntityId> {
        let id = EntityId::new(EntityKind::Tag, self.names.allocate(EntityKind::Tag));
        self.insert(id, EntityData::Tag(Tag::new(rfid)))
    }

    fn insert(&mut self, id: EntityId, data: EntityData) -> CoreResult<EntityId> {
        let color = self.config.appearance.style(id.kind).color;
        match self.registry.register(Entity::new(id, color, data)) {
            Ok(id) => {
                info!("Created {}", id);
                Ok(id)
            }
            Err(err) => {
                self.names.release(id.kind, id.number);
                Err(err)
            }
        }
    }

    fn default_data(&mut self, kind: EntityKind) -> EntityData {
        match kind {
            EntityKind::Bag => EntityData::Bag(Bag::new(self.config.default_max_items)),
            EntityKind::Item => EntityData::Item(Item::default()),
            EntityKind::Tag => EntityData::Tag(Tag::new(self.generate_rfid())),
            EntityKind::Scanner => EntityData::Scanner(Scanner::default()),
        }
    }

    /// 生成会话内唯一的 RFID（跳过显式创建时已使用的值）
    fn generate_rfid(&mut self) -> String {
        loop {
            self.rfid_counter += 1;
            let rfid = format!("{}{}", self.config.rfid_prefix, self.rfid_counter);
            let taken = self
                .registry
                .all()
                .filter_map(Entity::as_tag)
                .any(|tag| tag.rfid() == rfid);
            if !taken {
                return rfid;
            }
        }
    }

    pub fn get(&self, id: EntityId) -> CoreResult<&Entity> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.registry.contains(id)
    }

    pub fn bag(&self, id: EntityId) -> CoreResult<&Bag> {
        self.get(id)?.as_bag().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Bag,
        })
    }

    pub fn item(&self, id: EntityId) -> CoreResult<&Item> {
        self.get(id)?.as_item().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Item,
        })
    }

    pub fn tag(&self, id: EntityId) -> CoreResult<&Tag> {
        self.get(id)?.as_tag().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Tag,
        })
    }

    pub fn scanner(&self, id: EntityId) -> CoreResult<&Scanner> {
        self.get(id)?.as_scanner().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Scanner,
        })
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.registry.get_mut(id)
    }

    pub(crate) fn bag_mut(&mut self, id: EntityId) -> CoreResult<&mut Bag> {
        self.entity_mut(id)?.as_bag_mut().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Bag,
        })
    }

    pub(crate) fn item_mut(&mut self, id: EntityId) -> CoreResult<&mut Item> {
        self.entity_mut(id)?.as_item_mut().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Item,
        })
    }

    pub(crate) fn tag_mut(&mut self, id: EntityId) -> CoreResult<&mut Tag> {
        self.entity_mut(id)?.as_tag_mut().ok_or(CoreError::WrongKind {
            id,
            expected: EntityKind::Tag,
        })
    }

    pub(crate) fn scanner_mut(&mut self, id: EntityId) -> CoreResult<&mut Scanner> {
        self.entity_mut(id)?
            .as_scanner_mut()
            .ok_or(CoreError::WrongKind {
                id,
                expected: EntityKind::Scanner,
            })
    }

    pub(crate) fn set_hidden(&mut self, id: EntityId, hidden: bool) -> CoreResult<()> {
        self.entity_mut(id)?.hidden = hidden;
        Ok(())
    }

    /// 注销实体并归还其标识符
    pub(crate) fn discard(&mut self, id: EntityId) -> CoreResult<Effect> {
        self.registry.unregister(id)?;
        self.names.release(id.kind, id.number);
        info!("Deleted {}", id);
        Ok(Effect::Removed(id))
    }

    /// 按注册顺序遍历所有实体
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.registry.all()
    }

    /// 按注册顺序遍历可见实体
    pub fn visible(&self) -> impl Iterator<Item = &Entity> {
        self.registry.visible()
    }

    /// 修改显示名称（不影响标识符）
    pub fn rename(&mut self, id: EntityId, name: impl Into<String>) -> CoreResult<Vec<Effect>> {
        let name = name.into();
        let entity = self.entity_mut(id)?;
        if entity.name == name {
            return Ok(Vec::new());
        }
        debug!("Renamed {} from {:?} to {:?}", id, entity.name, name);
        entity.name = name.clone();
        Ok(vec![Effect::LabelChanged(id, name)])
    }

    pub fn recolor(&mut self, id: EntityId, color: Color) -> CoreResult<Vec<Effect>> {
        let entity = self.entity_mut(id)?;
        if entity.color == color {
            return Ok(Vec::new());
        }
        entity.color = color;
        Ok(vec![Effect::Recolor(id, color)])
    }

    pub fn set_outline(&mut self, id: EntityId, state: OutlineState) -> CoreResult<Vec<Effect>> {
        let entity = self.entity_mut(id)?;
        if entity.outline == state {
            return Ok(Vec::new());
        }
        entity.outline = state;
        Ok(vec![Effect::SetOutline(id, state)])
    }

    /// 复制：新建一个同类型、默认状态的实体，放在原实体旁边
    pub fn duplicate(&mut self, id: EntityId) -> CoreResult<(EntityId, Vec<Effect>)> {
        let kind = self.get(id)?.kind();
        let copy = self.create(kind)?;
        let (dx, dy) = DUPLICATE_OFFSET;
        let effects = vec![Effect::Show {
            entity: copy,
            anchor: Anchor::Offset {
                from: id,
                offset: Vector2::new(dx, dy),
            },
        }];
        Ok((copy, effects))
    }

    fn name_or_none(&self, id: Option<EntityId>) -> String {
        id.and_then(|id| self.get(id).ok())
            .map_or_else(|| "none".to_string(), |entity| entity.name.clone())
    }

    /// 信息对话框使用的只读摘要
    pub fn describe(&self, id: EntityId) -> CoreResult<EntityInfo> {
        let entity = self.get(id)?;
        let mut details = Vec::new();
        match entity.data() {
            EntityData::Bag(bag) => {
                let state = if bag.is_open() { "open" } else { "closed" };
                details.push(("State", state.to_string()));
                details.push((
                    "Items",
                    format!("{}/{}", bag.items().len(), bag.max_items()),
                ));
                for item in bag.items() {
                    details.push(("Contains", self.name_or_none(Some(*item))));
                }
                details.push(("Scanner", self.name_or_none(bag.attached_scanner())));
            }
            EntityData::Item(item) => {
                details.push(("RFID", item.display_rfid().to_string()));
                details.push(("Tag", self.name_or_none(item.attached_tag())));
                details.push(("Bag", self.name_or_none(item.bag())));
            }
            EntityData::Tag(tag) => {
                details.push(("RFID", tag.rfid().to_string()));
                details.push(("Item", self.name_or_none(tag.attached_item())));
            }
            EntityData::Scanner(scanner) => {
                details.push(("Bag", self.name_or_none(scanner.attached_bag())));
                let scanned: Vec<_> = scanner.scanned_rfids().collect();
                let scanned = if scanned.is_empty() {
                    "none".to_string()
                } else {
                    scanned.join(", ")
                };
                details.push(("Scanned", scanned));
            }
        }

        Ok(EntityInfo {
            id,
            name: entity.name.clone(),
            color: entity.color,
            hidden: entity.is_hidden(),
            details,
        })
    }
}

/// 实体摘要
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub color: Color,
    pub hidden: bool,
    pub details: Vec<(&'static str, String)>,
}

impl EntityInfo {
    /// 查找第一条指定标题的明细
    pub fn detail(&self, label: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.id.kind)?;
        writeln!(f, "Id: {}", self.id)?;
        write!(f, "Color: {}", self.color)?;
        for (label, value) in &self.details {
            write!(f, "\n{}: {}", label, value)?;
        }
        Ok(())
    }
}
