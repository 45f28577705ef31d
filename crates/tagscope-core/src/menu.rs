//! 上下文菜单模型
//!
//! 每个实体都有通用操作（重命名、改色、复制、删除、信息），
//! 各变体通过 [`MenuExtensible`] 追加自己的操作。展示层只负责把菜单项画出来，
//! 用户选中后交给 [`Session::execute`] 执行。

use crate::effect::Effect;
use crate::entity::{Bag, EntityData, EntityId, Item, Scanner, Tag};
use crate::error::CoreResult;
use crate::layout::Layout;
use crate::session::Session;

/// 菜单项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Rename,
    Recolor,
    Duplicate,
    Delete,
    Info,
    // 包
    Open,
    Close,
    RemoveItem(EntityId),
    RemoveAllItems,
    DetachScanner,
    // 物品
    AddToBag(EntityId),
    RemoveFromBag,
    DetachTag,
    // 标签
    AttachToItem(EntityId),
    DetachFromItem,
    // 扫描器
    AttachToBag(EntityId),
    DetachFromBag,
}

/// 需要展示层弹出对话框收集输入的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Rename,
    Recolor,
    Info,
}

/// 执行菜单项的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// 已执行，附带效果
    Applied(Vec<Effect>),
    /// 需要对话框，由展示层收集输入后调用对应命令
    OpenDialog(DialogKind),
}

impl MenuAction {
    /// 所有实体共有的操作
    pub const COMMON: [MenuAction; 5] = [
        MenuAction::Rename,
        MenuAction::Recolor,
        MenuAction::Duplicate,
        MenuAction::Delete,
        MenuAction::Info,
    ];

    /// 菜单文本，引用的实体使用其显示名称
    pub fn label(&self, session: &Session) -> String {
        let name = |id: &EntityId| {
            session
                .get(*id)
                .map_or_else(|_| id.to_string(), |entity| entity.name.clone())
        };
        match self {
            MenuAction::Rename => "Rename".to_string(),
            MenuAction::Recolor => "Recolor".to_string(),
            MenuAction::Duplicate => "Duplicate".to_string(),
            MenuAction::Delete => "Delete".to_string(),
            MenuAction::Info => "Info".to_string(),
            MenuAction::Open => "Open".to_string(),
            MenuAction::Close => "Close".to_string(),
            MenuAction::RemoveItem(item) => format!("Remove {}", name(item)),
            MenuAction::RemoveAllItems => "Remove all items".to_string(),
            MenuAction::DetachScanner => "Detach scanner".to_string(),
            MenuAction::AddToBag(bag) => format!("Add to {}", name(bag)),
            MenuAction::RemoveFromBag => "Remove from bag".to_string(),
            MenuAction::DetachTag => "Detach tag".to_string(),
            MenuAction::AttachToItem(item) => format!("Attach to {}", name(item)),
            MenuAction::DetachFromItem => "Detach from item".to_string(),
            MenuAction::AttachToBag(bag) => format!("Attach to {}", name(bag)),
            MenuAction::DetachFromBag => "Detach from bag".to_string(),
        }
    }
}

/// 变体追加上下文菜单项的能力
pub trait MenuExtensible {
    fn extend_menu(
        &self,
        id: EntityId,
        session: &Session,
        layout: &dyn Layout,
        actions: &mut Vec<MenuAction>,
    ) -> CoreResult<()>;
}

impl MenuExtensible for Bag {
    fn extend_menu(
        &self,
        _id: EntityId,
        _session: &Session,
        _layout: &dyn Layout,
        actions: &mut Vec<MenuAction>,
    ) -> CoreResult<()> {
        actions.push(if self.is_open() {
            MenuAction::Close
        } else {
            MenuAction::Open
        });
        actions.extend(self.items().iter().copied().map(MenuAction::RemoveItem));
        if !self.items().is_empty() {
            actions.push(MenuAction::RemoveAllItems);
        }
        if self.attached_scanner().is_some() {
            actions.push(MenuAction::DetachScanner);
        }
        Ok(())
    }
}

impl MenuExtensible for Item {
    fn extend_menu(
        &self,
        id: EntityId,
        session: &Session,
        layout: &dyn Layout,
        actions: &mut Vec<MenuAction>,
    ) -> CoreResult<()> {
        if self.bag().is_some() {
            actions.push(MenuAction::RemoveFromBag);
        } else if let Some(bag) = session.nearest_open_bag_for_item(id, layout)? {
            actions.push(MenuAction::AddToBag(bag));
        }
        if self.attached_tag().is_some() {
            actions.push(MenuAction::DetachTag);
        }
        Ok(())
    }
}

impl MenuExtensible for Tag {
    fn extend_menu(
        &self,
        id: EntityId,
        session: &Session,
        layout: &dyn Layout,
        actions: &mut Vec<MenuAction>,
    ) -> CoreResult<()> {
        if self.attached_item().is_some() {
            actions.push(MenuAction::DetachFromItem);
        } else if let Some(item) = session.nearest_item_for_tag(id, layout)? {
            actions.push(MenuAction::AttachToItem(item));
        }
        Ok(())
    }
}

impl MenuExtensible for Scanner {
    fn extend_menu(
        &self,
        id: EntityId,
        session: &Session,
        layout: &dyn Layout,
        actions: &mut Vec<MenuAction>,
    ) -> CoreResult<()> {
        if self.attached_bag().is_some() {
            actions.push(MenuAction::DetachFromBag);
        } else if let Some(bag) = session.nearest_bag_for_scanner(id, layout)? {
            actions.push(MenuAction::AttachToBag(bag));
        }
        Ok(())
    }
}

impl Session {
    /// 实体的上下文菜单：通用操作在前，变体操作在后
    pub fn menu_actions(&self, id: EntityId, layout: &dyn Layout) -> CoreResult<Vec<MenuAction>> {
        let entity = self.get(id)?;
        let mut actions = MenuAction::COMMON.to_vec();
        let extension: &dyn MenuExtensible = match entity.data() {
            EntityData::Bag(bag) => bag,
            EntityData::Item(item) => item,
            EntityData::Tag(tag) => tag,
            EntityData::Scanner(scanner) => scanner,
        };
        extension.extend_menu(id, self, layout, &mut actions)?;
        Ok(actions)
    }

    /// 执行菜单项
    pub fn execute(&mut self, id: EntityId, action: MenuAction) -> CoreResult<Dispatch> {
        let effects = match action {
            MenuAction::Rename => return Ok(Dispatch::OpenDialog(DialogKind::Rename)),
            MenuAction::Recolor => return Ok(Dispatch::OpenDialog(DialogKind::Recolor)),
            MenuAction::Info => return Ok(Dispatch::OpenDialog(DialogKind::Info)),
            MenuAction::Duplicate => self.duplicate(id)?.1,
            MenuAction::Delete => self.delete(id)?,
            MenuAction::Open => self.open(id)?,
            MenuAction::Close => self.close(id)?,
            MenuAction::RemoveItem(item) => self.remove_item(id, item)?,
            MenuAction::RemoveAllItems => self.remove_all_items(id)?,
            MenuAction::DetachScanner => self.remove_scanner(id)?,
            MenuAction::AddToBag(bag) => self.add_item(bag, id)?,
            MenuAction::RemoveFromBag => match self.item(id)?.bag() {
                Some(bag) => self.remove_item(bag, id)?,
                None => Vec::new(),
            },
            MenuAction::DetachTag => self.detach_item_tag(id)?,
            MenuAction::AttachToItem(item) => self.attach_tag(id, item)?,
            MenuAction::DetachFromItem => self.detach_tag(id)?,
            MenuAction::AttachToBag(bag) => self.attach_scanner(id, bag)?,
            MenuAction::DetachFromBag => self.detach_scanner(id)?,
        };
        Ok(Dispatch::Applied(effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_bag_menu() {
        let mut session = Session::default();
        let layout = StaticLayout::new();
        let bag = session.create(EntityKind::Bag).unwrap();

        let actions = session.menu_actions(bag, &layout).unwrap();
        assert_eq!(&actions[..5], &MenuAction::COMMON);
        assert_eq!(&actions[5..], &[MenuAction::Open]);

        session.execute(bag, MenuAction::Open).unwrap();
        let item = session.create(EntityKind::Item).unwrap();
        session.add_item(bag, item).unwrap();
        assert_eq!(
            &session.menu_actions(bag, &layout).unwrap()[5..],
            &[
                MenuAction::Close,
                MenuAction::RemoveItem(item),
                MenuAction::RemoveAllItems
            ]
        );
        assert_eq!(MenuAction::RemoveItem(item).label(&session), "Remove Item1");
    }

    #[test]
    fn test_tag_menu_offers_nearest_item() {
        let mut session = Session::default();
        let mut layout = StaticLayout::new();
        let tag = session.create(EntityKind::Tag).unwrap();
        let item = session.create(EntityKind::Item).unwrap();
        layout.place(tag, Point2::new(0.0, 0.0), 40.0, 40.0);
        layout.place(item, Point2::new(50.0, 0.0), 60.0, 60.0);
        session.rename(item, "Laptop").unwrap();

        let actions = session.menu_actions(tag, &layout).unwrap();
        assert_eq!(actions.last(), Some(&MenuAction::AttachToItem(item)));
        assert_eq!(actions.last().unwrap().label(&session), "Attach to Laptop");

        let dispatch = session.execute(tag, MenuAction::AttachToItem(item)).unwrap();
        assert_eq!(dispatch, Dispatch::Applied(vec![Effect::Hide(tag)]));
        assert_eq!(
            session.menu_actions(tag, &layout).unwrap().last(),
            Some(&MenuAction::DetachFromItem)
        );
        assert_eq!(
            session.menu_actions(item, &layout).unwrap().last(),
            Some(&MenuAction::DetachTag)
        );
    }

    #[test]
    fn test_scanner_menu_shows_closed_bag() {
        let mut session = Session::default();
        let mut layout = StaticLayout::new();
        let scanner = session.create(EntityKind::Scanner).unwrap();
        let bag = session.create(EntityKind::Bag).unwrap();
        layout.place(scanner, Point2::new(0.0, 0.0), 100.0, 50.0);
        layout.place(bag, Point2::new(120.0, 0.0), 80.0, 80.0);

        let actions = session.menu_actions(scanner, &layout).unwrap();
        assert_eq!(actions.last(), Some(&MenuAction::AttachToBag(bag)));
        assert_eq!(
            session.execute(scanner, MenuAction::AttachToBag(bag)),
            Err(CoreError::ClosedContainer(bag))
        );
    }

    #[test]
    fn test_item_menu_and_dialogs() {
        let mut session = Session::default();
        let mut layout = StaticLayout::new();
        let item = session.create(EntityKind::Item).unwrap();
        let bag = session.create(EntityKind::Bag).unwrap();
        layout.place(item, Point2::new(0.0, 0.0), 60.0, 60.0);
        layout.place(bag, Point2::new(0.0, 100.0), 80.0, 80.0);
        session.open(bag).unwrap();

        assert_eq!(
            session.menu_actions(item, &layout).unwrap().last(),
            Some(&MenuAction::AddToBag(bag))
        );
        session.execute(item, MenuAction::AddToBag(bag)).unwrap();
        assert_eq!(
            session.menu_actions(item, &layout).unwrap().last(),
            Some(&MenuAction::RemoveFromBag)
        );
        session.execute(item, MenuAction::RemoveFromBag).unwrap();
        assert!(session.bag(bag).unwrap().items().is_empty());

        assert_eq!(
            session.execute(item, MenuAction::Rename),
            Ok(Dispatch::OpenDialog(DialogKind::Rename))
        );
        match session.execute(item, MenuAction::Duplicate).unwrap() {
            Dispatch::Applied(effects) => assert_eq!(effects.len(), 1),
            other => panic!("unexpected dispatch: {:?}", other),
        }
        assert_eq!(session.all().count(), 3);
    }
}
