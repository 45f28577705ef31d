//! 文本绘制表面
//!
//! 持有所有图形的位置和外观，把核心返回的效果应用到自身，
//! 并为核心的最近邻查询提供 [`Layout`]。

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tagscope_core::effect::{Anchor, Effect};
use tagscope_core::entity::EntityId;
use tagscope_core::layout::{Layout, StaticLayout};
use tagscope_core::math::{BoundingBox2, Point2, Vector2};
use tagscope_core::properties::{Color, OutlineState};
use tagscope_core::session::Session;
use tracing::{debug, warn};

/// 图形之间的间隙
const GAP: f64 = 10.0;

/// 一个图形的外观
#[derive(Debug, Clone)]
struct Shape {
    label: String,
    color: Color,
    visible: bool,
    outline: OutlineState,
}

#[derive(Debug, Default)]
pub struct TextSurface {
    layout: StaticLayout,
    shapes: BTreeMap<EntityId, Shape>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新建的实体放置图形
    pub fn place(&mut self, session: &Session, id: EntityId, center: Point2) {
        let style = session.config().appearance.style(id.kind);
        self.layout.place(id, center, style.width, style.height);
        let (label, color) = session
            .get(id)
            .map(|entity| (entity.name.clone(), entity.color))
            .unwrap_or_else(|_| (id.to_string(), style.color));
        self.shapes.insert(
            id,
            Shape {
                label,
                color,
                visible: true,
                outline: OutlineState::Normal,
            },
        );
    }

    /// 拖动图形
    pub fn move_to(&mut self, id: EntityId, center: Point2) -> bool {
        self.layout.move_to(id, center)
    }

    /// 按顺序应用效果
    pub fn apply(&mut self, session: &Session, effects: &[Effect]) {
        for effect in effects {
            debug!("Applying {:?}", effect);
            match effect {
                Effect::Show { entity, anchor } => self.show(session, *entity, *anchor),
                Effect::Hide(id) => self.with_shape(*id, |shape| shape.visible = false),
                Effect::SetOutline(id, state) => self.with_shape(*id, |shape| shape.outline = *state),
                Effect::LabelChanged(id, name) => {
                    self.with_shape(*id, |shape| shape.label = name.clone())
                }
                Effect::Recolor(id, color) => self.with_shape(*id, |shape| shape.color = *color),
                Effect::Removed(id) => {
                    self.shapes.remove(id);
                    self.layout.remove(*id);
                }
            }
        }
    }

    fn with_shape(&mut self, id: EntityId, update: impl FnOnce(&mut Shape)) {
        match self.shapes.get_mut(&id) {
            Some(shape) => update(shape),
            None => warn!("No shape for {}", id),
        }
    }

    fn show(&mut self, session: &Session, id: EntityId, anchor: Anchor) {
        if !self.shapes.contains_key(&id) {
            // 复制出来的实体还没有图形
            let origin = self.layout.center(anchor.reference()).unwrap_or_else(Point2::origin);
            self.place(session, id, origin);
        }
        if let Some(center) = self.resolve(id, anchor) {
            self.layout.move_to(id, center);
        }
        self.with_shape(id, |shape| shape.visible = true);
    }

    /// 计算重新显示时的中心点
    fn resolve(&self, id: EntityId, anchor: Anchor) -> Option<Point2> {
        let reference = self.layout.bounds(anchor.reference())?;
        let own = self.layout.bounds(id)?;
        let center = reference.center();
        Some(match anchor {
            Anchor::Near(_) => {
                center + Vector2::new(0.0, (reference.height() + own.height()) / 2.0 + GAP)
            }
            Anchor::Beside(_) => {
                center + Vector2::new((reference.width() + own.width()) / 2.0 + GAP, 0.0)
            }
            Anchor::Offset { offset, .. } => center + offset,
        })
    }

    /// 按注册顺序列出可见图形
    pub fn render(&self, session: &Session) -> String {
        let mut out = String::new();
        for entity in session.visible() {
            let Some(shape) = self.shapes.get(&entity.id()) else {
                continue;
            };
            if !shape.visible {
                continue;
            }
            let marker = match shape.outline {
                OutlineState::Normal => ' ',
                OutlineState::Highlighted => '*',
                OutlineState::Selected => '>',
            };
            let position = self
                .layout
                .center(entity.id())
                .map_or_else(|| "unplaced".to_string(), |c| format!("({:.0}, {:.0})", c.x, c.y));
            let _ = writeln!(
                out,
                "{}{:<12} {:<10} {} {}",
                marker,
                shape.label,
                entity.id(),
                shape.color,
                position
            );
        }
        out
    }
}

impl Layout for TextSurface {
    fn bounds(&self, id: EntityId) -> Option<BoundingBox2> {
        self.layout.bounds(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagscope_core::entity::EntityKind;

    #[test]
    fn test_removed_item_reappears_below_bag() {
        let mut session = Session::default();
        let mut surface = TextSurface::new();
        let bag = session.create(EntityKind::Bag).unwrap();
        let item = session.create(EntityKind::Item).unwrap();
        surface.place(&session, bag, Point2::new(100.0, 100.0));
        surface.place(&session, item, Point2::new(0.0, 0.0));

        session.open(bag).unwrap();
        let effects = session.add_item(bag, item).unwrap();
        surface.apply(&session, &effects);
        assert!(!surface.render(&session).contains("Item1"));

        let effects = session.remove_item(bag, item).unwrap();
        surface.apply(&session, &effects);
        // 包高 80，物品高 60
        let center = surface.center(item).unwrap();
        assert_eq!((center.x, center.y), (100.0, 180.0));
        assert!(surface.render(&session).contains("Item1"));
    }

    #[test]
    fn test_duplicate_gets_a_shape() {
        let mut session = Session::default();
        let mut surface = TextSurface::new();
        let tag = session.create(EntityKind::Tag).unwrap();
        surface.place(&session, tag, Point2::new(10.0, 10.0));

        let (copy, effects) = session.duplicate(tag).unwrap();
        surface.apply(&session, &effects);
        let center = surface.center(copy).unwrap();
        assert_eq!((center.x, center.y), (30.0, 30.0));
        assert!(surface.render(&session).contains("Tag2"));
    }

    #[test]
    fn test_removed_shapes_are_dropped() {
        let mut session = Session::default();
        let mut surface = TextSurface::new();
        let scanner = session.create(EntityKind::Scanner).unwrap();
        surface.place(&session, scanner, Point2::new(0.0, 0.0));

        let effects = session.delete(scanner).unwrap();
        surface.apply(&session, &effects);
        assert!(surface.bounds(scanner).is_none());
        assert!(surface.render(&session).is_empty());
    }
}
