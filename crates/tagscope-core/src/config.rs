//! 会话配置
//!
//! 所有字段都有默认值，从 JSON 加载时缺失的字段使用默认值。

use crate::entity::EntityKind;
use crate::properties::Color;
use serde::{Deserialize, Serialize};

/// 某类实体的默认外观
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindStyle {
    pub color: Color,
    pub width: f64,
    pub height: f64,
}

impl KindStyle {
    pub const fn new(color: Color, width: f64, height: f64) -> Self {
        Self {
            color,
            width,
            height,
        }
    }
}

/// 各类实体的默认外观
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub bag: KindStyle,
    pub item: KindStyle,
    pub tag: KindStyle,
    pub scanner: KindStyle,
}

impl Appearance {
    pub fn style(&self, kind: EntityKind) -> KindStyle {
        match kind {
            EntityKind::Bag => self.bag,
            EntityKind::Item => self.item,
            EntityKind::Tag => self.tag,
            EntityKind::Scanner => self.scanner,
        }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            bag: KindStyle::new(Color::BLUE, 80.0, 80.0),
            item: KindStyle::new(Color::RED, 60.0, 60.0),
            tag: KindStyle::new(Color::GREEN, 40.0, 40.0),
            scanner: KindStyle::new(Color::ORANGE, 100.0, 50.0),
        }
    }
}

/// 附着/放入建议的搜索半径（中心点距离）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionRadii {
    /// 标签寻找可附着的物品
    pub tag_to_item: f64,
    /// 扫描器寻找包
    pub scanner_to_bag: f64,
    /// 物品寻找打开的包
    pub item_to_bag: f64,
}

impl Default for SuggestionRadii {
    fn default() -> Self {
        Self {
            tag_to_item: 80.0,
            scanner_to_bag: 150.0,
            item_to_bag: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 新建包的默认容量
    pub default_max_items: usize,
    pub radii: SuggestionRadii,
    pub appearance: Appearance,
    /// 自动生成 RFID 的前缀
    pub rfid_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_max_items: 5,
            radii: SuggestionRadii::default(),
            appearance: Appearance::default(),
            rfid_prefix: "RFID-".to_string(),
        }
    }
}
