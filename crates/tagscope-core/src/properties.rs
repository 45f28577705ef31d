//! 实体的视觉属性
//!
//! 核心只保存颜色和轮廓状态，如何绘制由展示层决定。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制值创建（如 0xFF0000 表示红色）
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    /// 转换为 0xRRGGBB（忽略透明度）
    pub const fn to_hex(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const ORANGE: Color = Color::new(255, 165, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(128, 128, 128);
}

impl Default for Color {
    fn default() -> Self {
        Self::GRAY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// 颜色解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color: {0}")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// 支持 `#rrggbb` 和常用颜色名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let named = match s.to_ascii_lowercase().as_str() {
            "red" => Some(Color::RED),
            "green" => Some(Color::GREEN),
            "blue" => Some(Color::BLUE),
            "orange" => Some(Color::ORANGE),
            "yellow" => Some(Color::YELLOW),
            "white" => Some(Color::WHITE),
            "black" => Some(Color::BLACK),
            "gray" | "grey" => Some(Color::GRAY),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        u32::from_str_radix(hex, 16)
            .map(Color::from_hex)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

/// 轮廓状态（用于悬停或候选高亮）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutlineState {
    /// 普通轮廓
    #[default]
    Normal,
    /// 高亮（例如作为附着候选）
    Highlighted,
    /// 选中
    Selected,
}
