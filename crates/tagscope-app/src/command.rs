//! 文本命令解析
//!
//! 每行一条命令，代替图形界面里的菜单、拖动和对话框。

use anyhow::{anyhow, bail, Result};
use tagscope_core::entity::{EntityId, EntityKind};
use tagscope_core::math::Point2;
use tagscope_core::properties::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New { kind: EntityKind, at: Option<Point2> },
    NewTag { rfid: String, at: Option<Point2> },
    Move { id: EntityId, to: Point2 },
    Open(EntityId),
    Close(EntityId),
    Add { item: EntityId, bag: EntityId },
    Remove { item: EntityId, bag: EntityId },
    Empty(EntityId),
    Attach(EntityId, EntityId),
    Detach(EntityId),
    Delete(EntityId),
    Duplicate(EntityId),
    Rename { id: EntityId, name: String },
    Recolor { id: EntityId, color: Color },
    Capacity { bag: EntityId, max_items: usize },
    Info(EntityId),
    Menu(EntityId),
    Pick { id: EntityId, index: usize },
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
new <bag|item|tag|scanner> [x y]   create an entity
tag <rfid> [x y]                   create a tag with a given RFID
move <id> <x> <y>                  drag a shape
open|close <bag>                   change bag state
add|remove <item> <bag>            put an item in or take it out
empty <bag>                        take every item out
attach <id> <id>                   tag to item, or scanner to bag
detach <id>                        undo an attachment
delete|dup|info|menu <id>          entity actions
rename <id> <name>                 set display name
recolor <id> <#rrggbb|name>        set color
capacity <bag> <n>                 set bag capacity
pick <id> <n>                      run the n-th context menu entry
list | help | quit";

fn id(arg: Option<&str>) -> Result<EntityId> {
    let arg = arg.ok_or_else(|| anyhow!("Missing identifier"))?;
    Ok(arg.parse()?)
}

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T> {
    arg.ok_or_else(|| anyhow!("Missing {}", what))?
        .parse()
        .map_err(|_| anyhow!("Invalid {}", what))
}

fn point(x: Option<&str>, y: Option<&str>) -> Result<Option<Point2>> {
    match (x, y) {
        (None, None) => Ok(None),
        (x, y) => Ok(Some(Point2::new(
            number(x, "x coordinate")?,
            number(y, "y coordinate")?,
        ))),
    }
}

impl Command {
    /// 解析一行命令，空行和 `#` 注释返回 `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut args = line.split_whitespace();
        let verb = args.next().unwrap_or_default().to_ascii_lowercase();

        let command = match verb.as_str() {
            "new" => {
                let kind = args
                    .next()
                    .ok_or_else(|| anyhow!("Missing entity type"))?
                    .parse::<EntityKind>()?;
                Command::New {
                    kind,
                    at: point(args.next(), args.next())?,
                }
            }
            "tag" => Command::NewTag {
                rfid: args
                    .next()
                    .ok_or_else(|| anyhow!("Missing RFID"))?
                    .to_string(),
                at: point(args.next(), args.next())?,
            },
            "move" => Command::Move {
                id: id(args.next())?,
                to: point(args.next(), args.next())?
                    .ok_or_else(|| anyhow!("Missing position"))?,
            },
            "open" => Command::Open(id(args.next())?),
            "close" => Command::Close(id(args.next())?),
            "add" => Command::Add {
                item: id(args.next())?,
                bag: id(args.next())?,
            },
            "remove" => Command::Remove {
                item: id(args.next())?,
                bag: id(args.next())?,
            },
            "empty" => Command::Empty(id(args.next())?),
            "attach" => Command::Attach(id(args.next())?, id(args.next())?),
            "detach" => Command::Detach(id(args.next())?),
            "delete" => Command::Delete(id(args.next())?),
            "dup" | "duplicate" => Command::Duplicate(id(args.next())?),
            "rename" => {
                let id = id(args.next())?;
                let name = args.by_ref().collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    bail!("Missing name");
                }
                Command::Rename { id, name }
            }
            "recolor" => Command::Recolor {
                id: id(args.next())?,
                color: args
                    .next()
                    .ok_or_else(|| anyhow!("Missing color"))?
                    .parse()?,
            },
            "capacity" => Command::Capacity {
                bag: id(args.next())?,
                max_items: number(args.next(), "capacity")?,
            },
            "info" => Command::Info(id(args.next())?),
            "menu" => Command::Menu(id(args.next())?),
            "pick" => Command::Pick {
                id: id(args.next())?,
                index: number(args.next(), "menu index")?,
            },
            "list" | "ls" => Command::List,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command: {}", other),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument `{}` in `{}`", extra, line);
        }
        Ok(Some(command))
    }
}
