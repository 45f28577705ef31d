//! Tagscope 演示程序入口
//! 以文本命令驱动核心，把效果应用到文本表面上

mod command;
mod config;
mod surface;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use tagscope_core::prelude::*;
use tagscope_core::menu::DialogKind;

use command::{Command, HELP};
use config::AppConfig;
use surface::TextSurface;

/// 演示程序
struct TagscopeApp {
    session: Session,
    surface: TextSurface,
    /// 未指定坐标时的下一个放置位置
    cursor: Point2,
    placement_step: f64,
}

impl TagscopeApp {
    fn new(config: &AppConfig) -> Self {
        Self {
            session: Session::new(config.session.clone()),
            surface: TextSurface::new(),
            cursor: Point2::new(50.0, 50.0),
            placement_step: config.placement_step,
        }
    }

    fn next_position(&mut self, at: Option<Point2>) -> Point2 {
        at.unwrap_or_else(|| {
            let position = self.cursor;
            self.cursor.x += self.placement_step;
            position
        })
    }

    fn apply(&mut self, effects: Vec<Effect>) -> String {
        self.surface.apply(&self.session, &effects);
        format!("ok ({} effects)", effects.len())
    }

    /// 执行一条命令，返回要打印的文本；`None` 表示退出
    fn run(&mut self, command: Command) -> Result<Option<String>> {
        let output = match command {
            Command::New { kind, at } => {
                let id = self.session.create(kind)?;
                let center = self.next_position(at);
                self.surface.place(&self.session, id, center);
                format!("Created {}", id)
            }
            Command::NewTag { rfid, at } => {
                let id = self.session.create_tag(rfid)?;
                let center = self.next_position(at);
                self.surface.place(&self.session, id, center);
                format!("Created {}", id)
            }
            Command::Move { id, to } => {
                self.session.get(id)?;
                if !self.surface.move_to(id, to) {
                    bail!("{} has no shape", id);
                }
                format!("Moved {}", id)
            }
            Command::Open(bag) => {
                let effects = self.session.open(bag)?;
                self.apply(effects)
            }
            Command::Close(bag) => {
                let effects = self.session.close(bag)?;
                self.apply(effects)
            }
            Command::Add { item, bag } => {
                let effects = self.session.add_item(bag, item)?;
                self.apply(effects)
            }
            Command::Remove { item, bag } => {
                let effects = self.session.remove_item(bag, item)?;
                self.apply(effects)
            }
            Command::Empty(bag) => {
                let effects = self.session.remove_all_items(bag)?;
                self.apply(effects)
            }
            Command::Attach(a, b) => {
                let effects = match (a.kind, b.kind) {
                    (EntityKind::Tag, EntityKind::Item) => self.session.attach_tag(a, b)?,
                    (EntityKind::Item, EntityKind::Tag) => self.session.attach_tag(b, a)?,
                    (EntityKind::Scanner, EntityKind::Bag) => self.session.attach_scanner(a, b)?,
                    (EntityKind::Bag, EntityKind::Scanner) => self.session.add_scanner(a, b)?,
                    _ => bail!("Cannot attach {} to {}", a, b),
                };
                self.apply(effects)
            }
            Command::Detach(id) => {
                let effects = match id.kind {
                    EntityKind::Tag => self.session.detach_tag(id)?,
                    EntityKind::Item => self.session.detach_item_tag(id)?,
                    EntityKind::Scanner => self.session.detach_scanner(id)?,
                    EntityKind::Bag => self.session.remove_scanner(id)?,
                };
                self.apply(effects)
            }
            Command::Delete(id) => {
                let effects = self.session.delete(id)?;
                self.apply(effects)
            }
            Command::Duplicate(id) => {
                let (copy, effects) = self.session.duplicate(id)?;
                self.apply(effects);
                format!("Created {}", copy)
            }
            Command::Rename { id, name } => {
                let effects = self.session.rename(id, name)?;
                self.apply(effects)
            }
            Command::Recolor { id, color } => {
                let effects = self.session.recolor(id, color)?;
                self.apply(effects)
            }
            Command::Capacity { bag, max_items } => {
                self.session.set_max_items(bag, max_items)?;
                format!("{} holds up to {} items", bag, max_items)
            }
            Command::Info(id) => self.session.describe(id)?.to_string(),
            Command::Menu(id) => self
                .session
                .menu_actions(id, &self.surface)?
                .iter()
                .enumerate()
                .map(|(n, action)| format!("{:>2}. {}", n + 1, action.label(&self.session)))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Pick { id, index } => {
                let actions = self.session.menu_actions(id, &self.surface)?;
                let action = index
                    .checked_sub(1)
                    .and_then(|n| actions.get(n))
                    .copied()
                    .with_context(|| format!("{} has no menu entry {}", id, index))?;
                match self.session.execute(id, action)? {
                    Dispatch::Applied(effects) => self.apply(effects),
                    Dispatch::OpenDialog(DialogKind::Info) => self.session.describe(id)?.to_string(),
                    Dispatch::OpenDialog(DialogKind::Rename) => {
                        format!("use `rename {} <name>`", id)
                    }
                    Dispatch::OpenDialog(DialogKind::Recolor) => {
                        format!("use `recolor {} <color>`", id)
                    }
                }
            }
            Command::List => self.surface.render(&self.session),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(None),
        };
        Ok(Some(output))
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    let mut script = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config_path = Some(args.next().context("--config needs a path")?);
            }
            _ => script = Some(arg),
        }
    }

    let config = match config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // 初始化日志
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(config.level()?)
            .with_writer(io::stderr)
            .finish(),
    )?;

    info!("Starting Tagscope...");

    let mut app = TagscopeApp::new(&config);
    let input: Box<dyn BufRead> = match &script {
        Some(path) => Box::new(io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("Failed to open {}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let interactive = script.is_none();

    let mut stdout = io::stdout();
    if interactive {
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    for line in input.lines() {
        let line = line?;
        match Command::parse(&line).and_then(|command| match command {
            Some(command) => app.run(command),
            None => Ok(Some(String::new())),
        }) {
            Ok(Some(output)) => {
                if !output.is_empty() {
                    writeln!(stdout, "{}", output.trim_end())?;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("{}: {:#}", line.trim(), e);
                writeln!(stdout, "error: {:#}", e)?;
            }
        }
        if interactive {
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
    }

    info!("Session ended with {} entities", app.session.all().count());
    Ok(())
}
