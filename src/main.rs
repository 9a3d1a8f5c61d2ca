/// Entry point and frame loop for the menu demo.

mod config;
mod logging;
mod ui;

use std::time::Duration;

use tracing::{error, info};

use retromenu::gfx::terminal::{GlyphAtlas, TerminalRenderer};
use retromenu::gfx::{Renderer, Rgba};
use retromenu::menu::PATCH_SIZE;
use retromenu::{Confirmed, MenuDef, MenuStack, MenuTree, Vec2};

use config::AppConfig;
use ui::gamepad::GamepadState;
use ui::input::{InputState, MenuCommand};
use ui::sound::SoundEngine;

const HELP: &str = "M open  Arrows move  Space/Enter confirm  Z back  Esc close  D tile borders  Q quit";
const BACKGROUND: Rgba = Rgba::from_rgb(22, 22, 35);
const STATUS_COLOR: Rgba = Rgba::from_rgb(255, 220, 90);

fn main() {
    let config = AppConfig::load();

    if let Err(e) = logging::init_logging(&config.log) {
        eprintln!("Warning: could not open log file {}: {e}", config.log.file.display());
    }

    let tree = match load_menu(&config) {
        Ok(tree) => tree,
        Err(e) => {
            error!("menu definition failed: {e}");
            eprintln!("Menu error: {e}");
            return;
        }
    };

    let mut renderer = TerminalRenderer::new((PATCH_SIZE.x, PATCH_SIZE.y));

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let mut demo = Demo::new(tree, &config);

    let result = game_loop(&mut demo, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("demo aborted: {e}");
        eprintln!("Menu error: {e}");
    }
}

/// Menu file from config if set, otherwise the embedded battle menu.
fn load_menu(config: &AppConfig) -> retromenu::Result<MenuTree> {
    let def = match &config.menu_file {
        Some(path) => {
            info!(path = %path.display(), "loading menu definition");
            MenuDef::load(path)?
        }
        None => MenuDef::battle()?,
    };
    def.to_tree()
}

fn game_loop(
    demo: &mut Demo,
    renderer: &mut TerminalRenderer,
    sound: Option<&SoundEngine>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let frame_sleep = Duration::from_millis(config.display.frame_sleep_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut commands = kb.commands();
        commands.extend(gp.commands());
        for cmd in commands {
            if cmd == MenuCommand::Quit {
                return Ok(());
            }
            let feedback = demo.dispatch(cmd)?;
            if let Some(sfx) = sound {
                feedback.play(sfx);
            }
        }

        renderer.sync_size()?;
        demo.render(renderer, config.display.screen_offset, gp.is_connected())?;
        renderer.present()?;
        std::thread::sleep(frame_sleep);
    }
    Ok(())
}

fn help_line(gamepad: bool) -> String {
    if gamepad {
        format!("{HELP}  [gamepad]")
    } else {
        HELP.to_string()
    }
}

/// What the last command did, for sound feedback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Feedback {
    None,
    Move,
    Enter,
    Choose,
    Back,
    Reject,
}

impl Feedback {
    fn play(self, sfx: &SoundEngine) {
        match self {
            Feedback::None => {}
            Feedback::Move => sfx.play_move(),
            Feedback::Enter => sfx.play_enter(),
            Feedback::Choose => sfx.play_choose(),
            Feedback::Back => sfx.play_back(),
            Feedback::Reject => sfx.play_reject(),
        }
    }
}

struct Demo {
    tree: MenuTree,
    stack: MenuStack,
    atlas: GlyphAtlas,
    status: String,
}

impl Demo {
    fn new(tree: MenuTree, config: &AppConfig) -> Self {
        let mut stack = MenuStack::new();
        stack.set_panel_offset(config.display.panel_offset);
        stack.set_draw_tile_borders(config.display.draw_tile_borders);
        stack.open(tree.root());
        Demo {
            tree,
            stack,
            atlas: GlyphAtlas::new((PATCH_SIZE.x, PATCH_SIZE.y)),
            status: String::new(),
        }
    }

    fn dispatch(&mut self, cmd: MenuCommand) -> retromenu::Result<Feedback> {
        let feedback = match cmd {
            MenuCommand::Open => {
                if !self.stack.is_empty() {
                    return Ok(Feedback::None);
                }
                self.stack.open(self.tree.root());
                self.status.clear();
                Feedback::Enter
            }
            MenuCommand::Move(dir) => {
                if !self.top_has_children()? {
                    return Ok(Feedback::None);
                }
                self.stack.navigate(&mut self.tree, dir)?;
                Feedback::Move
            }
            MenuCommand::Back => match self.stack.back() {
                Some(_) => Feedback::Back,
                None => Feedback::None,
            },
            MenuCommand::Close => {
                self.stack.clear();
                Feedback::Back
            }
            MenuCommand::ToggleTileBorders => {
                let on = !self.stack.is_drawing_tile_borders();
                self.stack.set_draw_tile_borders(on);
                Feedback::None
            }
            MenuCommand::Confirm => {
                if self.stack.is_empty() {
                    return Ok(Feedback::None);
                }
                if !self.top_has_children()? {
                    return Ok(Feedback::Reject);
                }
                match self.stack.confirm(&self.tree)? {
                    Some(Confirmed::Chosen(leaf)) => {
                        let item = self.tree.get(leaf)?;
                        self.status = match item.id() {
                            Some(id) => format!("Selected: {} ID: {id}", item.name()),
                            None => format!("Selected: {} (no ID)", item.name()),
                        };
                        self.stack.clear();
                        Feedback::Choose
                    }
                    Some(Confirmed::Entered(_)) => Feedback::Enter,
                    Some(Confirmed::Rejected(_)) => Feedback::Reject,
                    None => Feedback::None,
                }
            }
            MenuCommand::Quit => Feedback::None,
        };
        Ok(feedback)
    }

    /// Navigation and confirm only go to a panel with entries in it.
    fn top_has_children(&self) -> retromenu::Result<bool> {
        match self.stack.top() {
            Some(top) => Ok(self.tree.get(top)?.has_children()),
            None => Ok(false),
        }
    }

    fn render(&mut self, r: &mut TerminalRenderer, screen_offset: Vec2, gamepad: bool) -> retromenu::Result<()> {
        r.clear(BACKGROUND);
        r.draw_text(&help_line(gamepad), 0, 0, Rgba::GREY);

        self.stack.draw(&mut self.tree, r, &self.atlas, screen_offset)?;

        let (_, height) = r.size_px();
        let status = if self.stack.is_empty() && self.status.is_empty() {
            "Menu closed. Press M to open."
        } else {
            self.status.as_str()
        };
        r.draw_text(status, 0, height - PATCH_SIZE.y, STATUS_COLOR);
        Ok(())
    }
}
