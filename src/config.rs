/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use retromenu::Vec2;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    /// Menu definition to load instead of the embedded battle menu.
    pub menu_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Pixel position of the root panel.
    pub screen_offset: Vec2,
    /// Pixel step between stacked panels.
    pub panel_offset: Vec2,
    pub draw_tile_borders: bool,
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub open: Vec<String>,
    pub confirm: Vec<String>,
    pub back: Vec<String>,
    pub close: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub filter: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    menu: TomlMenu,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_screen_offset")]
    screen_offset: [i32; 2],
    #[serde(default = "default_panel_offset")]
    panel_offset: [i32; 2],
    #[serde(default)]
    draw_tile_borders: bool,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlMenu {
    #[serde(default)]
    file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_open")]
    open: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_back")]
    back: Vec<String>,
    #[serde(default = "default_close")]
    close: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_filter")]
    filter: String,
}

// ── Defaults ──

fn default_screen_offset() -> [i32; 2] { [32, 48] }
fn default_panel_offset() -> [i32; 2] { [64, 48] }   // 4 cells right, 2 down in the terminal
fn default_frame_sleep() -> u64 { 5 }

fn default_open() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_back() -> Vec<String> { vec!["B".into()] }
fn default_close() -> Vec<String> { vec!["Select".into()] }

fn default_log_file() -> String { "retromenu.log".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            screen_offset: default_screen_offset(),
            panel_offset: default_panel_offset(),
            draw_tile_borders: false,
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            open: default_open(),
            confirm: default_confirm(),
            back: default_back(),
            close: default_close(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

// ── Loading ──

impl AppConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Relative menu paths are kept as given.
    #[cfg(test)]
    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let menu_file = toml_cfg
            .menu
            .file
            .as_deref()
            .map(|f| resolve_data_path(f, search_dirs));

        AppConfig {
            display: DisplayConfig {
                screen_offset: Vec2::from(toml_cfg.display.screen_offset),
                panel_offset: Vec2::from(toml_cfg.display.panel_offset),
                draw_tile_borders: toml_cfg.display.draw_tile_borders,
                frame_sleep_ms: toml_cfg.display.frame_sleep_ms,
            },
            gamepad: GamepadConfig {
                open: toml_cfg.gamepad.open,
                confirm: toml_cfg.gamepad.confirm,
                back: toml_cfg.gamepad.back,
                close: toml_cfg.gamepad.close,
            },
            log: LogConfig {
                file: PathBuf::from(toml_cfg.log.file),
                filter: toml_cfg.log.filter,
            },
            menu_file,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths are used as-is; relative ones are looked up in the
/// candidate dirs, defaulting to CWD-relative.
fn resolve_data_path(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
