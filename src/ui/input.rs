/// Keyboard input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Edge-triggered commands (open, confirm, back fire once per press)
///   - Auto-repeat for cursor movement while an arrow key is held
///
/// Release events are ignored. A key counts as released once its
/// Press/Repeat events stop for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use retromenu::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Held movement keys start repeating after this delay...
const REPEAT_DELAY: Duration = Duration::from_millis(300);
/// ...and then fire at this interval.
const REPEAT_INTERVAL: Duration = Duration::from_millis(90);

/// What a key press asks the menu to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuCommand {
    Open,
    Move(Direction),
    Confirm,
    Back,
    Close,
    ToggleTileBorders,
    Quit,
}

impl MenuCommand {
    pub fn from_key(code: KeyCode) -> Option<MenuCommand> {
        let cmd = match code {
            KeyCode::Up => MenuCommand::Move(Direction::Up),
            KeyCode::Down => MenuCommand::Move(Direction::Down),
            KeyCode::Left => MenuCommand::Move(Direction::Left),
            KeyCode::Right => MenuCommand::Move(Direction::Right),
            KeyCode::Enter | KeyCode::Char(' ') => MenuCommand::Confirm,
            KeyCode::Esc => MenuCommand::Close,
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'm' => MenuCommand::Open,
                'z' => MenuCommand::Back,
                'd' => MenuCommand::ToggleTileBorders,
                'q' => MenuCommand::Quit,
                _ => return None,
            },
            _ => return None,
        };
        Some(cmd)
    }

    fn repeats(self) -> bool {
        matches!(self, MenuCommand::Move(_))
    }
}

struct Hold {
    first: Instant,
    last_active: Instant,
    last_fired: Instant,
}

pub struct InputState {
    held: HashMap<KeyCode, Hold>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        // Expire keys that have timed out
        let now = Instant::now();
        self.held.retain(|_, h| now.duration_since(h.last_active) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.raw_events.push(key);
        let was_held = self
            .held
            .get(&key.code)
            .is_some_and(|h| now.duration_since(h.last_active) < HOLD_TIMEOUT);
        if was_held {
            if let Some(h) = self.held.get_mut(&key.code) {
                h.last_active = now;
            }
        } else {
            self.held.insert(key.code, Hold { first: now, last_active: now, last_fired: now });
            self.fresh_presses.push(key.code);
        }
    }

    /// Commands for this frame: fresh presses, plus auto-repeat of held
    /// movement keys.
    pub fn commands(&mut self) -> Vec<MenuCommand> {
        self.commands_at(Instant::now())
    }

    fn commands_at(&mut self, now: Instant) -> Vec<MenuCommand> {
        let mut out: Vec<MenuCommand> = self
            .fresh_presses
            .iter()
            .filter_map(|&code| MenuCommand::from_key(code))
            .collect();

        for (code, hold) in self.held.iter_mut() {
            if self.fresh_presses.contains(code) {
                continue;
            }
            let Some(cmd) = MenuCommand::from_key(*code) else { continue };
            if !cmd.repeats() {
                continue;
            }
            if now.duration_since(hold.first) >= REPEAT_DELAY
                && now.duration_since(hold.last_fired) >= REPEAT_INTERVAL
            {
                hold.last_fired = now;
                out.push(cmd);
            }
        }
        out
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
