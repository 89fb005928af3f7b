use crate::browser;
use crate::engine::Point;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, TryRecvError, UnboundedReceiver};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The four ways the player can walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Order the frame loop tries held directions in, first wins
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Right => 3,
        }
    }

    /// How far the WORLD moves when the player walks this way with the
    /// camera following : always opposite the player's travel
    /// ┌───────────┬──────────────┐
    /// │ direction │ world shift  │
    /// ├───────────┼──────────────┤
    /// │ Up        │ (0, +step)   │
    /// │ Left      │ (+step, 0)   │
    /// │ Down      │ (0, -step)   │
    /// │ Right     │ (-step, 0)   │
    /// └───────────┴──────────────┘
    pub fn world_shift(self, step: f32) -> Point {
        match self {
            Direction::Up => Point::new(0.0, step),
            Direction::Left => Point::new(step, 0.0),
            Direction::Down => Point::new(0.0, -step),
            Direction::Right => Point::new(-step, 0.0),
        }
    }

    /// How far the PLAYER moves when the camera stays put
    pub fn travel(self, step: f32) -> Point {
        let shift = self.world_shift(step);
        Point::new(-shift.x, -shift.y)
    }
}

// Both WASD and the arrow keys walk; upper case covers caps lock / shift
static KEY_BINDINGS: Lazy<HashMap<&'static str, Direction>> = Lazy::new(|| {
    let mut bindings = HashMap::new();
    for (keys, direction) in [
        (["w", "W", "ArrowUp"], Direction::Up),
        (["a", "A", "ArrowLeft"], Direction::Left),
        (["s", "S", "ArrowDown"], Direction::Down),
        (["d", "D", "ArrowRight"], Direction::Right),
    ] {
        for key in keys {
            bindings.insert(key, direction);
        }
    }
    bindings
});

/// `KeyboardEvent.key` -> walking direction, `None` for keys the game ignores
pub fn direction_for_key(key: &str) -> Option<Direction> {
    KEY_BINDINGS.get(key).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    KeyDown(Direction),
    KeyUp(Direction),
}

/// Snapshot of the directional keys the frame loop reads every tick
/// - written ONLY by the input side (`apply`, `press`, `release`)
/// - read ONLY by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    held: [bool; 4],
    last_pressed: Direction,
}

impl Default for InputState {
    /// nothing held, facing down
    fn default() -> Self {
        InputState {
            held: [false; 4],
            last_pressed: Direction::Down,
        }
    }
}

impl InputState {
    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    pub fn last_pressed(&self) -> Direction {
        self.last_pressed
    }

    /// A fresh press takes over from the previous direction : the previously
    /// last pressed key stops counting as held, so the newest key is the
    /// one that walks
    pub fn press(&mut self, direction: Direction) {
        if direction != self.last_pressed {
            self.held[self.last_pressed.index()] = false;
        }
        self.held[direction.index()] = true;
        self.last_pressed = direction;
    }

    pub fn release(&mut self, direction: Direction) {
        self.held[direction.index()] = false;
    }

    /// Raw flag write, no takeover rule
    pub fn set_held(&mut self, direction: Direction, held: bool) {
        self.held[direction.index()] = held;
    }

    pub fn apply(&mut self, key_press: KeyPress) {
        match key_press {
            KeyPress::KeyDown(direction) => self.press(direction),
            KeyPress::KeyUp(direction) => self.release(direction),
        }
    }
}

/// Hook keyboard listeners up to a channel
/// - events arrive whenever the browser fires them
/// - the game loop drains them once per frame via `process_input`
pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keyup_sender = keydown_sender.clone();

    browser::add_key_listeners(
        move |event: web_sys::KeyboardEvent| {
            if let Some(direction) = direction_for_key(&event.key()) {
                let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(direction));
            }
        },
        move |event: web_sys::KeyboardEvent| {
            if let Some(direction) = direction_for_key(&event.key()) {
                let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(direction));
            }
        },
    )?;

    Ok(keyevent_receiver)
}

/// Apply every queued key event to `state`
/// # Returns
/// * `true`  - queue drained, more events may come
/// * `false` - sender side is gone, nothing more will ever arrive
pub fn process_input(
    state: &mut InputState,
    keyevent_receiver: &mut UnboundedReceiver<KeyPress>,
) -> bool {
    loop {
        match keyevent_receiver.try_recv() {
            Ok(key_press) => state.apply(key_press),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Closed) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_idle_facing_down() {
        let state = InputState::default();
        assert_eq!(state.last_pressed(), Direction::Down);
        for direction in Direction::PRIORITY {
            assert!(!state.is_held(direction));
        }
    }

    #[test]
    fn press_then_release() {
        let mut state = InputState::default();
        state.apply(KeyPress::KeyDown(Direction::Left));
        assert!(state.is_held(Direction::Left));
        assert_eq!(state.last_pressed(), Direction::Left);

        state.apply(KeyPress::KeyUp(Direction::Left));
        assert!(!state.is_held(Direction::Left));
        // facing survives the release
        assert_eq!(state.last_pressed(), Direction::Left);
    }

    #[test]
    fn new_press_takes_over_from_last_pressed() {
        let mut state = InputState::default();
        state.press(Direction::Up);
        state.press(Direction::Right);
        assert!(!state.is_held(Direction::Up));
        assert!(state.is_held(Direction::Right));
        assert_eq!(state.last_pressed(), Direction::Right);
    }

    #[test]
    fn key_repeat_keeps_direction_held() {
        let mut state = InputState::default();
        state.press(Direction::Down);
        state.press(Direction::Down);
        assert!(state.is_held(Direction::Down));
    }

    #[test]
    fn set_held_allows_simultaneous_directions() {
        let mut state = InputState::default();
        state.set_held(Direction::Up, true);
        state.set_held(Direction::Left, true);
        assert!(state.is_held(Direction::Up));
        assert!(state.is_held(Direction::Left));
    }

    #[test]
    fn key_bindings() {
        assert_eq!(direction_for_key("w"), Some(Direction::Up));
        assert_eq!(direction_for_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(direction_for_key("S"), Some(Direction::Down));
        assert_eq!(direction_for_key("d"), Some(Direction::Right));
        assert_eq!(direction_for_key(" "), None);
        assert_eq!(direction_for_key("Shift"), None);
    }

    #[test]
    fn travel_is_opposite_world_shift() {
        for direction in Direction::PRIORITY {
            let shift = direction.world_shift(4.0);
            let travel = direction.travel(4.0);
            assert_relative_eq!(shift.x + travel.x, 0.0);
            assert_relative_eq!(shift.y + travel.y, 0.0);
            assert_relative_eq!(shift.x.abs() + shift.y.abs(), 4.0);
        }
        assert_eq!(Direction::Up.world_shift(4.0), Point::new(0.0, 4.0));
        assert_eq!(Direction::Right.world_shift(4.0), Point::new(-4.0, 0.0));
    }

    #[test]
    fn draining_the_channel_applies_events_in_order() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(KeyPress::KeyDown(Direction::Up)).unwrap();
        sender.unbounded_send(KeyPress::KeyDown(Direction::Left)).unwrap();
        sender.unbounded_send(KeyPress::KeyUp(Direction::Left)).unwrap();

        let mut state = InputState::default();
        assert!(process_input(&mut state, &mut receiver));

        assert!(!state.is_held(Direction::Up));
        assert!(!state.is_held(Direction::Left));
        assert_eq!(state.last_pressed(), Direction::Left);
    }

    #[test]
    fn closed_channel_is_reported_after_draining() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(KeyPress::KeyDown(Direction::Right)).unwrap();
        drop(sender);

        let mut state = InputState::default();
        assert!(!process_input(&mut state, &mut receiver));
        // queued events still land before the close is seen
        assert!(state.is_held(Direction::Right));
        assert!(!process_input(&mut state, &mut receiver));
    }
}
