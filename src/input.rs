use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Input {
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl Input {
    pub(crate) fn merge(&mut self, other: Input) {
        self.up |= other.up;
        self.down |= other.down;
        self.left |= other.left;
        self.right |= other.right;
    }

    pub(crate) fn pressed(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Quit,
    Pause,
    Theme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Move(Direction),
    Command(Command),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub(crate) const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn offset(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FrameInput {
    pub(crate) input: Input,
    pub(crate) commands: Vec<Command>,
}

impl FrameInput {
    pub(crate) fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Move(Direction::Up) => self.input.up = true,
            KeyAction::Move(Direction::Down) => self.input.down = true,
            KeyAction::Move(Direction::Left) => self.input.left = true,
            KeyAction::Move(Direction::Right) => self.input.right = true,
            KeyAction::Command(c) => self.commands.push(c),
        }
    }
}

pub(crate) fn map_key(key: KeyCode, mods: KeyModifiers) -> Option<KeyAction> {
    if matches!(key, KeyCode::Char('c') | KeyCode::Char('C')) && mods.contains(KeyModifiers::CONTROL)
    {
        return Some(KeyAction::Command(Command::Quit));
    }
    match key {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(KeyAction::Move(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(KeyAction::Move(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(KeyAction::Move(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(KeyAction::Move(Direction::Right))
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            Some(KeyAction::Command(Command::Quit))
        }
        KeyCode::Char(' ') => Some(KeyAction::Command(Command::Pause)),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(KeyAction::Command(Command::Theme)),
        _ => None,
    }
}

/// Drain pending key presses without blocking. Presses are edge triggered:
/// holding a key does not repeat steps.
pub(crate) fn collect_input_nonblocking() -> anyhow::Result<FrameInput> {
    let mut out = FrameInput::default();
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = map_key(k.code, k.modifiers) {
                out.apply(action);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(KeyCode::Up, Some(KeyAction::Move(Direction::Up)))]
    #[case(KeyCode::Char('a'), Some(KeyAction::Move(Direction::Left)))]
    #[case(KeyCode::Char('D'), Some(KeyAction::Move(Direction::Right)))]
    #[case(KeyCode::Esc, Some(KeyAction::Command(Command::Quit)))]
    #[case(KeyCode::Char(' '), Some(KeyAction::Command(Command::Pause)))]
    #[case(KeyCode::Char('x'), None)]
    fn key_mapping(#[case] key: KeyCode, #[case] want: Option<KeyAction>) {
        assert_eq!(map_key(key, KeyModifiers::NONE), want);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(KeyAction::Command(Command::Quit))
        );
    }

    #[test]
    fn merge_keeps_presses_from_both() {
        let mut a = Input {
            up: true,
            ..Input::default()
        };
        a.merge(Input {
            left: true,
            ..Input::default()
        });
        assert!(a.up && a.left && !a.down && !a.right);
    }

    #[test]
    fn opposing_keys_are_kept_independently() {
        let mut f = FrameInput::default();
        f.apply(KeyAction::Move(Direction::Left));
        f.apply(KeyAction::Move(Direction::Right));
        f.apply(KeyAction::Move(Direction::Up));
        assert!(f.input.left && f.input.right && f.input.up);
        assert!(!f.input.down);
        assert!(f.commands.is_empty());
    }
}
