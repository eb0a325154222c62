/// Keyboard input: drains crossterm events and maps key presses to commands.
///
/// Play is turn-based, so only Press events count. Repeat and Release are
/// dropped; a held arrow key does not burn through the move budget.
///
/// Key map:
///   Arrows        →  move 1 cell
///   W / A / S / D →  move 2 cells
///   E             →  pick up
///   T             →  spring the trap in the facing direction
///   Q             →  disarm the fake coin
///   F             →  scan
///   P             →  replay (reset the board)
///   X             →  end the game
///   R             →  restart with fresh resources
///   Esc / Ctrl+C  →  quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use escape_grid::domain::entity::{Direction, Stride};
use escape_grid::sim::intent::Intent;

/// What the front-end should do next.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Play(Intent),
    Quit,
}

pub struct InputState {
    /// Press events collected by the most recent `drain_events()`.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
        }
    }

    /// Read every pending terminal event without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press {
                    self.presses.push(key);
                }
            }
        }
    }

    /// Commands for this frame, in press order.
    pub fn commands(&self, facing: Direction) -> Vec<Command> {
        self.presses.iter().filter_map(|k| map_key(k, facing)).collect()
    }
}

pub fn map_key(key: &KeyEvent, facing: Direction) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }

    let step = |dir, stride| Some(Command::Play(Intent::Move { dir, stride }));

    match key.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Left => step(Direction::Left, Stride::Single),
        KeyCode::Right => step(Direction::Right, Stride::Single),
        KeyCode::Up => step(Direction::Up, Stride::Single),
        KeyCode::Down => step(Direction::Down, Stride::Single),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => step(Direction::Left, Stride::Double),
            'd' => step(Direction::Right, Stride::Double),
            'w' => step(Direction::Up, Stride::Double),
            's' => step(Direction::Down, Stride::Double),
            'e' => Some(Command::Play(Intent::Pickup)),
            't' => Some(Command::Play(Intent::SpringTrap(facing))),
            'q' => Some(Command::Play(Intent::Disarm)),
            'f' => Some(Command::Play(Intent::Scan)),
            'p' => Some(Command::Play(Intent::Replay)),
            'x' => Some(Command::Play(Intent::End)),
            'r' => Some(Command::Play(Intent::Restart)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_single_letters_double() {
        assert_eq!(
            map_key(&key(KeyCode::Right), Direction::Up),
            Some(Command::Play(Intent::Move { dir: Direction::Right, stride: Stride::Single }))
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('S')), Direction::Up),
            Some(Command::Play(Intent::Move { dir: Direction::Down, stride: Stride::Double }))
        );
    }

    #[test]
    fn spring_follows_facing() {
        assert_eq!(
            map_key(&key(KeyCode::Char('t')), Direction::Left),
            Some(Command::Play(Intent::SpringTrap(Direction::Left)))
        );
    }

    #[test]
    fn quit_keys() {
        assert_eq!(map_key(&key(KeyCode::Esc), Direction::Right), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c, Direction::Right), Some(Command::Quit));
        // Plain 'q' disarms, it does not quit
        assert_eq!(map_key(&key(KeyCode::Char('q')), Direction::Right), Some(Command::Play(Intent::Disarm)));
    }

    #[test]
    fn unmapped_keys_ignored() {
        assert_eq!(map_key(&key(KeyCode::Char('z')), Direction::Right), None);
        assert_eq!(map_key(&key(KeyCode::Tab), Direction::Right), None);
        let ctrl_e = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_e, Direction::Right), None);
    }
}
