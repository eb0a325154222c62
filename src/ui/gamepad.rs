/// Gamepad input using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick  →  move 1 cell (2 cells while a stride button is held)
///   A                   →  pick up
///   B                   →  disarm
///   X                   →  spring trap ahead
///   Y                   →  scan
///   R1 / L1             →  stride modifier
///   Start               →  restart
///   Select              →  quit
///
/// Without the "gamepad" feature this compiles to a stub that never
/// produces commands.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use escape_grid::config::GamepadConfig;
use escape_grid::domain::entity::{Direction, Stride};
use escape_grid::sim::intent::Intent;

use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Which action a pressed button triggers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PadAction {
    Pickup,
    Disarm,
    Scan,
    Spring,
    Restart,
    Quit,
}

/// Button → action table built from config. First match wins.
pub struct ButtonMap {
    actions: Vec<(Btn, PadAction)>,
    stride: Vec<Btn>,
}

impl ButtonMap {
    pub fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }

        let mut actions = Vec::new();
        for (names, action) in [
            (&cfg.pickup, PadAction::Pickup),
            (&cfg.disarm, PadAction::Disarm),
            (&cfg.scan, PadAction::Scan),
            (&cfg.spring, PadAction::Spring),
            (&cfg.restart, PadAction::Restart),
            (&cfg.quit, PadAction::Quit),
        ] {
            actions.extend(parse(names).into_iter().map(|b| (b, action)));
        }

        ButtonMap { actions, stride: parse(&cfg.stride) }
    }

    fn command_for(&self, btn: Btn, facing: Direction) -> Option<Command> {
        let (_, action) = self.actions.iter().find(|(b, _)| *b == btn)?;
        Some(match action {
            PadAction::Pickup => Command::Play(Intent::Pickup),
            PadAction::Disarm => Command::Play(Intent::Disarm),
            PadAction::Scan => Command::Play(Intent::Scan),
            PadAction::Spring => Command::Play(Intent::SpringTrap(facing)),
            PadAction::Restart => Command::Play(Intent::Restart),
            PadAction::Quit => Command::Quit,
        })
    }

    fn is_stride(&self, btn: Btn) -> bool {
        self.stride.contains(&btn)
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    map: ButtonMap,
    /// Stride modifier buttons currently held.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stride_held: Vec<Btn>,
    /// Stick direction currently past the deadzone (edge detection).
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<Direction>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: (f32, f32),
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            map: ButtonMap::from_config(cfg),
            stride_held: Vec::new(),
            stick_dir: None,
            stick: (0.0, 0.0),
            connected,
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn stride(&self) -> Stride {
        if self.stride_held.is_empty() {
            Stride::Single
        } else {
            Stride::Double
        }
    }

    /// Drain pending pad events into commands.
    #[cfg(feature = "gamepad")]
    pub fn poll(&mut self, facing: Direction) -> Vec<Command> {
        let mut out = Vec::new();
        let events: Vec<_> = match &mut self.gilrs {
            Some(g) => std::iter::from_fn(|| g.next_event()).collect(),
            None => return out,
        };

        for event in events {
            match event.event {
                EventType::ButtonPressed(button, _) => {
                    self.connected = true;
                    if let Some(dir) = dpad_direction(button) {
                        out.push(Command::Play(Intent::Move { dir, stride: self.stride() }));
                        continue;
                    }
                    let Some(btn) = Btn::from_gilrs(button) else { continue };
                    if self.map.is_stride(btn) {
                        if !self.stride_held.contains(&btn) {
                            self.stride_held.push(btn);
                        }
                    } else if let Some(cmd) = self.map.command_for(btn, facing) {
                        out.push(cmd);
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(btn) = Btn::from_gilrs(button) {
                        self.stride_held.retain(|b| *b != btn);
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick.0 = value,
                        Axis::LeftStickY => self.stick.1 = value,
                        _ => continue,
                    }
                    let dir = stick_direction(self.stick);
                    if let Some(d) = dir.filter(|_| dir != self.stick_dir) {
                        out.push(Command::Play(Intent::Move { dir: d, stride: self.stride() }));
                    }
                    self.stick_dir = dir;
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stride_held.clear();
                    self.stick = (0.0, 0.0);
                    self.stick_dir = None;
                }
                _ => {}
            }
        }
        out
    }

    #[cfg(not(feature = "gamepad"))]
    pub fn poll(&mut self, _facing: Direction) -> Vec<Command> {
        Vec::new()
    }
}

#[cfg(feature = "gamepad")]
fn dpad_direction(button: Button) -> Option<Direction> {
    match button {
        Button::DPadUp => Some(Direction::Up),
        Button::DPadDown => Some(Direction::Down),
        Button::DPadLeft => Some(Direction::Left),
        Button::DPadRight => Some(Direction::Right),
        _ => None,
    }
}

/// Dominant stick axis past the deadzone. Stick y is positive upward.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction((x, y): (f32, f32)) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    Some(if x.abs() >= y.abs() {
        if x > 0.0 { Direction::Right } else { Direction::Left }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn default_map() {
        let map = ButtonMap::from_config(&GamepadConfig::default());
        assert_eq!(map.command_for(Btn::A, Direction::Up), Some(Command::Play(Intent::Pickup)));
        assert_eq!(map.command_for(Btn::B, Direction::Up), Some(Command::Play(Intent::Disarm)));
        assert_eq!(map.command_for(Btn::Y, Direction::Up), Some(Command::Play(Intent::Scan)));
        assert_eq!(
            map.command_for(Btn::X, Direction::Down),
            Some(Command::Play(Intent::SpringTrap(Direction::Down)))
        );
        assert_eq!(map.command_for(Btn::Select, Direction::Up), Some(Command::Quit));
        assert_eq!(map.command_for(Btn::R1, Direction::Up), None);
        assert!(map.is_stride(Btn::R1));
        assert!(map.is_stride(Btn::L1));
    }

    #[test]
    fn custom_map_skips_unknown_names() {
        let cfg = GamepadConfig {
            scan: vec!["R2".into(), "bogus".into()],
            ..GamepadConfig::default()
        };
        let map = ButtonMap::from_config(&cfg);
        assert_eq!(map.command_for(Btn::R2, Direction::Up), Some(Command::Play(Intent::Scan)));
        assert_eq!(map.command_for(Btn::Y, Direction::Up), None);
    }

    #[test]
    fn stick_deadzone_and_dominant_axis() {
        assert_eq!(stick_direction((0.2, -0.3)), None);
        assert_eq!(stick_direction((0.9, 0.4)), Some(Direction::Right));
        assert_eq!(stick_direction((-0.6, 0.1)), Some(Direction::Left));
        assert_eq!(stick_direction((0.1, 0.8)), Some(Direction::Up));
        assert_eq!(stick_direction((0.3, -0.7)), Some(Direction::Down));
    }
}
