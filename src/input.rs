use crate::snake::Direction;
use crate::state::GameState;

use anyhow::Result;
use log::info;

/// Logical controls, in the order the resolver evaluates them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    Restart,
    Exit,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Up,
        Control::Down,
        Control::Left,
        Control::Right,
        Control::Restart,
        Control::Exit,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn direction(self) -> Option<Direction> {
        match self {
            Control::Up => Some(Direction::Up),
            Control::Down => Some(Direction::Down),
            Control::Left => Some(Direction::Left),
            Control::Right => Some(Direction::Right),
            Control::Restart | Control::Exit => None,
        }
    }
}

/// Which controls are held down right now.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    active: [bool; 6],
}

impl ControlState {
    pub fn is_active(&self, control: Control) -> bool {
        self.active[control.index()]
    }

    pub fn set(&mut self, control: Control, active: bool) {
        self.active[control.index()] = active;
    }

    #[cfg(test)]
    pub fn with(mut self, control: Control) -> Self {
        self.set(control, true);
        self
    }

    pub fn clear(&mut self) {
        self.active = [false; 6];
    }
}

/// Something that can be asked once per frame for the current control state.
pub trait InputSource {
    fn sample(&mut self) -> Result<ControlState>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameIntent {
    pub exit: bool,
    pub restarted: bool,
}

/// Turns held controls into fresh presses. A control fires on the first frame
/// it is seen active and not again until it has been seen inactive.
#[derive(Default)]
pub struct InputResolver {
    latched: [bool; 5],
}

impl InputResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, controls: &ControlState, state: &mut GameState) -> FrameIntent {
        let mut intent = FrameIntent::default();

        for control in Control::ALL.iter().copied().filter(|c| *c != Control::Exit) {
            let latch = &mut self.latched[control.index()];

            if !controls.is_active(control) {
                *latch = false;
                continue;
            }
            if *latch {
                continue;
            }
            *latch = true;

            match control.direction() {
                Some(dir) => state.request(dir),
                None => {
                    state.restart();
                    intent.restarted = true;
                    info!("Restarted");
                }
            }
        }

        intent.exit = controls.is_active(Control::Exit);
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn new_state() -> GameState {
        GameState::new(StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_fresh_press_sets_direction() {
        let mut resolver = InputResolver::new();
        let mut state = new_state();

        resolver.resolve(&ControlState::default().with(Control::Left), &mut state);
        assert_eq!(state.requested(), Direction::Left);
    }

    #[test]
    fn test_held_key_fires_once() {
        let mut resolver = InputResolver::new();
        let mut state = new_state();
        let held = ControlState::default().with(Control::Up);

        resolver.resolve(&held, &mut state);
        assert_eq!(state.requested(), Direction::Up);

        state.request(Direction::Left);
        resolver.resolve(&held, &mut state);
        assert_eq!(state.requested(), Direction::Left);

        // Released, then pressed again
        resolver.resolve(&ControlState::default(), &mut state);
        resolver.resolve(&held, &mut state);
        assert_eq!(state.requested(), Direction::Up);
    }

    #[test]
    fn test_last_direction_in_order_wins() {
        let mut resolver = InputResolver::new();
        let mut state = new_state();
        let controls = ControlState::default()
            .with(Control::Right)
            .with(Control::Up)
            .with(Control::Down);

        resolver.resolve(&controls, &mut state);
        assert_eq!(state.requested(), Direction::Right);
    }

    #[test]
    fn test_restart_control() {
        let mut resolver = InputResolver::new();
        let mut state = new_state();
        state.request(Direction::Up);
        state.step();
        assert_eq!(state.committed(), Direction::Up);

        let intent = resolver.resolve(
            &ControlState::default().with(Control::Restart).with(Control::Right),
            &mut state,
        );
        assert!(intent.restarted);
        assert_eq!(state.requested(), Direction::Stationary);
        assert_eq!(state.committed(), Direction::Stationary);
        assert_eq!(state.head(), crate::SPAWN_CELL);

        // Holding restart does not restart again
        state.request(Direction::Down);
        let intent = resolver.resolve(&ControlState::default().with(Control::Restart), &mut state);
        assert!(!intent.restarted);
        assert_eq!(state.requested(), Direction::Down);
    }

    #[test]
    fn test_exit_is_level_triggered() {
        let mut resolver = InputResolver::new();
        let mut state = new_state();
        let exit = ControlState::default().with(Control::Exit);

        assert!(resolver.resolve(&exit, &mut state).exit);
        assert!(resolver.resolve(&exit, &mut state).exit);
        assert!(!resolver.resolve(&ControlState::default(), &mut state).exit);
    }

    #[test]
    fn test_control_state_clear() {
        let mut controls = ControlState::default().with(Control::Up).with(Control::Exit);
        controls.clear();
        assert_eq!(controls, ControlState::default());
    }
}
