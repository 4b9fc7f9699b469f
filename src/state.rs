use crate::arc::{round_to, DEFAULT_END_ANGLE, DEFAULT_START_ANGLE, PRECISION};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Sweep direction of an arc.
///
/// `Unspecified` leaves the flag out of the call, which draws like `Forward`.
#[cfg_attr(feature = "gui", derive(druid::Data))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `anticlockwise = false`
    Forward,
    /// `anticlockwise = true`
    Reverse,
    #[default]
    Unspecified,
}

impl Direction {
    /// Every direction in the order the radio options are listed.
    pub const ALL: [Direction; 3] = [Direction::Reverse, Direction::Forward, Direction::Unspecified];

    /// The `anticlockwise` argument of the call, if one is passed.
    pub fn anticlockwise(self) -> Option<bool> {
        match self {
            Direction::Forward => Some(false),
            Direction::Reverse => Some(true),
            Direction::Unspecified => None,
        }
    }

    /// Literal shown on the radio option.
    pub fn tag(self) -> &'static str {
        match self {
            Direction::Forward => "false",
            Direction::Reverse => "true",
            Direction::Unspecified => "undefined",
        }
    }

    /// The next radio option, wrapping around.
    pub fn next(self) -> Direction {
        match self {
            Direction::Reverse => Direction::Forward,
            Direction::Forward => Direction::Unspecified,
            Direction::Unspecified => Direction::Reverse,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction `{0}` (expected true, false or undefined)")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "false" | "forward" | "clockwise" => Ok(Direction::Forward),
            "true" | "reverse" | "anticlockwise" => Ok(Direction::Reverse),
            "undefined" | "unspecified" => Ok(Direction::Unspecified),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Parameters of the arc being explored
#[cfg_attr(feature = "gui", derive(druid::Data, druid::Lens))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleState {
    /// Start angle in radians
    pub start_angle: f64,
    /// End angle in radians
    pub end_angle: f64,
    /// Sweep direction flag
    pub direction: Direction,
}

impl AngleState {
    pub fn new(start_angle: f64, end_angle: f64, direction: Direction) -> Self {
        let mut state = AngleState {
            start_angle: 0.0,
            end_angle: 0.0,
            direction,
        };
        state.set_start(start_angle);
        state.set_end(end_angle);
        state
    }

    /// Stores `value` rounded to two decimals. Any range is accepted.
    pub fn set_start(&mut self, value: f64) {
        self.start_angle = round_to(value, PRECISION);
    }

    pub fn set_end(&mut self, value: f64) {
        self.end_angle = round_to(value, PRECISION);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

impl Default for AngleState {
    fn default() -> Self {
        AngleState {
            start_angle: DEFAULT_START_ANGLE,
            end_angle: DEFAULT_END_ANGLE,
            direction: Direction::Unspecified,
        }
    }
}

type Subscriber = Box<dyn FnMut(&AngleState)>;

/// Owns an [`AngleState`] and tells subscribers about every change to it.
#[derive(Default)]
pub struct AngleStore {
    state: AngleState,
    subscribers: Vec<Subscriber>,
}

impl AngleStore {
    pub fn new(state: AngleState) -> Self {
        AngleStore {
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AngleState {
        &self.state
    }

    /// Registers `callback`; it runs once after each change of state.
    pub fn subscribe(&mut self, callback: impl FnMut(&AngleState) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn set_start(&mut self, value: f64) {
        self.update(|state| state.set_start(value));
    }

    pub fn set_end(&mut self, value: f64) {
        self.update(|state| state.set_end(value));
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.update(|state| state.set_direction(direction));
    }

    /// Replaces the whole state, e.g. when restoring defaults.
    pub fn replace(&mut self, state: AngleState) {
        self.update(|current| *current = state);
    }

    fn update(&mut self, mutate: impl FnOnce(&mut AngleState)) {
        let before = self.state;
        mutate(&mut self.state);
        if self.state == before {
            return;
        }
        debug!("angle state changed: {:?}", self.state);
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn defaults() {
        let state = AngleState::default();
        assert_eq!(state.start_angle, 0.0);
        assert_eq!(state.end_angle, 0.79);
        assert_eq!(state.direction, Direction::Unspecified);
    }

    #[test]
    fn setters_round_without_clamping() {
        let mut state = AngleState::default();
        state.set_start(-3.14159);
        state.set_end(12.3456);
        assert_eq!(state.start_angle, -3.14);
        assert_eq!(state.end_angle, 12.35);
    }

    #[test]
    fn new_rounds_its_arguments() {
        let state = AngleState::new(1.005, 2.999, Direction::Reverse);
        assert_eq!(state.start_angle, round_to(1.005, 2));
        assert_eq!(state.end_angle, 3.0);
        assert_eq!(state.direction, Direction::Reverse);
    }

    #[test]
    fn direction_cycles_through_every_option() {
        let mut direction = Direction::Reverse;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(direction);
            direction = direction.next();
        }
        assert_eq!(direction, Direction::Reverse);
        assert_eq!(seen, Direction::ALL);
    }

    #[test]
    fn direction_tags_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(direction.tag().parse::<Direction>(), Ok(direction));
        }
        assert_eq!("Anticlockwise".parse::<Direction>(), Ok(Direction::Reverse));
        assert_eq!(
            "sideways".parse::<Direction>().unwrap_err().to_string(),
            "unknown direction `sideways` (expected true, false or undefined)"
        );
    }

    #[test]
    fn anticlockwise_flag() {
        assert_eq!(Direction::Forward.anticlockwise(), Some(false));
        assert_eq!(Direction::Reverse.anticlockwise(), Some(true));
        assert_eq!(Direction::Unspecified.anticlockwise(), None);
    }

    #[test]
    fn store_notifies_once_per_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = AngleStore::new(AngleState::default());
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| sink.borrow_mut().push(*state));

        store.set_start(1.234);
        store.set_direction(Direction::Reverse);
        store.set_end(0.79);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].start_angle, 1.23);
        assert_eq!(seen[1].direction, Direction::Reverse);
        assert_eq!(*store.state(), seen[1]);
    }

    #[test]
    fn store_skips_unchanged_values() {
        let count = Rc::new(RefCell::new(0));
        let mut store = AngleStore::new(AngleState::default());
        let counter = Rc::clone(&count);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.set_start(0.001);
        store.set_direction(Direction::Unspecified);
        store.replace(AngleState::default());
        assert_eq!(*count.borrow(), 0);
    }

    proptest! {
        #[test]
        fn start_and_end_store_rounded_values(v in -1.0e4f64..1.0e4) {
            let mut state = AngleState::default();
            state.set_start(v);
            state.set_end(v);
            prop_assert_eq!(state.start_angle, round_to(v, PRECISION));
            prop_assert_eq!(state.end_angle, round_to(v, PRECISION));
        }
    }
}
