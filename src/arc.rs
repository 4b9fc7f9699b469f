use crate::state::Direction;
use std::f64::consts::PI;

pub const TAU: f64 = PI * 2.0;

/// Decimal places kept for user-entered angles and for the readout.
pub const PRECISION: i32 = 2;

pub const DEFAULT_START_ANGLE: f64 = 0.0;
/// `PI / 4` rounded to [`PRECISION`] places.
pub const DEFAULT_END_ANGLE: f64 = 0.79;

/// Endpoint labels are hidden when the arc is within this many radians of a full turn.
pub const ANGLE_THRESHOLD: f64 = 0.05;

/// Side length of the square drawing surface, in logical units.
pub const SURFACE_SIZE: f64 = 500.0;
pub const MARGIN_SCALE: f64 = 0.95;
/// Distance of the endpoint labels from the centre, as a fraction of the radius.
pub const LABEL_RADIUS: f64 = 0.85;

pub const GUIDE_DASH: &[f64] = &[15.0, 10.0];
pub const GUIDE_WIDTH: f64 = 3.0;
pub const ARC_WIDTH: f64 = 15.0;
pub const LABEL_FONT_SIZE: f64 = 18.0;

/// Rounds half toward positive infinity, the way `Math.round` does.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    // Adding zero folds -0.0 into 0.0.
    rounded / factor + 0.0
}

/// Signed sweep of `arc(x, y, r, start, end, anticlockwise)`.
///
/// Positive sweeps run clockwise on a y-down surface. A difference of a full
/// turn or more in the drawing direction produces the whole circumference;
/// anything less is reduced modulo a full turn.
pub fn sweep_angle(start: f64, end: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Forward | Direction::Unspecified => {
            let delta = end - start;
            if delta >= TAU {
                TAU
            } else {
                wrap(delta)
            }
        }
        Direction::Reverse => {
            let delta = start - end;
            if delta >= TAU {
                -TAU
            } else {
                -wrap(delta)
            }
        }
    }
}

fn wrap(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Distance of `|start - end|` from a whole turn, folded into `[0, TAU)`.
pub fn label_span(start: f64, end: f64) -> f64 {
    ((start - end).abs() - TAU).abs() % TAU
}

/// Whether the "S" and "E" endpoint labels are drawn.
pub fn shows_labels(start: f64, end: f64) -> bool {
    label_span(start, end) > ANGLE_THRESHOLD
}
