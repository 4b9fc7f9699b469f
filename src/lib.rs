//! Interactive explorer for the canvas `arc(x, y, radius, startAngle, endAngle, anticlockwise)` call.
//!
//! [`state`] holds the three arc parameters, [`render::redraw`] paints them onto
//! any [`surface::Surface`], and [`readout`] spells out the equivalent call.
//! Two frontends drive them: a druid window ([`widget`], feature `gui`) and a
//! terminal preview ([`terminal`]).

pub mod arc;
pub mod error;
pub mod raster;
pub mod readout;
pub mod render;
pub mod state;
pub mod surface;
pub mod terminal;
#[cfg(feature = "gui")]
pub mod widget;

pub use error::{Error, Result};
pub use state::{AngleState, AngleStore, Direction};
