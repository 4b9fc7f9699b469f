use crate::arc::{
    shows_labels, ARC_WIDTH, GUIDE_DASH, GUIDE_WIDTH, LABEL_FONT_SIZE, LABEL_RADIUS, MARGIN_SCALE,
    TAU,
};
use crate::state::{AngleState, Direction};
use crate::surface::{Font, LineCap, Pen, Scoped, Surface, ARC_COLOR, GUIDE_COLOR, LABEL_COLOR};
use log::debug;

const GUIDE_PEN: Pen = Pen {
    color: GUIDE_COLOR,
    width: GUIDE_WIDTH,
    dash: Some(GUIDE_DASH),
    cap: LineCap::Butt,
};

const ARC_PEN: Pen = Pen {
    color: ARC_COLOR,
    width: ARC_WIDTH,
    dash: None,
    cap: LineCap::Round,
};

const LABEL_FONT: Font = Font {
    size: LABEL_FONT_SIZE,
    bold: true,
};

/// Repaints the whole surface from `state`.
///
/// Draws the dashed guide circle, the arc itself and, unless the arc closes
/// on itself, the "S" and "E" endpoint labels. The surface's transform stack
/// is left as it was found. A missing surface is skipped.
pub fn redraw<S: Surface + ?Sized>(surface: Option<&mut S>, state: &AngleState) {
    let Some(surface) = surface else {
        debug!("redraw skipped: no surface");
        return;
    };

    let (width, height) = surface.size();
    let radius = width.min(height) * 0.5;
    debug!("redraw {:?} on {}x{}", state, width, height);

    let mut ctx = Scoped::new(surface);
    ctx.clear();
    ctx.translate(width / 2.0, height / 2.0);
    ctx.scale(MARGIN_SCALE);

    ctx.stroke_arc(radius, 0.0, TAU, Direction::Forward, &GUIDE_PEN);
    ctx.stroke_arc(
        radius,
        state.start_angle,
        state.end_angle,
        state.direction,
        &ARC_PEN,
    );

    if shows_labels(state.start_angle, state.end_angle) {
        // Labels follow the rotated frame; they are not turned back upright.
        ctx.rotate(state.start_angle);
        ctx.fill_text("S", radius * LABEL_RADIUS, 0.0, &LABEL_FONT, LABEL_COLOR);
        ctx.rotate(state.end_angle - state.start_angle);
        ctx.fill_text("E", radius * LABEL_RADIUS, 0.0, &LABEL_FONT, LABEL_COLOR);
    }
}
