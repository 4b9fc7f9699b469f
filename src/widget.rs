use crate::arc::{sweep_angle, SURFACE_SIZE, TAU};
use crate::error::Result;
use crate::readout::{self, BACKGROUND};
use crate::render::redraw;
use crate::state::{AngleState, Direction};
use crate::surface::{self, Font, Pen, Rgba, Surface};
use druid::kurbo::{Affine, Arc, Point, Shape, Vec2};
use druid::piet::{FontFamily, FontWeight, StrokeStyle, Text, TextLayout, TextLayoutBuilder};
use druid::text::{FontDescriptor, ParseFormatter, RichText, RichTextBuilder};
use druid::widget::prelude::*;
use druid::widget::{CrossAxisAlignment, Flex, Label, RadioGroup, RawLabel, Slider, TextBox};
use druid::{lens, AppLauncher, Color, Data, Lens, RenderContext, Widget, WidgetExt, WindowDesc};
use log::warn;

/// Page color shown where the canvas is cleared.
const CANVAS_BACKGROUND: Color = Color::WHITE;

fn to_color(rgba: Rgba) -> Color {
    let (r, g, b, a) = rgba.as_rgba8();
    Color::rgba8(r, g, b, a)
}

/// A [`Surface`] drawing through a piet render context.
pub struct PietSurface<'a, R: RenderContext> {
    ctx: &'a mut R,
    size: Size,
    /// Widget-space transform at creation; `clear` paints in this frame.
    origin: Affine,
}

impl<'a, R: RenderContext> PietSurface<'a, R> {
    pub fn new(ctx: &'a mut R, size: Size) -> Self {
        let origin = ctx.current_transform();
        PietSurface { ctx, size, origin }
    }
}

impl<R: RenderContext> Surface for PietSurface<'_, R> {
    fn size(&self) -> (f64, f64) {
        (self.size.width, self.size.height)
    }

    fn save(&mut self) {
        if let Err(e) = self.ctx.save() {
            warn!("save failed: {}", e);
        }
    }

    fn restore(&mut self) {
        if let Err(e) = self.ctx.restore() {
            warn!("restore failed: {}", e);
        }
    }

    fn clear(&mut self) {
        let to_origin = self.ctx.current_transform().inverse() * self.origin;
        let area = to_origin * self.size.to_rect().to_path(0.1);
        self.ctx.fill(area, &CANVAS_BACKGROUND);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ctx.transform(Affine::translate((dx, dy)));
    }

    fn scale(&mut self, factor: f64) {
        self.ctx.transform(Affine::scale(factor));
    }

    fn rotate(&mut self, angle: f64) {
        self.ctx.transform(Affine::rotate(angle));
    }

    fn stroke_arc(&mut self, radius: f64, start: f64, end: f64, direction: Direction, pen: &Pen) {
        let arc = Arc {
            center: Point::ORIGIN,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: sweep_angle(start, end, direction),
            x_rotation: 0.0,
        };
        let cap = match pen.cap {
            surface::LineCap::Butt => druid::piet::LineCap::Butt,
            surface::LineCap::Round => druid::piet::LineCap::Round,
        };
        let mut style = StrokeStyle::new().line_cap(cap);
        if let Some(pattern) = pen.dash {
            style = style.dash_pattern(pattern);
        }
        self.ctx.stroke_styled(arc, &to_color(pen.color), pen.width, &style);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &Font, color: Rgba) {
        let weight = if font.bold {
            FontWeight::BOLD
        } else {
            FontWeight::NORMAL
        };
        let layout = match self
            .ctx
            .text()
            .new_text_layout(text.to_string())
            .font(FontFamily::SANS_SERIF, font.size)
            .default_attribute(weight)
            .text_color(to_color(color))
            .build()
        {
            Ok(layout) => layout,
            Err(e) => {
                warn!("text layout for {:?} failed: {}", text, e);
                return;
            }
        };
        // Layouts are positioned by their top-left corner, canvas text by its baseline.
        let baseline = layout.line_metric(0).map_or(0.0, |m| m.baseline);
        self.ctx.draw_text(&layout, (x, y - baseline));
    }
}

/// Canvas widget painting the arc for the current [`AngleState`]
#[derive(Default)]
pub struct ArcWidget;

impl ArcWidget {
    pub fn new() -> Self {
        ArcWidget
    }
}

impl Widget<AngleState> for ArcWidget {
    fn event(&mut self, _ctx: &mut EventCtx, _event: &Event, _data: &mut AngleState, _env: &Env) {}

    fn lifecycle(
        &mut self,
        _ctx: &mut LifeCycleCtx,
        _event: &LifeCycle,
        _data: &AngleState,
        _env: &Env,
    ) {
    }

    /// Every change of state schedules exactly one repaint
    fn update(&mut self, ctx: &mut UpdateCtx, old_data: &AngleState, data: &AngleState, _env: &Env) {
        if !old_data.same(data) {
            ctx.request_paint();
        }
    }

    /// The canvas is a fixed square
    fn layout(
        &mut self,
        _layout_ctx: &mut LayoutCtx,
        bc: &BoxConstraints,
        _data: &AngleState,
        _env: &Env,
    ) -> Size {
        bc.constrain(Size::new(SURFACE_SIZE, SURFACE_SIZE))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AngleState, _env: &Env) {
        let size = ctx.size();
        let mut surface = PietSurface::new(&mut *ctx.render_ctx, size);
        redraw(Some(&mut surface), data);
    }
}

fn start_lens() -> impl Lens<AngleState, f64> + Clone {
    lens::Map::new(
        |state: &AngleState| state.start_angle,
        |state: &mut AngleState, value: f64| state.set_start(value),
    )
}

fn end_lens() -> impl Lens<AngleState, f64> + Clone {
    lens::Map::new(
        |state: &AngleState| state.end_angle,
        |state: &mut AngleState, value: f64| state.set_end(value),
    )
}

fn card<W: Widget<AngleState> + 'static>(inner: W) -> impl Widget<AngleState> {
    inner
        .padding(12.0)
        .border(Color::grey(0.75), 1.0)
        .rounded(4.0)
}

fn code_label(text: &str) -> Label<AngleState> {
    Label::new(text.to_string()).with_font(FontDescriptor::new(FontFamily::MONOSPACE))
}

/// A slider and a number box bound to the same angle
fn angle_control<L>(name: &str, lens: L) -> impl Widget<AngleState>
where
    L: Lens<AngleState, f64> + Clone + 'static,
{
    card(
        Flex::column()
            .cross_axis_alignment(CrossAxisAlignment::Start)
            .with_child(code_label(name))
            .with_spacer(8.0)
            .with_child(
                Slider::new()
                    .with_range(0.0, TAU)
                    .expand_width()
                    .lens(lens.clone()),
            )
            .with_spacer(8.0)
            .with_child(
                TextBox::new()
                    .with_formatter(ParseFormatter::new())
                    .update_data_while_editing(true)
                    .expand_width()
                    .lens(lens),
            ),
    )
}

/// Radio options in display order, labelled with the `anticlockwise` literal.
fn direction_options() -> [(&'static str, Direction); 3] {
    Direction::ALL.map(|d| (d.tag(), d))
}

fn direction_control() -> impl Widget<AngleState> {
    card(
        Flex::column()
            .cross_axis_alignment(CrossAxisAlignment::Start)
            .with_child(code_label("anticlockwise"))
            .with_spacer(8.0)
            .with_child(
                RadioGroup::column(direction_options())
                    .lens(AngleState::direction),
            ),
    )
}

/// The readout as rich text in the token colors.
pub fn rich_readout(state: &AngleState) -> RichText {
    let mut builder = RichTextBuilder::new();
    for token in readout::tokens(state) {
        builder
            .push(&token.text)
            .text_color(to_color(token.kind.color()))
            .font_family(FontFamily::MONOSPACE);
    }
    builder.build()
}

fn readout_control() -> impl Widget<AngleState> {
    RawLabel::new()
        .lens(lens::Map::new(
            rich_readout,
            |_: &mut AngleState, _: RichText| {},
        ))
        .padding(12.0)
        .expand_width()
        .background(to_color(BACKGROUND))
        .rounded(4.0)
}

/// Builds the whole window: controls, readout and canvas
pub fn build_ui() -> impl Widget<AngleState> {
    let controls = Flex::row()
        .cross_axis_alignment(CrossAxisAlignment::Start)
        .with_flex_child(angle_control("startAngle", start_lens()), 1.0)
        .with_spacer(8.0)
        .with_flex_child(angle_control("endAngle", end_lens()), 1.0)
        .with_spacer(8.0)
        .with_child(direction_control());

    Flex::column()
        .cross_axis_alignment(CrossAxisAlignment::Center)
        .with_child(Label::new("Canvas arc").with_text_size(32.0))
        .with_spacer(16.0)
        .with_child(controls)
        .with_spacer(12.0)
        .with_child(readout_control())
        .with_spacer(24.0)
        .with_child(ArcWidget::new())
        .padding(20.0)
}

/// Opens the explorer window with `state` as the initial arc.
pub fn launch(state: AngleState) -> Result<()> {
    let main_window = WindowDesc::new(build_ui())
        .title("Canvas arc")
        .window_size((820.0, 960.0));

    AppLauncher::with_window(main_window).launch(state)?;

    Ok(())
}
