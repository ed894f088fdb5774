//! Analogue clock and day wave drawn through the coordinate projector.
//!
//! The deck tick (every 100 ms) is the only clock. Fast animation jumps
//! the shown time by one hour per tick.

use std::f64::consts::PI;

use chrono::{DateTime, Local, Timelike};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};
use crate::projector::{CoordinateProjector, Drawable, FloatPoint, Viewport};
use crate::tui::theme;

use super::render_instructions;

/// Seconds the shown time jumps per tick while animating.
pub const FAST_FORWARD_SECS: i64 = 3600;

const SECONDS_PER_DAY: i64 = 86_400;
const WAVE_HEIGHT: u16 = 10;
const MOON_PHASES: [&str; 8] = ["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"];

const INSTRUCTIONS: &[&str] = &[
    "Press ↓↑ to shift the time by an hour,",
    "Backspace to reset,",
    "space to fast-forward.",
];

pub struct Canvas;

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub animating: bool,
    /// Wall-clock time of the latest tick; None before the first one.
    pub now: Option<DateTime<Local>>,
    pub offset_secs: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Tick(DateTime<Local>),
    ToggleAnimation,
    Offset(i64),
    OffsetReset,
    Done,
}

/// The time being shown, broken down for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFace {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockFace {
    pub fn from_seconds(seconds_of_day: i64) -> Self {
        let s = seconds_of_day.rem_euclid(SECONDS_PER_DAY) as u32;
        ClockFace {
            hour: s / 3600,
            minute: s / 60 % 60,
            second: s % 60,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        f64::from(self.hour * 3600 + self.minute * 60 + self.second)
    }

    /// `hh:mm:ss` on a 12-hour dial with an am/pm suffix.
    pub fn label(&self) -> String {
        let hour12 = match self.hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        let suffix = if self.hour >= 12 { "pm" } else { "am" };
        format!("{:02}:{:02}:{:02}{}", hour12, self.minute, self.second, suffix)
    }

    pub fn moon(&self) -> &'static str {
        let index = (self.total_seconds() * MOON_PHASES.len() as f64 / SECONDS_PER_DAY as f64) as usize;
        MOON_PHASES[index.min(MOON_PHASES.len() - 1)]
    }

    fn hands(&self) -> [FloatPoint; 3] {
        [
            hand(0.6, f64::from(self.hour) * 2.0 * PI / 12.0),
            hand(0.8, f64::from(self.minute) * 2.0 * PI / 60.0),
            hand(1.0, f64::from(self.second) * 2.0 * PI / 60.0),
        ]
    }
}

/// Tip of a hand at `angle` clockwise from twelve o'clock.
fn hand(radius: f64, angle: f64) -> FloatPoint {
    FloatPoint::new(radius * (PI / 2.0 - angle).cos(), radius * (PI / 2.0 - angle).sin())
}

pub fn clock_face(state: &State) -> Option<ClockFace> {
    let now = state.now?;
    Some(ClockFace::from_seconds(
        i64::from(now.num_seconds_from_midnight()) + state.offset_secs,
    ))
}

impl Program for Canvas {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Canvas Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        let state = State {
            animating: false,
            now: None,
            offset_secs: 0,
        };
        (state, Vec::new())
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Tick(now) => {
                state.now = Some(now);
                if state.animating {
                    state.offset_secs += FAST_FORWARD_SECS;
                }
            }
            Msg::ToggleAnimation => state.animating = !state.animating,
            Msg::Offset(dt) => state.offset_secs += dt,
            Msg::OffsetReset => state.offset_secs = 0,
            Msg::Done => return Transition::Terminate(state),
        }
        Transition::state(state)
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        _claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);
        let [label_area, clock_area, wave_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(WAVE_HEIGHT),
        ])
        .areas(area);

        let Some(face) = clock_face(state) else {
            frame.render_widget(Paragraph::new("  --:--:--"), label_area);
            return;
        };
        frame.render_widget(
            Paragraph::new(Line::styled(format!("  {}", face.label()), theme::STYLE_IMPORTANT)),
            label_area,
        );

        let watch = Viewport::new(-1.0, -1.0, 2.0, 2.0);
        let projector =
            CoordinateProjector::fit(watch, clock_area.width.saturating_sub(2), clock_area.height);
        let clock_rect = centered(clock_area, projector.width(), projector.height());
        let [hour, minute, second] = face.hands();
        let drawables = vec![
            Drawable::Line(FloatPoint::new(-1.0, 0.0), FloatPoint::new(-0.9, 0.0)),
            Drawable::Line(FloatPoint::new(1.0, 0.0), FloatPoint::new(0.9, 0.0)),
            Drawable::Line(FloatPoint::new(0.0, -1.0), FloatPoint::new(0.0, -0.9)),
            Drawable::Line(FloatPoint::new(0.0, 1.0), FloatPoint::new(0.0, 0.9)),
            Drawable::Border,
            Drawable::Line(FloatPoint::ZERO, minute),
            Drawable::Line(FloatPoint::ZERO, hour),
            Drawable::Line(FloatPoint::ZERO, second),
        ];
        frame.render_widget(CanvasView::new(projector, drawables), clock_rect);

        let moon_x = (clock_rect.right() + 1).min(area.right().saturating_sub(2));
        frame.render_widget(
            Paragraph::new(face.moon()),
            Rect::new(moon_x, clock_rect.y, 2, 1).intersection(area),
        );

        let total = face.total_seconds();
        let wave = move |x: f64| 0.5 - ((total + x) / SECONDS_PER_DAY as f64 * 2.0 * PI).cos() / 2.0;
        let day = Viewport::new(-43_200.0, -1.0, 86_400.0, 2.0);
        let projector = CoordinateProjector::new(day, wave_area.width, wave_area.height);
        let drawables = vec![
            Drawable::Line(FloatPoint::new(0.0, -1.0), FloatPoint::new(0.0, 1.0)),
            Drawable::Function(&wave),
        ];
        frame.render_widget(CanvasView::new(projector, drawables), wave_area);
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Up => Some(Msg::Offset(FAST_FORWARD_SECS)),
            KeyCode::Down => Some(Msg::Offset(-FAST_FORWARD_SECS)),
            KeyCode::Backspace => Some(Msg::OffsetReset),
            KeyCode::Char(' ') => Some(Msg::ToggleAnimation),
            KeyCode::Enter => Some(Msg::Done),
            _ => None,
        }
    }

    fn on_tick(&self, _state: &State, now: DateTime<Local>) -> Option<Msg> {
        Some(Msg::Tick(now))
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ============================================================================
// CANVAS WIDGET
// ============================================================================

/// Plots projected drawables into a buffer region.
pub struct CanvasView<'a> {
    projector: CoordinateProjector,
    drawables: Vec<Drawable<'a>>,
    style: Style,
}

impl<'a> CanvasView<'a> {
    pub fn new(projector: CoordinateProjector, drawables: Vec<Drawable<'a>>) -> Self {
        CanvasView {
            projector,
            drawables,
            style: theme::STYLE_INTERACTIVE,
        }
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for drawable in &self.drawables {
            let glyph = match drawable {
                Drawable::Border => "·",
                Drawable::Line(..) | Drawable::Function(_) => "•",
            };
            for (col, row) in self.projector.rasterize(drawable) {
                if col >= area.width || row >= area.height {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(glyph).set_style(self.style);
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::regions::RegionClaimRegistry;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 10, h, m, s)
            .earliest()
            .expect("valid local time")
    }

    fn step(state: State, msg: Msg) -> State {
        match Canvas.update(state, msg) {
            Transition::Continue(state, _) => state,
            Transition::Terminate(_) => panic!("Expected Continue"),
        }
    }

    #[test]
    fn label_uses_twelve_hour_dial() {
        assert_eq!(ClockFace::from_seconds(0).label(), "12:00:00am");
        assert_eq!(ClockFace::from_seconds(13 * 3600 + 5 * 60 + 9).label(), "01:05:09pm");
        assert_eq!(ClockFace::from_seconds(12 * 3600).label(), "12:00:00pm");
    }

    #[test]
    fn offsets_wrap_around_the_day() {
        assert_eq!(ClockFace::from_seconds(-1).hour, 23);
        assert_eq!(ClockFace::from_seconds(SECONDS_PER_DAY + 60).minute, 1);
    }

    #[test]
    fn fast_animation_jumps_an_hour_per_tick() {
        let state = step(Canvas.initial().0, Msg::ToggleAnimation);
        let state = step(state, Msg::Tick(at(10, 0, 0)));
        let state = step(state, Msg::Tick(at(10, 0, 0)));
        assert_eq!(state.offset_secs, 2 * FAST_FORWARD_SECS);
        assert_eq!(clock_face(&state).map(|f| f.hour), Some(12));
    }

    #[test]
    fn paused_tick_only_updates_time() {
        let state = step(Canvas.initial().0, Msg::Tick(at(8, 30, 0)));
        assert_eq!(state.offset_secs, 0);
        assert_eq!(
            clock_face(&state),
            Some(ClockFace {
                hour: 8,
                minute: 30,
                second: 0
            })
        );
    }

    #[test]
    fn offset_reset_clears_shift() {
        let state = step(Canvas.initial().0, Msg::Offset(-3600));
        assert_eq!(step(state, Msg::OffsetReset).offset_secs, 0);
    }

    #[test]
    fn moon_phase_follows_time_of_day() {
        assert_eq!(ClockFace::from_seconds(0).moon(), "🌑");
        assert_eq!(ClockFace::from_seconds(12 * 3600).moon(), "🌕");
        assert_eq!(ClockFace::from_seconds(SECONDS_PER_DAY - 1).moon(), "🌘");
    }

    #[test]
    fn noon_hands_point_up() {
        let [hour, minute, second] = ClockFace::from_seconds(0).hands();
        assert!(hour.x.abs() < 1e-9 && (hour.y - 0.6).abs() < 1e-9);
        assert!((minute.y - 0.8).abs() < 1e-9);
        assert!((second.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn renders_time_label_after_first_tick() {
        let backend = TestBackend::new(60, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let state = step(Canvas.initial().0, Msg::Tick(at(15, 4, 5)));
        let mut registry = RegionClaimRegistry::new();
        terminal
            .draw(|frame| {
                let mut claims = Claims::new(&mut registry, |m: Msg| m);
                Canvas.render(&state, frame, frame.area(), &mut claims);
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol().to_string())
            .collect();
        assert!(content.contains("03:04:05pm"));
        assert!(content.contains('•'));
    }
}
