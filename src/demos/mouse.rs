//! Freehand drawing with the pointer.
//!
//! Brushes sit in a row of buttons; below them a bordered canvas claims
//! every pointer event inside it and paints with the selected brush.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};
use crate::tui::theme;

use super::render_instructions;

pub const ERASER: &str = " ";
pub const BRUSHES: [&str; 5] = ["█", "▓", "▒", "░", ERASER];

const BUTTON_WIDTH: u16 = 5;
const BUTTON_HEIGHT: u16 = 3;
const CANVAS_TOP: u16 = 4;
const PREVIEW_WIDTH: u16 = 8;

const INSTRUCTIONS: &[&str] = &["Click a brush to select it.", "Click and drag to draw."];

pub struct Mouse;

/// One painted cell, in canvas-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub x: u16,
    pub y: u16,
    pub glyph: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub strokes: Vec<Stroke>,
    pub brush: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Paint(Position),
    SetBrush(&'static str),
    Done,
}

impl Program for Mouse {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Mouse Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        let state = State {
            strokes: Vec::new(),
            brush: BRUSHES[0],
        };
        (state, Vec::new())
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Paint(at) => {
                // Repainting a cell replaces its glyph.
                state.strokes.retain(|s| (s.x, s.y) != (at.x, at.y));
                if state.brush != ERASER {
                    state.strokes.push(Stroke {
                        x: at.x,
                        y: at.y,
                        glyph: state.brush,
                    });
                }
                let log = Command::Log(format!("drawables: {}", state.strokes.len()));
                Transition::Continue(state, vec![log])
            }
            Msg::SetBrush(brush) => {
                state.brush = brush;
                Transition::state(state)
            }
            Msg::Done => Transition::Terminate(state),
        }
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);

        for (i, brush) in BRUSHES.into_iter().enumerate() {
            let rect = Rect::new(
                area.x + 1 + i as u16 * (BUTTON_WIDTH + 1),
                area.y,
                BUTTON_WIDTH,
                BUTTON_HEIGHT,
            )
            .intersection(area);
            frame.render_widget(
                Paragraph::new(brush.repeat(usize::from(BUTTON_WIDTH - 2)))
                    .block(brush_block(brush == state.brush)),
                rect,
            );
            claims.on_click(rect, Msg::SetBrush(brush));
        }

        let preview = Rect::new(
            area.right().saturating_sub(PREVIEW_WIDTH + 2),
            area.y,
            PREVIEW_WIDTH + 2,
            BUTTON_HEIGHT,
        )
        .intersection(area);
        frame.render_widget(
            Paragraph::new(state.brush.repeat(usize::from(PREVIEW_WIDTH)))
                .block(Block::default().borders(Borders::ALL).title("Brush")),
            preview,
        );

        let canvas = Rect {
            y: area.y + CANVAS_TOP,
            height: area.height.saturating_sub(CANVAS_TOP),
            ..area
        }
        .intersection(area);
        let block = Block::default().borders(Borders::ALL).border_style(theme::STYLE_DIM);
        let inner = block.inner(canvas);
        frame.render_widget(block, canvas);

        let buf = frame.buffer_mut();
        for stroke in &state.strokes {
            if stroke.x >= inner.width || stroke.y >= inner.height {
                continue;
            }
            if let Some(cell) = buf.cell_mut((inner.x + stroke.x, inner.y + stroke.y)) {
                cell.set_symbol(stroke.glyph).set_style(Style::default());
            }
        }

        claims.on_pointer(inner, |pointer| pointer.is_left_press().then_some(Msg::Paint(pointer.at)));
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter => Some(Msg::Done),
            _ => None,
        }
    }
}

fn brush_block(selected: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL);
    if selected {
        block.border_type(BorderType::Thick).border_style(theme::STYLE_IMPORTANT)
    } else {
        block.border_style(theme::STYLE_DIM)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{MouseButton, MouseEventKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::program::{Pointer, PointerHandler};
    use crate::regions::RegionClaimRegistry;

    fn render(state: &State) -> (Terminal<TestBackend>, RegionClaimRegistry<PointerHandler<Msg>>) {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut registry = RegionClaimRegistry::new();
        terminal
            .draw(|frame| {
                let mut claims = Claims::new(&mut registry, |m: Msg| m);
                Mouse.render(state, frame, frame.area(), &mut claims);
            })
            .unwrap();
        (terminal, registry)
    }

    fn route(
        registry: &RegionClaimRegistry<PointerHandler<Msg>>,
        kind: MouseEventKind,
        x: u16,
        y: u16,
    ) -> Option<Msg> {
        let at = Position::new(x, y);
        let region = registry.hit(at)?;
        (region.owner)(Pointer {
            kind,
            at: region.local(at),
        })
    }

    #[test]
    fn painting_logs_drawable_count() {
        let (state, commands) = match Mouse.update(Mouse.initial().0, Msg::Paint(Position::new(2, 1))) {
            Transition::Continue(state, commands) => (state, commands),
            Transition::Terminate(_) => panic!("Expected Continue"),
        };
        assert_eq!(state.strokes.len(), 1);
        match commands.as_slice() {
            [Command::Log(line)] => assert_eq!(line, "drawables: 1"),
            other => panic!("Expected one Log, got {:?}", other),
        }
    }

    #[test]
    fn repainting_a_cell_keeps_one_stroke() {
        let mut state = Mouse.initial().0;
        for brush in ["█", "░"] {
            state = match Mouse.update(state, Msg::SetBrush(brush)) {
                Transition::Continue(s, _) => s,
                Transition::Terminate(_) => panic!("Expected Continue"),
            };
            state = match Mouse.update(state, Msg::Paint(Position::new(0, 0))) {
                Transition::Continue(s, _) => s,
                Transition::Terminate(_) => panic!("Expected Continue"),
            };
        }
        assert_eq!(
            state.strokes,
            vec![Stroke {
                x: 0,
                y: 0,
                glyph: "░"
            }]
        );
    }

    #[test]
    fn eraser_removes_the_stroke() {
        let state = State {
            strokes: vec![Stroke {
                x: 1,
                y: 1,
                glyph: "▓",
            }],
            brush: ERASER,
        };
        match Mouse.update(state, Msg::Paint(Position::new(1, 1))) {
            Transition::Continue(state, commands) => {
                assert!(state.strokes.is_empty());
                assert!(matches!(commands.as_slice(), [Command::Log(line)] if line == "drawables: 0"));
            }
            Transition::Terminate(_) => panic!("Expected Continue"),
        }
    }

    #[test]
    fn drag_inside_canvas_paints_in_local_coordinates() {
        let (_, registry) = render(&Mouse.initial().0);
        // Canvas block starts at row 4; its inner area at (1, 5).
        let msg = route(&registry, MouseEventKind::Drag(MouseButton::Left), 4, 7);
        assert_eq!(msg, Some(Msg::Paint(Position::new(3, 2))));
        assert_eq!(route(&registry, MouseEventKind::Moved, 4, 7), None);
    }

    #[test]
    fn clicking_a_button_selects_its_brush() {
        let (_, registry) = render(&Mouse.initial().0);
        // Third button spans columns 13..18.
        let msg = route(&registry, MouseEventKind::Down(MouseButton::Left), 14, 1);
        assert_eq!(msg, Some(Msg::SetBrush("▒")));
    }

    #[test]
    fn strokes_are_drawn_inside_the_border() {
        let state = State {
            strokes: vec![Stroke {
                x: 0,
                y: 0,
                glyph: "▓",
            }],
            brush: BRUSHES[0],
        };
        let (terminal, _) = render(&state);
        assert_eq!(terminal.backend().buffer()[(1, 5)].symbol(), "▓");
    }

    #[test]
    fn preview_repeats_the_selected_brush() {
        let state = State {
            strokes: Vec::new(),
            brush: "▒",
        };
        let (terminal, _) = render(&state);
        let buffer = terminal.backend().buffer();
        let title: String = (51..56).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        let preview: String = (51..59).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert_eq!(title, "Brush");
        assert_eq!(preview, "▒".repeat(8));
    }
}
