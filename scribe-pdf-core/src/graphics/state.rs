//! Tracked graphics state mirroring the `q`/`Q` operator stack.

use crate::geometry::Matrix;
use crate::graphics::color::Color;
use crate::graphics::path::{LineCap, LineJoin};

/// The subset of PDF graphics state the context tracks alongside the
/// operators it emits.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub stroke_color: Color,
    pub fill_color: Color,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            stroke_color: Color::black(),
            fill_color: Color::black(),
        }
    }
}

/// Saved copies of the graphics state, one per unmatched `q`.
#[derive(Debug, Default)]
pub(crate) struct StateStack {
    saved: Vec<GraphicsState>,
}

impl StateStack {
    pub fn push(&mut self, state: GraphicsState) {
        self.saved.push(state);
    }

    pub fn pop(&mut self) -> Option<GraphicsState> {
        self.saved.pop()
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = GraphicsState::default();
        assert_eq!(state.ctm, Matrix::identity());
        assert_eq!(state.line_width, 1.0);
        assert_eq!(state.line_cap, LineCap::Butt);
        assert_eq!(state.line_join, LineJoin::Miter);
        assert_eq!(state.fill_color, Color::black());
    }

    #[test]
    fn test_stack_round_trip() {
        let mut stack = StateStack::default();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());

        let mut state = GraphicsState::default();
        state.line_width = 4.0;
        stack.push(state.clone());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop(), Some(state));
    }
}
