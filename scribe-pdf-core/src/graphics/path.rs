//! Path construction primitives and stroke style enums.

/// One pending path construction operator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Close,
}

/// Accumulates path commands until a painting operator consumes them.
#[derive(Debug, Default)]
pub(crate) struct PathBuilder {
    commands: Vec<PathCommand>,
}

impl PathBuilder {
    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Hand over the accumulated commands, leaving the builder empty.
    pub fn take(&mut self) -> Vec<PathCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// Line cap styles for the `J` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LineCap {
    #[default]
    Butt = 0,
    Round = 1,
    Square = 2,
}

/// Line join styles for the `j` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LineJoin {
    #[default]
    Miter = 0,
    Round = 1,
    Bevel = 2,
}
