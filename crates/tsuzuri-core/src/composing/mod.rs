//! The composing buffer: typed pieces, their rendering and cursor editing.

mod piece;
mod text;

pub use piece::{input_string, InputPiece, InputStyle, Modifiers};
pub use text::{ComposingElement, ComposingText};

/// How much of the buffer a candidate consumes. Input counts are in typed
/// pieces, surface counts in rendered characters; the two never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposingCount {
    InputCount(usize),
    SurfaceCount(usize),
}
