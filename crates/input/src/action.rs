use deskscene_common::{Direction, ProjectionMode};

use crate::edge::EdgeDetector;
use crate::key::{InputSource, Key};

/// A view-level action produced from polled input.
///
/// The view controller consumes actions, never raw key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the camera one step along a direction, scaled by frame time.
    Move(Direction),
    /// Switch projection. Fires once per key press.
    SelectProjection(ProjectionMode),
    /// Close the window.
    Exit,
}

/// Held keys mapped to continuous movement.
const MOVE_BINDINGS: [(Key, Direction); 6] = [
    (Key::W, Direction::Forward),
    (Key::S, Direction::Backward),
    (Key::A, Direction::Left),
    (Key::D, Direction::Right),
    (Key::Q, Direction::Up),
    (Key::E, Direction::Down),
];

/// Maps one frame's key state to actions, debouncing the projection keys.
#[derive(Debug, Clone, Default)]
pub struct ActionMapper {
    perspective: EdgeDetector,
    orthographic: EdgeDetector,
}

impl ActionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `out` with this frame's actions.
    ///
    /// Order: exit, movement in binding order, then P before O.
    pub fn poll<I: InputSource + ?Sized>(&mut self, input: &I, out: &mut Vec<Action>) {
        out.clear();
        if input.is_pressed(Key::Escape) {
            out.push(Action::Exit);
        }
        out.extend(
            MOVE_BINDINGS
                .iter()
                .filter(|(key, _)| input.is_pressed(*key))
                .map(|(_, direction)| Action::Move(*direction)),
        );
        if self.perspective.rising(input.is_pressed(Key::P)) {
            out.push(Action::SelectProjection(ProjectionMode::Perspective));
        }
        if self.orthographic.rising(input.is_pressed(Key::O)) {
            out.push(Action::SelectProjection(ProjectionMode::Orthographic));
        }
    }
}
