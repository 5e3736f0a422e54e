use glam::Vec2;

/// Remembers last frame's pressed state of one key.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    was_down: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's state; true only on a not-pressed to pressed transition.
    pub fn rising(&mut self, down: bool) -> bool {
        let edge = down && !self.was_down;
        self.was_down = down;
        edge
    }
}

/// Turns absolute cursor positions into look deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorTracker {
    last: Option<Vec2>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset since the previous sample, with Y flipped so moving up is positive.
    ///
    /// The first sample seeds the tracker and returns zero.
    pub fn delta(&mut self, x: f32, y: f32) -> Vec2 {
        let current = Vec2::new(x, y);
        let last = self.last.replace(current).unwrap_or(current);
        Vec2::new(current.x - last.x, last.y - current.y)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
