use deskscene_common::{FrameView, ProjectionMode};
use deskscene_input::{Action, ActionMapper, CursorTracker, InputSource};

use crate::camera::{Camera, Pose};
use crate::config::ViewConfig;
use crate::projection::Projection;

/// Turns polled input into camera motion and projection changes, then builds
/// the frame's view and projection matrices.
///
/// Entering orthographic mode from perspective saves the navigation pose and
/// jumps to the fixed inspection pose; returning to perspective restores it.
#[derive(Debug)]
pub struct ViewController {
    camera: Camera,
    mode: ProjectionMode,
    saved_pose: Option<Pose>,
    inspection_pose: Pose,
    projection: Projection,
    mapper: ActionMapper,
    actions: Vec<Action>,
    cursor: CursorTracker,
    last_frame: Option<f64>,
    max_frame_delta: f32,
    scroll_step: f32,
    aspect: f32,
    exit_requested: bool,
}

impl ViewController {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            camera: config.camera(),
            mode: ProjectionMode::Perspective,
            saved_pose: None,
            inspection_pose: config.inspection_pose,
            projection: config.projection(),
            mapper: ActionMapper::new(),
            actions: Vec::new(),
            cursor: CursorTracker::new(),
            last_frame: None,
            max_frame_delta: config.max_frame_delta,
            scroll_step: config.scroll_step,
            aspect: config.aspect(),
            exit_requested: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Navigation pose held while in orthographic mode.
    pub fn saved_pose(&self) -> Option<Pose> {
        self.saved_pose
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Track the drawable size. Zero-sized (minimized) windows keep the last aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Advance one frame: poll `input`, apply movement and projection
    /// switches, and return the matrices to draw with.
    ///
    /// `now` is a monotonic time in seconds.
    pub fn prepare_frame<I: InputSource + ?Sized>(&mut self, now: f64, input: &I) -> FrameView {
        let elapsed = self.advance_clock(now);
        let mut actions = std::mem::take(&mut self.actions);
        self.mapper.poll(input, &mut actions);
        for &action in &actions {
            self.apply(action, elapsed);
        }
        self.actions = actions;
        self.frame_view()
    }

    /// Apply one action. `elapsed` scales movement.
    pub fn apply(&mut self, action: Action, elapsed: f32) {
        match action {
            Action::Exit => {
                if !self.exit_requested {
                    tracing::info!("exit requested");
                }
                self.exit_requested = true;
            }
            Action::Move(direction) => {
                let distance = elapsed * self.camera.speed();
                self.camera.move_relative(direction, distance);
            }
            Action::SelectProjection(ProjectionMode::Perspective) => self.enter_perspective(),
            Action::SelectProjection(ProjectionMode::Orthographic) => self.enter_orthographic(),
        }
    }

    /// Matrices for the current pose and projection mode.
    pub fn frame_view(&self) -> FrameView {
        FrameView {
            view: self.camera.view_matrix(),
            projection: self
                .projection
                .matrix(self.mode, self.camera.zoom(), self.aspect),
            eye: self.camera.position(),
        }
    }

    /// Absolute cursor position in window pixels.
    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        let delta = self.cursor.delta(x, y);
        if delta != glam::Vec2::ZERO {
            self.camera.look_delta(delta.x, delta.y);
        }
    }

    /// Scroll adjusts movement speed. Field of view is unaffected.
    pub fn on_scroll(&mut self, dy: f32) {
        let speed = self.camera.speed() + dy * self.scroll_step;
        self.camera.set_speed(speed);
        tracing::debug!("movement speed {:.1}", self.camera.speed());
    }

    fn advance_clock(&mut self, now: f64) -> f32 {
        let elapsed = match self.last_frame {
            Some(previous) => ((now - previous) as f32)
                .min(self.max_frame_delta)
                .max(0.0),
            None => 0.0,
        };
        self.last_frame = Some(now);
        elapsed
    }

    fn enter_perspective(&mut self) {
        if let Some(pose) = self.saved_pose.take() {
            self.camera.set_pose(pose);
        }
        if self.mode != ProjectionMode::Perspective {
            tracing::debug!("projection: perspective");
        }
        self.mode = ProjectionMode::Perspective;
    }

    fn enter_orthographic(&mut self) {
        if self.mode == ProjectionMode::Perspective {
            self.saved_pose = Some(self.camera.pose());
            tracing::debug!("projection: orthographic");
        }
        self.mode = ProjectionMode::Orthographic;
        self.camera.set_pose(self.inspection_pose);
    }
}
