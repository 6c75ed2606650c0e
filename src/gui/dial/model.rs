use super::{END_ANGLE, START_ANGLE};
use crate::config::{DialConfig, LineCap};
use crate::geometry::{self, ArcPath, PathError, Point, Polar, Size};
use derive_more::{Deref, Display, From, Into};
use std::f64::consts::PI;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub viewport: Size,
    pub center: Point,
    pub radius: f64,
    pub stroke_width: f64,
    pub knob_radius: f64,
    pub knob_inner_radius: f64,
    pub line_cap: LineCap,
    pub image_origin: Point,
    pub image_size: f64,
}

impl Layout {
    /// Splits the viewport into an image area on top and the dial area
    /// below it, then fits the half circle into the dial area.
    pub fn for_viewport(viewport: Size, dial: &DialConfig, image_size: f64) -> Self {
        let image_height = viewport.height * dial.image_region.clamp(0.0, 1.0);
        let dial_height = viewport.height - image_height;
        let span = viewport.width.min(2.0 * dial_height);
        let radius = (span - dial.stroke_width) / 2.0 - dial.margin;

        Self {
            viewport,
            center: Point::new(
                viewport.width / 2.0,
                image_height + (dial_height + radius) / 2.0,
            ),
            radius,
            stroke_width: dial.stroke_width,
            knob_radius: dial.knob_radius,
            knob_inner_radius: dial.knob_inner_radius,
            line_cap: dial.line_cap,
            image_origin: Point::new(
                (viewport.width - image_size) / 2.0,
                (image_height - image_size) / 2.0,
            ),
            image_size,
        }
    }

    /// Endpoint of the dial for one of the construction angles.
    pub fn endpoint(&self, angle: f64) -> Point {
        Point::new(
            self.center.x - self.radius * angle.cos(),
            self.center.y - self.radius * angle.sin(),
        )
    }

    pub fn cursor_at(&self, theta: f64) -> Point {
        geometry::polar_to_canvas(
            Polar {
                theta,
                radius: self.radius,
            },
            self.center,
        )
    }

    pub fn arc_paths(&self) -> Result<ArcPaths, PathError> {
        let (start, end) = (self.endpoint(START_ANGLE), self.endpoint(END_ANGLE));
        let r = self.radius;

        let background = ArcPath::parse(&format!(
            "M {} {} A {r} {r} 0 1 0 {} {}",
            start.x, start.y, end.x, end.y
        ))?;
        let foreground = ArcPath::parse(&format!(
            "M {} {} A {r} {r} 1 0 1 {} {}",
            end.x, end.y, start.x, start.y
        ))?;

        Ok(ArcPaths {
            background,
            foreground,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPaths {
    pub background: ArcPath,
    /// Runs from the left end to the right end; trimmed to the progress.
    pub foreground: ArcPath,
}

/// Completion fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Display, Deref, From, Into)]
pub struct Progress(f64);

impl Progress {
    pub fn from_angle(theta: f64) -> Self {
        Self(1.0 - theta / PI)
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Phase {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragAction {
    pub should_redraw: bool,
    pub completed: bool,
}

impl DragAction {
    pub fn new(should_redraw: bool, completed: bool) -> Self {
        Self {
            should_redraw,
            completed,
        }
    }
}

pub struct State {
    pub layout: Layout,
    pub arcs: Option<ArcPaths>,
    pub cursor: Point,
    /// Cursor position at the end of the last drag; drags are applied
    /// relative to it.
    pub committed: Point,
    committed_angle: f64,
    pub angle: f64,
    pub progress: Progress,
    pub phase: Phase,
    completion_reported: bool,
}

impl State {
    pub fn new(layout: Layout) -> Self {
        let cursor = layout.cursor_at(PI);
        Self {
            arcs: Self::build_arcs(&layout),
            layout,
            cursor,
            committed: cursor,
            committed_angle: PI,
            angle: PI,
            progress: Progress::from_angle(PI),
            phase: Phase::Idle,
            completion_reported: false,
        }
    }

    fn build_arcs(layout: &Layout) -> Option<ArcPaths> {
        layout
            .arc_paths()
            .inspect_err(|e| log::error!("Invalid dial geometry, nothing will be drawn: {}", e))
            .ok()
    }

    /// Maps a pointer position to a dial angle in `[0, PI]`. Past the left
    /// end the angle sticks to `PI`, past the right end to `0`. A raw angle
    /// of exactly `0` right of center counts as past the right end. Below
    /// the center line with no side to go by, the nearer end wins.
    pub fn resolve_angle(center: Point, absolute_x: f64, pointer: Point) -> Option<f64> {
        let raw = geometry::canvas_to_polar(pointer, center).theta;
        if !raw.is_finite() {
            return None;
        }

        let angle = if absolute_x < center.x && raw < 0.0 {
            PI
        } else if absolute_x > center.x && raw <= 0.0 {
            0.0
        } else if raw < 0.0 {
            if raw < -PI / 2.0 { PI } else { 0.0 }
        } else {
            raw
        };
        Some(angle)
    }

    pub fn begin_drag(&mut self) {
        self.phase = Phase::Dragging;
        self.completion_reported = self.progress.is_complete();
    }

    pub fn update_drag(&mut self, absolute_x: f64, translation: Point) -> DragAction {
        if self.phase != Phase::Dragging {
            log::debug!("Ignoring drag update while {}", self.phase);
            return DragAction::default();
        }

        let pointer = self.committed.offset(translation);
        let Some(angle) = Self::resolve_angle(self.layout.center, absolute_x, pointer) else {
            return DragAction::default();
        };

        let changed = angle != self.angle;
        self.angle = angle;
        self.cursor = self.layout.cursor_at(angle);
        self.progress = Progress::from_angle(angle);

        let completed = self.progress.is_complete() && !self.completion_reported;
        self.completion_reported = self.progress.is_complete();

        DragAction::new(changed, completed)
    }

    pub fn end_drag(&mut self) {
        self.committed = self.cursor;
        self.committed_angle = self.angle;
        self.phase = Phase::Idle;
    }

    /// Rebuilds the geometry for a new layout, keeping the current angle
    /// and the drag baseline.
    pub fn relayout(&mut self, layout: Layout) {
        self.arcs = Self::build_arcs(&layout);
        self.layout = layout;
        self.cursor = layout.cursor_at(self.angle);
        self.committed = layout.cursor_at(self.committed_angle);
    }
}

#[cfg(test)]
pub(crate) fn test_layout(center: Point, radius: f64) -> Layout {
    Layout {
        center,
        radius,
        ..Layout::for_viewport(Size::new(400.0, 600.0), &DialConfig::default(), 200.0)
    }
}
