use super::model::State;
use crate::config::LineCap;
use crate::geometry::{ArcSegment, Point, Size};
use crate::gui::theme::ThemeColors;
use palette::Srgba;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        origin: Point,
        size: Size,
        color: Srgba<f64>,
    },
    Arc {
        segment: ArcSegment,
        width: f64,
        cap: LineCap,
        color: Srgba<f64>,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Srgba<f64>,
    },
    Image {
        origin: Point,
        size: f64,
        opacity: f64,
    },
}

/// Everything drawn for one frame, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

pub fn compose(state: &State, colors: &ThemeColors) -> Scene {
    let Some(arcs) = &state.arcs else {
        return Scene::default();
    };
    let layout = &state.layout;
    let progress = *state.progress;

    let shapes = vec![
        Shape::Rect {
            origin: Point::default(),
            size: layout.viewport,
            color: colors.background,
        },
        Shape::Arc {
            segment: arcs.background.segment(),
            width: layout.stroke_width,
            cap: layout.line_cap,
            color: colors.track,
        },
        Shape::Arc {
            segment: arcs.foreground.segment().trimmed(0.0, progress),
            width: layout.stroke_width,
            cap: layout.line_cap,
            color: colors.fill,
        },
        // knob: outer ring color with a lighter center
        Shape::Circle {
            center: state.cursor,
            radius: layout.knob_radius,
            color: colors.knob,
        },
        Shape::Circle {
            center: state.cursor,
            radius: layout.knob_inner_radius,
            color: colors.knob_center,
        },
        Shape::Image {
            origin: layout.image_origin,
            size: layout.image_size,
            opacity: progress,
        },
    ];

    Scene { shapes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorConfig;
    use crate::geometry::{assert_close, assert_point_close};
    use crate::gui::dial::model::test_layout;

    fn colors() -> ThemeColors {
        ThemeColors::from_config(&ColorConfig::default())
    }

    fn dragged_to_half() -> State {
        let mut state = State::new(test_layout(Point::new(200.0, 200.0), 100.0));
        state.begin_drag();
        state.update_drag(200.0, Point::new(100.0, -100.0));
        state.end_drag();
        state
    }

    #[test]
    fn test_scene_order() {
        let scene = compose(&dragged_to_half(), &colors());
        let kinds: Vec<_> = scene
            .shapes
            .iter()
            .map(|s| match s {
                Shape::Rect { .. } => "rect",
                Shape::Arc { .. } => "arc",
                Shape::Circle { .. } => "circle",
                Shape::Image { .. } => "image",
            })
            .collect();
        assert_eq!(kinds, ["rect", "arc", "arc", "circle", "circle", "image"]);
    }

    #[test]
    fn test_scene_follows_progress() {
        let state = dragged_to_half();
        let colors = colors();
        let scene = compose(&state, &colors);

        let Shape::Arc { segment, color, .. } = &scene.shapes[1] else {
            panic!("expected background arc");
        };
        assert_close(segment.sweep.abs(), std::f64::consts::PI);
        assert_eq!(*color, colors.track);

        let Shape::Arc {
            segment,
            width,
            cap,
            color,
        } = &scene.shapes[2]
        else {
            panic!("expected foreground arc");
        };
        assert_point_close(segment.point_at(0.0), Point::new(100.0, 200.0));
        assert_point_close(segment.point_at(1.0), state.cursor);
        assert_close(*width, 20.0);
        assert_eq!(*cap, LineCap::Round);
        assert_eq!(*color, colors.fill);

        let Shape::Circle { center, radius, .. } = &scene.shapes[3] else {
            panic!("expected knob");
        };
        assert_point_close(*center, Point::new(200.0, 100.0));
        assert_close(*radius, 20.0);

        let Shape::Circle { radius, color, .. } = &scene.shapes[4] else {
            panic!("expected knob center");
        };
        assert_close(*radius, 15.0);
        assert_eq!(*color, colors.knob_center);

        let Shape::Image { opacity, size, .. } = &scene.shapes[5] else {
            panic!("expected image");
        };
        assert_close(*opacity, 0.5);
        assert_close(*size, 200.0);
    }

    #[test]
    fn test_foreground_ends_at_knob_for_any_angle() {
        let mut state = State::new(test_layout(Point::new(200.0, 200.0), 100.0));
        for dx in [-40.0, 10.0, 60.0, 120.0, 190.0] {
            state.begin_drag();
            state.update_drag(100.0 + dx, Point::new(dx, -50.0));
            let scene = compose(&state, &colors());
            let Shape::Arc { segment, .. } = &scene.shapes[2] else {
                panic!("expected foreground arc");
            };
            assert_point_close(segment.point_at(1.0), state.cursor);
            state.end_drag();
        }
    }

    #[test]
    fn test_untouched_dial_has_empty_fill_and_hidden_image() {
        let state = State::new(test_layout(Point::new(200.0, 200.0), 100.0));
        let scene = compose(&state, &colors());

        let Shape::Arc { segment, .. } = &scene.shapes[2] else {
            panic!("expected foreground arc");
        };
        assert!(segment.is_empty());
        assert!(matches!(scene.shapes[5], Shape::Image { opacity, .. } if opacity == 0.0));
    }

    #[test]
    fn test_invalid_geometry_yields_empty_scene() {
        let state = State::new(test_layout(Point::new(200.0, 200.0), 0.0));
        assert!(compose(&state, &colors()).is_empty());
    }
}
