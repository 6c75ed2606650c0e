use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Angle measured counter-clockwise from the positive x axis, with the
/// y axis pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub theta: f64,
    pub radius: f64,
}

pub fn polar_to_canvas(polar: Polar, center: Point) -> Point {
    Point::new(
        center.x + polar.radius * polar.theta.cos(),
        center.y - polar.radius * polar.theta.sin(),
    )
}

pub fn canvas_to_polar(point: Point, center: Point) -> Polar {
    let (dx, dy) = (point.x - center.x, -(point.y - center.y));
    Polar {
        theta: dy.atan2(dx),
        radius: dx.hypot(dy),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("unexpected end of path data")]
    UnexpectedEnd,
    #[error("expected command '{expected}', found '{found}'")]
    UnexpectedCommand { expected: char, found: String },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("invalid arc flag '{0}'")]
    InvalidFlag(String),
    #[error("trailing path data '{0}'")]
    Trailing(String),
    #[error("non-finite coordinate in path")]
    NonFinite,
    #[error("degenerate arc radius {0}")]
    DegenerateRadius(f64),
    #[error("elliptical arcs are not supported (rx {rx}, ry {ry})")]
    Elliptical { rx: f64, ry: f64 },
    #[error("arc endpoints coincide")]
    CoincidentEndpoints,
}

/// A single circular arc in SVG path-data form: `M x y A r r rot large sweep x y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub from: Point,
    pub to: Point,
    pub radius: f64,
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

impl ArcPath {
    pub fn parse(data: &str) -> Result<Self, PathError> {
        let mut tokens = data
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());

        expect_command(&mut tokens, 'M')?;
        let from = Point::new(number(&mut tokens)?, number(&mut tokens)?);
        expect_command(&mut tokens, 'A')?;
        let (rx, ry) = (number(&mut tokens)?, number(&mut tokens)?);
        let rotation = number(&mut tokens)?;
        let large_arc = flag(&mut tokens)?;
        let sweep = flag(&mut tokens)?;
        let to = Point::new(number(&mut tokens)?, number(&mut tokens)?);

        if let Some(rest) = tokens.next() {
            return Err(PathError::Trailing(rest.to_string()));
        }
        if !from.is_finite() || !to.is_finite() || !rx.is_finite() || !ry.is_finite() {
            return Err(PathError::NonFinite);
        }
        if rx <= 0.0 || ry <= 0.0 {
            return Err(PathError::DegenerateRadius(rx.min(ry)));
        }
        if (rx - ry).abs() > f64::EPSILON * rx.max(ry) {
            return Err(PathError::Elliptical { rx, ry });
        }
        if from == to {
            return Err(PathError::CoincidentEndpoints);
        }

        Ok(Self {
            from,
            to,
            radius: rx,
            rotation,
            large_arc,
            sweep,
        })
    }

    /// Converts the endpoint form into center form. A radius too small to
    /// span the chord is scaled up until it does.
    pub fn segment(&self) -> ArcSegment {
        let hx = (self.from.x - self.to.x) / 2.0;
        let hy = (self.from.y - self.to.y) / 2.0;
        let half_chord = hx.hypot(hy);
        let radius = self.radius.max(half_chord);

        let mut coef = ((radius * radius - half_chord * half_chord).max(0.0)).sqrt() / half_chord;
        if self.large_arc == self.sweep {
            coef = -coef;
        }
        let (cx, cy) = (coef * hy, -coef * hx);
        let center = Point::new(
            cx + (self.from.x + self.to.x) / 2.0,
            cy + (self.from.y + self.to.y) / 2.0,
        );

        let (ux, uy) = ((hx - cx) / radius, (hy - cy) / radius);
        let (vx, vy) = ((-hx - cx) / radius, (-hy - cy) / radius);
        let start_angle = uy.atan2(ux);
        let mut sweep = (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
        if !self.sweep && sweep > 0.0 {
            sweep -= 2.0 * PI;
        } else if self.sweep && sweep < 0.0 {
            sweep += 2.0 * PI;
        }

        ArcSegment {
            center,
            radius,
            start_angle,
            sweep,
        }
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {} {} {} {} {} {} {}",
            self.from.x,
            self.from.y,
            self.radius,
            self.radius,
            self.rotation,
            u8::from(self.large_arc),
            u8::from(self.sweep),
            self.to.x,
            self.to.y,
        )
    }
}

impl FromStr for ArcPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn expect_command<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    expected: char,
) -> Result<(), PathError> {
    let token = tokens.next().ok_or(PathError::UnexpectedEnd)?;
    if token.len() == 1 && token.starts_with(expected) {
        Ok(())
    } else {
        Err(PathError::UnexpectedCommand {
            expected,
            found: token.to_string(),
        })
    }
}

fn number<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<f64, PathError> {
    let token = tokens.next().ok_or(PathError::UnexpectedEnd)?;
    token
        .parse()
        .map_err(|_| PathError::InvalidNumber(token.to_string()))
}

fn flag<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<bool, PathError> {
    match tokens.next().ok_or(PathError::UnexpectedEnd)? {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(PathError::InvalidFlag(other.to_string())),
    }
}

/// Center form of a circular arc in canvas angles (clockwise on screen, as
/// cairo measures them). `sweep` is signed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl ArcSegment {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    pub fn point_at(&self, t: f64) -> Point {
        let angle = self.start_angle + self.sweep * t;
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// The part of the arc between fractions `start` and `end` of its length.
    pub fn trimmed(&self, start: f64, end: f64) -> Self {
        let (start, end) = (start.clamp(0.0, 1.0), end.clamp(0.0, 1.0));
        Self {
            start_angle: self.start_angle + self.sweep * start,
            sweep: self.sweep * (end - start).max(0.0),
            ..*self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sweep.abs() * self.radius < 1e-9
    }
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
pub(crate) fn assert_point_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}
