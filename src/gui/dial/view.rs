use super::scene::{Scene, Shape};
use crate::config::{self, ImageConfig, LineCap};
use crate::geometry::{ArcSegment, Point, Size};
use anyhow::Context as _;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use std::f64::consts::PI;

pub fn load_image(image: &ImageConfig) -> anyhow::Result<Pixbuf> {
    anyhow::ensure!(image.size > 0, "image size must be positive, got {}", image.size);
    let path = config::resolve_image_path(image)
        .with_context(|| format!("image '{}' not found", image.path.display()))?;
    Pixbuf::from_file_at_scale(&path, image.size, image.size, true)
        .with_context(|| format!("failed to load image {}", path.display()))
}

pub fn draw(cr: &Context, scene: &Scene, image: Option<&Pixbuf>) -> Result<(), cairo::Error> {
    for shape in &scene.shapes {
        match *shape {
            Shape::Rect {
                origin,
                size,
                color,
            } => draw_rect(cr, origin, size, color)?,
            Shape::Arc {
                segment,
                width,
                cap,
                color,
            } => draw_arc(cr, &segment, width, cap, color)?,
            Shape::Circle {
                center,
                radius,
                color,
            } => draw_circle(cr, center, radius, color)?,
            Shape::Image {
                origin,
                size,
                opacity,
            } => {
                if let Some(pixbuf) = image {
                    draw_image(cr, pixbuf, origin, size, opacity)?;
                }
            }
        }
    }
    Ok(())
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn draw_rect(cr: &Context, origin: Point, size: Size, color: Srgba<f64>) -> Result<(), cairo::Error> {
    set_color(cr, color);
    cr.rectangle(origin.x, origin.y, size.width, size.height);
    cr.fill()
}

fn draw_arc(
    cr: &Context,
    segment: &ArcSegment,
    width: f64,
    cap: LineCap,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    // a round cap on an empty arc would still leave a dot
    if segment.is_empty() {
        return Ok(());
    }

    set_color(cr, color);
    cr.set_line_width(width);
    cr.set_line_cap(match cap {
        LineCap::Butt => cairo::LineCap::Butt,
        LineCap::Round => cairo::LineCap::Round,
        LineCap::Square => cairo::LineCap::Square,
    });

    cr.new_path();
    let (cx, cy, r) = (segment.center.x, segment.center.y, segment.radius);
    if segment.sweep >= 0.0 {
        cr.arc(cx, cy, r, segment.start_angle, segment.end_angle());
    } else {
        cr.arc_negative(cx, cy, r, segment.start_angle, segment.end_angle());
    }
    cr.stroke()
}

fn draw_circle(
    cr: &Context,
    center: Point,
    radius: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    set_color(cr, color);
    cr.new_path();
    cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
    cr.fill()
}

fn draw_image(
    cr: &Context,
    pixbuf: &Pixbuf,
    origin: Point,
    size: f64,
    opacity: f64,
) -> Result<(), cairo::Error> {
    if opacity <= 0.0 {
        return Ok(());
    }

    // fit image into its box, keeping the aspect ratio
    let scale = size / pixbuf.width().max(pixbuf.height()) as f64;
    let (iw, ih) = (
        pixbuf.width() as f64 * scale,
        pixbuf.height() as f64 * scale,
    );

    cr.save()?;
    cr.translate(origin.x + (size - iw) / 2.0, origin.y + (size - ih) / 2.0);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.paint_with_alpha(opacity.min(1.0))?;
    cr.restore()
}
