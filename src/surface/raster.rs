use image::RgbImage;

use crate::geometry::{Bounds, Color, Outline, Point};

/// Per-pixel coverage accumulated over a clipped region before a single
/// composite into the buffer. Overlapping primitives take the max coverage, so
/// polygon joints are not blended twice.
#[derive(Debug)]
pub(crate) struct CoverageMask {
    left: i32,
    top: i32,
    width: usize,
    height: usize,
    coverage: Vec<f32>,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    x: f32,
    y: f32,
}

impl From<Point> for Vertex {
    fn from(point: Point) -> Self {
        Self {
            x: point.x as f32,
            y: point.y as f32,
        }
    }
}

/// Stroke radius for a nominal width; width 0 is a one-pixel hairline.
pub(crate) fn stroke_radius(thickness: u8) -> f32 {
    f32::from(thickness.max(1)) / 2.0
}

impl CoverageMask {
    /// Mask over `bounds` grown by `padding`, clipped to the image. `None` when
    /// nothing of it lands on the image.
    pub(crate) fn clipped(
        bounds: Bounds,
        padding: f32,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let pad = padding.ceil() as i64 + 1;
        let max_x = i64::from(image_width) - 1;
        let max_y = i64::from(image_height) - 1;
        let left = (i64::from(bounds.left) - pad).max(0);
        let top = (i64::from(bounds.top) - pad).max(0);
        let right = (i64::from(bounds.right) + pad).min(max_x);
        let bottom = (i64::from(bounds.bottom) + pad).min(max_y);
        if right < left || bottom < top {
            return None;
        }

        let width = usize::try_from(right - left + 1).ok()?;
        let height = usize::try_from(bottom - top + 1).ok()?;
        Some(Self {
            left: i32::try_from(left).ok()?,
            top: i32::try_from(top).ok()?,
            width,
            height,
            coverage: vec![0.0; width.checked_mul(height)?],
        })
    }

    fn cover(&mut self, column: usize, row: usize, amount: f32) {
        let slot = &mut self.coverage[row * self.width + column];
        if amount > *slot {
            *slot = amount.min(1.0);
        }
    }

    fn pixel_centre(&self, column: usize, row: usize) -> Vertex {
        Vertex {
            x: (self.left as f32) + column as f32,
            y: (self.top as f32) + row as f32,
        }
    }

    fn span(&self, low: f32, high: f32, origin: i32, len: usize) -> Option<(usize, usize)> {
        let first = (low.floor() as i64 - i64::from(origin)).max(0);
        let last = (high.ceil() as i64 - i64::from(origin)).min(len as i64 - 1);
        if last < first {
            return None;
        }
        Some((first as usize, last as usize))
    }

    /// Anti-aliased capsule around the segment `a`..`b`.
    fn stroke_segment(&mut self, a: Vertex, b: Vertex, radius: f32) {
        let reach = radius + 1.0;
        let Some((col_start, col_end)) = self.span(
            a.x.min(b.x) - reach,
            a.x.max(b.x) + reach,
            self.left,
            self.width,
        ) else {
            return;
        };
        let Some((row_start, row_end)) = self.span(
            a.y.min(b.y) - reach,
            a.y.max(b.y) + reach,
            self.top,
            self.height,
        ) else {
            return;
        };

        for row in row_start..=row_end {
            for column in col_start..=col_end {
                let distance = distance_to_segment(self.pixel_centre(column, row), a, b);
                let amount = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if amount > 0.0 {
                    self.cover(column, row, amount);
                }
            }
        }
    }

    fn stroke_closed_path(&mut self, vertices: &[Vertex], radius: f32) {
        match vertices {
            [] => {}
            [single] => self.stroke_segment(*single, *single, radius),
            _ => {
                for (index, start) in vertices.iter().enumerate() {
                    let end = vertices[(index + 1) % vertices.len()];
                    self.stroke_segment(*start, end, radius);
                }
            }
        }
    }

    fn fill_polygon(&mut self, vertices: &[Vertex]) {
        if vertices.len() < 3 {
            return;
        }
        for row in 0..self.height {
            for column in 0..self.width {
                if contains_even_odd(vertices, self.pixel_centre(column, row)) {
                    self.cover(column, row, 1.0);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, bounds: Bounds) {
        let (centre, rx, ry) = ellipse_axes(bounds);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        for row in 0..self.height {
            for column in 0..self.width {
                let p = self.pixel_centre(column, row);
                let nx = (p.x - centre.x) / rx;
                let ny = (p.y - centre.y) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.cover(column, row, 1.0);
                }
            }
        }
    }

    pub(crate) fn add_segment(&mut self, a: Point, b: Point, thickness: u8) {
        self.stroke_segment(a.into(), b.into(), stroke_radius(thickness));
    }

    pub(crate) fn add_outline(&mut self, outline: &Outline, thickness: u8, filled: bool) {
        let radius = stroke_radius(thickness);
        match outline {
            Outline::Line(start, end) => self.add_segment(*start, *end, thickness),
            Outline::Polygon(points) => {
                let vertices = points.iter().copied().map(Vertex::from).collect::<Vec<_>>();
                if filled {
                    self.fill_polygon(&vertices);
                }
                self.stroke_closed_path(&vertices, radius);
            }
            Outline::Ellipse(bounds) => {
                if filled {
                    self.fill_ellipse(*bounds);
                }
                self.stroke_closed_path(&ellipse_vertices(*bounds), radius);
            }
        }
    }

    /// Blend `color` into the image using the accumulated coverage.
    pub(crate) fn composite(&self, image: &mut RgbImage, color: Color) {
        let source = [color.r, color.g, color.b];
        for row in 0..self.height {
            for column in 0..self.width {
                let amount = self.coverage[row * self.width + column];
                if amount <= 0.0 {
                    continue;
                }
                let x = self.left as u32 + column as u32;
                let y = self.top as u32 + row as u32;
                let pixel = image.get_pixel_mut(x, y);
                for (channel, target) in pixel.0.iter_mut().zip(source) {
                    *channel = blend_channel(*channel, target, amount);
                }
            }
        }
    }
}

fn blend_channel(base: u8, target: u8, amount: f32) -> u8 {
    if amount >= 1.0 {
        return target;
    }
    let mixed = f32::from(base) + (f32::from(target) - f32::from(base)) * amount;
    mixed.round().clamp(0.0, 255.0) as u8
}

fn distance_to_segment(p: Vertex, a: Vertex, b: Vertex) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let nearest_x = a.x + t * dx;
    let nearest_y = a.y + t * dy;
    ((p.x - nearest_x).powi(2) + (p.y - nearest_y).powi(2)).sqrt()
}

fn contains_even_odd(vertices: &[Vertex], p: Vertex) -> bool {
    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for current in vertices {
        if (current.y > p.y) != (previous.y > p.y) {
            let crossing =
                (previous.x - current.x) * (p.y - current.y) / (previous.y - current.y) + current.x;
            if p.x < crossing {
                inside = !inside;
            }
        }
        previous = *current;
    }
    inside
}

fn ellipse_axes(bounds: Bounds) -> (Vertex, f32, f32) {
    let centre = Vertex {
        x: (bounds.left as f32 + bounds.right as f32) / 2.0,
        y: (bounds.top as f32 + bounds.bottom as f32) / 2.0,
    };
    (
        centre,
        bounds.width() as f32 / 2.0,
        bounds.height() as f32 / 2.0,
    )
}

fn ellipse_vertices(bounds: Bounds) -> Vec<Vertex> {
    let (centre, rx, ry) = ellipse_axes(bounds);
    if rx == 0.0 && ry == 0.0 {
        return vec![centre];
    }
    // Ramanujan's approximation; one vertex per pixel of circumference.
    let perimeter =
        std::f32::consts::PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt());
    let steps = (perimeter.ceil() as usize).clamp(12, 4096);
    (0..steps)
        .map(|step| {
            let angle = std::f32::consts::TAU * step as f32 / steps as f32;
            Vertex {
                x: centre.x + rx * angle.cos(),
                y: centre.y + ry * angle.sin(),
            }
        })
        .collect()
}
