//! Vertex sets for each shape kind, computed from an anchor/drag pair.
//!
//! Every division is floor division so the fixed-point fractions used by the
//! pentagon and arrow land on the same pixels for every drag direction.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Outline, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Oval,
    RightTriangle,
    Triangle,
    Line,
    Diamond,
    Pentagon,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [Self; 8] = [
        Self::Rectangle,
        Self::Oval,
        Self::RightTriangle,
        Self::Triangle,
        Self::Line,
        Self::Diamond,
        Self::Pentagon,
        Self::Arrow,
    ];

    pub fn outline(self, anchor: Point, drag: Point) -> Outline {
        match self {
            Self::Rectangle => rectangle(anchor, drag),
            Self::Oval => Outline::Ellipse(Bounds::spanning(anchor, drag)),
            Self::RightTriangle => right_triangle(anchor, drag),
            Self::Triangle => triangle(anchor, drag),
            Self::Line => Outline::Line(anchor, drag),
            Self::Diamond => diamond(anchor, drag),
            Self::Pentagon => pentagon(anchor, drag),
            Self::Arrow => arrow(anchor, drag),
        }
    }
}

/// Box anchored at the larger corner on each axis, spanning by the signed
/// (non-positive) extent toward the smaller one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirroredBox {
    pub zero_x: i32,
    pub x: i32,
    pub zero_y: i32,
    pub y: i32,
}

impl MirroredBox {
    pub fn new(anchor: Point, drag: Point) -> Self {
        let (zero_x, x) = mirrored_axis(anchor.x, drag.x);
        let (zero_y, y) = mirrored_axis(anchor.y, drag.y);
        Self {
            zero_x,
            x,
            zero_y,
            y,
        }
    }

    /// `(zero_x + x * nx / dx, zero_y + y * ny / dy)`
    fn at(&self, (nx, dx): (i64, i64), (ny, dy): (i64, i64)) -> Point {
        Point::new(
            offset(self.zero_x, scaled(self.x, nx, dx)),
            offset(self.zero_y, scaled(self.y, ny, dy)),
        )
    }
}

fn mirrored_axis(anchor: i32, drag: i32) -> (i32, i32) {
    if anchor < drag {
        (drag, anchor.saturating_sub(drag))
    } else {
        (anchor, drag.saturating_sub(anchor))
    }
}

fn scaled(value: i32, numerator: i64, denominator: i64) -> i64 {
    (i64::from(value) * numerator).div_euclid(denominator)
}

fn offset(origin: i32, delta: i64) -> i32 {
    let sum = i64::from(origin) + delta;
    i32::try_from(sum).unwrap_or(if sum < 0 { i32::MIN } else { i32::MAX })
}

fn midpoint(from: i32, to: i32) -> i32 {
    offset(from, (i64::from(to) - i64::from(from)).div_euclid(2))
}

fn rectangle(anchor: Point, drag: Point) -> Outline {
    let bounds = Bounds::spanning(anchor, drag);
    Outline::Polygon(vec![
        Point::new(bounds.left, bounds.top),
        Point::new(bounds.right, bounds.top),
        Point::new(bounds.right, bounds.bottom),
        Point::new(bounds.left, bounds.bottom),
    ])
}

fn right_triangle(anchor: Point, drag: Point) -> Outline {
    Outline::Polygon(vec![anchor, Point::new(anchor.x, drag.y), drag])
}

fn triangle(anchor: Point, drag: Point) -> Outline {
    Outline::Polygon(vec![
        anchor,
        drag,
        Point::new(midpoint(anchor.x, drag.x), anchor.y),
    ])
}

fn diamond(anchor: Point, drag: Point) -> Outline {
    let mid = Point::new(midpoint(anchor.x, drag.x), midpoint(anchor.y, drag.y));
    Outline::Polygon(vec![
        Point::new(anchor.x, mid.y),
        Point::new(mid.x, anchor.y),
        Point::new(drag.x, mid.y),
        Point::new(mid.x, drag.y),
    ])
}

fn pentagon(anchor: Point, drag: Point) -> Outline {
    let frame = MirroredBox::new(anchor, drag);
    Outline::Polygon(vec![
        frame.at((1, 6), (0, 1)),
        frame.at((5, 6), (0, 1)),
        frame.at((1, 1), (13, 22)),
        frame.at((1, 2), (1, 1)),
        frame.at((0, 1), (13, 22)),
    ])
}

fn arrow(anchor: Point, drag: Point) -> Outline {
    let frame = MirroredBox::new(anchor, drag);
    Outline::Polygon(vec![
        frame.at((0, 1), (1, 4)),
        frame.at((0, 1), (3, 4)),
        frame.at((1, 2), (3, 4)),
        frame.at((1, 2), (1, 1)),
        frame.at((1, 1), (1, 2)),
        frame.at((1, 2), (0, 1)),
        frame.at((1, 2), (1, 4)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(outline: Outline) -> Vec<Point> {
        match outline {
            Outline::Polygon(vertices) => vertices,
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    fn points(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn mirrored_box_anchors_at_the_larger_corner() {
        let frame = MirroredBox::new(Point::new(200, 100), Point::new(100, 200));
        assert_eq!(
            frame,
            MirroredBox {
                zero_x: 200,
                x: -100,
                zero_y: 200,
                y: -100
            }
        );
        assert_eq!(
            MirroredBox::new(Point::new(100, 200), Point::new(200, 100)),
            frame
        );
    }

    #[test]
    fn pentagon_vertices_use_floor_division() {
        let vertices = polygon(ShapeKind::Pentagon.outline(Point::new(200, 100), Point::new(100, 200)));
        assert_eq!(
            vertices,
            points(&[(183, 200), (116, 200), (100, 140), (150, 100), (200, 140)])
        );
    }

    #[test]
    fn arrow_vertices_follow_the_mirrored_box() {
        let vertices = polygon(ShapeKind::Arrow.outline(Point::new(10, 10), Point::new(110, 50)));
        // zero = (110, 50), extent = (-100, -40)
        assert_eq!(
            vertices,
            points(&[
                (110, 40),
                (110, 20),
                (60, 20),
                (60, 10),
                (10, 30),
                (60, 50),
                (60, 40),
            ])
        );
    }

    #[test]
    fn arrow_and_pentagon_vertex_counts_are_fixed() {
        let pairs = [
            (Point::new(0, 0), Point::new(31, 17)),
            (Point::new(90, 4), Point::new(3, 77)),
            (Point::new(-5, -5), Point::new(-60, 12)),
        ];
        for (anchor, drag) in pairs {
            assert_eq!(polygon(ShapeKind::Arrow.outline(anchor, drag)).len(), 7);
            assert_eq!(polygon(ShapeKind::Pentagon.outline(anchor, drag)).len(), 5);
        }
    }

    #[test]
    fn rectangle_and_oval_share_the_normalized_bounding_box() {
        let anchor = Point::new(50, 40);
        let drag = Point::new(10, 10);
        assert_eq!(
            polygon(ShapeKind::Rectangle.outline(anchor, drag)),
            points(&[(10, 10), (50, 10), (50, 40), (10, 40)])
        );
        assert_eq!(
            ShapeKind::Oval.outline(anchor, drag),
            Outline::Ellipse(Bounds {
                left: 10,
                top: 10,
                right: 50,
                bottom: 40
            })
        );
    }

    #[test]
    fn line_keeps_points_verbatim() {
        let anchor = Point::new(7, 70);
        let drag = Point::new(3, 1);
        assert_eq!(
            ShapeKind::Line.outline(anchor, drag),
            Outline::Line(anchor, drag)
        );
    }

    #[test]
    fn triangles_and_diamond_match_their_vertex_formulas() {
        let anchor = Point::new(10, 20);
        let drag = Point::new(31, 61);
        assert_eq!(
            polygon(ShapeKind::RightTriangle.outline(anchor, drag)),
            points(&[(10, 20), (10, 61), (31, 61)])
        );
        assert_eq!(
            polygon(ShapeKind::Triangle.outline(anchor, drag)),
            points(&[(10, 20), (31, 61), (20, 20)])
        );
        assert_eq!(
            polygon(ShapeKind::Diamond.outline(anchor, drag)),
            points(&[(10, 40), (20, 20), (31, 40), (20, 61)])
        );
    }

    #[test]
    fn odd_negative_deltas_round_toward_negative_infinity() {
        let anchor = Point::new(10, 10);
        let drag = Point::new(5, 20);
        assert_eq!(
            polygon(ShapeKind::Triangle.outline(anchor, drag)),
            points(&[(10, 10), (5, 20), (7, 10)])
        );
        assert_eq!(
            polygon(ShapeKind::Diamond.outline(anchor, drag)),
            points(&[(10, 15), (7, 10), (5, 15), (7, 20)])
        );
    }

    #[test]
    fn degenerate_drag_collapses_without_panicking() {
        let point = Point::new(5, 5);
        for kind in ShapeKind::ALL {
            let outline = kind.outline(point, point);
            assert!(outline.vertices().iter().all(|vertex| *vertex == point), "{kind:?}");
        }
    }
}
