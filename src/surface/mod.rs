//! Pixel buffer owned by the canvas, its paint state and full-buffer snapshots.

mod raster;

use image::RgbImage;

use crate::geometry::{Bounds, Color, Outline, Point};
use raster::{stroke_radius, CoverageMask};

pub const MIN_STROKE_WIDTH: u8 = 0;
pub const MAX_STROKE_WIDTH: u8 = 50;
pub const DEFAULT_STROKE_WIDTH: u8 = 1;
pub const BACKGROUND_COLOR: Color = Color::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintState {
    pub color: Color,
    pub stroke_width: u8,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl PaintState {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Out-of-range widths are clamped, never rejected.
    pub fn set_stroke_width(&mut self, width: i32) {
        self.stroke_width = clamp_stroke_width(width);
    }
}

pub fn clamp_stroke_width(width: i32) -> u8 {
    let clamped = width.clamp(i32::from(MIN_STROKE_WIDTH), i32::from(MAX_STROKE_WIDTH));
    u8::try_from(clamped).unwrap_or(MAX_STROKE_WIDTH)
}

/// Immutable deep copy of the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pixels: RgbImage,
}

impl Snapshot {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbImage,
    paint: PaintState,
}

impl RasterSurface {
    /// Blank white surface. Zero dimensions are raised to one pixel.
    pub fn create(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND_COLOR.to_pixel()),
            paint: PaintState::default(),
        }
    }

    /// Adopts a decoded buffer, recreating the surface at its size. Paint
    /// state carries over.
    pub fn from_pixels(pixels: RgbImage, paint: PaintState) -> Self {
        Self { pixels, paint }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.pixels.get_pixel_checked(x, y).copied().map(Color::from)
    }

    pub fn paint(&self) -> PaintState {
        self.paint
    }

    pub fn set_color(&mut self, color: Color) {
        self.paint.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: i32) {
        self.paint.set_stroke_width(width);
    }

    /// Fills the whole buffer with one color.
    pub fn fill(&mut self, color: Color) {
        let pixel = color.to_pixel();
        for target in self.pixels.pixels_mut() {
            *target = pixel;
        }
    }

    pub fn draw_segment(&mut self, start: Point, end: Point, color: Color, thickness: u8) {
        let bounds = Bounds::spanning(start, end);
        let (width, height) = self.dimensions();
        let Some(mut mask) =
            CoverageMask::clipped(bounds, stroke_radius(thickness), width, height)
        else {
            return;
        };
        mask.add_segment(start, end, thickness);
        mask.composite(&mut self.pixels, color);
    }

    pub fn rasterize_shape(&mut self, outline: &Outline, color: Color, thickness: u8, filled: bool) {
        rasterize_outline(&mut self.pixels, outline, color, thickness, filled);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pixels: self.pixels.clone(),
        }
    }

    /// Replaces the buffer with the snapshot's pixels, taking its dimensions.
    /// The active paint state is kept.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.pixels = snapshot.pixels;
    }
}

/// Draws `outline` into any RGB buffer; shared by commits and preview overlays.
pub(crate) fn rasterize_outline(
    pixels: &mut RgbImage,
    outline: &Outline,
    color: Color,
    thickness: u8,
    filled: bool,
) {
    let Some(bounds) = outline.bounds() else {
        return;
    };
    let (width, height) = pixels.dimensions();
    let Some(mut mask) = CoverageMask::clipped(bounds, stroke_radius(thickness), width, height)
    else {
        return;
    };
    mask.add_outline(outline, thickness, filled && outline.is_fillable());
    mask.composite(pixels, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_non_background(surface: &RasterSurface) -> usize {
        surface
            .pixels()
            .pixels()
            .filter(|pixel| Color::from(**pixel) != BACKGROUND_COLOR)
            .count()
    }

    #[test]
    fn create_yields_blank_white_buffer() {
        let surface = RasterSurface::create(32, 24);
        assert_eq!(surface.dimensions(), (32, 24));
        assert_eq!(count_non_background(&surface), 0);
        assert_eq!(surface.paint(), PaintState::default());
    }

    #[test]
    fn stroke_width_is_clamped_into_range() {
        let mut surface = RasterSurface::create(4, 4);
        surface.set_stroke_width(-5);
        assert_eq!(surface.paint().stroke_width, 0);
        surface.set_stroke_width(999);
        assert_eq!(surface.paint().stroke_width, 50);
        surface.set_stroke_width(12);
        assert_eq!(surface.paint().stroke_width, 12);
    }

    #[test]
    fn rectangle_outline_stays_inside_its_bounding_box() {
        let mut surface = RasterSurface::create(80, 60);
        let outline = Outline::Polygon(vec![
            Point::new(10, 10),
            Point::new(50, 10),
            Point::new(50, 40),
            Point::new(10, 40),
        ]);
        surface.rasterize_shape(&outline, Color::BLACK, 1, false);

        let bounds = Bounds::spanning(Point::new(10, 10), Point::new(50, 40));
        for (x, y, pixel) in surface.pixels().enumerate_pixels() {
            let point = Point::new(x as i32, y as i32);
            if !bounds.contains(point) {
                assert_eq!(Color::from(*pixel), BACKGROUND_COLOR, "pixel {point:?} changed");
            }
        }
        assert_eq!(surface.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(surface.pixel(50, 40), Some(Color::BLACK));
        assert_eq!(surface.pixel(30, 25), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn drawing_outside_the_buffer_is_clipped_silently() {
        let mut surface = RasterSurface::create(16, 16);
        surface.draw_segment(Point::new(-100, -100), Point::new(-50, -80), Color::BLACK, 5);
        assert_eq!(count_non_background(&surface), 0);

        surface.draw_segment(Point::new(-10, 8), Point::new(100, 8), Color::BLACK, 1);
        assert_eq!(surface.pixel(0, 8), Some(Color::BLACK));
        assert_eq!(surface.pixel(15, 8), Some(Color::BLACK));
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut surface = RasterSurface::create(16, 16);
        let before = surface.snapshot();
        surface.draw_segment(Point::new(0, 0), Point::new(15, 15), Color::BLACK, 3);
        assert_ne!(surface.pixels(), before.pixels());

        surface.restore(before.clone());
        assert_eq!(surface.pixels(), before.pixels());
    }

    #[test]
    fn restore_keeps_paint_state_and_adopts_snapshot_size() {
        let small = RasterSurface::create(8, 8).snapshot();
        let mut surface = RasterSurface::create(20, 10);
        surface.set_color(Color::new(255, 0, 0));
        surface.set_stroke_width(7);

        surface.restore(small);
        assert_eq!(surface.dimensions(), (8, 8));
        assert_eq!(surface.paint().color, Color::new(255, 0, 0));
        assert_eq!(surface.paint().stroke_width, 7);
    }

    #[test]
    fn fill_paints_every_pixel() {
        let mut surface = RasterSurface::create(5, 5);
        surface.fill(Color::new(1, 2, 3));
        assert!(surface
            .pixels()
            .pixels()
            .all(|pixel| pixel.0 == [1, 2, 3]));
    }

    #[test]
    fn line_outline_ignores_fill_flag() {
        let mut surface = RasterSurface::create(20, 20);
        let outline = Outline::Line(Point::new(2, 2), Point::new(17, 2));
        surface.rasterize_shape(&outline, Color::BLACK, 1, true);
        assert_eq!(surface.pixel(10, 2), Some(Color::BLACK));
        assert_eq!(surface.pixel(10, 10), Some(BACKGROUND_COLOR));
    }
}
