use crate::draw::buffer::RgbaBuffer;
use crate::draw::model::{Color, LineCap, Point};

const COORD_LIMIT: f32 = (i32::MAX / 2) as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    /// Bounding box of a segment grown by `pad`. Coordinates are pinned to
    /// half the `i32` range so the span always fits in `width`/`height`.
    pub fn from_points(a: Point, b: Point, pad: i32) -> Self {
        let pin = |v: f32| v.clamp(-COORD_LIMIT, COORD_LIMIT) as i32;
        let min_x = pin(a.x.min(b.x).floor()).saturating_sub(pad);
        let max_x = pin(a.x.max(b.x).ceil()).saturating_add(pad);
        let min_y = pin(a.y.min(b.y).floor()).saturating_sub(pad);
        let max_y = pin(a.y.max(b.y).ceil()).saturating_add(pad);
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = i32::try_from(width).unwrap_or(i32::MAX);
        let max_h = i32::try_from(height).unwrap_or(i32::MAX);
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Rasterizes one stroke segment and returns the touched area, if any.
///
/// Pixels are covered when their center lies within `line_width / 2` of the
/// segment; the cap decides how the ends are shaped. A zero-length segment
/// paints a dot for round and square caps and nothing for butt caps.
/// Segments with a non-finite endpoint paint nothing.
pub fn draw_segment(
    buffer: &mut RgbaBuffer,
    start: Point,
    end: Point,
    color: Color,
    line_width: u32,
    cap: LineCap,
) -> Option<DirtyRect> {
    if ![start.x, start.y, end.x, end.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let radius = line_width.max(1) as f32 / 2.0;
    let pad = radius.ceil() as i32 + 1;
    let bounds = DirtyRect::from_points(start, end, pad).clamp(buffer.width(), buffer.height())?;

    let radius_sq = radius * radius;
    let mut touched = false;
    for y in bounds.y..(bounds.y + bounds.height) {
        for x in bounds.x..(bounds.x + bounds.width) {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if covers(center, start, end, radius, radius_sq, cap) {
                buffer.set_pixel(x, y, color);
                touched = true;
            }
        }
    }
    touched.then_some(bounds)
}

fn covers(
    point: Point,
    start: Point,
    end: Point,
    radius: f32,
    radius_sq: f32,
    cap: LineCap,
) -> bool {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;

    if len_sq <= f32::EPSILON {
        return match cap {
            LineCap::Round => wx * wx + wy * wy <= radius_sq,
            LineCap::Square => wx.abs() <= radius && wy.abs() <= radius,
            LineCap::Butt => false,
        };
    }

    let t = (wx * vx + wy * vy) / len_sq;
    match cap {
        LineCap::Round => {
            let t = t.clamp(0.0, 1.0);
            let dx = point.x - (start.x + vx * t);
            let dy = point.y - (start.y + vy * t);
            dx * dx + dy * dy <= radius_sq
        }
        LineCap::Butt | LineCap::Square => {
            let extend = if cap == LineCap::Square {
                radius / len_sq.sqrt()
            } else {
                0.0
            };
            if t < -extend || t > 1.0 + extend {
                return false;
            }
            let cross = wx * vy - wy * vx;
            cross * cross / len_sq <= radius_sq
        }
    }
}
