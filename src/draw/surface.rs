use crate::draw::buffer::RgbaBuffer;
use crate::draw::model::{Color, Point, SurfaceStyle};
use crate::draw::render::{draw_segment, DirtyRect};
use crate::draw::save::{encode_png, Snapshot};

/// Where the next segment starts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeCursor {
    Lifted,
    /// A stroke is open but its last position was lost to a reinitialization.
    Detached,
    At(Point),
}

/// Owns the drawing pixel buffer.
///
/// Until `initialize` is called with a non-empty size the surface is
/// unmounted and every operation is a silent no-op.
#[derive(Debug)]
pub struct Surface {
    style: SurfaceStyle,
    buffer: Option<RgbaBuffer>,
    cursor: StrokeCursor,
    revision: u64,
}

impl Surface {
    pub fn new(style: SurfaceStyle) -> Self {
        Self {
            style,
            buffer: None,
            cursor: StrokeCursor::Lifted,
            revision: 0,
        }
    }

    pub fn style(&self) -> SurfaceStyle {
        self.style
    }

    pub fn is_mounted(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(RgbaBuffer::size)
    }

    /// Bumped on every pixel mutation; lets presenters skip re-uploads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_stroke_open(&self) -> bool {
        !matches!(self.cursor, StrokeCursor::Lifted)
    }

    pub fn initialize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "surface viewport is empty; unmounting");
            self.buffer = None;
            self.cursor = StrokeCursor::Lifted;
            self.revision += 1;
            return;
        }

        let background = self.style.background;
        let same_size = self.size() == Some((width, height));
        if let (true, Some(buffer)) = (same_size, self.buffer.as_mut()) {
            buffer.fill(background);
        } else {
            self.buffer = Some(RgbaBuffer::new(width, height, background));
        }
        if let StrokeCursor::At(_) = self.cursor {
            self.cursor = StrokeCursor::Detached;
        }
        self.revision += 1;
        tracing::debug!(width, height, "surface initialized");
    }

    pub fn clear(&mut self) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        buffer.fill(self.style.background);
        self.revision += 1;
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.buffer.is_none() {
            return;
        }
        self.cursor = StrokeCursor::At(point);
    }

    /// Draws from the last position to `point`; a no-op without an open stroke.
    pub fn extend_stroke(&mut self, point: Point, color: Color) -> Option<DirtyRect> {
        let buffer = self.buffer.as_mut()?;
        let start = match self.cursor {
            StrokeCursor::Lifted => return None,
            StrokeCursor::Detached => {
                self.cursor = StrokeCursor::At(point);
                return None;
            }
            StrokeCursor::At(start) => start,
        };
        self.cursor = StrokeCursor::At(point);
        let dirty = draw_segment(
            buffer,
            start,
            point,
            color,
            self.style.line_width,
            self.style.line_cap,
        );
        if dirty.is_some() {
            self.revision += 1;
        }
        dirty
    }

    pub fn end_stroke(&mut self) {
        self.cursor = StrokeCursor::Lifted;
    }

    pub fn unmount(&mut self) {
        if self.buffer.take().is_some() {
            tracing::debug!("surface unmounted");
            self.revision += 1;
        }
        self.cursor = StrokeCursor::Lifted;
    }

    /// Encodes the current pixels as PNG. `None` while unmounted or when
    /// encoding fails.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let buffer = self.buffer.as_ref()?;
        match encode_png(buffer) {
            Ok(png) => Some(Snapshot::new(buffer.width(), buffer.height(), png)),
            Err(err) => {
                tracing::error!(?err, "failed to encode surface snapshot");
                None
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.buffer.as_ref()?.pixel(x, y)
    }

    /// Read-only access to the raw RGBA pixels for presentation.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&[u8], u32, u32) -> R) -> Option<R> {
        self.buffer
            .as_ref()
            .map(|buffer| f(buffer.pixels(), buffer.width(), buffer.height()))
    }

    pub fn is_blank(&self) -> bool {
        self.buffer
            .as_ref()
            .map_or(true, |buffer| buffer.is_uniform(self.style.background))
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(SurfaceStyle::default())
    }
}
