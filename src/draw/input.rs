use crate::draw::model::Point;
use crate::draw::palette::Palette;
use crate::draw::render::DirtyRect;
use crate::draw::state::{can_transition, CaptureState};
use crate::draw::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Turns pointer events into stroke segments on a [`Surface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        surface: &mut Surface,
        palette: &Palette,
    ) -> Option<DirtyRect> {
        match event {
            PointerEvent::Down(point) => {
                self.handle_down(point, surface);
                None
            }
            PointerEvent::Move(point) => self.handle_move(point, surface, palette),
            PointerEvent::Up | PointerEvent::Leave => {
                self.handle_up(surface);
                None
            }
        }
    }

    pub fn handle_down(&mut self, point: Point, surface: &mut Surface) {
        surface.begin_stroke(point);
        self.transition(CaptureState::Drawing);
    }

    pub fn handle_move(
        &mut self,
        point: Point,
        surface: &mut Surface,
        palette: &Palette,
    ) -> Option<DirtyRect> {
        if !self.state.is_drawing() {
            return None;
        }
        surface.extend_stroke(point, palette.current_color())
    }

    pub fn handle_up(&mut self, surface: &mut Surface) {
        if !self.state.is_drawing() {
            return;
        }
        surface.end_stroke();
        self.transition(CaptureState::Idle);
    }

    fn transition(&mut self, to: CaptureState) {
        debug_assert!(can_transition(self.state, to));
        if self.state != to {
            tracing::trace!(from = ?self.state, to = ?to, "stroke capture transition");
        }
        self.state = to;
    }
}
