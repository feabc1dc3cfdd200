use crate::draw::input::{PointerEvent, StrokeCapture};
use crate::draw::model::{Point, SurfaceStyle};
use crate::draw::palette::{Palette, Swatch};
use crate::draw::save::export_snapshot;
use crate::draw::state::CaptureState;
use crate::draw::surface::Surface;
use crate::submit::client::Evaluator;
use crate::submit::controller::{Calculation, SubmissionController, SubmissionState, Waker};
use crate::submit::vars::VariableDictionary;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Everything the session reacts to, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Resize { width: u32, height: u32 },
    Pointer(PointerEvent),
    SelectColor(Swatch),
    Reset,
    Submit,
    Unmount,
}

impl Event {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Event::Pointer(PointerEvent::Down(Point::new(x, y)))
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Event::Pointer(PointerEvent::Move(Point::new(x, y)))
    }

    pub fn pointer_up() -> Self {
        Event::Pointer(PointerEvent::Up)
    }

    pub fn pointer_leave() -> Self {
        Event::Pointer(PointerEvent::Leave)
    }
}

/// Interaction state for one drawing session.
pub struct Session {
    surface: Surface,
    capture: StrokeCapture,
    palette: Palette,
    submission: SubmissionController,
    state: SubmissionState,
}

impl Session {
    pub fn new(style: SurfaceStyle, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            surface: Surface::new(style),
            capture: StrokeCapture::default(),
            palette: Palette::default(),
            submission: SubmissionController::new(evaluator),
            state: SubmissionState::default(),
        }
    }

    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Resize { width, height } => {
                if self.capture.state().is_drawing() {
                    tracing::debug!(width, height, "viewport resized mid-stroke");
                }
                self.surface.initialize(width, height);
            }
            Event::Pointer(pointer) => {
                let _ = self
                    .capture
                    .handle(pointer, &mut self.surface, &self.palette);
            }
            Event::SelectColor(swatch) => self.palette.select_color(swatch),
            Event::Reset => self.submission.reset(&mut self.surface),
            Event::Submit => {
                let _ = self.submit();
            }
            Event::Unmount => {
                self.capture.handle_up(&mut self.surface);
                self.surface.unmount();
            }
        }
    }

    pub fn dispatch_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.dispatch(event);
        }
    }

    /// Fire-and-forget; the outcome is applied by a later [`Session::pump`].
    pub fn submit(&mut self) -> Option<u64> {
        self.submission.submit(&self.surface, &self.state.vars)
    }

    /// Applies finished submissions. Call once per frame.
    pub fn pump(&mut self) -> usize {
        self.submission.pump(&mut self.state)
    }

    pub fn pump_until_idle(&mut self, timeout: Duration) -> usize {
        self.submission.pump_until_idle(&mut self.state, timeout)
    }

    pub fn set_waker(&mut self, waker: Option<Waker>) {
        self.submission.set_waker(waker);
    }

    pub fn export_snapshot(&self, dir: &Path) -> Result<PathBuf> {
        let snapshot = self
            .surface
            .snapshot()
            .ok_or_else(|| anyhow!("surface is not mounted"))?;
        export_snapshot(&snapshot, dir, chrono::Local::now())
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn result(&self) -> Option<&Calculation> {
        self.state.result.as_ref()
    }

    pub fn vars(&self) -> &VariableDictionary {
        &self.state.vars
    }

    pub fn vars_mut(&mut self) -> &mut VariableDictionary {
        &mut self.state.vars
    }

    pub fn submissions_in_flight(&self) -> usize {
        self.submission.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;
    use crate::submit::client::CalculateRequest;
    use crate::submit::response::ResponseEntry;

    struct Unreachable;

    impl Evaluator for Unreachable {
        fn evaluate(&self, _request: &CalculateRequest) -> Result<Vec<ResponseEntry>> {
            Err(anyhow!("service unreachable"))
        }
    }

    fn session() -> Session {
        let mut session = Session::new(SurfaceStyle::default(), Arc::new(Unreachable));
        session.dispatch(Event::Resize {
            width: 64,
            height: 48,
        });
        session
    }

    #[test]
    fn reset_clears_surface_but_keeps_variables() {
        let mut session = session();
        session.vars_mut().assign("x", "5");
        session.dispatch_all([
            Event::pointer_down(5.0, 5.0),
            Event::pointer_move(30.0, 30.0),
            Event::pointer_up(),
        ]);
        assert!(!session.surface().is_blank());

        session.dispatch(Event::Reset);
        assert!(session.surface().is_blank());
        assert_eq!(session.vars().len(), 1);
    }

    #[test]
    fn resize_mid_stroke_starts_fresh_buffer() {
        let mut session = session();
        session.dispatch_all([Event::pointer_down(5.0, 5.0), Event::pointer_move(20.0, 5.0)]);
        session.dispatch(Event::Resize {
            width: 100,
            height: 80,
        });
        assert_eq!(session.surface().size(), Some((100, 80)));
        assert!(session.surface().is_blank());

        session.dispatch_all([Event::pointer_move(60.0, 60.0), Event::pointer_move(90.0, 60.0)]);
        assert_eq!(session.surface().pixel(75, 60), Some(Color::WHITE));
        assert_eq!(session.surface().pixel(12, 5), Some(Color::BLACK));
    }

    #[test]
    fn failed_submit_keeps_drawing_available() {
        let mut session = session();
        session.dispatch(Event::Submit);
        session.pump_until_idle(Duration::from_secs(5));
        assert!(session.result().is_none());

        session.dispatch_all([
            Event::pointer_down(2.0, 2.0),
            Event::pointer_move(40.0, 2.0),
            Event::pointer_up(),
        ]);
        assert_eq!(session.surface().pixel(20, 2), Some(Color::WHITE));
    }

    #[test]
    fn unmount_turns_surface_operations_into_noops() {
        let mut session = session();
        session.dispatch(Event::Unmount);
        session.dispatch_all([Event::pointer_down(1.0, 1.0), Event::pointer_move(9.0, 9.0)]);
        assert!(!session.surface().is_mounted());
        assert_eq!(session.submit(), None);
    }
}
