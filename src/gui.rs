use crate::draw::model::Color;
use crate::draw::palette::Swatch;
use crate::session::{Event, Session};
use crate::settings::Settings;
use eframe::egui;
use std::sync::Arc;

/// Full-window drawing canvas with a control strip on top and the latest
/// results at the bottom.
pub struct SketchApp {
    session: Session,
    settings: Settings,
    settings_path: String,
    texture: Option<egui::TextureHandle>,
    uploaded_revision: Option<u64>,
    pointer_inside: bool,
    status: Option<String>,
}

impl SketchApp {
    pub fn new(
        ctx: &egui::Context,
        mut session: Session,
        settings: Settings,
        settings_path: impl Into<String>,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        session.set_waker(Some(Arc::new(move || repaint_ctx.request_repaint())));
        Self {
            session,
            settings,
            settings_path: settings_path.into(),
            texture: None,
            uploaded_revision: None,
            pointer_inside: false,
            status: None,
        }
    }

    fn sync_viewport(&mut self, ctx: &egui::Context) -> egui::Rect {
        let rect = ctx.screen_rect();
        let width = rect.width().round().max(0.0) as u32;
        let height = rect.height().round().max(0.0) as u32;
        if self.session.surface().size() != Some((width, height)) {
            self.session.dispatch(Event::Resize { width, height });
        }
        if width > 0 && height > 0 {
            self.settings.window_size = Some((rect.width(), rect.height()));
        }
        rect
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, canvas: egui::Rect) {
        let sample = ctx.input(|i| PointerSample {
            pos: i.pointer.hover_pos(),
            press_origin: i.pointer.press_origin(),
            pressed: i.pointer.primary_pressed(),
            released: i.pointer.primary_released(),
            down: i.pointer.primary_down(),
            over_controls: false,
        });
        let sample = PointerSample {
            over_controls: ctx.is_pointer_over_area(),
            ..sample
        };
        let (events, inside) = pointer_events(sample, canvas, self.pointer_inside);
        self.pointer_inside = inside;
        self.session.dispatch_all(events);
    }

    fn persist_settings(&self) {
        if let Err(err) = self.settings.save(&self.settings_path) {
            tracing::warn!(?err, path = %self.settings_path, "failed to save settings");
        }
    }

    fn upload_surface(&mut self, ctx: &egui::Context) {
        let revision = self.session.surface().revision();
        if self.uploaded_revision == Some(revision) && self.texture.is_some() {
            return;
        }
        let image = self.session.surface().with_pixels(|pixels, width, height| {
            egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], pixels)
        });
        let Some(image) = image else {
            self.texture = None;
            return;
        };
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("sketch-surface", image, egui::TextureOptions::NEAREST))
            }
        }
        self.uploaded_revision = Some(revision);
    }

    fn controls(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("sketch-controls"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Reset").clicked() {
                            self.session.dispatch(Event::Reset);
                        }
                        ui.separator();
                        let current = self.session.palette().current();
                        for swatch in Swatch::ALL {
                            let stroke = if swatch == current {
                                egui::Stroke::new(2.0, egui::Color32::YELLOW)
                            } else {
                                egui::Stroke::new(1.0, egui::Color32::GRAY)
                            };
                            let button = egui::Button::new("")
                                .fill(color32(swatch.color()))
                                .stroke(stroke)
                                .min_size(egui::vec2(22.0, 22.0));
                            if ui.add(button).on_hover_text(swatch.label()).clicked() {
                                self.session.dispatch(Event::SelectColor(swatch));
                            }
                        }
                        ui.separator();
                        if ui.button("Calculate").clicked() {
                            self.session.dispatch(Event::Submit);
                        }
                        if ui.button("Save").clicked() {
                            self.status = Some(
                                match self.session.export_snapshot(&self.settings.export_dir) {
                                    Ok(path) => format!("Saved {}", path.display()),
                                    Err(err) => {
                                        tracing::error!(?err, "snapshot export failed");
                                        format!("Save failed: {err}")
                                    }
                                },
                            );
                        }
                        if self.session.submissions_in_flight() > 0 {
                            ui.spinner();
                        }
                    });
                });
            });
    }

    fn results(&self, ctx: &egui::Context) {
        let has_vars = !self.session.vars().is_empty();
        if self.session.result().is_none() && !has_vars && self.status.is_none() {
            return;
        }
        egui::Area::new(egui::Id::new("sketch-results"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if let Some(result) = self.session.result() {
                        for answer in &result.answers {
                            ui.monospace(format!("{} = {}", answer.expression, answer.answer));
                        }
                    }
                    if has_vars {
                        ui.separator();
                        for (name, value) in self.session.vars().iter() {
                            ui.weak(format!("{name} := {value}"));
                        }
                    }
                    if let Some(status) = &self.status {
                        ui.separator();
                        ui.small(status);
                    }
                });
            });
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.pump();
        let canvas = self.sync_viewport(ctx);
        self.controls(ctx);
        self.results(ctx);
        self.handle_pointer(ctx, canvas);
        self.upload_surface(ctx);

        if let Some(texture) = &self.texture {
            ctx.layer_painter(egui::LayerId::background()).image(
                texture.id(),
                canvas,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.dispatch(Event::Unmount);
        self.persist_settings();
    }
}

/// Pointer state read from one egui frame.
#[derive(Debug, Clone, Copy, Default)]
struct PointerSample {
    pos: Option<egui::Pos2>,
    press_origin: Option<egui::Pos2>,
    pressed: bool,
    released: bool,
    down: bool,
    over_controls: bool,
}

/// Maps a frame's pointer state to session events in canvas coordinates.
/// Returns the events and whether the pointer is over the canvas.
fn pointer_events(
    sample: PointerSample,
    canvas: egui::Rect,
    was_inside: bool,
) -> (Vec<Event>, bool) {
    let mut events = Vec::new();
    let inside = sample.pos.is_some_and(|p| canvas.contains(p));
    if was_inside && !inside {
        events.push(Event::pointer_leave());
    }

    if sample.pressed && !sample.over_controls {
        // A press and some movement can land in the same frame; start the
        // stroke where the button went down.
        let origin = sample.press_origin.or(sample.pos).filter(|p| canvas.contains(*p));
        if let Some(origin) = origin {
            let local = origin - canvas.min;
            events.push(Event::pointer_down(local.x, local.y));
            if let Some(pos) = sample.pos.filter(|p| inside && *p != origin) {
                let local = pos - canvas.min;
                events.push(Event::pointer_move(local.x, local.y));
            }
        }
    } else if sample.down {
        if let Some(pos) = sample.pos.filter(|_| inside) {
            let local = pos - canvas.min;
            events.push(Event::pointer_move(local.x, local.y));
        }
    }

    if sample.released {
        events.push(Event::pointer_up());
    }
    (events, inside)
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::SurfaceStyle;
    use crate::submit::client::{CalculateRequest, Evaluator};
    use crate::submit::response::ResponseEntry;

    struct Offline;

    impl Evaluator for Offline {
        fn evaluate(&self, _request: &CalculateRequest) -> anyhow::Result<Vec<ResponseEntry>> {
            Err(anyhow::anyhow!("offline"))
        }
    }

    #[test]
    fn first_frame_mounts_surface_at_screen_size() {
        let ctx = egui::Context::default();
        let session = Session::new(SurfaceStyle::default(), Arc::new(Offline));
        let mut app = SketchApp::new(&ctx, session, Settings::default(), "settings.json");

        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(320.0, 200.0),
            )),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            let canvas = app.sync_viewport(ctx);
            app.upload_surface(ctx);
            assert_eq!(canvas.width(), 320.0);
        });

        assert_eq!(app.session.surface().size(), Some((320, 200)));
        assert!(app.texture.is_some());
        assert_eq!(app.settings.window_size, Some((320.0, 200.0)));
    }

    #[test]
    fn window_size_is_saved_on_exit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let path = path.to_str().unwrap().to_string();
        let ctx = egui::Context::default();
        let session = Session::new(SurfaceStyle::default(), Arc::new(Offline));
        let mut app = SketchApp::new(&ctx, session, Settings::default(), path.clone());

        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(640.0, 480.0),
            )),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            app.sync_viewport(ctx);
        });
        eframe::App::on_exit(&mut app, None);

        assert!(!app.session.surface().is_mounted());
        let reloaded = Settings::load(&path).unwrap();
        assert_eq!(reloaded.window_size, Some((640.0, 480.0)));
    }

    fn canvas() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(200.0, 100.0))
    }

    #[test]
    fn fast_press_starts_stroke_at_press_origin() {
        let sample = PointerSample {
            pos: Some(egui::pos2(60.0, 90.0)),
            press_origin: Some(egui::pos2(10.0, 50.0)),
            pressed: true,
            down: true,
            ..Default::default()
        };
        let (events, inside) = pointer_events(sample, canvas(), false);
        assert!(inside);
        assert_eq!(
            events,
            vec![Event::pointer_down(10.0, 10.0), Event::pointer_move(60.0, 50.0)]
        );
    }

    #[test]
    fn press_without_origin_falls_back_to_hover_position() {
        let sample = PointerSample {
            pos: Some(egui::pos2(30.0, 60.0)),
            pressed: true,
            down: true,
            ..Default::default()
        };
        let (events, _) = pointer_events(sample, canvas(), true);
        assert_eq!(events, vec![Event::pointer_down(30.0, 20.0)]);
    }

    #[test]
    fn press_over_controls_is_ignored() {
        let sample = PointerSample {
            pos: Some(egui::pos2(30.0, 60.0)),
            press_origin: Some(egui::pos2(30.0, 60.0)),
            pressed: true,
            down: true,
            over_controls: true,
            ..Default::default()
        };
        let (events, _) = pointer_events(sample, canvas(), true);
        assert!(events.is_empty());
    }

    #[test]
    fn leaving_canvas_emits_leave_once() {
        let outside = PointerSample {
            pos: Some(egui::pos2(30.0, 10.0)),
            down: true,
            ..Default::default()
        };
        let (events, inside) = pointer_events(outside, canvas(), true);
        assert!(!inside);
        assert_eq!(events, vec![Event::pointer_leave()]);

        let (events, _) = pointer_events(outside, canvas(), inside);
        assert!(events.is_empty());
    }

    #[test]
    fn swatch_colors_convert_to_egui() {
        assert_eq!(color32(Swatch::Red.color()), egui::Color32::from_rgb(255, 0, 0));
    }
}
