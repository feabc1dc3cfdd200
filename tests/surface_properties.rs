use sketch_calc::draw::{
    Color, LineCap, Palette, Point, PointerEvent, StrokeCapture, Surface, Swatch, SurfaceStyle,
};

fn mounted(width: u32, height: u32) -> Surface {
    let mut surface = Surface::default();
    surface.initialize(width, height);
    surface
}

fn stroke(points: &[(f32, f32)], surface: &mut Surface, palette: &Palette) {
    let mut capture = StrokeCapture::default();
    let mut iter = points.iter().copied();
    if let Some(first) = iter.next() {
        capture.handle(PointerEvent::Down(first.into()), surface, palette);
    }
    for point in iter {
        capture.handle(PointerEvent::Move(point.into()), surface, palette);
    }
    capture.handle(PointerEvent::Up, surface, palette);
}

#[test]
fn stroke_is_continuous_between_sampled_points() {
    let mut surface = mounted(100, 100);
    let palette = Palette::default();
    let points = [(10.0, 10.0), (40.0, 12.0), (60.0, 55.0), (20.0, 80.0), (85.0, 90.0)];
    stroke(&points, &mut surface, &palette);

    for pair in points.windows(2) {
        let (a, b) = (Point::from(pair[0]), Point::from(pair[1]));
        for step in 0..=50 {
            let t = step as f32 / 50.0;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            assert_eq!(
                surface.pixel(x.floor() as u32, y.floor() as u32),
                Some(Color::WHITE),
                "gap at ({x}, {y})"
            );
        }
    }
}

#[test]
fn initialize_then_clear_snapshots_match() {
    let mut drawn = mounted(64, 40);
    stroke(&[(5.0, 5.0), (60.0, 35.0)], &mut drawn, &Palette::default());
    drawn.clear();

    let fresh = mounted(64, 40);
    let cleared = drawn.snapshot().expect("snapshot").decode().expect("decode");
    let initial = fresh.snapshot().expect("snapshot").decode().expect("decode");
    assert_eq!(cleared, initial);
    assert!(cleared.is_uniform(Color::BLACK));
}

#[test]
fn snapshot_is_a_pure_read() {
    let mut surface = mounted(32, 32);
    stroke(&[(2.0, 2.0), (30.0, 30.0)], &mut surface, &Palette::default());
    let revision = surface.revision();

    let first = surface.snapshot().expect("snapshot");
    let second = surface.snapshot().expect("snapshot");
    assert_eq!(first, second);
    assert_eq!(surface.revision(), revision);
    assert_eq!((first.width, first.height), (32, 32));
}

#[test]
fn snapshot_reflects_stroke_colors() {
    let mut surface = mounted(64, 64);
    let mut palette = Palette::default();
    palette.select_color(Swatch::Blue);
    stroke(&[(8.0, 32.0), (56.0, 32.0)], &mut surface, &palette);

    let decoded = surface.snapshot().expect("snapshot").decode().expect("decode");
    assert_eq!(decoded.pixel(32, 32), Some(Swatch::Blue.color()));
    assert_eq!(decoded.pixel(32, 10), Some(Color::BLACK));
}

#[test]
fn custom_style_controls_background_and_width() {
    let mut surface = Surface::new(SurfaceStyle {
        background: Color::WHITE,
        line_cap: LineCap::Butt,
        line_width: 9,
    });
    surface.initialize(40, 40);
    assert!(surface.is_blank());

    let mut palette = Palette::default();
    palette.select_color(Swatch::Black);
    stroke(&[(10.0, 20.0), (30.0, 20.0)], &mut surface, &palette);
    assert_eq!(surface.pixel(20, 16), Some(Color::BLACK));
    assert_eq!(surface.pixel(20, 26), Some(Color::WHITE));
    assert_eq!(surface.pixel(7, 20), Some(Color::WHITE));
}

#[test]
fn strokes_to_far_off_points_stay_clipped() {
    let mut surface = mounted(40, 40);
    let palette = Palette::default();
    stroke(&[(5.0, 5.0), (3.0e9, 5.0)], &mut surface, &palette);
    stroke(&[(5.0, 20.0), (-3.0e9, 20.0)], &mut surface, &palette);
    stroke(&[(5.0, 30.0), (f32::INFINITY, 30.0), (20.0, 30.0)], &mut surface, &palette);

    assert_eq!(surface.pixel(30, 5), Some(Color::WHITE));
    assert_eq!(surface.pixel(0, 20), Some(Color::WHITE));
    assert_eq!(surface.pixel(10, 12), Some(Color::BLACK));
    assert!(surface.snapshot().is_some());
}
