use shapevg::color::PackedSrgb;
use shapevg::math::{bounds, point};
use shapevg::tessellation::shape::{Ellipse, Knot, Polyline, Sunburst};
use shapevg::tessellation::{Fill, RingStyle, Shape};
use shapevg::GraphicStore;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn store_rebuilds_dirty_graphics() {
    init_logger();
    let mut store = GraphicStore::new();

    let dot = store.insert(Ellipse::new(bounds(0.0, 0.0, 8.0, 8.0), 12));
    let star = store.insert(Sunburst::new(bounds(0.0, 0.0, 30.0, 30.0), 5, 0.5, 1.0));
    let line = store.insert(Polyline::new(
        [Knot::new(point(0.0, 0.0)), Knot::new(point(20.0, 0.0))],
        2.0,
    ));
    assert_eq!(store.len(), 3);
    assert_eq!(store.rebuild_dirty(), 3);
    assert_eq!(store.rebuild_dirty(), 0);

    assert_eq!(store.get(dot).unwrap().cached_mesh().vertices.len(), 13);
    assert_eq!(store.get(star).unwrap().cached_mesh().triangle_count(), 10);
    assert_eq!(store.get(line).unwrap().cached_mesh().triangle_count(), 2);

    let red = PackedSrgb::new(1.0, 0.0, 0.0, 1.0);
    let red_dot = Ellipse {
        style: RingStyle {
            fill: Fill::Solid(red),
            ..Default::default()
        },
        ..Ellipse::new(bounds(0.0, 0.0, 8.0, 8.0), 12)
    };
    assert!(store.set_shape(dot, red_dot));
    assert_eq!(store.rebuild_dirty(), 1);

    let mesh = store.mesh(dot).unwrap();
    assert!(mesh.vertices.iter().all(|v| v.color == red));
    assert_eq!(store.tessellator().pools().outstanding_leases(), 0);
}

#[test]
fn invalid_edit_keeps_the_last_mesh() {
    init_logger();
    let mut store = GraphicStore::new();
    let id = store.insert(Ellipse::new(bounds(0.0, 0.0, 8.0, 8.0), 6));
    assert_eq!(store.mesh(id).unwrap().triangle_count(), 6);

    if let Some(Shape::Ellipse(ellipse)) = store.get_mut(id).map(|g| g.shape_mut()) {
        ellipse.hull_sections = 2;
    }
    assert_eq!(store.mesh(id).unwrap().triangle_count(), 6);
    assert!(store.get(id).unwrap().last_error().is_some());
}
