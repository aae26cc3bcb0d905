use shapevg_tessellation::color::PackedSrgb;
use shapevg_tessellation::curve::CubicBezier;
use shapevg_tessellation::dash::DashPattern;
use shapevg_tessellation::gradient::Gradient;
use shapevg_tessellation::math::{bounds, point, Box2D};
use shapevg_tessellation::mesh::{MeshSink, ShapeMesh};
use shapevg_tessellation::pool::BufferPool;
use shapevg_tessellation::shape::*;
use shapevg_tessellation::{
    tessellate, BufferPools, EdgeSpec, EdgeThickness, Fill, RingMode, RingStyle,
    TessellationError, Tessellator,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn styles() -> Vec<RingStyle> {
    let gradient = Fill::Gradient(
        Gradient::radial()
            .add_stop(0.0, PackedSrgb::WHITE)
            .add_stop(1.0, PackedSrgb::BLACK),
    );
    vec![
        RingStyle::default(),
        RingStyle {
            anti_aliasing: 1.0,
            fill: gradient,
            ..Default::default()
        },
        RingStyle {
            mode: RingMode::Edge,
            edge: EdgeSpec {
                thickness: EdgeThickness::Absolute(3.0),
                inner_aa: 1.0,
                ..Default::default()
            },
            ..Default::default()
        },
        RingStyle {
            mode: RingMode::EdgeAndFill,
            anti_aliasing: 0.5,
            edge: EdgeSpec {
                thickness: EdgeThickness::Relative(0.2),
                ..Default::default()
            },
            dash: Some(DashPattern::new(2, 1, 1)),
            ..Default::default()
        },
    ]
}

fn ring_shapes(style: RingStyle) -> Vec<Shape> {
    let rect = bounds(10.0, 20.0, 110.0, 80.0);
    let mut shapes = Vec::new();

    {
        shapes.push(
            Ellipse {
                style,
                ..Ellipse::new(rect, 24)
            }
            .into(),
        );
        shapes.push(
            Ellipse {
                style,
                keep_circle: true,
                start_angle: 30.0,
                ..Ellipse::new(rect, 7)
            }
            .into(),
        );
        shapes.push(
            RoundedRect {
                style,
                ..RoundedRect::new(rect, CornerRadii::uniform(0.3, 5))
            }
            .into(),
        );
        shapes.push(
            RoundedRect {
                style,
                ..RoundedRect::new(rect, CornerRadii::default())
            }
            .into(),
        );
        shapes.push(
            Sunburst {
                style,
                ..Sunburst::new(rect, 7, 0.5, 1.3)
            }
            .into(),
        );
        shapes.push(
            SmoothSunburst {
                bounds: bounds(0.0, 0.0, 200.0, 200.0),
                peaks: 5,
                inner_factor: 0.4,
                outer_factor: 1.1,
                inner_shift: 0.3,
                smoothness: 6,
                style,
                ..Default::default()
            }
            .into(),
        );
        shapes.push(
            Triangle {
                style,
                ..Triangle::new(rect)
            }
            .into(),
        );
        shapes.push(
            Triangle {
                rounding: Some(TriangleRounding::default()),
                style,
                ..Triangle::new(rect)
            }
            .into(),
        );
        shapes.push(
            CurvedRect {
                style,
                ..CurvedRect::new(
                    rect,
                    KeyframeCurve::new([
                        CurveKey::new(0.0, 0.8),
                        CurveKey::new(0.6, 0.1),
                        CurveKey::new(1.0, 0.0),
                    ]),
                    8,
                )
            }
            .into(),
        );
    }
    shapes
}

fn other_shapes() -> Vec<Shape> {
    let rect = bounds(10.0, 20.0, 110.0, 80.0);
    let mut shapes = Vec::new();

    for (keep_circle, aa) in [(false, 0.0), (true, 1.0), (true, 0.0)] {
        shapes.push(
            InversedEllipse {
                keep_circle,
                anti_aliasing: aa,
                ..InversedEllipse::new(rect, 6)
            }
            .into(),
        );
    }

    for (aa, fill) in [
        (0.0, Fill::default()),
        (
            1.5,
            Fill::Gradient(
                Gradient::radial()
                    .add_stop(0.0, PackedSrgb::WHITE)
                    .add_stop(1.0, PackedSrgb::TRANSPARENT),
            ),
        ),
    ] {
        shapes.push(
            CurvedInsideRect {
                anti_aliasing: aa,
                fill,
                ..CurvedInsideRect::new(
                    rect,
                    KeyframeCurve::new([
                        CurveKey::new(0.0, 0.8),
                        CurveKey::new(0.6, 0.1),
                        CurveKey::new(1.0, 0.4),
                    ]),
                    8,
                )
            }
            .into(),
        );
    }

    for (rounded, aa, kind) in [
        (false, 0.0, EndingKind::None),
        (true, 1.0, EndingKind::Arrow),
        (false, 1.0, EndingKind::FilledArrow),
        (true, 0.0, EndingKind::FilledArrow),
    ] {
        shapes.push(
            Polyline {
                knots: [
                    Knot::new(point(0.0, 0.0)),
                    Knot::with_tangents(point(60.0, 40.0), Some(point(40.0, 60.0)), Some(point(80.0, 20.0))),
                    Knot::new(point(120.0, 0.0)),
                ]
                .into_iter()
                .collect(),
                spline: rounded,
                thickness: 4.0,
                anti_aliasing: aa,
                segments: 12,
                rounded,
                dash: Some(DashPattern::new(3, 2, 0)),
                start: Ending::new(kind, 40.0, 12.0),
                end: Ending::new(kind, 30.0, 8.0),
                bounds: bounds(0.0, 0.0, 120.0, 40.0),
                ..Default::default()
            }
            .into(),
        );
    }

    shapes
}

fn all_shapes() -> Vec<Shape> {
    let mut shapes: Vec<Shape> = styles().into_iter().flat_map(ring_shapes).collect();
    shapes.extend(other_shapes());
    shapes
}

fn signed_area(mesh: &ShapeMesh, [a, b, c]: [u32; 3]) -> f32 {
    let p = |i: u32| mesh.vertices[i as usize].position();
    (p(b) - p(a)).cross(p(c) - p(a)) * 0.5
}

#[test]
fn every_shape_matches_its_budget() {
    init_logger();
    let mut tessellator = Tessellator::new();

    for shape in all_shapes() {
        let mesh = tessellator.tessellate(&shape).unwrap();
        let budget = shape.budget();
        assert_eq!(budget.vertices, mesh.vertices.len(), "{}: {shape:?}", shape.name());
        assert_eq!(budget.triangles, mesh.triangle_count(), "{}: {shape:?}", shape.name());
        assert!(!mesh.is_empty(), "{}", shape.name());
    }
    assert_eq!(tessellator.pools().outstanding_leases(), 0);
}

#[test]
fn indices_stay_in_range() {
    let mut tessellator = Tessellator::new();
    for shape in all_shapes() {
        let mesh = tessellator.tessellate(&shape).unwrap();
        let count = mesh.current_vertex_count();
        assert!(mesh.indices.iter().all(|&i| i < count), "{}", shape.name());
        assert_eq!(mesh.indices.len() % 3, 0);
    }
}

/// Shapes whose inward edge band is wider than the curvature radius of some
/// of their corners. The band folds over there by construction.
fn band_folds(shape: &Shape) -> Option<&'static str> {
    match shape {
        // The tip join of the default rounding has a radius under one unit.
        Shape::Triangle(t) if t.rounding.is_some() => Some("rounded tip tighter than the band"),
        // The valleys of this burst bend faster than a 20 unit relative band.
        Shape::SmoothSunburst(_) => Some("valley curvature tighter than the band"),
        _ => None,
    }
}

#[test]
fn triangles_wind_counter_clockwise() {
    let mut tessellator = Tessellator::new();
    let mut checked = [0usize; 3];
    for style in styles() {
        for shape in ring_shapes(style) {
            if style.mode != RingMode::Fill {
                if let Some(reason) = band_folds(&shape) {
                    log::debug!("skipping {} in {:?}: {reason}", shape.name(), style.mode);
                    continue;
                }
            }
            let mesh = tessellator.tessellate(&shape).unwrap();
            for tri in mesh.triangles() {
                let area = signed_area(&mesh, tri);
                assert!(
                    area >= -1e-3,
                    "{} ({:?}): {tri:?} has area {area}",
                    shape.name(),
                    style.mode
                );
            }
            checked[style.mode as usize] += 1;
        }
    }
    // Edge styles must not silently shrink to nothing.
    assert!(checked.iter().all(|&n| n >= 7), "{checked:?}");

    for shape in other_shapes() {
        let mesh = tessellator.tessellate(&shape).unwrap();
        for tri in mesh.triangles() {
            let area = signed_area(&mesh, tri);
            assert!(area >= -1e-3, "{}: {tri:?} has area {area}", shape.name());
        }
    }
}

#[test]
fn plain_ellipse_counts() {
    for n in [3, 10, 64] {
        let mesh = Tessellator::new()
            .tessellate(&Ellipse::new(bounds(0.0, 0.0, 50.0, 30.0), n).into())
            .unwrap();
        assert_eq!(mesh.vertices.len(), n as usize + 1);
        assert_eq!(mesh.triangle_count(), n as usize);
    }
}

#[test]
fn dashed_ellipse_caps_the_seam() {
    let ellipse = Ellipse {
        style: RingStyle {
            mode: RingMode::Edge,
            anti_aliasing: 1.0,
            dash: Some(DashPattern::new(2, 1, 0)),
            ..Default::default()
        },
        ..Ellipse::new(bounds(0.0, 0.0, 60.0, 60.0), 7)
    };
    let mesh = Tessellator::new().tessellate(&ellipse.into()).unwrap();
    // Dashes on segments 1-2, 4-5 and 7 alone, each with two caps.
    assert_eq!(mesh.vertices.len(), 4 * 7 + 6 * 2);
    assert_eq!(mesh.triangle_count(), 5 * 6 + 6 * 2);
    for tri in mesh.triangles() {
        assert!(signed_area(&mesh, tri) >= -1e-3, "{tri:?}");
    }
}

#[test]
fn square_rounded_rect_is_a_quad() {
    let mesh = Tessellator::new()
        .tessellate(&RoundedRect::new(bounds(0.0, 0.0, 40.0, 10.0), CornerRadii::default()).into())
        .unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn two_knot_line() {
    let line = Polyline {
        bounds: bounds(0.0, -5.0, 10.0, 5.0),
        ..Polyline::new(
            [Knot::new(point(0.0, 0.0)), Knot::new(point(10.0, 0.0))],
            2.0,
        )
    };
    assert_eq!(line.budget().ring_records, 2);

    let mesh = Tessellator::new().tessellate(&line.into()).unwrap();
    assert_eq!(mesh.triangle_count(), 2);
    for v in &mesh.vertices {
        assert_eq!(v.position[1].abs(), 1.0);
    }
}

#[test]
fn five_peak_sunburst() {
    let mesh = Tessellator::new()
        .tessellate(&Sunburst::new(bounds(0.0, 0.0, 100.0, 100.0), 5, 0.5, 1.0).into())
        .unwrap();
    assert_eq!(mesh.vertices.len(), 11);
    assert_eq!(mesh.triangle_count(), 10);
}

fn degenerate(rect: Box2D) -> Vec<Shape> {
    vec![
        Ellipse::new(rect, 12).into(),
        RoundedRect::new(rect, CornerRadii::uniform(0.2, 4)).into(),
        Sunburst::new(rect, 5, 0.5, 1.0).into(),
        SmoothSunburst {
            bounds: rect,
            ..Default::default()
        }
        .into(),
        Triangle::new(rect).into(),
        CurvedRect::new(rect, KeyframeCurve::default(), 4).into(),
        CurvedInsideRect::new(rect, KeyframeCurve::default(), 4).into(),
        InversedEllipse::new(rect, 4).into(),
        Polyline {
            bounds: rect,
            ..Default::default()
        }
        .into(),
    ]
}

#[test]
fn zero_area_bounds_are_degenerate() {
    let pools = BufferPools::new();
    for rect in [bounds(0.0, 0.0, 0.0, 10.0), bounds(0.0, 0.0, 10.0, 0.0)] {
        for shape in degenerate(rect) {
            let mut mesh = ShapeMesh::new();
            let result = tessellate(&shape, &pools, &mut mesh);
            assert!(
                matches!(result, Err(TessellationError::ShapeDegenerate(_))),
                "{}: {result:?}",
                shape.name()
            );
            assert!(mesh.vertices.is_empty());
        }
    }
    assert_eq!(pools.outstanding_leases(), 0);
}

#[test]
fn out_of_range_parameters_are_reported() {
    let shape: Shape = Sunburst::new(bounds(0.0, 0.0, 10.0, 10.0), 5, 1.5, 1.0).into();
    let err = Tessellator::new().tessellate(&shape).unwrap_err();
    assert_eq!(
        err,
        TessellationError::ParameterOutOfRange {
            name: "inner_factor",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        }
    );
}

#[test]
fn leases_return_on_early_exit() {
    init_logger();
    let pool = BufferPool::<u32>::new();

    fn fill(pool: &BufferPool<u32>, n: usize) -> Result<usize, TessellationError> {
        let mut lease = pool.acquire(4);
        for i in 0..n {
            lease.append(i as u32)?;
        }
        Ok(lease.len())
    }

    assert_eq!(fill(&pool, 3), Ok(3));
    assert_eq!(
        fill(&pool, 9),
        Err(TessellationError::BufferCapacityExceeded { capacity: 4 })
    );
    assert_eq!(pool.outstanding_leases(), 0);
    assert_eq!(pool.idle_buffers(), 1);
}

#[test]
fn dash_pattern_is_periodic() {
    for (dash, gap, offset) in [(1, 1, 0), (3, 2, 1), (2, 5, -4), (4, 1, 7)] {
        let pattern = DashPattern::new(dash, gap, offset);
        let period = pattern.period();
        for i in -20..40 {
            assert_eq!(pattern.is_drawn(i), pattern.is_drawn(i + period));
        }
        let drawn = (1..=period).filter(|&i| pattern.is_drawn(i)).count();
        assert_eq!(drawn, dash as usize);
    }
}

#[test]
fn bezier_hits_its_end_points() {
    let from = point(3.0, -7.0);
    let to = point(41.5, 12.25);
    let curve = CubicBezier::new(from, point(10.0, 30.0), point(-5.0, 2.0), to);
    assert!((curve.point(0.0) - from).length() < 1e-5);
    assert!((curve.point(1.0) - to).length() < 1e-5);
}
