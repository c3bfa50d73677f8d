use super::*;

fn assert_near(a: Point, b: Point) {
    assert!((a - b).hypot() < 1e-9, "{a:?} != {b:?}");
}

#[test]
fn fewer_than_two_points_is_no_path() {
    assert!(TweenPath::new(&[]).is_none());
    assert!(TweenPath::new(&[PathPoint::straight((1.0, 1.0))]).is_none());
}

#[test]
fn straight_line_is_linear() {
    let path =
        TweenPath::new(&[PathPoint::straight((0.0, 0.0)), PathPoint::straight((20.0, 10.0))])
            .unwrap();
    assert_eq!(path.segment_count(), 1);
    assert_near(path.point_at(0.5), Point::new(10.0, 5.0));
    assert_near(path.point_at(0.25), Point::new(5.0, 2.5));
}

#[test]
fn endpoints_are_exact_for_every_curve_kind() {
    let paths = [
        vec![
            PathPoint::straight((1.0, 2.0)),
            PathPoint::straight((3.0, 4.0)),
            PathPoint::straight((-7.0, 0.5)),
        ],
        vec![PathPoint::bezier((0.0, 0.0), (5.0, 9.0)), PathPoint::straight((10.0, 0.0))],
        vec![
            PathPoint::cubic((0.0, 0.0), (0.0, 5.0), (10.0, 5.0)),
            PathPoint::straight((10.0, 0.0)),
        ],
        vec![
            PathPoint::spline((0.1, 0.2)),
            PathPoint::spline((3.3, 7.7)),
            PathPoint::spline((9.9, -1.1)),
        ],
    ];
    for points in paths {
        let path = TweenPath::new(&points).unwrap();
        assert_eq!(path.point_at(0.0), points[0].pos);
        assert_eq!(path.point_at(1.0), points[points.len() - 1].pos);
        assert_eq!(path.point_at(-4.0), points[0].pos);
        assert_eq!(path.point_at(4.0), points[points.len() - 1].pos);
    }
}

#[test]
fn quadratic_midpoint_bends_towards_control() {
    let path =
        TweenPath::new(&[PathPoint::bezier((0.0, 0.0), (5.0, 10.0)), PathPoint::straight((10.0, 0.0))])
            .unwrap();
    assert_near(path.point_at(0.5), Point::new(5.0, 5.0));
}

#[test]
fn cubic_midpoint_matches_bezier() {
    let path = TweenPath::new(&[
        PathPoint::cubic((0.0, 0.0), (0.0, 8.0), (10.0, 8.0)),
        PathPoint::straight((10.0, 0.0)),
    ])
    .unwrap();
    assert_near(path.point_at(0.5), Point::new(5.0, 6.0));
}

#[test]
fn spline_passes_through_interior_points() {
    let path = TweenPath::new(&[
        PathPoint::spline((0.0, 0.0)),
        PathPoint::spline((10.0, 0.0)),
        PathPoint::spline((20.0, 0.0)),
    ])
    .unwrap();
    assert_eq!(path.segment_count(), 1);
    assert_eq!(path.length(), 20.0);
    assert_near(path.point_at(0.5), Point::new(10.0, 0.0));
    let quarter = path.point_at(0.25);
    assert!(quarter.x > 0.0 && quarter.x < 10.0);
    assert!(quarter.y.abs() < 1e-9);
}

#[test]
fn weights_distribute_progress_across_segments() {
    let path = TweenPath::new(&[
        PathPoint::straight((0.0, 0.0)),
        PathPoint::straight((30.0, 0.0)),
        PathPoint::straight((30.0, 10.0)),
    ])
    .unwrap();
    assert_eq!(path.segment_count(), 2);
    assert_eq!(path.length(), 40.0);
    assert_near(path.point_at(0.5), Point::new(20.0, 0.0));
    assert_near(path.point_at(0.875), Point::new(30.0, 5.0));
}

#[test]
fn mixed_spline_and_straight_runs() {
    let path = TweenPath::new(&[
        PathPoint::spline((0.0, 0.0)),
        PathPoint::spline((5.0, 5.0)),
        PathPoint::straight((10.0, 0.0)),
        PathPoint::straight((20.0, 0.0)),
    ])
    .unwrap();
    assert_eq!(path.segment_count(), 2);
    assert_eq!(path.point_at(1.0), Point::new(20.0, 0.0));
}

#[test]
fn zero_length_path_returns_final_point() {
    let path =
        TweenPath::new(&[PathPoint::straight((3.0, 3.0)), PathPoint::straight((3.0, 3.0))]).unwrap();
    assert_eq!(path.point_at(0.4), Point::new(3.0, 3.0));
}

#[test]
fn curve_tags() {
    for tag in 0..4 {
        assert_eq!(CurveType::from_tag(tag).tag(), tag);
    }
    assert_eq!(CurveType::from_tag(99), CurveType::Straight);
}
