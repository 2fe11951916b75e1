use proj4_shim::coords::{self, AngularUnit, PointBuffer, transform_point};
use proj4_shim::ffi::context::Context;
use proj4_shim::ffi::proj4::{Projection, Spheroid};
use proj4_shim::ffi::proj4_sys::DEG_TO_RAD;

const LONGLAT: &str = "+proj=longlat +ellps=WGS84";
const MERC: &str = "+proj=merc +ellps=WGS84";

fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

// ============================================================
// 1. pj_transform
// ============================================================

#[test]
fn test_transform_origin_to_mercator() {
    let src = Projection::new(LONGLAT).unwrap();
    let dst = Projection::new(MERC).unwrap();
    let mut x = [0.0];
    let mut y = [0.0];
    let mut buf = PointBuffer::new(&mut x, &mut y, None).unwrap();
    coords::transform(&src, &dst, &mut buf).unwrap();
    assert!(close(x[0], 0.0, 1e-6));
    assert!(close(y[0], 0.0, 1e-6));
}

#[test]
fn test_transform_round_trip_many_points() {
    let src = Projection::new(LONGLAT).unwrap();
    let dst = Projection::new("+proj=utm +zone=31 +ellps=WGS84").unwrap();

    let lons: Vec<f64> = [0.5, 1.0, 3.0, 4.5, 5.9].iter().map(|d| d * DEG_TO_RAD).collect();
    let lats: Vec<f64> = [10.0, 35.0, 48.8, 60.0, 70.0].iter().map(|d| d * DEG_TO_RAD).collect();
    let mut x = lons.clone();
    let mut y = lats.clone();
    let mut z = vec![0.0; lons.len()];

    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::transform(&src, &dst, &mut buf).unwrap();
    assert!(x.iter().all(|e| (100_000.0..900_000.0).contains(e)));

    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::transform(&dst, &src, &mut buf).unwrap();
    for i in 0..lons.len() {
        assert!(close(x[i], lons[i], 1e-9), "lon {i}: {} vs {}", x[i], lons[i]);
        assert!(close(y[i], lats[i], 1e-9), "lat {i}: {} vs {}", y[i], lats[i]);
    }
}

#[test]
fn test_transform_strided_leaves_gaps_untouched() {
    let src = Projection::new(LONGLAT).unwrap();
    let dst = Projection::new(MERC).unwrap();

    // Two points interleaved with sentinel values at odd indices.
    let mut x = [10.0 * DEG_TO_RAD, -1.0, 20.0 * DEG_TO_RAD];
    let mut y = [0.0, -1.0, 0.0];
    let mut buf = PointBuffer::strided(&mut x, &mut y, None, 2, 2).unwrap();
    coords::transform(&src, &dst, &mut buf).unwrap();

    assert_eq!(x[1], -1.0);
    assert_eq!(y[1], -1.0);
    assert!(close(x[2], 2.0 * x[0], 1e-6));
}

#[test]
fn test_transform_empty_buffer_is_noop() {
    let src = Projection::new(LONGLAT).unwrap();
    let dst = Projection::new(MERC).unwrap();
    let mut x: [f64; 0] = [];
    let mut y: [f64; 0] = [];
    let mut buf = PointBuffer::new(&mut x, &mut y, None).unwrap();
    assert!(coords::transform(&src, &dst, &mut buf).is_ok());
}

// ============================================================
// 2. Datum transform
// ============================================================

#[test]
fn test_datum_transform_same_datum_is_identity() {
    let src = Projection::new("+proj=longlat +datum=WGS84").unwrap();
    let dst = Projection::new("+proj=longlat +datum=WGS84").unwrap();
    let mut x = [2.0 * DEG_TO_RAD];
    let mut y = [48.0 * DEG_TO_RAD];
    let mut z = [100.0];
    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::datum_transform(&src, &dst, &mut buf).unwrap();
    assert!(close(x[0], 2.0 * DEG_TO_RAD, 1e-12));
    assert!(close(y[0], 48.0 * DEG_TO_RAD, 1e-12));
    assert!(close(z[0], 100.0, 1e-6));
}

#[test]
fn test_datum_transform_applies_towgs84_shift() {
    let src = Projection::new("+proj=longlat +ellps=WGS84 +towgs84=100,0,0").unwrap();
    let dst = Projection::new("+proj=longlat +datum=WGS84").unwrap();
    assert!(!src.same_datum(&dst));

    // At 90E a shift along geocentric X moves the point east-west.
    let lon = 90.0 * DEG_TO_RAD;
    let lat = 0.0;
    let mut x = [lon];
    let mut y = [lat];
    let mut z = [0.0];
    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::datum_transform(&src, &dst, &mut buf).unwrap();

    let moved = Spheroid::WGS84.a * (x[0] - lon).abs();
    assert!(close(moved, 100.0, 1.0), "moved {moved} m");
    assert!(close(y[0], lat, 1e-9));
}

// ============================================================
// 3. Geocentric conversions
// ============================================================

#[test]
fn test_geodetic_to_geocentric_equator_and_pole() {
    let mut x = [0.0, 0.0];
    let mut y = [0.0, 90.0 * DEG_TO_RAD];
    let mut z = [0.0, 0.0];
    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::geodetic_to_geocentric(Spheroid::WGS84, &mut buf).unwrap();

    let b = Spheroid::WGS84.a * (1.0 - Spheroid::WGS84.es).sqrt();
    assert!(close(x[0], Spheroid::WGS84.a, 1e-6));
    assert!(close(y[0], 0.0, 1e-6));
    assert!(close(z[0], 0.0, 1e-6));
    assert!(close(z[1], b, 1e-3), "polar z {} vs {}", z[1], b);
}

#[test]
fn test_geocentric_round_trip() {
    let lon = 2.478917 * DEG_TO_RAD;
    let lat = 48.805639 * DEG_TO_RAD;
    let mut x = [lon];
    let mut y = [lat];
    let mut z = [35.0];

    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::geodetic_to_geocentric(Spheroid::WGS84, &mut buf).unwrap();
    assert!(x[0] > 4_000_000.0);

    let mut buf = PointBuffer::new(&mut x, &mut y, Some(&mut z)).unwrap();
    coords::geocentric_to_geodetic(Spheroid::WGS84, &mut buf).unwrap();
    assert!(close(x[0], lon, 1e-10));
    assert!(close(y[0], lat, 1e-10));
    assert!(close(z[0], 35.0, 1e-3));
}

#[test]
fn test_geocentric_conversions_require_z() {
    let mut x = [0.0];
    let mut y = [0.0];

    let mut buf = PointBuffer::new(&mut x, &mut y, None).unwrap();
    let err = coords::geodetic_to_geocentric(Spheroid::WGS84, &mut buf)
        .err()
        .expect("missing z should be rejected");
    assert!(err.to_string().contains("z array"), "got: {err}");

    let mut buf = PointBuffer::new(&mut x, &mut y, None).unwrap();
    assert!(coords::geocentric_to_geodetic(Spheroid::WGS84, &mut buf).is_err());

    let mut empty_x: [f64; 0] = [];
    let mut empty_y: [f64; 0] = [];
    let mut buf = PointBuffer::new(&mut empty_x, &mut empty_y, None).unwrap();
    assert!(coords::geodetic_to_geocentric(Spheroid::WGS84, &mut buf).is_err());

    assert_eq!((x[0], y[0]), (0.0, 0.0));
}

// ============================================================
// 4. Grid shift
// ============================================================

#[test]
fn test_apply_gridshift_missing_grid_fails() {
    let ctx = Context::new().unwrap();
    let mut x = [0.0];
    let mut y = [0.0];
    let mut buf = PointBuffer::new(&mut x, &mut y, None).unwrap();
    let result = coords::apply_gridshift(&ctx, "no_such_grid_file.gsb", false, &mut buf);
    let err = result.err().expect("missing grid should fail");
    assert!(err.code().is_some_and(|c| c != 0), "got: {err}");
}

// ============================================================
// 5. Single-point convenience
// ============================================================

#[test]
fn test_transform_point_degrees() {
    let geo = Projection::new(LONGLAT).unwrap();
    let utm = Projection::new("+proj=utm +zone=31 +ellps=WGS84").unwrap();

    let (e, n, _) = transform_point(&geo, &utm, 3.0, 0.0, None, AngularUnit::Degrees).unwrap();
    assert!(close(e, 500_000.0, 1e-3));
    assert!(close(n, 0.0, 1e-3));

    let (lon, lat, _) = transform_point(&utm, &geo, e, n, None, AngularUnit::Degrees).unwrap();
    assert!(close(lon, 3.0, 1e-9));
    assert!(close(lat, 0.0, 1e-9));
}

#[test]
fn test_transform_point_radians_passes_through() {
    let geo = Projection::new(LONGLAT).unwrap();
    let merc = Projection::new(MERC).unwrap();
    let (x, _, _) =
        transform_point(&geo, &merc, 1.0 * DEG_TO_RAD, 0.0, None, AngularUnit::Radians).unwrap();
    let (x_deg, _, _) = transform_point(&geo, &merc, 1.0, 0.0, None, AngularUnit::Degrees).unwrap();
    assert!(close(x, x_deg, 1e-6));
}

#[test]
fn test_transform_point_failure_reports_errno_across_contexts() {
    let src_ctx = Context::new().unwrap();
    let dst_ctx = Context::new().unwrap();
    let geo = Projection::with_context(&src_ctx, LONGLAT).unwrap();
    let merc = Projection::with_context(&dst_ctx, MERC).unwrap();

    let err = transform_point(&geo, &merc, 0.0, 95.0, None, AngularUnit::Degrees)
        .err()
        .expect("latitude beyond the pole should fail");
    assert!(err.code().is_some_and(|c| c != 0), "got: {err}");
}
