// Coordinate buffers and batch operations over pj_transform and friends

use libc::{c_double, c_int, c_long};
use tracing::warn;

use crate::error::{Proj4Error, Result};
use crate::ffi::context::Context;
use crate::ffi::proj4::{Projection, Spheroid};
use crate::ffi::proj4_sys::{
    DEG_TO_RAD, RAD_TO_DEG, pj_apply_gridshift, pj_datum_transform, pj_geocentric_to_geodetic,
    pj_geodetic_to_geocentric, pj_transform,
};

/// Unit of angular input/output for [`transform_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngularUnit {
    Degrees,
    Radians,
}

/// Validated view over the parallel `x`, `y`, `z` arrays PROJ mutates in place.
///
/// Point `i` lives at index `i * stride` of every array. Each array holds at
/// least `(count - 1) * stride + 1` values.
pub struct PointBuffer<'a> {
    x: &'a mut [f64],
    y: &'a mut [f64],
    z: Option<&'a mut [f64]>,
    count: usize,
    stride: usize,
}

impl<'a> PointBuffer<'a> {
    /// Contiguous points: one value per point in each array.
    ///
    /// # Returns
    /// `Err` if the arrays have different lengths.
    pub fn new(x: &'a mut [f64], y: &'a mut [f64], z: Option<&'a mut [f64]>) -> Result<Self> {
        let count = x.len();
        if y.len() != count || z.as_ref().is_some_and(|z| z.len() != count) {
            return Err(Proj4Error::invalid_argument(format!(
                "coordinate arrays differ in length (x={}, y={}, z={:?})",
                x.len(),
                y.len(),
                z.as_ref().map(|z| z.len())
            )));
        }
        Self::strided(x, y, z, count, 1)
    }

    /// Interleaved points, `stride` values apart. A stride of 0 means 1, as
    /// in PROJ.
    pub fn strided(
        x: &'a mut [f64],
        y: &'a mut [f64],
        z: Option<&'a mut [f64]>,
        count: usize,
        stride: usize,
    ) -> Result<Self> {
        let stride = stride.max(1);
        if c_long::try_from(count).is_err() || c_int::try_from(stride).is_err() {
            return Err(Proj4Error::invalid_argument(format!(
                "point count {count} or stride {stride} out of range"
            )));
        }
        let needed = required_len(count, stride).ok_or_else(|| {
            Proj4Error::invalid_argument(format!(
                "overflow computing extent of {count} points with stride {stride}"
            ))
        })?;

        let short = [("x", x.len()), ("y", y.len())]
            .into_iter()
            .chain(z.as_ref().map(|z| ("z", z.len())))
            .find(|&(_, len)| len < needed);
        if let Some((axis, len)) = short {
            return Err(Proj4Error::invalid_argument(format!(
                "{axis} array holds {len} values, {count} points with stride {stride} need {needed}"
            )));
        }

        Ok(PointBuffer {
            x,
            y,
            z,
            count,
            stride,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Coordinates of point `i`; `z` is 0 when the buffer has no z array.
    pub fn point(&self, i: usize) -> Option<(f64, f64, f64)> {
        if i >= self.count {
            return None;
        }
        let at = i * self.stride;
        let z = self.z.as_ref().map_or(0.0, |z| z[at]);
        Some((self.x[at], self.y[at], z))
    }

    /// Arguments in the `(point_count, point_offset, x, y, z)` order every
    /// batch entry point takes. `z` is null when absent.
    fn raw_parts(&mut self) -> (c_long, c_int, *mut c_double, *mut c_double, *mut c_double) {
        let z = self
            .z
            .as_deref_mut()
            .map_or(std::ptr::null_mut(), |z| z.as_mut_ptr());
        // Both casts were range-checked in `strided`.
        (
            self.count as c_long,
            self.stride as c_int,
            self.x.as_mut_ptr(),
            self.y.as_mut_ptr(),
            z,
        )
    }
}

fn required_len(count: usize, stride: usize) -> Option<usize> {
    match count {
        0 => Some(0),
        n => (n - 1).checked_mul(stride)?.checked_add(1),
    }
}

// The geocentric entry points dereference z without a null check.
fn require_z(points: &PointBuffer<'_>) -> Result<()> {
    if points.has_z() {
        Ok(())
    } else {
        Err(Proj4Error::invalid_argument(
            "geocentric conversion needs a z array",
        ))
    }
}

fn check_status(op: &str, status: c_int) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        warn!(op, status, "batch operation failed");
        Err(Proj4Error::transform(status))
    }
}

/// Reproject every point from `src` to `dst` in place (`pj_transform`).
///
/// Geographic coordinates are in radians on both sides. Points that fail
/// individually are set to `f64::INFINITY` by the library without failing
/// the whole call.
pub fn transform(
    src: &Projection<'_>,
    dst: &Projection<'_>,
    points: &mut PointBuffer<'_>,
) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let (count, offset, x, y, z) = points.raw_parts();
    let status = unsafe { pj_transform(src.as_ptr(), dst.as_ptr(), count, offset, x, y, z) };
    check_status("pj_transform", status)
}

/// Only the datum shift stage of [`transform`] (`pj_datum_transform`).
/// Input and output are geographic radians.
pub fn datum_transform(
    src: &Projection<'_>,
    dst: &Projection<'_>,
    points: &mut PointBuffer<'_>,
) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let (count, offset, x, y, z) = points.raw_parts();
    let status = unsafe { pj_datum_transform(src.as_ptr(), dst.as_ptr(), count, offset, x, y, z) };
    check_status("pj_datum_transform", status)
}

/// Longitude/latitude (radians) and height to earth-centred X/Y/Z metres.
/// The buffer must carry a z array.
pub fn geodetic_to_geocentric(spheroid: Spheroid, points: &mut PointBuffer<'_>) -> Result<()> {
    require_z(points)?;
    if points.is_empty() {
        return Ok(());
    }
    let (count, offset, x, y, z) = points.raw_parts();
    let status =
        unsafe { pj_geodetic_to_geocentric(spheroid.a, spheroid.es, count, offset, x, y, z) };
    check_status("pj_geodetic_to_geocentric", status)
}

/// Earth-centred X/Y/Z metres back to longitude/latitude (radians) and height.
/// The buffer must carry a z array.
pub fn geocentric_to_geodetic(spheroid: Spheroid, points: &mut PointBuffer<'_>) -> Result<()> {
    require_z(points)?;
    if points.is_empty() {
        return Ok(());
    }
    let (count, offset, x, y, z) = points.raw_parts();
    let status =
        unsafe { pj_geocentric_to_geodetic(spheroid.a, spheroid.es, count, offset, x, y, z) };
    check_status("pj_geocentric_to_geodetic", status)
}

/// Apply a comma separated `nadgrids` list to geographic radians. Grid files
/// are resolved through the search path and finder.
pub fn apply_gridshift(
    ctx: &Context,
    grids: &str,
    inverse: bool,
    points: &mut PointBuffer<'_>,
) -> Result<()> {
    let c_grids = std::ffi::CString::new(grids)?;
    if points.is_empty() {
        return Ok(());
    }
    let (count, offset, x, y, z) = points.raw_parts();
    let status = unsafe {
        pj_apply_gridshift(
            ctx.as_ptr(),
            c_grids.as_ptr(),
            c_int::from(inverse),
            count,
            offset,
            x,
            y,
            z,
        )
    };
    check_status("pj_apply_gridshift", status)
}

/// Transform a single point. With [`AngularUnit::Degrees`], geographic input
/// is converted to radians when `src` is lat/long, and geographic output back
/// to degrees when `dst` is lat/long. A missing `z` is treated as 0.
pub fn transform_point(
    src: &Projection<'_>,
    dst: &Projection<'_>,
    x: f64,
    y: f64,
    z: Option<f64>,
    unit: AngularUnit,
) -> Result<(f64, f64, f64)> {
    let degrees = unit == AngularUnit::Degrees;
    let scale_in = if degrees && src.is_latlong() { DEG_TO_RAD } else { 1.0 };
    let scale_out = if degrees && dst.is_latlong() { RAD_TO_DEG } else { 1.0 };

    let mut xs = [x * scale_in];
    let mut ys = [y * scale_in];
    let mut zs = [z.unwrap_or(0.0)];
    let mut points = PointBuffer::new(&mut xs, &mut ys, Some(&mut zs))?;
    transform(src, dst, &mut points)?;

    if xs[0].is_infinite() || ys[0].is_infinite() {
        // The forward step records its error on dst's context.
        let code = [dst.errno(), src.errno(), dst.error_code(), src.error_code()]
            .into_iter()
            .find(|&c| c != 0)
            .unwrap_or(0);
        return Err(Proj4Error::transform(code));
    }
    Ok((xs[0] * scale_out, ys[0] * scale_out, zs[0]))
}

/// Parse an `x y [z]` line. Fields may be separated by whitespace or commas.
pub fn parse_point(line: &str) -> Result<(f64, f64, Option<f64>)> {
    let fields: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(Proj4Error::invalid_argument(format!(
            "expected `x y [z]`, got {line:?}"
        )));
    }
    let parse = |f: &str| {
        f.parse::<f64>()
            .map_err(|e| Proj4Error::invalid_argument(format!("bad coordinate {f:?}: {e}")))
    };
    let x = parse(fields[0])?;
    let y = parse(fields[1])?;
    let z = fields.get(2).map(|f| parse(f)).transpose()?;
    Ok((x, y, z))
}
