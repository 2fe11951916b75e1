// Chunked reprojection across rayon workers, one PROJ context per chunk

use rayon::prelude::*;
use tracing::debug;

use crate::config::settings::Settings;
use crate::coords::{self, PointBuffer};
use crate::error::{Proj4Error, Result};
use crate::ffi::context::{Context, LogLevel};
use crate::ffi::proj4::Projection;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Reprojects large coordinate arrays in parallel.
///
/// PROJ.4 handles are not safe to share between threads, so each chunk gets
/// a fresh [`Context`] and its own pair of projections built from the
/// stored definitions.
#[derive(Debug, Clone)]
pub struct ParallelTransformer {
    src_def: String,
    dst_def: String,
    chunk_size: usize,
    log_level: LogLevel,
    forward_logs: bool,
}

impl ParallelTransformer {
    /// Both definitions are initialised once up front so bad input fails here
    /// rather than inside a worker.
    pub fn new(src_def: &str, dst_def: &str) -> Result<Self> {
        let ctx = Context::new()?;
        Projection::with_context(&ctx, src_def)?;
        Projection::with_context(&ctx, dst_def)?;
        Ok(ParallelTransformer {
            src_def: src_def.to_owned(),
            dst_def: dst_def.to_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_level: LogLevel::default(),
            forward_logs: true,
        })
    }

    /// Take chunk size and per-context logging from `settings`.
    pub fn from_settings(settings: &Settings, src_def: &str, dst_def: &str) -> Result<Self> {
        let mut transformer = Self::new(src_def, dst_def)?.with_chunk_size(settings.chunk_size)?;
        transformer.log_level = settings.log_level;
        transformer.forward_logs = settings.forward_logs_to_tracing;
        Ok(transformer)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Proj4Error::invalid_argument("chunk size must be positive"));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Transform contiguous points in place. Same units and failure rules
    /// as [`coords::transform`]. If any chunk fails, one failing chunk's
    /// error is returned and the remaining chunks may be left untransformed.
    pub fn transform(&self, x: &mut [f64], y: &mut [f64], z: Option<&mut [f64]>) -> Result<()> {
        let z_len = z.as_deref().map_or(x.len(), <[f64]>::len);
        if y.len() != x.len() || z_len != x.len() {
            return Err(Proj4Error::invalid_argument(format!(
                "coordinate arrays differ in length (x={}, y={}, z={})",
                x.len(),
                y.len(),
                z_len
            )));
        }

        let n = self.chunk_size;
        debug!(points = x.len(), chunk_size = n, "parallel transform");
        match z {
            Some(z) => x
                .par_chunks_mut(n)
                .zip(y.par_chunks_mut(n))
                .zip(z.par_chunks_mut(n))
                .try_for_each(|((x, y), z)| self.transform_chunk(x, y, Some(z))),
            None => x
                .par_chunks_mut(n)
                .zip(y.par_chunks_mut(n))
                .try_for_each(|(x, y)| self.transform_chunk(x, y, None)),
        }
    }

    fn transform_chunk(&self, x: &mut [f64], y: &mut [f64], z: Option<&mut [f64]>) -> Result<()> {
        let ctx = Context::new()?;
        ctx.set_debug(self.log_level);
        if self.forward_logs {
            ctx.use_tracing_logger();
        }
        let src = Projection::with_context(&ctx, &self.src_def)?;
        let dst = Projection::with_context(&ctx, &self.dst_def)?;
        let mut points = PointBuffer::new(x, y, z)?;
        coords::transform(&src, &dst, &mut points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONGLAT: &str = "+proj=longlat +ellps=WGS84";
    const MERC: &str = "+proj=merc +ellps=WGS84";

    #[test]
    fn test_rejects_bad_definition_up_front() {
        assert!(ParallelTransformer::new(LONGLAT, "+proj=nonsense").is_err());
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let t = ParallelTransformer::new(LONGLAT, MERC).unwrap();
        assert!(t.with_chunk_size(0).is_err());
    }

    #[test]
    fn test_rejects_mismatched_z() {
        let t = ParallelTransformer::new(LONGLAT, MERC).unwrap();
        let mut x = vec![0.0; 4];
        let mut y = vec![0.0; 4];
        let mut z = vec![0.0; 3];
        assert!(t.transform(&mut x, &mut y, Some(&mut z)).is_err());
    }

    #[test]
    fn test_failing_chunk_error_is_returned() {
        // Chunks of one point make PROJ fail the call instead of marking
        // the point with HUGE_VAL.
        let t = ParallelTransformer::new(LONGLAT, MERC)
            .unwrap()
            .with_chunk_size(1)
            .unwrap();
        let mut x = vec![0.0, 0.1, 0.2, 0.3];
        let mut y = vec![0.0, 0.1, 95f64.to_radians(), 0.3];

        let err = t
            .transform(&mut x, &mut y, None)
            .err()
            .expect("latitude beyond the pole should fail");
        assert!(matches!(err, Proj4Error::Transform { .. }), "got: {err}");
        assert!(err.code().is_some_and(|c| c != 0), "got: {err}");
    }

    #[test]
    fn test_matches_sequential_transform() {
        let t = ParallelTransformer::new(LONGLAT, MERC)
            .unwrap()
            .with_chunk_size(7)
            .unwrap();

        let lons: Vec<f64> = (0..50).map(|i| (i as f64 - 25.0).to_radians()).collect();
        let lats: Vec<f64> = (0..50).map(|i| (i as f64 - 25.0).to_radians() * 0.5).collect();

        let mut px = lons.clone();
        let mut py = lats.clone();
        t.transform(&mut px, &mut py, None).unwrap();

        let src = Projection::new(LONGLAT).unwrap();
        let dst = Projection::new(MERC).unwrap();
        let mut sx = lons.clone();
        let mut sy = lats.clone();
        let mut buf = PointBuffer::new(&mut sx, &mut sy, None).unwrap();
        coords::transform(&src, &dst, &mut buf).unwrap();

        for i in 0..lons.len() {
            assert!((px[i] - sx[i]).abs() < 1e-6, "x mismatch at {i}");
            assert!((py[i] - sy[i]).abs() < 1e-6, "y mismatch at {i}");
        }
    }
}
