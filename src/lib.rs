//! Bindings to the PROJ.4 (`proj_api.h`) cartographic projection library.
//!
//! [`ffi::proj4_sys`] mirrors the C header; the remaining modules wrap it in
//! owned handle types and slice-checked batch operations.

pub mod config;
pub mod coords;
pub mod error;
pub mod ffi;
pub mod parallel;

pub use coords::{AngularUnit, PointBuffer};
pub use error::{Proj4Error, Result};
pub use ffi::context::{Context, LogLevel};
pub use ffi::proj4::{Projection, Spheroid};
