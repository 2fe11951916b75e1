// Hand-written FFI bindings for the PROJ.4 4.8.0 `proj_api.h` surface.
// We avoid bindgen so the crate builds without libclang; the header is small
// and frozen, so every declaration below mirrors it by hand.

#![allow(non_camel_case_types)]

use libc::{c_char, c_double, c_int, c_long, c_void, size_t};

/// A coordinate pair as PROJ.4 passes it by value: `typedef struct { double u, v; } projUV;`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct projUV {
    pub u: c_double,
    pub v: c_double,
}

/// Projected coordinates (`u` = easting, `v` = northing).
pub type projXY = projUV;
/// Geographic coordinates in radians (`u` = longitude, `v` = latitude).
pub type projLP = projUV;

/// Opaque representation of PROJ.4's `PJconsts` projection definition.
/// We never access internal fields; all interaction goes through the C API.
#[repr(C)]
pub struct PJconsts {
    _opaque: [u8; 0],
}

/// Opaque representation of PROJ.4's `projCtx_t` execution context.
#[repr(C)]
pub struct projCtx_t {
    _opaque: [u8; 0],
}

pub type projPJ = *mut PJconsts;
pub type projCtx = *mut projCtx_t;

/// Resolves an auxiliary file name (grid, init file) to a full path.
pub type FinderFn = unsafe extern "C" fn(name: *const c_char) -> *const c_char;

/// Receives `(app_data, level, message)` for every log line of a context.
pub type LoggerFn = unsafe extern "C" fn(app_data: *mut c_void, level: c_int, msg: *const c_char);

pub const PJ_VERSION: c_int = 480;

pub const RAD_TO_DEG: c_double = 57.295_779_513_082_32;
pub const DEG_TO_RAD: c_double = 0.017_453_292_519_943_295;

pub const PJ_LOG_NONE: c_int = 0;
pub const PJ_LOG_ERROR: c_int = 1;
pub const PJ_LOG_DEBUG_MAJOR: c_int = 2;
pub const PJ_LOG_DEBUG_MINOR: c_int = 3;

unsafe extern "C" {
    // --- Forward / inverse projection ---

    pub fn pj_fwd(lp: projLP, proj: projPJ) -> projXY;
    pub fn pj_inv(xy: projXY, proj: projPJ) -> projLP;

    // --- Batch transforms (arrays mutated in place, 0 on success) ---

    pub fn pj_transform(
        src: projPJ,
        dst: projPJ,
        point_count: c_long,
        point_offset: c_int,
        x: *mut c_double,
        y: *mut c_double,
        z: *mut c_double,
    ) -> c_int;
    pub fn pj_datum_transform(
        src: projPJ,
        dst: projPJ,
        point_count: c_long,
        point_offset: c_int,
        x: *mut c_double,
        y: *mut c_double,
        z: *mut c_double,
    ) -> c_int;
    pub fn pj_geocentric_to_geodetic(
        a: c_double,
        es: c_double,
        point_count: c_long,
        point_offset: c_int,
        x: *mut c_double,
        y: *mut c_double,
        z: *mut c_double,
    ) -> c_int;
    pub fn pj_geodetic_to_geocentric(
        a: c_double,
        es: c_double,
        point_count: c_long,
        point_offset: c_int,
        x: *mut c_double,
        y: *mut c_double,
        z: *mut c_double,
    ) -> c_int;
    pub fn pj_compare_datums(srcdefn: projPJ, dstdefn: projPJ) -> c_int;
    pub fn pj_apply_gridshift(
        ctx: projCtx,
        nadgrids: *const c_char,
        inverse: c_int,
        point_count: c_long,
        point_offset: c_int,
        x: *mut c_double,
        y: *mut c_double,
        z: *mut c_double,
    ) -> c_int;
    pub fn pj_deallocate_grids();
    pub fn pj_clear_initcache();

    // --- Definition queries ---

    pub fn pj_is_latlong(proj: projPJ) -> c_int;
    pub fn pj_is_geocent(proj: projPJ) -> c_int;
    pub fn pj_get_spheroid_defn(
        defn: projPJ,
        major_axis: *mut c_double,
        eccentricity_squared: *mut c_double,
    );
    pub fn pj_pr_list(proj: projPJ);
    pub fn pj_get_def(proj: projPJ, options: c_int) -> *mut c_char;
    pub fn pj_latlong_from_proj(proj: projPJ) -> projPJ;

    // --- Creation and destruction ---

    pub fn pj_init(argc: c_int, argv: *mut *mut c_char) -> projPJ;
    pub fn pj_init_plus(definition: *const c_char) -> projPJ;
    pub fn pj_init_ctx(ctx: projCtx, argc: c_int, argv: *mut *mut c_char) -> projPJ;
    pub fn pj_init_plus_ctx(ctx: projCtx, definition: *const c_char) -> projPJ;
    pub fn pj_free(proj: projPJ);

    // --- Process-wide file lookup ---

    pub fn pj_set_finder(finder: Option<FinderFn>);
    pub fn pj_set_searchpath(count: c_int, path: *const *const c_char);

    // --- Memory owned by the library ---

    pub fn pj_malloc(size: size_t) -> *mut c_void;
    pub fn pj_dalloc(ptr: *mut c_void);

    // --- Errors and version ---

    pub fn pj_strerrno(errno: c_int) -> *mut c_char;
    pub fn pj_get_errno_ref() -> *mut c_int;
    pub fn pj_get_release() -> *const c_char;

    // --- Locking of library-internal state ---

    pub fn pj_acquire_lock();
    pub fn pj_release_lock();
    pub fn pj_cleanup_lock();

    // --- Contexts ---

    pub fn pj_get_default_ctx() -> projCtx;
    pub fn pj_get_ctx(proj: projPJ) -> projCtx;
    pub fn pj_set_ctx(proj: projPJ, ctx: projCtx);
    pub fn pj_ctx_alloc() -> projCtx;
    pub fn pj_ctx_free(ctx: projCtx);
    pub fn pj_ctx_get_errno(ctx: projCtx) -> c_int;
    pub fn pj_ctx_set_errno(ctx: projCtx, errno: c_int);
    pub fn pj_ctx_set_debug(ctx: projCtx, level: c_int);
    pub fn pj_ctx_set_logger(ctx: projCtx, logger: Option<LoggerFn>);
    pub fn pj_ctx_set_app_data(ctx: projCtx, app_data: *mut c_void);
    pub fn pj_ctx_get_app_data(ctx: projCtx) -> *mut c_void;

    // --- Logging ---

    pub fn pj_log(ctx: projCtx, level: c_int, fmt: *const c_char, ...);
    pub fn pj_stderr_logger(app_data: *mut c_void, level: c_int, msg: *const c_char);
}
