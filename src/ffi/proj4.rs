// Safe wrapper around PROJ.4 projection handles (Projection type, RAII Drop)

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;

use libc::{c_char, c_int, c_void};
use tracing::{debug, warn};

use super::context::Context;
use super::proj4_sys::{
    pj_compare_datums, pj_ctx_get_errno, pj_dalloc, pj_free, pj_fwd, pj_get_ctx,
    pj_get_def, pj_get_default_ctx, pj_get_release, pj_get_spheroid_defn,
    pj_init, pj_init_ctx, pj_init_plus, pj_init_plus_ctx, pj_inv, pj_is_geocent, pj_is_latlong,
    pj_latlong_from_proj, pj_pr_list, pj_set_ctx, pj_strerrno, projCtx, projLP, projPJ, projXY,
};
use super::shim_sys::{get_errno, get_pj_release};
use crate::error::{Proj4Error, Result};

/// Release string of the linked library, e.g. `"Rel. 4.8.0, 6 March 2012"`.
pub fn release() -> Result<String> {
    unsafe { owned_string(get_pj_release()) }
}

/// Same string as [`release`], read through `pj_get_release()` instead of the
/// `pj_release` global.
pub fn release_from_api() -> Result<String> {
    unsafe { owned_string(pj_get_release()) }
}

/// The process-wide `pj_errno`. Only meaningful right after a failing call on
/// the default context; explicit contexts keep their own error state.
pub fn last_errno() -> i32 {
    unsafe { get_errno() }
}

/// Errno recorded in `ctx`. Only the default context falls back to the
/// global `pj_errno`; an explicit context never reports another thread's error.
pub(crate) fn context_errno(ctx: projCtx) -> i32 {
    let code = unsafe { pj_ctx_get_errno(ctx) };
    if code == 0 && ctx == unsafe { pj_get_default_ctx() } {
        last_errno()
    } else {
        code
    }
}

/// Human readable text for a PROJ errno. Negative codes are PROJ's own,
/// positive codes are system `errno` values.
pub fn errno_message(code: i32) -> String {
    if code == 0 {
        return "no error".to_string();
    }
    // pj_strerrno may return a shared static buffer; copy it out immediately.
    let msg = unsafe { pj_strerrno(code) };
    if msg.is_null() {
        format!("unknown error ({code})")
    } else {
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

/// Copy a library-owned C string without freeing it.
///
/// # Safety
/// `ptr` must be null or point at a nul-terminated string.
pub(crate) unsafe fn owned_string(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Err(Proj4Error::invalid_argument("PROJ returned a null string"));
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_str()?;
    Ok(s.to_owned())
}

/// Ellipsoid parameters of a projection definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spheroid {
    /// Semi-major axis in metres.
    pub a: f64,
    /// First eccentricity squared.
    pub es: f64,
}

impl Spheroid {
    pub const WGS84: Spheroid = Spheroid {
        a: 6_378_137.0,
        es: 0.006_694_379_990_141_317,
    };
}

/// Safe wrapper around a PROJ.4 `projPJ`.
///
/// The lifetime ties the handle to the [`Context`] it was created in; handles
/// on the default context are `Projection<'static>`. `pj_free` runs exactly
/// once, on drop.
pub struct Projection<'ctx> {
    ptr: projPJ,
    _ctx: PhantomData<&'ctx Context>,
}

impl Projection<'static> {
    /// Initialise from a `"+proj=... +other=..."` string on the default context.
    pub fn new(definition: &str) -> Result<Self> {
        let c_def = CString::new(definition)?;
        let ptr = unsafe { pj_init_plus(c_def.as_ptr()) };
        unsafe { Self::from_init(ptr, pj_get_default_ctx(), definition) }
    }

    /// Initialise from an argument vector such as `["proj=utm", "zone=31"]`
    /// on the default context.
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let mut argv = ArgVector::new(args)?;
        let ptr = unsafe { pj_init(argv.argc()?, argv.as_mut_ptr()) };
        unsafe { Self::from_init(ptr, pj_get_default_ctx(), &args.join(" ")) }
    }
}

impl<'ctx> Projection<'ctx> {
    /// Initialise from a `"+proj=..."` string; errors land in `ctx`.
    pub fn with_context(ctx: &'ctx Context, definition: &str) -> Result<Self> {
        let c_def = CString::new(definition)?;
        let ptr = unsafe { pj_init_plus_ctx(ctx.as_ptr(), c_def.as_ptr()) };
        unsafe { Self::from_init(ptr, ctx.as_ptr(), definition) }
    }

    /// Initialise from an argument vector; errors land in `ctx`.
    pub fn from_args_with_context(ctx: &'ctx Context, args: &[&str]) -> Result<Self> {
        let mut argv = ArgVector::new(args)?;
        let ptr = unsafe { pj_init_ctx(ctx.as_ptr(), argv.argc()?, argv.as_mut_ptr()) };
        unsafe { Self::from_init(ptr, ctx.as_ptr(), &args.join(" ")) }
    }

    /// # Safety
    /// `ptr` must be null or a fresh handle from a `pj_init*` call on `ctx`.
    unsafe fn from_init(ptr: projPJ, ctx: projCtx, definition: &str) -> Result<Self> {
        if ptr.is_null() {
            let code = context_errno(ctx);
            warn!(definition, code, "pj_init failed");
            return Err(Proj4Error::init(code));
        }
        debug!(definition, "projection initialised");
        Ok(Projection {
            ptr,
            _ctx: PhantomData,
        })
    }

    /// Project geographic coordinates (radians) to projected coordinates.
    pub fn forward(&self, lp: projLP) -> Result<projXY> {
        let xy = unsafe { pj_fwd(lp, self.ptr) };
        if xy.u.is_infinite() || xy.v.is_infinite() {
            return Err(Proj4Error::projection(self.error_code()));
        }
        Ok(xy)
    }

    /// Unproject projected coordinates back to geographic radians.
    pub fn inverse(&self, xy: projXY) -> Result<projLP> {
        let lp = unsafe { pj_inv(xy, self.ptr) };
        if lp.u.is_infinite() || lp.v.is_infinite() {
            return Err(Proj4Error::projection(self.error_code()));
        }
        Ok(lp)
    }

    /// Current errno of the context this projection reports into.
    pub fn errno(&self) -> i32 {
        unsafe { pj_ctx_get_errno(pj_get_ctx(self.ptr)) }
    }

    pub(crate) fn error_code(&self) -> i32 {
        context_errno(self.context_ptr())
    }

    pub fn is_latlong(&self) -> bool {
        unsafe { pj_is_latlong(self.ptr) != 0 }
    }

    pub fn is_geocent(&self) -> bool {
        unsafe { pj_is_geocent(self.ptr) != 0 }
    }

    /// The expanded `+proj=...` definition, including parameters pulled in
    /// from init files and defaults.
    pub fn definition(&self) -> Result<String> {
        unsafe {
            let def = pj_get_def(self.ptr, 0);
            if def.is_null() {
                return Err(Proj4Error::projection(self.error_code()));
            }
            let result = owned_string(def);
            pj_dalloc(def as *mut c_void);
            result
        }
    }

    pub fn spheroid(&self) -> Spheroid {
        let mut a = 0.0;
        let mut es = 0.0;
        unsafe { pj_get_spheroid_defn(self.ptr, &mut a, &mut es) };
        Spheroid { a, es }
    }

    /// A geographic definition on the same datum, in the same context.
    pub fn latlong(&self) -> Result<Projection<'ctx>> {
        let ptr = unsafe { pj_latlong_from_proj(self.ptr) };
        if ptr.is_null() {
            return Err(Proj4Error::init(self.error_code()));
        }
        Ok(Projection {
            ptr,
            _ctx: PhantomData,
        })
    }

    /// Whether both definitions share ellipsoid and datum shift parameters.
    pub fn same_datum(&self, other: &Projection<'_>) -> bool {
        unsafe { pj_compare_datums(self.ptr, other.ptr) != 0 }
    }

    /// Dump the parameter list to stdout (`pj_pr_list`).
    pub fn print_parameters(&self) {
        unsafe { pj_pr_list(self.ptr) }
    }

    /// Move the handle onto another context (`pj_set_ctx`).
    pub fn rebind<'b>(self, ctx: &'b Context) -> Projection<'b> {
        let this = ManuallyDrop::new(self);
        unsafe { pj_set_ctx(this.ptr, ctx.as_ptr()) };
        Projection {
            ptr: this.ptr,
            _ctx: PhantomData,
        }
    }

    pub fn context_ptr(&self) -> projCtx {
        unsafe { pj_get_ctx(self.ptr) }
    }

    /// Raw handle for calls into [`super::proj4_sys`]. Still owned by `self`.
    pub fn as_ptr(&self) -> projPJ {
        self.ptr
    }
}

impl Drop for Projection<'_> {
    fn drop(&mut self) {
        unsafe {
            if !self.ptr.is_null() {
                pj_free(self.ptr);
                self.ptr = std::ptr::null_mut();
            }
        }
    }
}

/// Owned `argv` for `pj_init`: the CStrings must outlive the pointer array.
struct ArgVector {
    _args: Vec<CString>,
    ptrs: Vec<*mut c_char>,
}

impl ArgVector {
    fn new(args: &[&str]) -> Result<Self> {
        let args = args
            .iter()
            .map(|a| CString::new(*a))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        // pj_init copies every parameter and never writes through argv.
        let ptrs = args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
        Ok(ArgVector { _args: args, ptrs })
    }

    fn argc(&self) -> Result<c_int> {
        c_int::try_from(self.ptrs.len()).map_err(|_| {
            Proj4Error::invalid_argument(format!("too many init arguments: {}", self.ptrs.len()))
        })
    }

    fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        self.ptrs.as_mut_ptr()
    }
}
