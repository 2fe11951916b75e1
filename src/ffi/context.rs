// Safe wrapper around PROJ.4 execution contexts (Context type, RAII Drop)

use std::ffi::{CStr, CString};

use libc::{c_char, c_int, c_void};
use serde::Deserialize;
use tracing::{debug, error, trace};

use super::proj4_sys::{
    LoggerFn, PJ_LOG_DEBUG_MAJOR, PJ_LOG_DEBUG_MINOR, PJ_LOG_ERROR, PJ_LOG_NONE, pj_ctx_alloc,
    pj_ctx_free, pj_ctx_get_app_data, pj_ctx_get_errno, pj_ctx_set_app_data, pj_ctx_set_debug,
    pj_ctx_set_errno, pj_ctx_set_logger, pj_get_default_ctx, pj_log, pj_stderr_logger, projCtx,
};
use crate::error::{Proj4Error, Result};

/// Verbosity of a context's logger, mirroring `PJ_LOG_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    None,
    #[default]
    Error,
    DebugMajor,
    DebugMinor,
}

impl LogLevel {
    pub fn as_raw(self) -> c_int {
        match self {
            LogLevel::None => PJ_LOG_NONE,
            LogLevel::Error => PJ_LOG_ERROR,
            LogLevel::DebugMajor => PJ_LOG_DEBUG_MAJOR,
            LogLevel::DebugMinor => PJ_LOG_DEBUG_MINOR,
        }
    }
}

/// An explicit PROJ.4 context: its own errno, debug level, logger and
/// application data.
///
/// Use one context per thread. A context can move to another thread
/// (`Send`) but is never shared (`!Sync`).
pub struct Context {
    ptr: projCtx,
}

// projCtx carries no thread affinity; the library only requires that a
// context is not used from two threads at once, which !Sync guarantees.
unsafe impl Send for Context {}

impl Context {
    /// Allocate a context. The library copies the default context's
    /// settings into it.
    pub fn new() -> Result<Self> {
        let ptr = unsafe { pj_ctx_alloc() };
        if ptr.is_null() {
            return Err(Proj4Error::init(libc::ENOMEM));
        }
        debug!("context allocated");
        Ok(Context { ptr })
    }

    /// Allocate a context whose log lines go to `tracing`.
    pub fn with_tracing() -> Result<Self> {
        let ctx = Self::new()?;
        ctx.use_tracing_logger();
        Ok(ctx)
    }

    /// The library's process-wide default context. Not owned.
    pub fn default_ptr() -> projCtx {
        unsafe { pj_get_default_ctx() }
    }

    pub fn errno(&self) -> i32 {
        unsafe { pj_ctx_get_errno(self.ptr) }
    }

    /// Set the context errno. A non-zero value also updates the global
    /// `pj_errno`.
    pub fn set_errno(&self, code: i32) {
        unsafe { pj_ctx_set_errno(self.ptr, code) }
    }

    pub fn set_debug(&self, level: LogLevel) {
        unsafe { pj_ctx_set_debug(self.ptr, level.as_raw()) }
    }

    /// Install a raw logger.
    ///
    /// # Safety
    /// `logger` must be sound to call from any PROJ entry point using this
    /// context, with whatever pointer was given to [`Context::set_app_data`].
    pub unsafe fn set_logger(&self, logger: LoggerFn) {
        unsafe { pj_ctx_set_logger(self.ptr, Some(logger)) }
    }

    /// Forward log lines to `tracing` under the `proj4` target.
    pub fn use_tracing_logger(&self) {
        unsafe { pj_ctx_set_logger(self.ptr, Some(tracing_logger)) }
    }

    /// Restore the library's own stderr logger.
    pub fn use_stderr_logger(&self) {
        unsafe { pj_ctx_set_logger(self.ptr, Some(pj_stderr_logger)) }
    }

    /// Attach an opaque pointer handed to the logger as its first argument.
    ///
    /// # Safety
    /// `data` must stay valid for as long as the installed logger may read it.
    pub unsafe fn set_app_data(&self, data: *mut c_void) {
        unsafe { pj_ctx_set_app_data(self.ptr, data) }
    }

    pub fn app_data(&self) -> *mut c_void {
        unsafe { pj_ctx_get_app_data(self.ptr) }
    }

    /// Emit a message through this context's logger. Dropped by the library
    /// when `level` is above the context's debug level.
    pub fn log(&self, level: LogLevel, message: &str) -> Result<()> {
        let msg = CString::new(message)?;
        unsafe { pj_log(self.ptr, level.as_raw(), c"%s".as_ptr(), msg.as_ptr()) };
        Ok(())
    }

    /// Raw handle. Still owned by `self`.
    pub fn as_ptr(&self) -> projCtx {
        self.ptr
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe {
            if !self.ptr.is_null() {
                pj_ctx_free(self.ptr);
                self.ptr = std::ptr::null_mut();
            }
        }
    }
}

/// Logger routing PROJ messages into `tracing`.
///
/// # Safety
/// `msg` must be null or a nul-terminated string; PROJ guarantees this.
pub unsafe extern "C" fn tracing_logger(_app_data: *mut c_void, level: c_int, msg: *const c_char) {
    if msg.is_null() {
        return;
    }
    let msg = unsafe { CStr::from_ptr(msg) }.to_string_lossy();
    let msg = msg.trim_end();
    match level {
        PJ_LOG_ERROR => error!(target: "proj4", "{msg}"),
        PJ_LOG_DEBUG_MAJOR => debug!(target: "proj4", "{msg}"),
        _ => trace!(target: "proj4", "{msg}"),
    }
}
