// Raw FFI declarations for the C shim (csrc/proj4_shim.c).
//
// The shim exposes PROJ.4's global data symbols through functions and
// provides out-pointer variants of pj_fwd/pj_inv.

use libc::{c_char, c_int};

use super::proj4_sys::{projLP, projPJ, projXY};

unsafe extern "C" {
    /// Returns the library's static `pj_release` string. Never null, never freed.
    pub fn get_pj_release() -> *const c_char;

    /// Returns the process-wide `pj_errno` set by the last failing call on
    /// the default context.
    pub fn get_errno() -> c_int;

    /// `*out = pj_fwd(*in, proj)`.
    pub fn pj_fwd_(input: *const projLP, proj: projPJ, out: *mut projXY);

    /// `*out = pj_inv(*in, proj)`.
    pub fn pj_inv_(input: *const projXY, proj: projPJ, out: *mut projLP);
}
