// Process-wide PROJ.4 state: grid search path, file finder, internal lock.
//
// All of this lives inside the library. These functions only forward
// configuration into it; nothing here is owned by the crate except the
// finder closure slot and the paths it has returned.

use std::collections::BTreeSet;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Mutex, PoisonError};

use libc::{c_char, c_int};
use tracing::{debug, warn};

use super::proj4_sys::{
    pj_acquire_lock, pj_cleanup_lock, pj_clear_initcache, pj_deallocate_grids, pj_release_lock,
    pj_set_finder, pj_set_searchpath,
};
use crate::error::{Proj4Error, Result};

type Finder = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;

static FINDER: Mutex<Option<Finder>> = Mutex::new(None);
// pj_open_lib reads the returned path after the finder returns and outside
// the library lock, so every path handed out stays allocated for the rest of
// the process. A CString's buffer does not move when the set rebalances.
static FOUND_PATHS: Mutex<BTreeSet<CString>> = Mutex::new(BTreeSet::new());

/// Replace the directories searched for grid and init files. An empty slice
/// clears the list.
pub fn set_search_paths<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    let c_paths = paths
        .iter()
        .map(|p| -> Result<CString> {
            let p = p.as_ref();
            let s = p.to_str().ok_or_else(|| {
                Proj4Error::invalid_argument(format!("search path is not UTF-8: {}", p.display()))
            })?;
            Ok(CString::new(s)?)
        })
        .collect::<Result<Vec<_>>>()?;
    let count = c_int::try_from(c_paths.len())
        .map_err(|_| Proj4Error::invalid_argument("too many search paths"))?;
    let ptrs: Vec<*const c_char> = c_paths.iter().map(|p| p.as_ptr()).collect();

    // The library copies every entry, so the CStrings may drop afterwards.
    unsafe {
        if ptrs.is_empty() {
            pj_set_searchpath(0, ptr::null());
        } else {
            pj_set_searchpath(count, ptrs.as_ptr());
        }
    }
    debug!(count, "search path updated");
    Ok(())
}

/// Install a finder resolving auxiliary file names (`"conus"`, `"epsg"`) to
/// paths. Returning `None` lets the library fall back to its search path.
///
/// The finder must not call [`set_finder`] or [`clear_finder`] itself.
pub fn set_finder<F>(finder: F)
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync + 'static,
{
    *FINDER.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(finder));
    unsafe { pj_set_finder(Some(finder_trampoline)) };
}

/// Remove the installed finder. Paths it already returned stay valid.
pub fn clear_finder() {
    unsafe { pj_set_finder(None) };
    *FINDER.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

unsafe extern "C" fn finder_trampoline(name: *const c_char) -> *const c_char {
    if name.is_null() {
        return ptr::null();
    }
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();

    let found = catch_unwind(AssertUnwindSafe(|| {
        let finder = FINDER.lock().unwrap_or_else(PoisonError::into_inner);
        finder.as_ref().and_then(|f| f(&*name))
    }));
    let path = match found {
        Ok(Some(path)) => path,
        Ok(None) => return ptr::null(),
        Err(_) => {
            warn!(%name, "finder panicked");
            return ptr::null();
        }
    };

    let Some(c_path) = path.to_str().and_then(|s| CString::new(s).ok()) else {
        warn!(%name, path = %path.display(), "finder returned an unusable path");
        return ptr::null();
    };
    intern_path(c_path)
}

fn intern_path(path: CString) -> *const c_char {
    let mut paths = FOUND_PATHS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(kept) = paths.get(&path) {
        return kept.as_ptr();
    }
    let ptr = path.as_ptr();
    paths.insert(path);
    ptr
}

/// Holds the library's internal lock; released on drop.
///
/// The lock is recursive in PROJ.4, so nested guards on one thread are fine.
pub struct LibraryLock {
    _not_send: PhantomData<*const ()>,
}

impl LibraryLock {
    pub fn acquire() -> Self {
        unsafe { pj_acquire_lock() };
        LibraryLock {
            _not_send: PhantomData,
        }
    }
}

impl Drop for LibraryLock {
    fn drop(&mut self) {
        unsafe { pj_release_lock() };
    }
}

/// Free cached grids and init files, then tear down the library lock.
///
/// # Safety
/// No [`super::proj4::Projection`] may be alive, and no other thread may be
/// inside the library.
pub unsafe fn cleanup() {
    unsafe {
        pj_deallocate_grids();
        pj_clear_initcache();
        pj_cleanup_lock();
    }
    debug!("library caches released");
}
