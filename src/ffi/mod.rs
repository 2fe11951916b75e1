pub mod context;
pub mod global;
pub mod proj4;
pub mod proj4_sys;
pub mod shim_sys;
