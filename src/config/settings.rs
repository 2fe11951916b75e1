use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Proj4Error, Result};
use crate::ffi::context::{Context, LogLevel};
use crate::ffi::global;
use crate::parallel::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directories searched for grid shift and init files, in order.
    pub search_paths: Vec<PathBuf>,
    pub log_level: LogLevel,
    pub forward_logs_to_tracing: bool,
    /// Points per worker chunk in parallel transforms.
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            search_paths: Vec::new(),
            log_level: LogLevel::Error,
            forward_logs_to_tracing: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Proj4Error::config("chunk_size must be greater than 0"));
        }
        Ok(())
    }

    /// Push process-wide settings into the library. An empty search path
    /// leaves the library's own default (`PROJ_LIB`) untouched.
    pub fn apply_global(&self) -> Result<()> {
        if !self.search_paths.is_empty() {
            global::set_search_paths(self.search_paths.as_slice())?;
        }
        Ok(())
    }

    /// Apply per-context settings: debug level and log routing.
    pub fn configure(&self, ctx: &Context) {
        ctx.set_debug(self.log_level);
        if self.forward_logs_to_tracing {
            ctx.use_tracing_logger();
        }
    }
}
