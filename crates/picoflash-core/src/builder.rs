//! Firmware build step
//!
//! Wraps the make-based firmware build: clean, parallel build, and the
//! conventional `<build_dir>/<target>.uf2` output path. The working
//! directory is scoped per invocation via the spawned child; nothing
//! chdirs the process.

use std::path::PathBuf;

use crate::config::FlashConfig;
use crate::error::BuildError;
use crate::tool::run_tool_in;

pub struct Builder<'a> {
    config: &'a FlashConfig,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a FlashConfig) -> Self {
        Self { config }
    }

    /// Compile `target` and return the produced image path
    pub fn build(&self, target: &str) -> Result<PathBuf, BuildError> {
        let build_dir = &self.config.build_dir;
        if !build_dir.is_dir() {
            return Err(BuildError::MissingBuildDir(build_dir.clone()));
        }

        log::info!("Compiling {}", target);

        // Best-effort clean; a failure only leaves a stale tree behind.
        match run_tool_in(
            &self.config.make,
            &["clean"],
            build_dir,
            self.config.build_timeout,
        ) {
            Ok(out) if !out.success() => {
                log::debug!("clean failed: {}", out.stderr_trimmed())
            }
            Err(e) => log::debug!("clean skipped: {}", e),
            _ => {}
        }

        let jobs = format!("-j{}", self.config.build_jobs);
        let out = run_tool_in(
            &self.config.make,
            &[jobs.as_str()],
            build_dir,
            self.config.build_timeout,
        )?;
        if !out.success() {
            return Err(BuildError::Failed {
                stderr: out.stderr_trimmed().to_string(),
            });
        }

        let image = self.config.image_path(target);
        if !image.is_file() {
            return Err(BuildError::MissingImage(image));
        }

        log::info!("Compilation successful: {}", image.display());
        Ok(image)
    }
}
