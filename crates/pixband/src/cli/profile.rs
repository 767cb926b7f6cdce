//! CPU profiles of benchmark runs, written in pprof's protobuf format.
//!
//! Profiling needs the `profiling` feature (on by default) and a Unix target.

use std::path::Path;

/// Sampling frequency in Hz.
#[cfg(all(unix, feature = "profiling"))]
const FREQUENCY: i32 = 1000;

/// A running CPU profiler. Only one can be active per process.
#[cfg(all(unix, feature = "profiling"))]
pub struct CpuProfiler {
    guard: pprof::ProfilerGuard<'static>,
}

#[cfg(all(unix, feature = "profiling"))]
impl CpuProfiler {
    /// Start sampling every thread of the process.
    pub fn start() -> anyhow::Result<Self> {
        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(FREQUENCY)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()?;
        Ok(Self { guard })
    }

    /// Stop sampling and write the profile to `path`.
    pub fn finish(self, path: &Path) -> anyhow::Result<()> {
        use pprof::protos::Message;

        let profile = self.guard.report().build()?.pprof()?;
        let mut content = Vec::new();
        profile.write_to_vec(&mut content)?;
        std::fs::write(path, content)?;
        tracing::debug!("CPU profile written to {:?}", path);
        Ok(())
    }
}

#[cfg(not(all(unix, feature = "profiling")))]
pub struct CpuProfiler;

#[cfg(not(all(unix, feature = "profiling")))]
impl CpuProfiler {
    pub fn start() -> anyhow::Result<Self> {
        anyhow::bail!(
            "CPU profiling is unavailable: pixband was built without the \
             `profiling` feature or for a non-Unix target"
        )
    }

    pub fn finish(self, _path: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}

/// File name of the profile for the run called `name`.
pub fn profile_file_name(name: &str) -> String {
    format!("cpu-{name}.pb")
}
