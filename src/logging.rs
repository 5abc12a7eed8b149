use anyhow::Context;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;

/// Initializes the global logger, appending to `file`.
///
/// The terminal belongs to the game while it runs, so records never go to
/// stderr. `verbose` lowers the default filter to debug; `RUST_LOG` still
/// takes precedence.
pub(crate) fn init(verbose: bool, file: &Path) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let sink = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("opening log file {}", file.display()))?;

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.target(Target::Pipe(Box::new(sink)));

    // only fails when a logger is already installed
    let _ = builder.try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_the_log_file_and_tolerates_repeats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leapfrog.log");
        init(false, &path).unwrap();
        init(true, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("leapfrog.log");
        assert!(init(false, &path).is_err());
    }
}
