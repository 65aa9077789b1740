use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` enables debug
/// output and lets `RUST_LOG` override the level.
///
/// When `file` is given, events are written there (without ANSI colours)
/// instead of the terminal. An unusable path falls back to terminal output.
pub fn init(debug: bool, file: Option<PathBuf>) {
    // Without debug we force `info` regardless of `RUST_LOG`.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let appender = file.as_deref().and_then(|path| match file_appender(path) {
        Ok(appender) => Some(appender),
        Err(err) => {
            eprintln!("trace file {} unavailable: {err}", path.display());
            None
        }
    });

    match appender {
        Some(appender) => {
            let _ = builder.with_writer(appender).with_ansi(false).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, String> {
    let name = path
        .file_name()
        .ok_or_else(|| "path has no file name".to_string())?
        .to_string_lossy()
        .into_owned();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .map_err(|err| err.to_string())
}
