use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Local;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the segmentation output root: `<exe_dir>/segmentations/`
pub fn get_segmentations_dir() -> PathBuf {
    get_exe_dir().join("segmentations")
}

/// Returns a fresh timestamped run directory under the segmentation root.
/// The directory is not created.
pub fn new_run_dir() -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    get_segmentations_dir().join(stamp.to_string())
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_segmentations_dir())?;
    Ok(())
}
