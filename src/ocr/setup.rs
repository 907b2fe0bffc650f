use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::DetectorConfig;
use crate::log;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

#[cfg(windows)]
const COMMON_INSTALLS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR",
    r"C:\Program Files (x86)\Tesseract-OCR",
];
#[cfg(not(windows))]
const COMMON_INSTALLS: &[&str] = &["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"];

#[cfg(windows)]
const COMMON_TESSDATA: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];
#[cfg(not(windows))]
const COMMON_TESSDATA: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

#[derive(Debug, Clone)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

/// Returns the directory for storing Tesseract files
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scroll-segmenter")
        .join("tesseract")
}

fn traineddata_name(language: &str) -> String {
    format!("{}.traineddata", language)
}

/// Ensures Tesseract and the configured language pack are available.
/// Downloads the trained data into the local data dir if necessary.
pub fn ensure_tesseract(config: &DetectorConfig) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(config)?;

    if let Ok(tessdata) = find_tessdata_dir(config) {
        log(&format!(
            "Tesseract found at: {} (tessdata: {})",
            executable.display(),
            tessdata.display()
        ));
        return Ok(TesseractPaths {
            executable,
            tessdata,
        });
    }

    log(&format!(
        "{} not found locally, downloading...",
        traineddata_name(&config.language)
    ));

    let tessdata = get_tesseract_dir().join("tessdata");
    fs::create_dir_all(&tessdata)?;
    download_tessdata(&tessdata, &config.language)?;

    log(&format!("Tesseract ready, tessdata at: {}", tessdata.display()));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Downloads the trained data for `language` from the official repository
fn download_tessdata(tessdata_dir: &Path, language: &str) -> Result<()> {
    let name = traineddata_name(language);
    let url = format!("{}/{}", TESSDATA_REPO, name);
    let target = tessdata_dir.join(&name);

    log(&format!("Downloading {}...", name));

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "scroll-segmenter")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&target)
        .context(format!("Failed to create {}", target.display()))?;
    file.write_all(&bytes)?;

    log(&format!("Downloaded {} ({} bytes)", name, bytes.len()));

    Ok(())
}

/// Finds the Tesseract executable: explicit config, local dir, PATH, then common installs
pub fn find_tesseract_executable(config: &DetectorConfig) -> Result<PathBuf> {
    if let Some(path) = &config.tesseract_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(anyhow!(
            "Configured tesseract executable does not exist: {}",
            path.display()
        ));
    }

    let local_exe = get_tesseract_dir().join(EXECUTABLE_NAME);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for dir in COMMON_INSTALLS {
        let p = PathBuf::from(dir).join(EXECUTABLE_NAME);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory holding the configured language pack
pub fn find_tessdata_dir(config: &DetectorConfig) -> Result<PathBuf> {
    let wanted = traineddata_name(&config.language);

    if let Some(dir) = &config.tessdata_dir {
        if dir.join(&wanted).exists() {
            return Ok(dir.clone());
        }
        return Err(anyhow!(
            "Configured tessdata directory has no {}: {}",
            wanted,
            dir.display()
        ));
    }

    let mut candidates = vec![get_tesseract_dir().join("tessdata")];

    // TESSDATA_PREFIX may point at tessdata itself or at its parent
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(&prefix));
        candidates.push(PathBuf::from(&prefix).join("tessdata"));
    }

    candidates.extend(COMMON_TESSDATA.iter().map(PathBuf::from));

    candidates
        .into_iter()
        .find(|dir| dir.join(&wanted).exists())
        .ok_or_else(|| anyhow!("tessdata directory not found. Please ensure {} is available.", wanted))
}
