use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::{GlyphClassifier, GlyphTensor, Prediction};
use crate::config::ClassifierConfig;

/// Classifier oracle that runs the glyph model through an external program.
///
/// The batch is written as little-endian `f32` in NCHW order (C = 1) and the
/// program is invoked as
/// `<program> <args..> --model <model> --input <file> --batch <n> --size <s>`.
/// It must print one line of whitespace-separated class logits per glyph.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: PathBuf,
    args: Vec<String>,
    model: PathBuf,
    input_size: u32,
    classes: Vec<String>,
}

impl CommandClassifier {
    /// Fails if the model or the program cannot be found: there is no
    /// fallback classifier, so the pipeline must not start without one.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        if !config.model.exists() {
            return Err(anyhow!(
                "Failed to load classifier model: {} does not exist",
                config.model.display()
            ));
        }
        if config.classes.is_empty() {
            return Err(anyhow!("Classifier config lists no classes"));
        }
        if config.input_size == 0 {
            return Err(anyhow!("Classifier input size must be positive"));
        }
        if !program_available(&config.program) {
            return Err(anyhow!(
                "Classifier program not found: {}",
                config.program.display()
            ));
        }

        crate::log(&format!(
            "Classifier ready: {} (model {}, {} classes, input {}px)",
            config.program.display(),
            config.model.display(),
            config.classes.len(),
            config.input_size
        ));

        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            model: config.model.clone(),
            input_size: config.input_size,
            classes: config.classes.clone(),
        })
    }

    fn run(&self, glyphs: &[GlyphTensor]) -> Result<Vec<Prediction>> {
        if glyphs.is_empty() {
            return Ok(Vec::new());
        }

        let mut input = NamedTempFile::with_suffix(".f32")?;
        for glyph in glyphs {
            for value in &glyph.data {
                input.write_all(&value.to_le_bytes())?;
            }
        }
        input.flush()?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--model")
            .arg(&self.model)
            .arg("--input")
            .arg(input.path())
            .arg("--batch")
            .arg(glyphs.len().to_string())
            .arg("--size")
            .arg(self.input_size.to_string())
            .output()
            .context(format!("Failed to launch classifier {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Classifier failed: {}", stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_logit_lines(&stdout, glyphs.len(), &self.classes)
    }
}

impl GlyphClassifier for CommandClassifier {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn classify(&self, glyph: &GlyphTensor) -> Result<Prediction> {
        self.run(std::slice::from_ref(glyph))?
            .pop()
            .ok_or_else(|| anyhow!("Classifier returned no prediction"))
    }

    fn classify_batch(&self, glyphs: &[GlyphTensor]) -> Result<Vec<Prediction>> {
        self.run(glyphs)
    }
}

/// Parses one line of logits per glyph. Blank lines are ignored.
pub fn parse_logit_lines(stdout: &str, expected: usize, classes: &[String]) -> Result<Vec<Prediction>> {
    let mut predictions = Vec::with_capacity(expected);

    for (line_num, line) in stdout.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let logits = line
            .split_whitespace()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| anyhow!("Bad logit on classifier output line {}: {}", line_num + 1, e))?;

        predictions.push(Prediction::from_logits(&logits, classes)?);
    }

    if predictions.len() != expected {
        return Err(anyhow!(
            "Classifier printed {} predictions, expected {}",
            predictions.len(),
            expected
        ));
    }

    Ok(predictions)
}

/// True if `program` is an existing path, or a bare name found on PATH.
fn program_available(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.exists();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        candidate.exists() || (cfg!(windows) && candidate.with_extension("exe").exists())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn classes() -> Vec<String> {
        vec!["ALEF".to_string(), "BET".to_string(), "GIMEL".to_string()]
    }

    #[test]
    fn test_parse_logit_lines() {
        let out = "0.1 3.0 0.2\n\n4.0 0.0 0.0\n";
        let predictions = parse_logit_lines(out, 2, &classes()).unwrap();
        assert_eq!(predictions[0].label, "BET");
        assert_eq!(predictions[1].label, "ALEF");
    }

    #[test]
    fn test_parse_logit_lines_count_mismatch() {
        assert!(parse_logit_lines("0 1 2\n", 2, &classes()).is_err());
    }

    #[test]
    fn test_parse_logit_lines_bad_number() {
        assert!(parse_logit_lines("0 one 2\n", 1, &classes()).is_err());
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let dir = tempdir().unwrap();
        let config = ClassifierConfig {
            model: dir.path().join("missing.model"),
            ..ClassifierConfig::default()
        };
        let err = CommandClassifier::new(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to load classifier model"));
    }

    #[test]
    fn test_missing_program_is_fatal() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("default.model");
        fs::write(&model, b"weights").unwrap();

        let config = ClassifierConfig {
            model,
            program: dir.path().join("no-such-classifier"),
            ..ClassifierConfig::default()
        };
        assert!(CommandClassifier::new(&config).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_external_program() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("default.model");
        fs::write(&model, b"weights").unwrap();

        // $6 is the batch size: --model m --input f --batch n --size s
        let script = dir.path().join("fake_classifier.sh");
        fs::write(
            &script,
            "i=0\nwhile [ \"$i\" -lt \"$6\" ]; do echo \"0.1 2.5 0.3\"; i=$((i+1)); done\n",
        )
        .unwrap();

        let config = ClassifierConfig {
            program: PathBuf::from("/bin/sh"),
            args: vec![script.to_string_lossy().to_string()],
            model,
            input_size: 16,
            batch_size: 8,
            classes: classes(),
        };
        let classifier = CommandClassifier::new(&config).unwrap();

        let glyph = GlyphTensor::from_image(&image::GrayImage::new(4, 4), 16);
        let batch = classifier.classify_batch(&[glyph.clone(), glyph.clone(), glyph.clone()]).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|p| p.label == "BET"));

        let single = classifier.classify(&glyph).unwrap();
        assert_eq!(single.label, "BET");
    }
}
