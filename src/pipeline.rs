// acex (ai code extractor)

use crate::classifier::CodeClassifier;
use crate::config::AcexConfig;
use crate::frames::{self, Frame};
use crate::ocr;
use crate::writer::{self, Snippet};
use std::path::{Path, PathBuf};

pub struct ExtractionOptions {
    pub frames_dir: PathBuf,
    pub output_file: PathBuf,
    pub interval: f64,
}

impl ExtractionOptions {
    pub fn from_config(cfg: &AcexConfig) -> Self {
        Self {
            frames_dir: PathBuf::from(&cfg.frames_dir),
            output_file: PathBuf::from(&cfg.output_file),
            interval: cfg.interval_seconds,
        }
    }
}

/// Runs the full extraction for one video: sample frames, OCR and classify
/// each frame, write the surviving snippets. Returns the snippets so callers
/// can map them into the library.
///
/// Sampling and writing failures abort the run. An OCR failure only skips
/// that frame, and the classifier never fails (negative classification
/// instead), so a classifier outage produces an empty result, not an error.
pub async fn process_video(
    video_path: &Path,
    options: &ExtractionOptions,
    classifier: &CodeClassifier,
    cfg: &AcexConfig,
) -> Result<Vec<Snippet>, Box<dyn std::error::Error>> {
    println!("Extracting frames...");
    let frames =
        frames::sample_frames(video_path, &options.frames_dir, options.interval, cfg).await?;
    println!("Sampled {} frames from {}", frames.len(), video_path.display());

    println!("Extracting and filtering code...");
    let snippets = collect_snippets(&frames, classifier, cfg).await;
    println!("Kept {} code snippets", snippets.len());

    println!("Saving code to file...");
    writer::write_snippets(&snippets, &options.output_file)?;

    println!(
        "Done! Extracted code saved to: {}",
        options.output_file.display()
    );
    Ok(snippets)
}

async fn collect_snippets(
    frames: &[Frame],
    classifier: &CodeClassifier,
    cfg: &AcexConfig,
) -> Vec<Snippet> {
    let tesseract_path = Path::new(&cfg.tesseract_path);
    let mut snippets = Vec::new();

    for frame in frames {
        let text = match ocr::recognize_text(&frame.path, tesseract_path).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Skipping frame {}: {}", frame.path.display(), e);
                continue;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        if classifier.is_code(trimmed).await {
            snippets.push(Snippet {
                timestamp: frame.timestamp,
                text: trimmed.to_string(),
            });
        }
    }

    snippets
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    // Fake ffmpeg that writes two staged frames into the output pattern
    fn fake_ffmpeg(dir: &Path) -> String {
        write_script(
            dir,
            "ffmpeg",
            concat!(
                "for last; do :; done\n",
                "one=$(printf '%s' \"$last\" | sed 's/%06d/000001/')\n",
                "two=$(printf '%s' \"$last\" | sed 's/%06d/000002/')\n",
                ": > \"$one\"\n",
                ": > \"$two\"",
            ),
        )
    }

    fn test_setup(temp_dir: &TempDir, tesseract_body: &str, classifier_body: &str) -> AcexConfig {
        AcexConfig {
            ffmpeg_path: fake_ffmpeg(temp_dir.path()),
            ffprobe_path: write_script(temp_dir.path(), "ffprobe", "echo 30/1"),
            tesseract_path: write_script(temp_dir.path(), "tesseract", tesseract_body),
            classifier_path: write_script(temp_dir.path(), "classifier", classifier_body),
            ..Default::default()
        }
    }

    fn test_options(temp_dir: &TempDir, interval: f64) -> ExtractionOptions {
        ExtractionOptions {
            frames_dir: temp_dir.path().join("frames"),
            output_file: temp_dir.path().join("extracted_code.txt"),
            interval,
        }
    }

    #[tokio::test]
    async fn test_process_video_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        // First frame shows code, second frame is blank
        let cfg = test_setup(
            &temp_dir,
            "case \"$1\" in *frame_0.jpg) echo 'def foo(): return 1';; *) echo '   ';; esac",
            "cat > /dev/null; echo LABEL_1",
        );
        let options = test_options(&temp_dir, 5.0);

        let video_path = temp_dir.path().join("lesson.mp4");
        fs::write(&video_path, "fake video content").unwrap();

        let classifier = CodeClassifier::new(cfg.classifier_path.clone());
        let snippets = process_video(&video_path, &options, &classifier, &cfg)
            .await
            .unwrap();

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].timestamp, 0.0);
        assert_eq!(snippets[0].text, "def foo(): return 1");

        let content = fs::read_to_string(&options.output_file).unwrap();
        assert_eq!(content, "\n# Code at 0.00 seconds\ndef foo(): return 1\n");
    }

    #[tokio::test]
    async fn test_classifier_outage_yields_empty_output_not_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = test_setup(&temp_dir, "echo 'x = 2'", "exit 1");
        cfg.classifier_path = "/nonexistent/classifier".to_string();
        let options = test_options(&temp_dir, 5.0);

        let video_path = temp_dir.path().join("lesson.mp4");
        fs::write(&video_path, "fake video content").unwrap();

        let classifier = CodeClassifier::new(cfg.classifier_path.clone());
        let snippets = process_video(&video_path, &options, &classifier, &cfg)
            .await
            .unwrap();

        assert!(snippets.is_empty());
        assert_eq!(fs::read_to_string(&options.output_file).unwrap(), "");
    }

    #[tokio::test]
    async fn test_ocr_failure_skips_frame_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        // OCR fails on the first frame, succeeds on the second
        let cfg = test_setup(
            &temp_dir,
            "case \"$1\" in *frame_0.jpg) exit 1;; *) echo 'x = 2';; esac",
            "cat > /dev/null; echo LABEL_1",
        );
        let options = test_options(&temp_dir, 5.0);

        let video_path = temp_dir.path().join("lesson.mp4");
        fs::write(&video_path, "fake video content").unwrap();

        let classifier = CodeClassifier::new(cfg.classifier_path.clone());
        let snippets = process_video(&video_path, &options, &classifier, &cfg)
            .await
            .unwrap();

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].timestamp, 5.0);
        assert_eq!(snippets[0].text, "x = 2");
    }

    #[tokio::test]
    async fn test_two_runs_produce_identical_output() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = test_setup(
            &temp_dir,
            "echo 'def foo(): return 1'",
            "cat > /dev/null; echo LABEL_1",
        );
        let options = test_options(&temp_dir, 5.0);

        let video_path = temp_dir.path().join("lesson.mp4");
        fs::write(&video_path, "fake video content").unwrap();

        let classifier = CodeClassifier::new(cfg.classifier_path.clone());
        process_video(&video_path, &options, &classifier, &cfg)
            .await
            .unwrap();
        let first = fs::read_to_string(&options.output_file).unwrap();
        process_video(&video_path, &options, &classifier, &cfg)
            .await
            .unwrap();
        let second = fs::read_to_string(&options.output_file).unwrap();

        assert_eq!(first, second);
    }
}
