// acex (ai code extractor)

use crate::config::AcexConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub path: PathBuf,
    pub timestamp: f64,
}

pub async fn probe_frame_rate(video_path: &Path, ffprobe_path: &Path) -> Result<f64, String> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(video_path)
        .output()
        .await;

    match output {
        Ok(output) => {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                parse_frame_rate(&stdout)
                    .ok_or_else(|| format!("Could not parse frame rate: {}", stdout.trim()))
            } else {
                let error_output = String::from_utf8_lossy(&output.stderr);
                Err(format!("ffprobe failed: {}", error_output))
            }
        }
        Err(e) => Err(format!("Failed to execute ffprobe: {}", e)),
    }
}

// ffprobe reports r_frame_rate as a fraction like "30000/1001"
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let fps = if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        raw.parse().ok()?
    };

    if fps.is_finite() && fps > 0.0 { Some(fps) } else { None }
}

// A zero step would select nothing; fall back to every frame instead.
fn sample_step(fps: f64, interval: f64) -> u64 {
    let step = (fps * interval).round();
    if step < 1.0 { 1 } else { step as u64 }
}

fn frame_timestamp(index: u64, step: u64, fps: f64) -> f64 {
    (index * step) as f64 / fps
}

pub fn frame_file_name(timestamp: f64) -> String {
    format!("frame_{}.jpg", timestamp as i64)
}

/// Extracts one frame every `interval` seconds from the video, saving each as
/// a JPEG named by its truncated-integer timestamp. Returns the saved frames
/// in ascending timestamp order.
pub async fn sample_frames(
    video_path: &Path,
    output_dir: &Path,
    interval: f64,
    cfg: &AcexConfig,
) -> Result<Vec<Frame>, Box<dyn std::error::Error>> {
    let fps = probe_frame_rate(video_path, Path::new(&cfg.ffprobe_path))
        .await
        .map_err(|e| format!("Cannot read video {}: {}", video_path.display(), e))?;

    fs::create_dir_all(output_dir)?;

    let step = sample_step(fps, interval);

    // Single decode pass; ffmpeg numbers the selected frames sequentially,
    // they are renamed to their timestamp-based names afterwards.
    let staged_pattern = output_dir.join("sample_%06d.jpg");
    let output = Command::new(&cfg.ffmpeg_path)
        .args(["-v", "error", "-i"])
        .arg(video_path)
        .args([
            "-vf",
            &format!("select='not(mod(n\\,{}))'", step),
            "-fps_mode",
            "vfr",
            "-q:v",
            "2",
            "-y",
        ])
        .arg(&staged_pattern)
        .output()
        .await
        .map_err(|e| format!("Failed to execute ffmpeg: {}", e))?;

    if !output.status.success() {
        let error_output = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffmpeg frame extraction failed: {}", error_output).into());
    }

    let mut frames = Vec::new();
    for sequence in 1u64.. {
        let staged = output_dir.join(format!("sample_{:06}.jpg", sequence));
        if !staged.exists() {
            break;
        }
        let timestamp = frame_timestamp(sequence - 1, step, fps);
        let final_path = output_dir.join(frame_file_name(timestamp));
        // Two timestamps truncating to the same second collide on the
        // filename; the later frame overwrites the earlier one.
        fs::rename(&staged, &final_path)?;
        frames.push(Frame {
            path: final_path,
            timestamp,
        });
    }

    Ok(frames)
}
