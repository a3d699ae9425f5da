// acex (ai code extractor)

use std::path::Path;
use tokio::process::Command;

/// Runs one OCR pass over a saved frame. Returns the raw recognized text,
/// which may be empty or whitespace-only; no normalization is applied beyond
/// what tesseract itself performs.
pub async fn recognize_text(image_path: &Path, tesseract_path: &Path) -> Result<String, String> {
    if !image_path.exists() {
        return Err(format!("Image file does not exist: {}", image_path.display()));
    }

    let output = Command::new(tesseract_path)
        .arg(image_path)
        .arg("stdout")
        .output()
        .await;

    match output {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let error_output = String::from_utf8_lossy(&output.stderr);
                Err(format!("tesseract failed: {}", error_output))
            }
        }
        Err(e) => Err(format!("Failed to execute tesseract: {}", e)),
    }
}
