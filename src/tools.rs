// acex (ai code extractor)

use crate::config::AcexConfig;

#[derive(Debug, serde::Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub configured_path: String,
    pub configured_exists: bool,
    pub system_available: bool,
    pub system_path: Option<String>,
}

/// Reports the status of every external tool the pipeline shells out to.
pub fn list_tools(cfg: &AcexConfig) -> Vec<ToolInfo> {
    let tools = [
        ("ffmpeg", cfg.ffmpeg_path.clone()),
        ("ffprobe", cfg.ffprobe_path.clone()),
        ("tesseract", cfg.tesseract_path.clone()),
        ("classifier", cfg.classifier_path.clone()),
    ];

    tools
        .into_iter()
        .map(|(name, configured_path)| {
            let system_path = find_in_system_path(name);
            ToolInfo {
                name: name.to_string(),
                configured_exists: !configured_path.is_empty()
                    && std::path::Path::new(&configured_path).exists(),
                configured_path,
                system_available: system_path.is_some(),
                system_path,
            }
        })
        .collect()
}

fn find_in_system_path(tool: &str) -> Option<String> {
    which::which(tool)
        .ok()
        .map(|path| path.to_string_lossy().to_string())
}

/// The pipeline needs all four tools configured before it can run.
pub fn missing_tool_paths(cfg: &AcexConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if cfg.ffmpeg_path.is_empty() {
        missing.push("ffmpeg_path");
    }
    if cfg.ffprobe_path.is_empty() {
        missing.push("ffprobe_path");
    }
    if cfg.tesseract_path.is_empty() {
        missing.push("tesseract_path");
    }
    if cfg.classifier_path.is_empty() {
        missing.push("classifier_path");
    }
    missing
}
