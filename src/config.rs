// acex (ai code extractor)

use serde::{Deserialize, Serialize};

fn default_frames_dir() -> String {
    "frames".to_string()
}

fn default_output_file() -> String {
    "extracted_code.txt".to_string()
}

fn default_interval() -> f64 {
    2.0
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AcexConfig {
    #[serde(default)]
    pub ffmpeg_path: String,
    #[serde(default)]
    pub ffprobe_path: String,
    #[serde(default)]
    pub tesseract_path: String,
    #[serde(default)]
    pub classifier_path: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default = "default_frames_dir")]
    pub frames_dir: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,
}

impl Default for AcexConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: String::new(),
            ffprobe_path: String::new(),
            tesseract_path: String::new(),
            classifier_path: String::new(),
            model_name: String::new(),
            frames_dir: default_frames_dir(),
            output_file: default_output_file(),
            interval_seconds: default_interval(),
        }
    }
}

pub fn load_config() -> Result<AcexConfig, confy::ConfyError> {
    if let Ok(config_path) = std::env::var("ACEX_CONFIG_PATH") {
        confy::load_path(&config_path)
    } else {
        confy::load("acex", "config")
    }
}

pub fn load_config_or_default() -> AcexConfig {
    load_config().unwrap_or_default()
}

pub fn store_config(config: &AcexConfig) -> Result<(), confy::ConfyError> {
    if let Ok(config_path) = std::env::var("ACEX_CONFIG_PATH") {
        confy::store_path(&config_path, config)
    } else {
        confy::store("acex", "config", config)
    }
}

pub fn model_path(cfg: &AcexConfig) -> std::path::PathBuf {
    let home_dir = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    home_dir
        .join(".acex/models")
        .join(format!("{}.bin", cfg.model_name))
}
