// acex (ai code extractor)

use crate::config::{self, AcexConfig};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Label the model emits for text that looks like source code.
pub const POSITIVE_LABEL: &str = "LABEL_1";

/// Stand-in for the model's token limit; input is cut here before submission.
pub const MAX_INPUT_CHARS: usize = 512;

/// Wraps the external text-classification CLI. Constructed once per run and
/// passed by reference to the pipeline; there is no process-global instance.
///
/// `is_code` is total: any failure of the classifier process degrades to a
/// negative answer instead of surfacing. A classifier outage silently drops
/// snippets rather than crashing the pipeline.
pub struct CodeClassifier {
    program: String,
    model_path: Option<PathBuf>,
    positive_label: String,
}

impl CodeClassifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model_path: None,
            positive_label: POSITIVE_LABEL.to_string(),
        }
    }

    pub fn from_config(cfg: &AcexConfig) -> Self {
        let mut classifier = Self::new(cfg.classifier_path.clone());
        if !cfg.model_name.is_empty() {
            classifier.model_path = Some(config::model_path(cfg));
        }
        classifier
    }

    #[cfg(test)]
    fn with_positive_label(mut self, label: &str) -> Self {
        self.positive_label = label.to_string();
        self
    }

    pub async fn is_code(&self, text: &str) -> bool {
        match self.classify(text).await {
            Ok(label) => label == self.positive_label,
            Err(_) => false,
        }
    }

    async fn classify(&self, text: &str) -> Result<String, String> {
        let mut cmd = Command::new(&self.program);
        if let Some(model_path) = &self.model_path {
            cmd.arg("-m").arg(model_path);
        }

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to execute classifier: {}", e))?;

        let input = truncate_chars(text, MAX_INPUT_CHARS);
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| format!("Failed to write classifier input: {}", e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| format!("Classifier did not finish: {}", e))?;

        if !output.status.success() {
            return Err(format!("Classifier exited with {}", output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|label| !label.is_empty())
            .ok_or_else(|| "Classifier produced no label".to_string())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
