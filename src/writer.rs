// acex (ai code extractor)

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// A piece of recognized text that survived the code filter, tagged with the
/// timestamp of the frame it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    pub timestamp: f64,
    pub text: String,
}

/// Writes the snippets to `output_path` in input order, truncating any
/// previous file. The format is fixed for compatibility:
/// `\n# Code at {timestamp:.2} seconds\n{code}\n` per snippet.
pub fn write_snippets(snippets: &[Snippet], output_path: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(output_path)?;
    for snippet in snippets {
        write!(file, "\n# Code at {:.2} seconds\n{}\n", snippet.timestamp, snippet.text)?;
    }
    Ok(())
}

/// Inverse of `write_snippets`: splits on the header pattern and recovers the
/// ordered (timestamp, text) pairs. Used when importing a previously written
/// snippet file into the library.
pub fn parse_snippets(content: &str) -> Vec<Snippet> {
    let header = Regex::new(r"(?m)^# Code at (\d+(?:\.\d+)?) seconds$").unwrap();

    let matches: Vec<_> = header.captures_iter(content).collect();
    let mut snippets = Vec::new();

    for (i, caps) in matches.iter().enumerate() {
        let timestamp: f64 = match caps[1].parse() {
            Ok(ts) => ts,
            Err(_) => continue,
        };

        let whole = caps.get(0).expect("capture 0 always present");
        let body_start = whole.end();
        let body_end = match matches.get(i + 1) {
            Some(next) => next.get(0).expect("capture 0 always present").start(),
            None => content.len(),
        };

        let text = content[body_start..body_end].trim_matches('\n').to_string();
        snippets.push(Snippet { timestamp, text });
    }

    snippets
}
