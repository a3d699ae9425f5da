// acex (ai code extractor)
//
// Extracts frames from a video at a fixed interval, runs OCR over each frame,
// keeps the text a pretrained classifier judges to be source code, and writes
// the surviving snippets with timestamps to a text file. Extracted segments
// can be recorded in a local SQLite library per video.

use crate::classifier::CodeClassifier;
use crate::config::AcexConfig;
use crate::pipeline::ExtractionOptions;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod classifier;
mod config;
mod db;
mod frames;
mod ocr;
mod pipeline;
mod tools;
mod writer;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the full extraction pipeline on a video")]
    #[command(arg_required_else_help = true)]
    Extract {
        #[arg(help = "Path to the video file")]
        path: String,
        #[arg(long, help = "Directory to save sampled frames into")]
        frames_dir: Option<String>,
        #[arg(long, help = "File to write extracted code snippets to")]
        output: Option<String>,
        #[arg(long, help = "Sampling interval in seconds")]
        interval: Option<f64>,
        #[arg(long, help = "Record the video and its segments in the library")]
        record: bool,
        #[arg(long, help = "Title for the library entry (defaults to the file name)")]
        title: Option<String>,
    },
    #[command(about = "Sample frames from a video without running OCR")]
    #[command(arg_required_else_help = true)]
    Frames {
        #[arg(help = "Path to the video file")]
        path: String,
        #[arg(long, help = "Directory to save sampled frames into")]
        frames_dir: Option<String>,
        #[arg(long, help = "Sampling interval in seconds")]
        interval: Option<f64>,
    },
    #[command(about = "Manage the video library")]
    Videos {
        #[command(subcommand)]
        videos_command: Option<VideosCommands>,
    },
    #[command(about = "Import a previously extracted snippet file into the library")]
    #[command(arg_required_else_help = true)]
    Import {
        #[arg(help = "Library id of the owning video")]
        video_id: i64,
        #[arg(help = "Path to the snippet file")]
        file: String,
    },
    #[command(about = "Manage external tools and dependencies")]
    Tools {
        #[command(subcommand)]
        tools_command: Option<ToolsCommands>,
    },
    #[command(about = "Display current configuration settings")]
    Config {
        #[command(subcommand)]
        config_command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug)]
#[command(arg_required_else_help = true)]
enum VideosCommands {
    #[command(about = "List all videos in the library")]
    List,
    #[command(about = "Add a video to the library")]
    Add {
        #[arg(help = "Title for the video")]
        title: String,
        #[arg(help = "Path to the stored video file")]
        path: String,
    },
    #[command(about = "Delete a video and its code segments")]
    Delete {
        #[arg(help = "Library id of the video")]
        id: i64,
    },
    #[command(about = "List the code segments extracted from a video")]
    Segments {
        #[arg(help = "Library id of the video")]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
#[command(arg_required_else_help = true)]
enum ToolsCommands {
    #[command(about = "List all external tools and their status")]
    List {
        #[arg(
            long,
            help = "Show JSON output instead of formatted",
            default_value = "false"
        )]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    #[command(about = "Display current configuration settings")]
    Show,
    #[command(about = "Display path to configuration file")]
    Path,
    #[command(about = "Set a configuration field")]
    Set {
        #[arg(help = "Field name to set")]
        field: String,
        #[arg(help = "Value to set")]
        value: String,
    },
    #[command(about = "Unset/clear a configuration field")]
    Unset {
        #[arg(help = "Field name to unset")]
        field: String,
    },
}

const VALID_CONFIG_FIELDS: &str = "ffmpeg_path, ffprobe_path, tesseract_path, classifier_path, model_name, frames_dir, output_file, interval_seconds";

fn is_valid_config_field(field: &str) -> bool {
    matches!(
        field,
        "ffmpeg_path"
            | "ffprobe_path"
            | "tesseract_path"
            | "classifier_path"
            | "model_name"
            | "frames_dir"
            | "output_file"
            | "interval_seconds"
    )
}

fn set_config_field(cfg: &mut AcexConfig, field: &str, value: &str) -> Result<(), String> {
    match field {
        "ffmpeg_path" => cfg.ffmpeg_path = value.to_string(),
        "ffprobe_path" => cfg.ffprobe_path = value.to_string(),
        "tesseract_path" => cfg.tesseract_path = value.to_string(),
        "classifier_path" => cfg.classifier_path = value.to_string(),
        "model_name" => cfg.model_name = value.to_string(),
        "frames_dir" => cfg.frames_dir = value.to_string(),
        "output_file" => cfg.output_file = value.to_string(),
        "interval_seconds" => {
            let interval = value
                .parse::<f64>()
                .map_err(|_| format!("Invalid number value for interval_seconds: {}", value))?;
            if !(interval > 0.0) {
                return Err(format!("interval_seconds must be positive: {}", value));
            }
            cfg.interval_seconds = interval;
        }
        _ => return Err(format!("Unknown field: {}", field)),
    }
    Ok(())
}

fn unset_config_field(cfg: &mut AcexConfig, field: &str) -> Result<(), String> {
    match field {
        "ffmpeg_path" => cfg.ffmpeg_path = String::new(),
        "ffprobe_path" => cfg.ffprobe_path = String::new(),
        "tesseract_path" => cfg.tesseract_path = String::new(),
        "classifier_path" => cfg.classifier_path = String::new(),
        "model_name" => cfg.model_name = String::new(),
        "frames_dir" => cfg.frames_dir = "frames".to_string(),
        "output_file" => cfg.output_file = "extracted_code.txt".to_string(),
        "interval_seconds" => cfg.interval_seconds = 2.0,
        _ => return Err(format!("Unknown field: {}", field)),
    }
    Ok(())
}

fn default_title(video_path: &str) -> String {
    Path::new(video_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| video_path.to_string())
}

fn require_tools(cfg: &AcexConfig, required: &[&str]) {
    let missing: Vec<&str> = tools::missing_tool_paths(cfg)
        .into_iter()
        .filter(|field| required.contains(field))
        .collect();
    if !missing.is_empty() {
        eprintln!(
            "Error: missing tool configuration: {}. Set them with 'acex config set <field> <path>'.",
            missing.join(", ")
        );
        std::process::exit(1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Extract {
            path,
            frames_dir,
            output,
            interval,
            record,
            title,
        }) => {
            let cfg: AcexConfig = config::load_config()?;
            require_tools(
                &cfg,
                &["ffmpeg_path", "ffprobe_path", "tesseract_path", "classifier_path"],
            );

            let mut options = ExtractionOptions::from_config(&cfg);
            if let Some(frames_dir) = frames_dir {
                options.frames_dir = PathBuf::from(frames_dir);
            }
            if let Some(output) = output {
                options.output_file = PathBuf::from(output);
            }
            if let Some(interval) = interval {
                options.interval = interval;
            }

            let classifier = CodeClassifier::from_config(&cfg);

            let rt = tokio::runtime::Runtime::new()?;
            let snippets = match rt.block_on(pipeline::process_video(
                Path::new(&path),
                &options,
                &classifier,
                &cfg,
            )) {
                Ok(snippets) => snippets,
                Err(e) => {
                    eprintln!("Error processing video: {}", e);
                    std::process::exit(1);
                }
            };

            if record {
                let mut conn = db::get_connection()?;
                let title = title.unwrap_or_else(|| default_title(&path));
                let video_id = db::insert_video(&conn, &title, &path)?;
                db::insert_segments(&mut conn, video_id, &snippets, options.interval)?;
                println!(
                    "Recorded video {} ({}) with {} segments",
                    video_id,
                    title,
                    snippets.len()
                );
            }
        }
        Some(Commands::Frames {
            path,
            frames_dir,
            interval,
        }) => {
            let cfg: AcexConfig = config::load_config()?;
            require_tools(&cfg, &["ffmpeg_path", "ffprobe_path"]);

            let out_dir = frames_dir.unwrap_or_else(|| cfg.frames_dir.clone());
            let interval = interval.unwrap_or(cfg.interval_seconds);

            let rt = tokio::runtime::Runtime::new()?;
            match rt.block_on(frames::sample_frames(
                Path::new(&path),
                Path::new(&out_dir),
                interval,
                &cfg,
            )) {
                Ok(frames) => {
                    let json_output = serde_json::to_string_pretty(&frames)?;
                    println!("{}", json_output);
                }
                Err(e) => {
                    eprintln!("Error sampling frames: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Videos { videos_command }) => match videos_command {
            Some(VideosCommands::List) => {
                let conn = db::get_connection()?;
                let videos = db::list_videos(&conn)?;
                let json_output = serde_json::to_string_pretty(&videos)?;
                println!("{}", json_output);
            }
            Some(VideosCommands::Add { title, path }) => {
                let conn = db::get_connection()?;
                let video_id = db::insert_video(&conn, &title, &path)?;
                println!("Added video {} ({})", video_id, title);
            }
            Some(VideosCommands::Delete { id }) => {
                let conn = db::get_connection()?;
                let deleted = db::delete_video(&conn, id)?;
                if deleted == 0 {
                    eprintln!("No video with id {}", id);
                    std::process::exit(1);
                }
                println!("Deleted video {}", id);
            }
            Some(VideosCommands::Segments { id }) => {
                let conn = db::get_connection()?;
                let segments = db::list_segments(&conn, id)?;
                let json_output = serde_json::to_string_pretty(&segments)?;
                println!("{}", json_output);
            }
            None => {}
        },
        Some(Commands::Import { video_id, file }) => {
            let content = std::fs::read_to_string(&file)
                .map_err(|e| format!("Cannot read snippet file {}: {}", file, e))?;
            let snippets = writer::parse_snippets(&content);
            if snippets.is_empty() {
                eprintln!("No snippets found in {}", file);
                std::process::exit(1);
            }

            let cfg = config::load_config_or_default();
            let mut conn = db::get_connection()?;
            if db::get_video(&conn, video_id)?.is_none() {
                eprintln!("No video with id {}", video_id);
                std::process::exit(1);
            }
            let imported =
                db::insert_segments(&mut conn, video_id, &snippets, cfg.interval_seconds)?;
            println!("Imported {} segments for video {}", imported, video_id);
        }
        Some(Commands::Tools { tools_command }) => match tools_command {
            Some(ToolsCommands::List { json }) => {
                let cfg = config::load_config_or_default();
                let tools = tools::list_tools(&cfg);
                if json {
                    let json_output = serde_json::to_string_pretty(&tools)?;
                    println!("{}", json_output);
                } else {
                    println!("Tools Status:");
                    println!("{}", "=".repeat(50));
                    for tool in tools {
                        println!("\n{}", tool.name.to_uppercase());
                        println!(
                            "   Configured Path: {}",
                            if tool.configured_path.is_empty() {
                                "(not set)"
                            } else {
                                tool.configured_path.as_str()
                            }
                        );
                        println!(
                            "   Configured Path Exists: {}",
                            if tool.configured_exists { "Yes" } else { "No" }
                        );
                        println!(
                            "   System Available: {}",
                            if tool.system_available { "Yes" } else { "No" }
                        );
                        if let Some(system_path) = &tool.system_path {
                            println!("   System Path: {}", system_path);
                        }
                    }
                }
            }
            None => {}
        },
        Some(Commands::Config { config_command }) => match config_command {
            Some(ConfigCommands::Show) | None => {
                let cfg: AcexConfig = config::load_config()?;
                let json_output = serde_json::to_string_pretty(&cfg)?;
                println!("{}", json_output);
            }
            Some(ConfigCommands::Path) => {
                let config_path = if let Ok(path) = std::env::var("ACEX_CONFIG_PATH") {
                    PathBuf::from(path)
                } else {
                    confy::get_configuration_file_path("acex", "config")?
                };
                println!("{}", config_path.display());
            }
            Some(ConfigCommands::Set { field, value }) => {
                if !is_valid_config_field(&field) {
                    eprintln!(
                        "Error: Unknown field '{}'. Valid fields are: {}",
                        field, VALID_CONFIG_FIELDS
                    );
                    std::process::exit(1);
                }

                let mut cfg: AcexConfig = config::load_config()?;
                if let Err(e) = set_config_field(&mut cfg, &field, &value) {
                    eprintln!("Error setting field: {}", e);
                    std::process::exit(1);
                }
                config::store_config(&cfg)?;
                println!("Set {} = {}", field, value);
            }
            Some(ConfigCommands::Unset { field }) => {
                if !is_valid_config_field(&field) {
                    eprintln!(
                        "Error: Unknown field '{}'. Valid fields are: {}",
                        field, VALID_CONFIG_FIELDS
                    );
                    std::process::exit(1);
                }

                let mut cfg: AcexConfig = config::load_config()?;
                if let Err(e) = unset_config_field(&mut cfg, &field) {
                    eprintln!("Error unsetting field: {}", e);
                    std::process::exit(1);
                }
                config::store_config(&cfg)?;
                println!("Unset {}", field);
            }
        },
        None => {}
    }

    Ok(())
}
