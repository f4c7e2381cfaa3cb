use clap::Parser;
use std::path::PathBuf;

/// Capture an image from a camera or a file and annotate it with a remote
/// vision service.
#[derive(Debug, Parser)]
#[command(name = "vision_capture", version)]
pub struct Cli {
    /// API key for the annotation service
    #[arg(short = 'k', long = "api-key", value_name = "API_KEY")]
    pub api_key: String,

    /// Camera device index to capture from
    #[arg(short = 'c', long = "camera", value_name = "INDEX")]
    pub camera: Option<i32>,

    /// Path to a static image to annotate instead of a camera feed
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Maximum number of results requested per feature
    #[arg(short = 'm', long = "max-results", value_name = "N")]
    pub max_results: Option<u32>,
}
