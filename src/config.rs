use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("either a camera index or an image path must be provided")]
    MissingSource,
    #[error("a camera index and an image path are mutually exclusive")]
    ConflictingSources,
}

/// Where frames come from. Exactly one of the two CLI options selects this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Camera(i32),
    Image(PathBuf),
}

impl SourceConfig {
    pub fn from_options(
        camera: Option<i32>,
        image: Option<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        match (camera, image) {
            (Some(_), Some(_)) => Err(ConfigurationError::ConflictingSources),
            (Some(index), None) => Ok(SourceConfig::Camera(index)),
            (None, Some(path)) => Ok(SourceConfig::Image(path)),
            (None, None) => Err(ConfigurationError::MissingSource),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(
        default = "default_log_level",
        deserialize_with = "deserialize_log_level"
    )]
    pub log_level: LogLevel,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub annotation: AnnotationSettings,
    #[serde(default)]
    pub capture: CaptureSettings,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoverySettings {
    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
        }
    }
}

fn default_document_path() -> PathBuf {
    PathBuf::from("vision_discovery_v1alpha1.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnnotationSettings {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureSettings {
    #[serde(default = "default_window_name")]
    pub window_name: String,
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: i32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            window_name: default_window_name(),
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

fn default_window_name() -> String {
    "monitor".to_string()
}

fn default_frame_delay_ms() -> i32 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "{} is not a supported minimum log level. Use either `debug` or `info`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(
            config::File::from(configuration_directory.join("base.yaml")).required(false),
        )
        .add_source(
            config::Environment::with_prefix("VC")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;

    Ok(settings)
}
