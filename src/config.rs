// Configuration: command-line arguments (with environment fallbacks) and
// the resolved `Settings` the rest of the crate works from.

use crate::error::{ClassifyError, Result};
use crate::schema::{
    ImageClassificationParams, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_PREDICTIONS,
};
use clap::{Parser, ValueEnum};
use dialoguer::Input;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_IMAGES_DIR: &str = "assets/images";
const TOKEN_FILE_NAME: &str = ".vertex_classify_token";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Classify local images with a model deployed on a Vertex AI endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "vertex-classify", version)]
#[command(about = "Classify local images with a Vertex AI endpoint", long_about = None)]
pub struct Args {
    /// Google Cloud project ID or number
    #[arg(long, env = "VERTEX_PROJECT")]
    pub project: Option<String>,

    /// Region the endpoint is deployed in
    #[arg(long, env = "VERTEX_LOCATION", default_value = DEFAULT_LOCATION)]
    pub location: String,

    /// ID of the deployed endpoint
    #[arg(long, env = "VERTEX_ENDPOINT_ID")]
    pub endpoint_id: Option<String>,

    /// API host (defaults to `<location>-aiplatform.googleapis.com`)
    #[arg(long, env = "VERTEX_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// Directory holding the images to classify
    #[arg(long, env = "VERTEX_IMAGES_DIR", default_value = DEFAULT_IMAGES_DIR)]
    pub images_dir: PathBuf,

    /// Minimum confidence for a label to be returned
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub confidence_threshold: f64,

    /// Maximum number of labels returned per image
    #[arg(long, default_value_t = DEFAULT_MAX_PREDICTIONS)]
    pub max_predictions: u32,

    /// OAuth2 access token (falls back to ~/.vertex_classify_token)
    #[arg(long, env = "VERTEX_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Report failed images and keep going instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,

    /// Output format for predictions
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Never prompt for missing settings
    #[arg(long)]
    pub no_prompt: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project: String,
    pub location: String,
    pub endpoint_id: String,
    pub api_endpoint: String,
    pub images_dir: PathBuf,
    pub params: ImageClassificationParams,
    pub access_token: Option<String>,
    pub continue_on_error: bool,
    pub format: OutputFormat,
}

impl Settings {
    /// Validate `args`, fill in defaults and ask for the project and endpoint
    /// when they are missing and stdin is a terminal.
    pub fn resolve(args: Args) -> Result<Self> {
        let allow_prompt = !args.no_prompt && std::io::stdin().is_terminal();

        if !(0.0..=1.0).contains(&args.confidence_threshold) {
            return Err(ClassifyError::InvalidSetting {
                name: "confidence-threshold",
                reason: format!("{} is outside [0, 1]", args.confidence_threshold),
            });
        }
        if args.max_predictions == 0 {
            return Err(ClassifyError::InvalidSetting {
                name: "max-predictions",
                reason: "must be at least 1".into(),
            });
        }
        let location = non_empty(Some(args.location)).ok_or(ClassifyError::MissingSetting("location"))?;

        let project = match non_empty(args.project) {
            Some(p) => p,
            None if allow_prompt => prompt("Google Cloud project ID")?,
            None => return Err(ClassifyError::MissingSetting("project")),
        };
        let endpoint_id = match non_empty(args.endpoint_id) {
            Some(e) => e,
            None if allow_prompt => prompt("Endpoint ID")?,
            None => return Err(ClassifyError::MissingSetting("endpoint-id")),
        };

        let api_endpoint = non_empty(args.api_endpoint).unwrap_or_else(|| default_api_endpoint(&location));

        let access_token = match non_empty(args.access_token) {
            Some(t) => Some(t),
            None => load_token(),
        };
        if access_token.is_none() {
            warn!("No access token configured; requests will be sent unauthenticated");
        }

        Ok(Settings {
            project,
            location,
            endpoint_id,
            api_endpoint,
            images_dir: args.images_dir,
            params: ImageClassificationParams::new(args.confidence_threshold, args.max_predictions),
            access_token,
            continue_on_error: args.continue_on_error,
            format: args.format,
        })
    }

    /// Base URL of the prediction service. A configured endpoint that already
    /// carries a scheme is used as is.
    pub fn api_base_url(&self) -> String {
        let endpoint = self.api_endpoint.trim_end_matches('/');
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        }
    }
}

/// Regional API host, e.g. `us-central1-aiplatform.googleapis.com`.
pub fn default_api_endpoint(location: &str) -> String {
    format!("{}-aiplatform.googleapis.com", location)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map(|v| v.trim().to_string())
        .map_err(|e| ClassifyError::Prompt(e.to_string()))
}

/// Location of the token file in the user's home directory.
pub fn token_file_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE_NAME)
}

/// Read a token from `path`, ignoring surrounding whitespace. An absent or
/// empty file yields `None`.
pub fn read_token_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(data) => non_empty(Some(data)),
        Err(e) => {
            debug!("No token read from {}: {}", path.display(), e);
            None
        }
    }
}

fn load_token() -> Option<String> {
    read_token_file(&token_file_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["vertex-classify", "--no-prompt"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_follow_location() {
        let settings = Settings::resolve(parse(&[
            "--project",
            "demo",
            "--endpoint-id",
            "123",
            "--location",
            "europe-west4",
            "--access-token",
            "tok",
        ]))
        .unwrap();
        assert_eq!(settings.api_endpoint, "europe-west4-aiplatform.googleapis.com");
        assert_eq!(
            settings.api_base_url(),
            "https://europe-west4-aiplatform.googleapis.com"
        );
        assert_eq!(settings.params, ImageClassificationParams::default());
        assert_eq!(settings.access_token.as_deref(), Some("tok"));
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let settings = Settings::resolve(parse(&[
            "--project",
            "demo",
            "--endpoint-id",
            "123",
            "--api-endpoint",
            "http://127.0.0.1:9000/",
        ]))
        .unwrap();
        assert_eq!(settings.api_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_project_without_prompt_fails() {
        let err = Settings::resolve(parse(&["--endpoint-id", "123"])).unwrap_err();
        assert!(matches!(err, ClassifyError::MissingSetting("project")));
    }

    #[test]
    fn blank_endpoint_counts_as_missing() {
        let err = Settings::resolve(parse(&["--project", "demo", "--endpoint-id", "  "])).unwrap_err();
        assert!(matches!(err, ClassifyError::MissingSetting("endpoint-id")));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let err = Settings::resolve(parse(&[
            "--project",
            "demo",
            "--endpoint-id",
            "1",
            "--confidence-threshold",
            "1.5",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidSetting { name: "confidence-threshold", .. }
        ));

        let err = Settings::resolve(parse(&[
            "--project",
            "demo",
            "--endpoint-id",
            "1",
            "--max-predictions",
            "0",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidSetting { name: "max-predictions", .. }
        ));
    }

    #[test]
    fn token_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  ya29.abc\n").unwrap();
        assert_eq!(read_token_file(&path).as_deref(), Some("ya29.abc"));

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(read_token_file(&path), None);
        assert_eq!(read_token_file(&dir.path().join("missing")), None);
    }
}
