use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::coordinates::{resolve_target, Coordinates};
use crate::error::PipelineResult;

#[derive(Parser)]
#[command(name = "skyscribe")]
#[command(
    about = "Describe a patch of sky: survey cutout, catalog objects and a model-written summary",
    long_about = None
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and print the description
    Describe {
        #[command(flatten)]
        target: CoordinateArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List catalog objects of interest around the coordinates
    Catalog {
        #[command(flatten)]
        target: CoordinateArgs,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Fetch the survey cutout only and save it as the raw artifact
    Fetch {
        #[command(flatten)]
        target: CoordinateArgs,
    },

    /// List the preset places
    Places {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Serve the pipeline over a JSON HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

/// Where to look: explicit coordinates or a preset place.
#[derive(Args, Debug, Clone)]
pub struct CoordinateArgs {
    /// Right ascension in degrees
    #[arg(
        long,
        allow_hyphen_values = true,
        requires = "dec",
        conflicts_with = "place"
    )]
    pub ra: Option<String>,

    /// Declination in degrees
    #[arg(
        long,
        allow_hyphen_values = true,
        requires = "ra",
        conflicts_with = "place"
    )]
    pub dec: Option<String>,

    /// Preset place name, see `skyscribe places`
    #[arg(long)]
    pub place: Option<String>,
}

impl CoordinateArgs {
    pub fn resolve(&self) -> PipelineResult<Coordinates> {
        resolve_target(
            self.ra.as_deref(),
            self.dec.as_deref(),
            self.place.as_deref(),
        )
    }
}

/// Command-line and environment overrides applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// API key for the chat completion service
    #[arg(
        long,
        global = true,
        env = "SKYSCRIBE_CHAT_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    /// Chat model name
    #[arg(long, global = true, env = "SKYSCRIBE_MODEL")]
    pub chat_model: Option<String>,

    /// ONNX detection model file
    #[arg(long, global = true)]
    pub detector_model: Option<PathBuf>,

    /// Directory holding the raw and annotated cutouts
    #[arg(long, global = true)]
    pub artifact_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.chat.api_key = Some(key.clone());
        }
        if let Some(model) = &self.chat_model {
            config.chat.model = model.clone();
        }
        if let Some(path) = &self.detector_model {
            config.detection.model_path = path.clone();
        }
        if let Some(dir) = &self.artifact_dir {
            config.artifacts.dir = dir.clone();
        }
    }
}
