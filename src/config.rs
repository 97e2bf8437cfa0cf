/// Command line and environment configuration
///
/// Values come from (highest priority first) command line flags, process
/// environment, and a `.env` file loaded by `main` before parsing.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ReviewError;

/// Database holding both submission collections
pub const DEFAULT_DATABASE: &str = "UWguesser";

/// Base map shown under the location marker, relative to the working directory
pub const DEFAULT_CAMPUS_MAP: &str = "uw campus map.png";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "submission-approver")]
#[command(about = "Approve or reject pending submissions with a single keypress")]
#[command(version)]
pub struct Args {
    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    /// Database name
    #[arg(long, default_value = DEFAULT_DATABASE, env = "APPROVER_DATABASE")]
    pub database: String,

    /// PEM bundle of trusted certificate authorities for the database connection
    #[arg(long, env = "MONGODB_TLS_CA_FILE")]
    pub tls_ca_file: Option<PathBuf>,

    /// What to do when a single record cannot be shown
    #[arg(long, value_enum, default_value_t = FailurePolicy::Skip)]
    pub on_error: FailurePolicy,

    /// Image download timeout in seconds (0 = wait forever)
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    #[command(subcommand)]
    pub queue: Queue,
}

/// Which submission queue to review
#[derive(Subcommand, Debug, Clone)]
pub enum Queue {
    /// Review submitted locations (photo + marker on the campus map)
    Locations {
        /// Path to the campus map image
        #[arg(long, default_value = DEFAULT_CAMPUS_MAP)]
        campus_map: PathBuf,

        /// How stored coordinates are interpreted
        #[arg(long, value_enum, default_value_t = CoordinateScale::Fraction)]
        coordinates: CoordinateScale,

        /// Collection name
        #[arg(long, default_value = "base_locations")]
        collection: String,
    },
    /// Review submitted posters
    Posters {
        /// Collection name
        #[arg(long, default_value = "posters")]
        collection: String,
    },
}

/// The two kinds of submissions this tool moderates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Location,
    Poster,
}

/// Interpretation of `xCoordinate`/`yCoordinate`
///
/// Submissions have been stored with both conventions, so the choice is left
/// to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoordinateScale {
    /// Values are fractions of the map size in [0, 1]
    Fraction,
    /// Values are percentages of the map size in [0, 100]
    Percent,
}

impl CoordinateScale {
    /// Convert a stored value to a fraction of the map dimension
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            Self::Fraction => value,
            Self::Percent => value / 100.0,
        }
    }
}

/// Per-record failure handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Log the failure, leave the record pending and move on
    Skip,
    /// Stop the session with the error
    Abort,
}

/// Connection parameters for the record store
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub tls_ca_file: Option<PathBuf>,
}

/// Behaviour of the review loop
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    pub variant: Variant,
    pub campus_map: PathBuf,
    pub coordinates: CoordinateScale,
    pub on_error: FailurePolicy,
    /// `None` disables the timeout
    pub fetch_timeout: Option<Duration>,
}

/// Validated configuration for one session
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub review: ReviewSettings,
}

impl Settings {
    /// Validate parsed arguments
    pub fn from_args(args: Args) -> Result<Self, ReviewError> {
        let uri = args
            .mongodb_uri
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| {
                ReviewError::config("MONGODB_URI is not set (pass --mongodb-uri or add it to .env)")
            })?;

        let (variant, collection, campus_map, coordinates) = match args.queue {
            Queue::Locations {
                campus_map,
                coordinates,
                collection,
            } => (Variant::Location, collection, campus_map, coordinates),
            // Posters never look at the map or coordinates
            Queue::Posters { collection } => (
                Variant::Poster,
                collection,
                PathBuf::from(DEFAULT_CAMPUS_MAP),
                CoordinateScale::Fraction,
            ),
        };

        let fetch_timeout = match args.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Settings {
            database: DatabaseSettings {
                uri,
                database: args.database,
                collection,
                tls_ca_file: args.tls_ca_file,
            },
            review: ReviewSettings {
                variant,
                campus_map,
                coordinates,
                on_error: args.on_error,
                fetch_timeout,
            },
        })
    }
}
