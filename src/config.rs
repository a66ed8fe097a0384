//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::model::Day;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Directory holding the built web client, served as a fallback
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Genetic algorithm parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_population")]
    pub population_size: usize,

    #[serde(default = "default_generations")]
    pub generations: usize,

    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,

    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,

    /// Stop after this many generations without improvement (0 disables)
    #[serde(default = "default_early_stop")]
    pub early_stop_generations: usize,

    #[serde(default = "default_elitism")]
    pub elitism: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub weights: WeightsConfig,
}

fn default_population() -> usize {
    50
}

fn default_generations() -> usize {
    100
}

fn default_crossover_rate() -> f64 {
    0.9
}

fn default_mutation_rate() -> f64 {
    0.1
}

fn default_tournament_size() -> usize {
    3
}

fn default_early_stop() -> usize {
    20
}

fn default_elitism() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: default_population(),
            generations: default_generations(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            tournament_size: default_tournament_size(),
            early_stop_generations: default_early_stop(),
            elitism: default_elitism(),
            seed: default_seed(),
            weights: WeightsConfig::default(),
        }
    }
}

/// Penalty weights. Hard weights must dominate soft ones.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_clash_weight")]
    pub room_clash: f64,

    #[serde(default = "default_clash_weight")]
    pub group_clash: f64,

    #[serde(default = "default_placement_weight")]
    pub wrong_day: f64,

    #[serde(default = "default_placement_weight")]
    pub wrong_hour: f64,

    #[serde(default = "default_capacity_weight")]
    pub capacity: f64,

    #[serde(default = "default_precedence_weight")]
    pub precedence: f64,

    #[serde(default = "default_idle_gap_weight")]
    pub idle_gap: f64,

    /// Sessions of one course split into non-adjacent hours
    #[serde(default = "default_non_consecutive_weight")]
    pub non_consecutive: f64,
}

fn default_clash_weight() -> f64 {
    1000.0
}

fn default_placement_weight() -> f64 {
    100.0
}

fn default_capacity_weight() -> f64 {
    500.0
}

fn default_precedence_weight() -> f64 {
    10.0
}

fn default_idle_gap_weight() -> f64 {
    8.0
}

fn default_non_consecutive_weight() -> f64 {
    5.0
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            room_clash: default_clash_weight(),
            group_clash: default_clash_weight(),
            wrong_day: default_placement_weight(),
            wrong_hour: default_placement_weight(),
            capacity: default_capacity_weight(),
            precedence: default_precedence_weight(),
            idle_gap: default_idle_gap_weight(),
            non_consecutive: default_non_consecutive_weight(),
        }
    }
}

/// Teaching week layout and study-year rules
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_academic_year")]
    pub academic_year: i32,

    /// Curriculum slot counts are per trimester; this turns them into weekly sessions
    #[serde(default = "default_weeks_per_trimester")]
    pub weeks_per_trimester: u32,

    #[serde(default = "default_max_study_year")]
    pub max_study_year: u32,

    #[serde(default = "default_days")]
    pub days: Vec<Day>,

    /// First session start hour
    #[serde(default = "default_first_hour")]
    pub first_hour: u8,

    /// Last session start hour
    #[serde(default = "default_last_hour")]
    pub last_hour: u8,

    /// Last start hour for first-year groups
    #[serde(default = "default_first_year_last_hour")]
    pub first_year_last_hour: u8,

    #[serde(default = "default_year_excluded_days")]
    pub year_excluded_days: Vec<YearDays>,
}

/// Days a study year may not be scheduled on
#[derive(Debug, Clone, Deserialize)]
pub struct YearDays {
    pub year: u32,
    pub days: Vec<Day>,
}

fn default_academic_year() -> i32 {
    2024
}

fn default_weeks_per_trimester() -> u32 {
    10
}

fn default_max_study_year() -> u32 {
    3
}

fn default_days() -> Vec<Day> {
    Day::ALL.to_vec()
}

fn default_first_hour() -> u8 {
    8
}

fn default_last_hour() -> u8 {
    19
}

fn default_first_year_last_hour() -> u8 {
    13
}

fn default_year_excluded_days() -> Vec<YearDays> {
    vec![
        YearDays {
            year: 2,
            days: vec![Day::Sat],
        },
        YearDays {
            year: 3,
            days: vec![Day::Thu],
        },
    ]
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            academic_year: default_academic_year(),
            weeks_per_trimester: default_weeks_per_trimester(),
            max_study_year: default_max_study_year(),
            days: default_days(),
            first_hour: default_first_hour(),
            last_hour: default_last_hour(),
            first_year_last_hour: default_first_year_last_hour(),
            year_excluded_days: default_year_excluded_days(),
        }
    }
}

/// Input workbook filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetConfig {
    /// Room codes never used for scheduling
    #[serde(default)]
    pub excluded_rooms: Vec<String>,

    /// Courses whose name contains any of these (case-insensitive) are skipped
    #[serde(default)]
    pub excluded_courses: Vec<String>,

    #[serde(default = "default_headcount")]
    pub default_headcount: u32,
}

fn default_headcount() -> u32 {
    25
}

/// Where generated files are written
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "./outputs".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber. `RUST_LOG` wins over the configured level.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("timetabler={},tower_http=info", self.level)));

        let registry = tracing_subscriber::registry().with(filter);
        if self.format.eq_ignore_ascii_case("json") {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("timetabler").join("config.toml")),
            Some(PathBuf::from("/etc/timetabler/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TIMETABLER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TIMETABLER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(dir) = std::env::var("TIMETABLER_STATIC_DIR") {
            self.server.static_dir = Some(dir);
        }

        if let Ok(dir) = std::env::var("TIMETABLER_OUTPUT_DIR") {
            self.output.dir = dir;
        }

        if let Ok(seed) = std::env::var("TIMETABLER_SEED") {
            if let Ok(s) = seed.parse() {
                self.solver.seed = s;
            }
        }

        if let Ok(level) = std::env::var("TIMETABLER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TIMETABLER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Timetabler Configuration
#
# Environment variables override these settings:
# - TIMETABLER_HOST
# - TIMETABLER_PORT
# - TIMETABLER_STATIC_DIR
# - TIMETABLER_OUTPUT_DIR
# - TIMETABLER_SEED
# - TIMETABLER_LOG_LEVEL
# - TIMETABLER_LOG_FORMAT

[server]
host = "0.0.0.0"
port = 5000

# Largest accepted upload (MB)
max_upload_mb = 50

# Built web client (trunk dist directory)
# static_dir = "./timetabler-ui/dist"

[solver]
population_size = 50
generations = 100
crossover_rate = 0.9
mutation_rate = 0.1
tournament_size = 3

# Stop after this many generations without improvement (0 disables)
early_stop_generations = 20

# Best individuals carried unchanged into the next generation
elitism = 1

seed = 42

[solver.weights]
# Hard constraints
room_clash = 1000.0
group_clash = 1000.0
wrong_day = 100.0
wrong_hour = 100.0
capacity = 500.0

# Soft constraints
precedence = 10.0
idle_gap = 8.0
non_consecutive = 5.0

[calendar]
academic_year = 2024
weeks_per_trimester = 10
max_study_year = 3
days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
first_hour = 8
last_hour = 19
first_year_last_hour = 13

[[calendar.year_excluded_days]]
year = 2
days = ["Sat"]

[[calendar.year_excluded_days]]
year = 3
days = ["Thu"]

[dataset]
excluded_rooms = []
excluded_courses = []
default_headcount = 25

[output]
dir = "./outputs"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
