use crate::workflows::evaluation::{EvaluationPolicy, ScoreWeights};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub evaluation: EvaluationPolicy,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let evaluation = load_evaluation_policy()?;

        let projects_csv = env::var("APP_PROJECTS_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            evaluation,
            catalog: CatalogConfig { projects_csv },
        })
    }
}

fn load_evaluation_policy() -> Result<EvaluationPolicy, ConfigError> {
    let defaults = EvaluationPolicy::default();

    let min_score = parse_score("APP_SCORE_MIN", defaults.min_score)?;
    let max_score = parse_score("APP_SCORE_MAX", defaults.max_score)?;
    if min_score >= max_score {
        return Err(ConfigError::InvalidScoreRange {
            min: min_score,
            max: max_score,
        });
    }

    let feedback_max_chars = match env::var("APP_FEEDBACK_MAX_CHARS") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(ConfigError::InvalidFeedbackLimit)?,
        Err(_) => defaults.feedback_max_chars,
    };

    let weights = load_score_weights(&defaults.weights)?;

    Ok(EvaluationPolicy {
        min_score,
        max_score,
        feedback_max_chars,
        weights,
    })
}

fn load_score_weights(defaults: &ScoreWeights) -> Result<ScoreWeights, ConfigError> {
    let weights = ScoreWeights {
        technical_skills: parse_weight("APP_WEIGHT_TECHNICAL", defaults.technical_skills)?,
        communication: parse_weight("APP_WEIGHT_COMMUNICATION", defaults.communication)?,
        teamwork: parse_weight("APP_WEIGHT_TEAMWORK", defaults.teamwork)?,
        punctuality: parse_weight("APP_WEIGHT_PUNCTUALITY", defaults.punctuality)?,
    };

    let total =
        weights.technical_skills + weights.communication + weights.teamwork + weights.punctuality;
    if total <= 0.0 {
        return Err(ConfigError::InvalidWeightTotal);
    }
    Ok(weights)
}

fn parse_weight(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidWeight { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_score(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidScoreBound { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Optional seed data for the project catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub projects_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScoreBound { name: &'static str, value: String },
    InvalidScoreRange { min: f64, max: f64 },
    InvalidFeedbackLimit,
    InvalidWeight { name: &'static str, value: String },
    InvalidWeightTotal,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScoreBound { name, value } => {
                write!(f, "{name} must be a finite number (got '{value}')")
            }
            ConfigError::InvalidScoreRange { min, max } => write!(
                f,
                "APP_SCORE_MIN ({min}) must be lower than APP_SCORE_MAX ({max})"
            ),
            ConfigError::InvalidFeedbackLimit => {
                write!(f, "APP_FEEDBACK_MAX_CHARS must be a positive integer")
            }
            ConfigError::InvalidWeight { name, value } => {
                write!(f, "{name} must be a non-negative number (got '{value}')")
            }
            ConfigError::InvalidWeightTotal => {
                write!(f, "APP_WEIGHT_* values must not all be zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScoreBound { .. }
            | ConfigError::InvalidScoreRange { .. }
            | ConfigError::InvalidFeedbackLimit
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidWeightTotal => None,
        }
    }
}
