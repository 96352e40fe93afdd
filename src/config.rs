//! Configuration for Rotunda
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::path::PathBuf;

/// Rotunda - request and feedback lifecycle engine for a citizen services portal
#[derive(Parser, Debug, Clone)]
#[command(name = "rotunda")]
#[command(about = "Request and feedback lifecycle engine for a citizen services portal")]
pub struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "rotunda")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Path for the JSONL audit log (disabled when unset)
    #[arg(long, env = "AUDIT_LOG_PATH")]
    pub audit_log_path: Option<PathBuf>,

    /// How many reference numbers to try before giving up on a collision
    #[arg(long, env = "REFERENCE_MAX_ATTEMPTS", default_value = "3")]
    pub reference_max_attempts: u32,
}

impl Args {
    /// Validate configuration beyond what clap can express
    pub fn validate(&self) -> Result<(), String> {
        if self.reference_max_attempts == 0 {
            return Err("REFERENCE_MAX_ATTEMPTS must be at least 1".to_string());
        }
        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let args = Args::parse_from(["rotunda"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.reference_max_attempts, 3);
        assert_eq!(args.mongodb_db, "rotunda");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let args = Args::parse_from(["rotunda", "--reference-max-attempts", "0"]);
        assert!(args.validate().is_err());
    }
}
