//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Teams to import at startup, if set.
    pub roster_csv: Option<PathBuf>,
    /// Name of the tournament created at startup.
    pub tournament_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            roster_csv: None,
            tournament_name: "Tournament".to_string(),
        }
    }
}

impl Config {
    /// HOST, PORT, ROSTER_CSV, TOURNAMENT_NAME. Missing or unparsable values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            roster_csv: get("ROSTER_CSV").map(PathBuf::from),
            tournament_name: get("TOURNAMENT_NAME").unwrap_or(defaults.tournament_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn falls_back_to_defaults() {
        let vars: HashMap<&str, &str> = [("PORT", "not-a-port"), ("HOST", "  ")].into();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let vars: HashMap<&str, &str> = [
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("ROSTER_CSV", "teams.csv"),
            ("TOURNAMENT_NAME", "Spring Cup"),
        ]
        .into();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.roster_csv, Some(PathBuf::from("teams.csv")));
        assert_eq!(config.tournament_name, "Spring Cup");
    }
}
