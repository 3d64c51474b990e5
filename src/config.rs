use std::path::PathBuf;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// JSON document that seeds the in-memory host. Empty host when unset.
    pub seed_path: Option<PathBuf>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            seed_path: lookup("HOST_SEED_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.http_host, "0.0.0.0");
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.seed_path, None);
        assert_eq!(cfg.environment, "development");
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("HTTP_PORT", "9000"),
            ("HOST_SEED_PATH", "demos/seed.json"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(cfg.http_port, 9000);
        assert_eq!(cfg.seed_path, Some(PathBuf::from("demos/seed.json")));
        assert_eq!(cfg.environment, "production");
    }

    #[test]
    fn test_bad_port_falls_back() {
        assert_eq!(config(&[("HTTP_PORT", "eighty")]).http_port, 8080);
    }
}
