use serde::Deserialize;
use std::path::Path;

/// Global configuration for the edge router
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Route paths
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Where the console bundle lives
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// HTTP port (default: 8787)
    #[serde(default = "default_listen_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_listen_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RoutesConfig {
    /// Liveness probe path (default: /health)
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Prefix the console is served under, without trailing slash (default: /admin)
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,

    /// Store path of the console's HTML shell (default: /index.html)
    #[serde(default = "default_index_document")]
    pub index_document: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            health_path: default_health_path(),
            admin_prefix: default_admin_prefix(),
            index_document: default_index_document(),
        }
    }
}

impl RoutesConfig {
    /// Location the service root redirects to: the admin prefix with a trailing slash
    pub fn redirect_target(&self) -> String {
        format!("{}/", self.admin_prefix)
    }

    /// Validate route paths, returning every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("health_path", &self.health_path),
            ("admin_prefix", &self.admin_prefix),
            ("index_document", &self.index_document),
        ] {
            if !value.starts_with('/') {
                errors.push(format!("routes.{} '{}' must start with '/'", name, value));
            }
        }

        if self.admin_prefix == "/" || self.admin_prefix.ends_with('/') {
            errors.push(format!(
                "routes.admin_prefix '{}' must not end with '/'",
                self.admin_prefix
            ));
        }

        if self.index_document.ends_with('/') {
            errors.push(format!(
                "routes.index_document '{}' must name a file",
                self.index_document
            ));
        }

        if self.health_path == "/" {
            errors.push("routes.health_path must not be '/'".to_string());
        }

        if self.health_path == self.admin_prefix
            || self
                .health_path
                .starts_with(&format!("{}/", self.admin_prefix))
        {
            errors.push(format!(
                "routes.health_path '{}' is shadowed by admin_prefix '{}'",
                self.health_path, self.admin_prefix
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directory holding the pre-built console bundle (default: ./dist)
    #[serde(default = "default_assets_dir")]
    pub dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8787
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_index_document() -> String {
    "/index.html".to_string()
}

fn default_assets_dir() -> String {
    "./dist".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be non-zero".to_string());
        }

        if let Err(route_errors) = self.routes.validate() {
            errors.extend(route_errors);
        }

        if self.assets.dir.trim().is_empty() {
            errors.push("assets.dir must not be empty".to_string());
        }

        if !errors.is_empty() {
            anyhow::bail!("Configuration errors:\n  - {}", errors.join("\n  - "));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind = "127.0.0.1"
port = 8080

[routes]
health_path = "/healthz"
admin_prefix = "/console"
index_document = "/app.html"

[assets]
dir = "/srv/console"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.routes.health_path, "/healthz");
        assert_eq!(config.routes.admin_prefix, "/console");
        assert_eq!(config.routes.index_document, "/app.html");
        assert_eq!(config.routes.redirect_target(), "/console/");
        assert_eq!(config.assets.dir, "/srv/console");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();

        // Should use all defaults
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.routes, RoutesConfig::default());
        assert_eq!(config.routes.health_path, "/health");
        assert_eq!(config.routes.admin_prefix, "/admin");
        assert_eq!(config.routes.index_document, "/index.html");
        assert_eq!(config.routes.redirect_target(), "/admin/");
        assert_eq!(config.assets.dir, "./dist");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_routes_keep_defaults() {
        let toml = r#"
[routes]
admin_prefix = "/ops"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.routes.admin_prefix, "/ops");
        assert_eq!(config.routes.health_path, "/health");
        assert_eq!(config.routes.index_document, "/index.html");
    }

    #[test]
    fn test_validate_paths_need_leading_slash() {
        let routes = RoutesConfig {
            health_path: "health".to_string(),
            admin_prefix: "admin".to_string(),
            index_document: "index.html".to_string(),
        };
        let errors = routes.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.contains("must start with '/'")));
    }

    #[test]
    fn test_validate_admin_prefix_trailing_slash() {
        let mut routes = RoutesConfig::default();
        routes.admin_prefix = "/admin/".to_string();
        let errors = routes.validate().unwrap_err();
        assert!(errors[0].contains("must not end with '/'"));

        routes.admin_prefix = "/".to_string();
        assert!(routes.validate().is_err());
    }

    #[test]
    fn test_validate_health_path_collisions() {
        let mut routes = RoutesConfig::default();
        routes.health_path = "/admin/health".to_string();
        let errors = routes.validate().unwrap_err();
        assert!(errors[0].contains("shadowed by admin_prefix"));

        routes.health_path = "/".to_string();
        assert!(routes.validate().is_err());

        // A sibling path that only shares the prefix text is fine
        routes.health_path = "/administrator-health".to_string();
        assert!(routes.validate().is_ok());
    }

    #[test]
    fn test_validate_multiple_errors() {
        let toml = r#"
[server]
port = 0

[routes]
index_document = "/"

[assets]
dir = " "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port must be non-zero"));
        assert!(err.contains("routes.index_document '/' must name a file"));
        assert!(err.contains("assets.dir must not be empty"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[routes]\nadmin_prefix = \"admin/\"\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }
}
