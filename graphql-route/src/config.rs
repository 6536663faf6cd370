//! Route configuration

use serde::Deserialize;

/// Behaviour switches for a mounted GraphQL route
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Serve the GraphiQL explorer to browsers on GET without a query
    pub explorer: bool,
    /// Title of the explorer page
    pub explorer_title: Option<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            explorer: true,
            explorer_title: None,
        }
    }
}

impl RouteConfig {
    /// Enable or disable the explorer page
    pub fn with_explorer(mut self, explorer: bool) -> Self {
        self.explorer = explorer;
        self
    }

    /// Set the explorer page title
    pub fn with_explorer_title(mut self, title: impl Into<String>) -> Self {
        self.explorer_title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_config_default() {
        let config = RouteConfig::default();
        assert!(config.explorer);
        assert_eq!(config.explorer_title, None);
    }

    #[test]
    fn test_route_config_chaining() {
        let config = RouteConfig::default()
            .with_explorer(false)
            .with_explorer_title("Ledger");
        assert!(!config.explorer);
        assert_eq!(config.explorer_title.as_deref(), Some("Ledger"));
    }

    #[test]
    fn test_route_config_deserialize_partial() {
        let config: RouteConfig = serde_json::from_str(r#"{"explorer_title":"API"}"#).unwrap();
        assert!(config.explorer);
        assert_eq!(config.explorer_title.as_deref(), Some("API"));
    }
}
