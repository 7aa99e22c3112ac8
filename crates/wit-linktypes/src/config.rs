//! Controller Configuration

/// Link type controller settings with environment variable overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Cache-Control for list responses (env: WIT_CACHE_CONTROL_LINK_TYPES)
    pub cache_control_link_types: String,

    /// Cache-Control for single responses (env: WIT_CACHE_CONTROL_LINK_TYPE)
    pub cache_control_link_type: String,

    /// Allow create, update and delete (env: WIT_LINK_TYPE_MUTATIONS)
    pub mutations_enabled: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cache_control_link_types: "private,max-age=2".to_string(),
            cache_control_link_type: "private,max-age=2".to_string(),
            mutations_enabled: false,
        }
    }
}

impl ControllerConfig {
    /// Create configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("WIT_CACHE_CONTROL_LINK_TYPES") {
            config.cache_control_link_types = value;
        }

        if let Ok(value) = std::env::var("WIT_CACHE_CONTROL_LINK_TYPE") {
            config.cache_control_link_type = value;
        }

        if let Ok(value) = std::env::var("WIT_LINK_TYPE_MUTATIONS") {
            if let Ok(parsed) = value.parse::<bool>() {
                config.mutations_enabled = parsed;
            }
        }

        config
    }
}
