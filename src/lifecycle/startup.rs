//! Startup orchestration.
//!
//! # Responsibilities
//! - Read the optional config file
//! - Apply command-line overrides
//! - Validate the final configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Overrides are applied before validation so they are checked too

use std::path::Path;

use crate::config::loader::{read_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::RelayConfig;

/// Settings given on the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub prefix: Option<String>,
    pub mirror_mode: bool,
}

impl Overrides {
    fn apply(&self, config: &mut RelayConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.relay.prefix = prefix.clone();
        }
        if self.mirror_mode {
            config.relay.mirror_mode = true;
        }
    }
}

/// Build the configuration the process will run with.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, &Overrides::default()).unwrap();
        assert_eq!(config.relay.prefix, "/");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:7000"

            [relay]
            prefix = "/gh/"
            "#
        )
        .unwrap();

        let overrides = Overrides {
            bind_address: Some("127.0.0.1:7001".to_string()),
            prefix: None,
            mirror_mode: true,
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:7001");
        assert_eq!(config.relay.prefix, "/gh/");
        assert!(config.relay.mirror_mode);
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = Overrides {
            prefix: Some("gh".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }
}
