use dlv_core::{
    models::{AgentConfig, ConfigurationError, RawConfig},
    ports::ConfigProvider,
};
use std::path::{Path, PathBuf};

/// The default prefix of environment overrides
pub const ENV_PREFIX: &str = "DLV";

/// A [`ConfigProvider`] reading a configuration file, then environment
/// overrides.
///
/// Settings absent from both sources take their defaults, except for the
/// three timeouts which are required. Environment variables map onto keys
/// with `__` as the section separator:
///
/// ```bash
/// # timeouts.bid = 500
/// export DLV_TIMEOUTS__BID=500
///
/// # search.seed = 7
/// export DLV_SEARCH__SEED=7
/// ```
#[derive(Clone, Debug)]
pub struct FileSettings {
    path: PathBuf,
    prefix: String,
    environment: Option<config::Map<String, String>>,
}

impl FileSettings {
    /// Read `path` (format given by its extension), overridden by `DLV_*` variables
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefix: ENV_PREFIX.to_owned(),
            environment: None,
        }
    }

    /// Use another prefix for environment overrides
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Read overrides from the given variables instead of the process environment
    pub fn with_environment(
        mut self,
        variables: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.environment = Some(variables.into_iter().collect());
        self
    }

    /// The configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileSettings {
    fn load(&self) -> Result<AgentConfig, ConfigurationError> {
        if !self.path.exists() {
            return Err(ConfigurationError::Unavailable(format!(
                "config file {} does not exist",
                self.path.display()
            )));
        }

        // This maps DLV_TIMEOUTS__BID to timeouts.bid
        let environment = config::Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(self.environment.clone());

        let raw = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()))
            .add_source(environment)
            .build()
            .and_then(|built| built.try_deserialize::<RawConfig>())
            .map_err(|error| match error {
                config::ConfigError::Foreign(error) => {
                    ConfigurationError::Unavailable(error.to_string())
                }
                other => ConfigurationError::Malformed(other.to_string()),
            })?;

        // Validation happens on the way from raw to rich
        AgentConfig::try_from(raw)
    }
}
