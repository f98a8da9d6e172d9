use crate::models::{AgentConfig, ConfigurationError};

/// The configuration collaborator, read once during setup.
pub trait ConfigProvider {
    /// Produce a validated configuration, or explain why none is available
    fn load(&self) -> Result<AgentConfig, ConfigurationError>;
}

// A configuration that is already in hand is its own provider.
impl ConfigProvider for AgentConfig {
    fn load(&self) -> Result<AgentConfig, ConfigurationError> {
        self.validate()?;
        Ok(self.clone())
    }
}
