//! Colony configuration

use std::path::{Path, PathBuf};

use colony_domains::{DomainPolicy, MaxDepth, RootChildrenOnly};
use colony_types::{Amount, TokenId, WAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot find config directory")]
    NoConfigDir,

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which creation policy guards `add_domain`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DomainPolicyConfig {
    #[default]
    RootChildrenOnly,
    MaxDepth { max_depth: u32 },
}

impl DomainPolicyConfig {
    pub fn build(self) -> Box<dyn DomainPolicy> {
        match self {
            DomainPolicyConfig::RootChildrenOnly => Box::new(RootChildrenOnly),
            DomainPolicyConfig::MaxDepth { max_depth } => Box::new(MaxDepth::new(max_depth)),
        }
    }
}

/// Colony configuration.
///
/// Token quantities are whole tokens; the kernel scales them by [`WAD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Colony name, bound into every signed payload.
    pub name: String,

    /// Symbol of the colony's native token.
    pub native_token: String,

    /// Tokens minted to the founder at bootstrap.
    pub initial_supply: u64,

    /// Tokens the founder pays into the colony at bootstrap.
    pub initial_funding: u64,

    /// One in `reward_inverse` of every incoming payment goes to the rewards pot.
    pub reward_inverse: u64,

    /// Label the founder's signing key is derived from.
    pub founder: String,

    pub domain_policy: DomainPolicyConfig,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            name: "meta".into(),
            native_token: "CLNY".into(),
            initial_supply: 10_000_000,
            initial_funding: 1_000,
            reward_inverse: 100,
            founder: "founder".into(),
            domain_policy: DomainPolicyConfig::default(),
        }
    }
}

impl ColonyConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&contents)?
        } else {
            ColonyConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `<config_dir>/colony/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("colony").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        if self.native_token.trim().is_empty() {
            return Err(ConfigError::Invalid("native_token must not be empty".into()));
        }
        if self.reward_inverse == 0 {
            return Err(ConfigError::Invalid("reward_inverse must be positive".into()));
        }
        if let DomainPolicyConfig::MaxDepth { max_depth: 0 } = self.domain_policy {
            return Err(ConfigError::Invalid("max_depth must be positive".into()));
        }
        if self.initial_funding > self.initial_supply {
            return Err(ConfigError::Invalid(format!(
                "initial_funding {} exceeds initial_supply {}",
                self.initial_funding, self.initial_supply
            )));
        }
        Ok(())
    }

    pub fn token(&self) -> TokenId {
        TokenId::new(self.native_token.clone())
    }

    pub fn initial_supply_amount(&self) -> Amount {
        Amount::from(self.initial_supply) * WAD
    }

    pub fn initial_funding_amount(&self) -> Amount {
        Amount::from(self.initial_funding) * WAD
    }
}
