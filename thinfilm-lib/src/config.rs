//! Engine configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_N_DOPING, DEFAULT_MAX_P_DOPING, DEFAULT_MAX_SUBLAYERS};
use crate::error::{Result, ThinFilmError};
use crate::free_carrier::{DonorSpecies, EffectiveMass, MobilityModel};
use crate::layers::DopingLimits;

/// Settings for one [`ThinFilm`](crate::ThinFilm) engine.
///
/// ```toml
/// database_dir = "/usr/share/thinfilm/nk"
/// mobility_model = "klaassen"
/// effective_mass = "dual-band"
/// donor_species = "arsenic"
/// max_n_doping = 3e20
/// max_p_doping = 1e20
/// max_sublayers = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory holding one nk text file per material.
    pub database_dir: Option<PathBuf>,
    pub mobility_model: MobilityModel,
    pub effective_mass: EffectiveMass,
    pub donor_species: DonorSpecies,
    /// Cap on n-type concentration (cm⁻³).
    pub max_n_doping: f64,
    /// Cap on p-type concentration (cm⁻³).
    pub max_p_doping: f64,
    /// Most slices a single doping profile may expand into.
    pub max_sublayers: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_dir: None,
            mobility_model: MobilityModel::default(),
            effective_mass: EffectiveMass::default(),
            donor_species: DonorSpecies::default(),
            max_n_doping: DEFAULT_MAX_N_DOPING,
            max_p_doping: DEFAULT_MAX_P_DOPING,
            max_sublayers: DEFAULT_MAX_SUBLAYERS,
        }
    }
}

impl EngineConfig {
    pub fn with_database_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.database_dir = Some(dir.into());
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| ThinFilmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn doping_limits(&self) -> DopingLimits {
        DopingLimits {
            max_n: self.max_n_doping.abs(),
            max_p: self.max_p_doping.abs(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("max_n_doping", self.max_n_doping),
            ("max_p_doping", self.max_p_doping),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ThinFilmError::Config(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.max_sublayers == 0 {
            return Err(ThinFilmError::Config(
                "max_sublayers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
