use crate::config::EngineConfig;
use crate::error::{Result, ThinFilmError};
use crate::free_carrier::{FreeCarrierModel, MobilityModel};
use crate::material::MaterialRegistry;
use crate::source::{DirectorySource, MaterialSource};

/// The main interface: one evaluation context owning its configuration,
/// material source, material cache and free-carrier model.
///
/// Independent engines share no state.
pub struct ThinFilm {
    pub(crate) config: EngineConfig,
    pub(crate) source: Box<dyn MaterialSource>,
    pub(crate) registry: MaterialRegistry,
    pub(crate) free_carrier: FreeCarrierModel,
}

impl ThinFilm {
    /// Create an engine reading materials from `config.database_dir`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let dir = config.database_dir.clone().ok_or_else(|| {
            ThinFilmError::Config("no material database directory configured".to_string())
        })?;
        Ok(Self::with_source(config, DirectorySource::new(dir)))
    }

    /// Create an engine reading materials from any source.
    pub fn with_source(config: EngineConfig, source: impl MaterialSource + 'static) -> Self {
        let free_carrier = FreeCarrierModel::new(config.effective_mass, config.donor_species);
        ThinFilm {
            config,
            source: Box::new(source),
            registry: MaterialRegistry::default(),
            free_carrier,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Change the mobility model used by later free-carrier corrections.
    pub fn set_mobility_model(&mut self, model: MobilityModel) {
        self.config.mobility_model = model;
    }

    pub fn free_carrier(&self) -> &FreeCarrierModel {
        &self.free_carrier
    }

    /// Free-carrier absorption coefficient (cm⁻¹) with the configured
    /// mobility model.
    ///
    /// # Arguments
    /// * `doping` - Net doping in cm⁻³ (negative = n-type)
    /// * `excess` - Excess carrier density in cm⁻³
    /// * `temperature` - Temperature in K
    /// * `wavelength_um` - Wavelength in µm
    pub fn alpha(&self, doping: f64, excess: f64, temperature: f64, wavelength_um: f64) -> f64 {
        self.free_carrier.alpha(
            doping,
            excess,
            temperature,
            wavelength_um,
            self.config.mobility_model,
        )
    }

    /// Free-carrier extinction coefficient with the configured mobility model.
    pub fn k(&self, doping: f64, excess: f64, temperature: f64, wavelength_um: f64) -> f64 {
        self.free_carrier.k(
            doping,
            excess,
            temperature,
            wavelength_um,
            self.config.mobility_model,
        )
    }
}

impl std::fmt::Debug for ThinFilm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThinFilm")
            .field("config", &self.config)
            .field("materials", &self.registry.len())
            .finish_non_exhaustive()
    }
}
