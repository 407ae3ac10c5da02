//! Free-carrier absorption in silicon.
//!
//! Absorption follows Schroder, *Semiconductor Material and Device
//! Characterization* (1990), p. 83. The default mobility model is the
//! temperature and dual-dopant parameterization of Reggiani et al.,
//! IEEE Trans. Electron Devices 49(3), 2002.

use std::f64::consts::PI;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThinFilmError};
use crate::mobility_db::{ARSENIC, BORON, MOBILITY_300K, MobilityParams, PHOSPHORUS};
use crate::spline::Spline;

/// Ceiling on the absorption coefficient (cm⁻¹).
///
/// Uncapped, the model predicts a fully reflecting surface as silicon
/// approaches melting, which is not observed. 3e4 cm⁻¹ gives 10-11%
/// reflectance near Brewster's angle, pending better measurements.
pub const MAX_ALPHA: f64 = 3.0e4;

/// Carrier densities are clamped here (cm⁻³).
pub const MAX_CARRIER_DENSITY: f64 = 5.0e21;

/// Valid temperature range of the model (K).
pub const MIN_TEMPERATURE: f64 = 77.0;
pub const MAX_TEMPERATURE: f64 = 1683.0;

const K_BOLTZMANN_EV: f64 = 8.62e-5;
const NC_300: f64 = 2.8e19;
const NV_300: f64 = 1.04e19;
const EG_0: f64 = 1.1255;
const EG_ALPHA: f64 = 4.73e-4;
const EG_BETA: f64 = 636.0;

/// Index of silicon over 4-12 µm
const N_BACKGROUND: f64 = 3.412;

/// q³/(4π²ε₀c³m₀²) in the units of the absorption formula
const K_PHYS: f64 = 5.27e-17;

const N_MSTAR_L: f64 = 0.19;
const N_MSTAR_T: f64 = 0.98;
const P_MSTAR_H: f64 = 0.50;
const P_MSTAR_L: f64 = 0.16;
const N_DEGENERACY_L: f64 = 4.0;
const N_DEGENERACY_T: f64 = 2.0;
const P_DEGENERACY_H: f64 = 4.0;
const P_DEGENERACY_L: f64 = 2.0;

/// Mobility sub-model used in the absorption calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MobilityModel {
    /// Power-law fit in temperature and concentration
    Simple,
    /// Spline through tabulated 300 K mobilities
    Spline,
    /// Full temperature and dual-dopant model
    #[default]
    Klaassen,
}

impl FromStr for MobilityModel {
    type Err = ThinFilmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(MobilityModel::Simple),
            "spline" => Ok(MobilityModel::Spline),
            "klaassen" | "reggiani" => Ok(MobilityModel::Klaassen),
            _ => Err(ThinFilmError::Parse(format!("unknown mobility model: {s}"))),
        }
    }
}

/// Hole effective-mass averaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectiveMass {
    /// Light and heavy hole bands both contribute
    #[default]
    DualBand,
    /// Heavy hole band only
    HeavyHole,
}

impl FromStr for EffectiveMass {
    type Err = ThinFilmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dual-band" | "dual" => Ok(EffectiveMass::DualBand),
            "heavy-hole" | "heavy" => Ok(EffectiveMass::HeavyHole),
            _ => Err(ThinFilmError::Parse(format!("unknown effective mass mode: {s}"))),
        }
    }
}

/// Donor species for the electron mobility coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonorSpecies {
    #[default]
    Arsenic,
    Phosphorus,
}

impl FromStr for DonorSpecies {
    type Err = ThinFilmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "arsenic" | "as" => Ok(DonorSpecies::Arsenic),
            "phosphorus" | "p" => Ok(DonorSpecies::Phosphorus),
            _ => Err(ThinFilmError::Parse(format!("unknown donor species: {s}"))),
        }
    }
}

/// Temperature-dependent band gap of silicon (eV).
pub fn band_gap(temperature: f64) -> f64 {
    EG_0 - EG_ALPHA * temperature * temperature / (EG_BETA + temperature)
}

/// Intrinsic carrier product ni² (cm⁻⁶).
pub fn intrinsic_density_squared(temperature: f64) -> f64 {
    NC_300 * NV_300
        * (temperature / 300.0).powi(3)
        * (-band_gap(temperature) / (K_BOLTZMANN_EV * temperature)).exp()
}

/// Free-carrier absorption model with its effective-mass mode and the
/// lazily fitted mobility splines.
#[derive(Debug)]
pub struct FreeCarrierModel {
    effective_mass: EffectiveMass,
    donor: DonorSpecies,
    electron_spline: OnceLock<Option<Spline>>,
    hole_spline: OnceLock<Option<Spline>>,
}

impl FreeCarrierModel {
    pub fn new(effective_mass: EffectiveMass, donor: DonorSpecies) -> Self {
        FreeCarrierModel {
            effective_mass,
            donor,
            electron_spline: OnceLock::new(),
            hole_spline: OnceLock::new(),
        }
    }

    pub fn effective_mass_mode(&self) -> EffectiveMass {
        self.effective_mass
    }

    /// Conductivity effective masses (electron, hole) in units of m₀.
    pub fn effective_masses(&self) -> (f64, f64) {
        let electron = (1.0
            / ((N_DEGENERACY_L / N_MSTAR_L.powi(2) + N_DEGENERACY_T / N_MSTAR_T.powi(2))
                / (N_DEGENERACY_L + N_DEGENERACY_T)))
            .sqrt();
        let hole = match self.effective_mass {
            EffectiveMass::DualBand => (1.0
                / ((P_DEGENERACY_L / P_MSTAR_L.powi(2) + P_DEGENERACY_H / P_MSTAR_H.powi(2))
                    / (P_DEGENERACY_L + P_DEGENERACY_H)))
                .sqrt(),
            EffectiveMass::HeavyHole => P_MSTAR_H,
        };
        (electron, hole)
    }

    /// Electron mobility (cm²/V·s).
    ///
    /// # Arguments
    /// * `nd` - Ionized donor concentration (cm⁻³)
    /// * `na` - Ionized acceptor concentration (cm⁻³)
    /// * `temperature` - Absolute temperature (K)
    /// * `model` - Mobility sub-model
    pub fn electron_mobility(&self, nd: f64, na: f64, temperature: f64, model: MobilityModel) -> f64 {
        let (nd, na) = (floor_concentration(nd), floor_concentration(na));
        match model {
            MobilityModel::Klaassen => {
                let params = match self.donor {
                    DonorSpecies::Arsenic => &ARSENIC,
                    DonorSpecies::Phosphorus => &PHOSPHORUS,
                };
                klaassen(params, nd, na, temperature)
            }
            MobilityModel::Spline => match self.electron_spline() {
                Some(spline) => spline.eval(nd.log10()),
                None => simple_electron(nd, temperature),
            },
            MobilityModel::Simple => simple_electron(nd, temperature),
        }
    }

    /// Hole mobility (cm²/V·s). Arguments as for [`Self::electron_mobility`].
    pub fn hole_mobility(&self, nd: f64, na: f64, temperature: f64, model: MobilityModel) -> f64 {
        let (nd, na) = (floor_concentration(nd), floor_concentration(na));
        match model {
            MobilityModel::Klaassen => klaassen(&BORON, nd, na, temperature),
            MobilityModel::Spline => match self.hole_spline() {
                Some(spline) => spline.eval(na.log10()),
                None => simple_hole(na, temperature),
            },
            MobilityModel::Simple => simple_hole(na, temperature),
        }
    }

    /// Free-carrier absorption coefficient (cm⁻¹), capped at [`MAX_ALPHA`].
    ///
    /// # Arguments
    /// * `doping` - Net doping (cm⁻³); negative is n-type, positive p-type
    /// * `excess` - Excess electron-hole pair density (cm⁻³)
    /// * `temperature` - Absolute temperature (K), clamped to 77-1683 K
    /// * `wavelength_um` - Wavelength in µm
    /// * `model` - Mobility sub-model
    pub fn alpha(
        &self,
        doping: f64,
        excess: f64,
        temperature: f64,
        wavelength_um: f64,
        model: MobilityModel,
    ) -> f64 {
        let t = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let ni2 = intrinsic_density_squared(t);

        let (nd, na, n_n, n_p) = if doping < 0.0 {
            let nd = doping.abs();
            let n_n = nd + ni2.sqrt();
            (nd, 1.0, n_n, ni2 / n_n)
        } else {
            let na = doping.abs();
            let n_p = na + ni2.sqrt();
            (1.0, na, ni2 / n_p, n_p)
        };
        let n_n = (n_n + excess).min(MAX_CARRIER_DENSITY);
        let n_p = (n_p + excess).min(MAX_CARRIER_DENSITY);

        let (m_n, m_p) = self.effective_masses();
        let lambda2 = wavelength_um * wavelength_um;
        let alpha_n = K_PHYS / (N_BACKGROUND * self.electron_mobility(nd, na, t, model) * m_n * m_n)
            * n_n
            * lambda2;
        let alpha_p = K_PHYS / (N_BACKGROUND * self.hole_mobility(nd, na, t, model) * m_p * m_p)
            * n_p
            * lambda2;

        (alpha_n + alpha_p).min(MAX_ALPHA)
    }

    /// Free-carrier extinction coefficient, k = α·λ/(4π). Arguments as for
    /// [`Self::alpha`].
    pub fn k(
        &self,
        doping: f64,
        excess: f64,
        temperature: f64,
        wavelength_um: f64,
        model: MobilityModel,
    ) -> f64 {
        self.alpha(doping, excess, temperature, wavelength_um, model) * (wavelength_um * 1e-4)
            / (4.0 * PI)
    }

    fn electron_spline(&self) -> Option<&Spline> {
        self.electron_spline
            .get_or_init(|| table_spline(|row| row.1))
            .as_ref()
    }

    fn hole_spline(&self) -> Option<&Spline> {
        self.hole_spline
            .get_or_init(|| table_spline(|row| row.2))
            .as_ref()
    }
}

impl Default for FreeCarrierModel {
    fn default() -> Self {
        Self::new(EffectiveMass::default(), DonorSpecies::default())
    }
}

#[inline]
fn floor_concentration(c: f64) -> f64 {
    if c <= 0.0 { 1.0 } else { c }
}

fn table_spline(pick: fn(&(f64, f64, f64)) -> f64) -> Option<Spline> {
    let x: Vec<f64> = MOBILITY_300K.iter().map(|row| row.0.log10()).collect();
    let y: Vec<f64> = MOBILITY_300K.iter().map(pick).collect();
    Spline::fit(&x, &y).ok()
}

fn klaassen(p: &MobilityParams, nd: f64, na: f64, temperature: f64) -> f64 {
    let tn = temperature / 300.0;
    let scaled = |(c, e): (f64, f64)| if e == 0.0 { c } else { c * tn.powf(e) };

    let lattice = p.u_max * tn.powf(-p.gamma + p.c * tn);
    let u0 = (scaled(p.u0d) * nd + scaled(p.u0a) * na) / (nd + na + 1.0);
    let u1 = (scaled(p.u1d) * nd + scaled(p.u1a) * na) / (nd + na + 1.0);

    u0 + (lattice - u0)
        / (1.0 + (nd / scaled(p.cr1)).powf(p.alpha_1) + (na / scaled(p.cr2)).powf(p.alpha_2))
        - u1 / (1.0 + (nd / scaled(p.cs1) + na / scaled(p.cs2)).powi(-2))
}

fn simple_electron(nd: f64, temperature: f64) -> f64 {
    const MU_MIN: f64 = 55.24;
    const MU_MAX: f64 = 1429.23;
    const N_REF: f64 = 1.072e17;
    let tn = temperature / 300.0;
    MU_MIN + (MU_MAX * tn.powf(-2.3) - MU_MIN) / (1.0 + tn.powf(-3.8) * (nd / N_REF).powf(0.73))
}

fn simple_hole(na: f64, temperature: f64) -> f64 {
    const MU_MIN: f64 = 49.70;
    const MU_MAX: f64 = 379.37;
    const N_REF: f64 = 1.606e17;
    let tn = temperature / 300.0;
    MU_MIN + (MU_MAX * tn.powf(-2.2) - MU_MIN) / (1.0 + tn.powf(-3.7) * (na / N_REF).powf(0.70))
}
