//! Expansion of a sample description into the flat layer list seen by the
//! Fresnel solver.

use num_complex::Complex64;
use thinfilm_data::{DopingProfile, LayerRole};

use crate::constants::{DEFAULT_MAX_N_DOPING, DEFAULT_MAX_P_DOPING, NM_PER_CM};
use crate::engine::ThinFilm;
use crate::error::{Result, ThinFilmError};
use crate::sample::Sample;

/// Sublayers for linear profiles when no count is given.
pub const DEFAULT_LINEAR_SUBLAYERS: u32 = 10;

/// Decay lengths spanned by the default exponential discretization.
const EXPONENTIAL_SPAN: f64 = 5.0;

/// One physical layer after expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub role: LayerRole,
    pub thickness_nm: f64,
    /// Complex index `n - ik`, including any free-carrier absorption.
    pub index: Complex64,
    /// Clamped net doping (cm⁻³).
    pub doping: f64,
    /// Position of the originating entry in the sample.
    pub entry: usize,
}

impl Layer {
    /// An undoped layer.
    pub fn new(role: LayerRole, thickness_nm: f64, index: Complex64) -> Self {
        Layer {
            role,
            thickness_nm,
            index,
            doping: 0.0,
            entry: 0,
        }
    }
}

/// Caps on the magnitude of n-type and p-type doping (cm⁻³).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopingLimits {
    pub max_n: f64,
    pub max_p: f64,
}

impl Default for DopingLimits {
    fn default() -> Self {
        DopingLimits {
            max_n: DEFAULT_MAX_N_DOPING,
            max_p: DEFAULT_MAX_P_DOPING,
        }
    }
}

impl DopingLimits {
    pub fn clamp(&self, doping: f64) -> f64 {
        if doping < 0.0 {
            doping.max(-self.max_n)
        } else {
            doping.min(self.max_p)
        }
    }
}

/// A uniformly doped slice of a profiled entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSlice {
    pub thickness_nm: f64,
    pub doping: f64,
}

/// Split an entry of `thickness_nm` into uniformly doped slices.
///
/// Dose-based profiles are scaled so that Σ doping·thickness equals the
/// dose. An undoped entry yields one slice with zero doping. An implant or
/// exponential profile on an entry with zero or negative thickness has no
/// finite concentration, so it yields one slice with zero doping and its
/// dose is dropped. A profile needing more than `max_sublayers` slices is
/// an error.
pub fn profile_slices(
    profile: &DopingProfile,
    thickness_nm: f64,
    max_sublayers: u32,
) -> Result<Vec<ProfileSlice>> {
    let single = |doping| {
        vec![ProfileSlice {
            thickness_nm,
            doping,
        }]
    };

    match *profile {
        DopingProfile::None => Ok(single(0.0)),
        DopingProfile::Constant { concentration } => Ok(single(concentration)),
        DopingProfile::Linear {
            front,
            back,
            sublayers,
        } => Ok(linear_slices(
            front,
            back,
            thickness_nm,
            slice_count(
                sublayers.unwrap_or(DEFAULT_LINEAR_SUBLAYERS) as f64,
                max_sublayers,
            )?,
        )),
        DopingProfile::LinearImplant {
            dose,
            front,
            back,
            sublayers,
        } => {
            if thickness_nm <= 0.0 {
                return Ok(single(0.0));
            }
            if front + back <= 0.0 {
                return Err(ThinFilmError::InvalidStack(format!(
                    "linear implant heights must have a positive sum, got {front} and {back}"
                )));
            }
            let count = slice_count(
                sublayers.unwrap_or(DEFAULT_LINEAR_SUBLAYERS) as f64,
                max_sublayers,
            )?;
            let peak = 2.0 * dose / (thickness_nm / NM_PER_CM) / (front + back);
            Ok(linear_slices(
                front * peak,
                back * peak,
                thickness_nm,
                count,
            ))
        }
        DopingProfile::Exponential {
            dose,
            width_nm,
            sublayers,
        } => {
            if !(width_nm > 0.0) {
                return Err(ThinFilmError::InvalidStack(format!(
                    "exponential decay width must be positive, got {width_nm}"
                )));
            }
            if thickness_nm <= 0.0 {
                return Ok(single(0.0));
            }
            let count = slice_count(
                sublayers.map_or_else(
                    || (EXPONENTIAL_SPAN * thickness_nm / width_nm + 1.0).floor(),
                    f64::from,
                ),
                max_sublayers,
            )?;
            let dz = thickness_nm / count as f64;
            // per-slice integral of the exponential, normalized to the dose
            let peak = dose * (1.0 - (-dz / width_nm).exp())
                / (1.0 - (-thickness_nm / width_nm).exp())
                / (dz / NM_PER_CM);
            Ok((0..count)
                .map(|i| ProfileSlice {
                    thickness_nm: dz,
                    doping: peak * (-(i as f64) * dz / width_nm).exp(),
                })
                .collect())
        }
    }
}

/// Checked slice count, at least 1. Taken as f64 so oversized default
/// counts are caught before any cast.
fn slice_count(count: f64, max_sublayers: u32) -> Result<u32> {
    if !(count <= max_sublayers as f64) {
        return Err(ThinFilmError::InvalidStack(format!(
            "doping profile needs {count} sublayers, more than the limit of {max_sublayers}"
        )));
    }
    Ok((count as u32).max(1))
}

fn linear_slices(front: f64, back: f64, thickness_nm: f64, count: u32) -> Vec<ProfileSlice> {
    let count = count.max(1);
    let dz = thickness_nm / count as f64;
    (0..count)
        .map(|i| {
            let pos = (i as f64 + 0.5) / count as f64;
            ProfileSlice {
                thickness_nm: dz,
                doping: front * (1.0 - pos) + back * pos,
            }
        })
        .collect()
}

impl ThinFilm {
    /// Doping caps for a sample: its own `!CMAX` values, else the engine's.
    pub fn doping_limits(&self, sample: &Sample) -> DopingLimits {
        let defaults = self.config.doping_limits();
        DopingLimits {
            max_n: sample.max_n_doping.map_or(defaults.max_n, f64::abs),
            max_p: sample.max_p_doping.map_or(defaults.max_p, f64::abs),
        }
    }

    /// Resolve every entry of `sample` at `wavelength_nm` and flatten it into
    /// physical layers.
    ///
    /// Doped entries get the free-carrier extinction subtracted from the
    /// imaginary part of their index, evaluated at the entry temperature if
    /// set, else `temperature`. The first layer is marked incident and the
    /// last end-of-stack.
    ///
    /// # Arguments
    /// * `sample` - Stack description
    /// * `temperature` - Default temperature in K
    /// * `wavelength_nm` - Vacuum wavelength in nm
    pub fn expand_layers(
        &mut self,
        sample: &Sample,
        temperature: f64,
        wavelength_nm: f64,
    ) -> Result<Vec<Layer>> {
        let limits = self.doping_limits(sample);
        let model = self.config.mobility_model;
        let max_sublayers = self.config.max_sublayers;
        let wavelength_um = wavelength_nm / 1000.0;
        let mut layers = Vec::with_capacity(sample.entries.len());

        for (i, entry) in sample.entries.iter().enumerate() {
            if entry.role == LayerRole::Ignored {
                continue;
            }
            let id = self.resolve_material(&entry.material)?;
            let mut index = self.find_index(id, wavelength_nm)?;
            if let Some(n) = entry.n_override {
                index.re = n;
            }
            if let Some(k) = entry.k_override {
                index.im = -k.abs();
            }

            let t = entry.temperature.unwrap_or(temperature);
            let doped = entry.doping != DopingProfile::None;
            for slice in profile_slices(&entry.doping, entry.thickness_nm, max_sublayers)? {
                let doping = if doped { limits.clamp(slice.doping) } else { 0.0 };
                let mut layer_index = index;
                if doped {
                    layer_index.im -= self.free_carrier.k(doping, 0.0, t, wavelength_um, model);
                }
                layers.push(Layer {
                    role: entry.role,
                    thickness_nm: slice.thickness_nm,
                    index: layer_index,
                    doping,
                    entry: i,
                });
            }
        }

        if layers.len() < 2 {
            return Err(ThinFilmError::InvalidStack(format!(
                "a stack needs an incident medium and a substrate, got {} layer(s)",
                layers.len()
            )));
        }
        if let Some(first) = layers.first_mut() {
            first.role = LayerRole::Incident;
        }
        if let Some(last) = layers.last_mut() {
            last.role = LayerRole::EndOfStack;
        }
        Ok(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_SUBLAYERS;

    fn split(profile: &DopingProfile, thickness_nm: f64) -> Result<Vec<ProfileSlice>> {
        profile_slices(profile, thickness_nm, DEFAULT_MAX_SUBLAYERS)
    }

    fn dose_of(slices: &[ProfileSlice]) -> f64 {
        slices
            .iter()
            .map(|s| s.doping * s.thickness_nm / NM_PER_CM)
            .sum()
    }

    #[test]
    fn test_linear_midpoints() {
        let slices = split(
            &DopingProfile::Linear {
                front: 0.0,
                back: 4.0,
                sublayers: Some(4),
            },
            100.0,
        )
        .unwrap();
        let doping: Vec<f64> = slices.iter().map(|s| s.doping).collect();
        assert_eq!(doping, vec![0.5, 1.5, 2.5, 3.5]);
        assert!(slices.iter().all(|s| s.thickness_nm == 25.0));
    }

    #[test]
    fn test_default_counts() {
        let linear = split(
            &DopingProfile::Linear {
                front: 1.0,
                back: 1.0,
                sublayers: None,
            },
            50.0,
        )
        .unwrap();
        assert_eq!(linear.len(), DEFAULT_LINEAR_SUBLAYERS as usize);

        let exp = split(
            &DopingProfile::Exponential {
                dose: 1e15,
                width_nm: 100.0,
                sublayers: None,
            },
            1000.0,
        )
        .unwrap();
        assert_eq!(exp.len(), 51);

        let thin = split(
            &DopingProfile::Exponential {
                dose: 1e15,
                width_nm: 1e6,
                sublayers: None,
            },
            10.0,
        )
        .unwrap();
        assert_eq!(thin.len(), 1);
    }

    #[test]
    fn test_exponential_conserves_dose_exactly() {
        let slices = split(
            &DopingProfile::Exponential {
                dose: 2e15,
                width_nm: 40.0,
                sublayers: Some(7),
            },
            300.0,
        )
        .unwrap();
        assert!((dose_of(&slices) / 2e15 - 1.0).abs() < 1e-12);
        assert!(slices.windows(2).all(|w| w[0].doping > w[1].doping));
    }

    #[test]
    fn test_implant_conserves_dose() {
        let slices = split(
            &DopingProfile::LinearImplant {
                dose: -5e14,
                front: 3.0,
                back: 1.0,
                sublayers: Some(5),
            },
            200.0,
        )
        .unwrap();
        assert!((dose_of(&slices) / -5e14 - 1.0).abs() < 1e-12);
        assert!(slices[0].doping < slices[4].doping);
    }

    #[test]
    fn test_bad_profiles() {
        assert!(
            split(
                &DopingProfile::Exponential {
                    dose: 1e15,
                    width_nm: 0.0,
                    sublayers: None
                },
                100.0
            )
            .is_err()
        );
        assert!(
            split(
                &DopingProfile::LinearImplant {
                    dose: 1e15,
                    front: 0.0,
                    back: 0.0,
                    sublayers: None
                },
                100.0
            )
            .is_err()
        );
        let empty = split(
            &DopingProfile::LinearImplant {
                dose: 1e15,
                front: 1.0,
                back: 1.0,
                sublayers: None,
            },
            0.0,
        )
        .unwrap();
        assert_eq!(empty, vec![ProfileSlice { thickness_nm: 0.0, doping: 0.0 }]);
    }

    #[test]
    fn test_sublayer_limit() {
        let huge = DopingProfile::Linear {
            front: 1.0,
            back: 2.0,
            sublayers: Some(4_000_000_000),
        };
        assert!(matches!(
            split(&huge, 100.0),
            Err(ThinFilmError::InvalidStack(_))
        ));
        // default exponential count of ~5e9 is rejected before allocating
        let narrow = DopingProfile::Exponential {
            dose: 1e15,
            width_nm: 1e-6,
            sublayers: None,
        };
        assert!(matches!(
            split(&narrow, 1000.0),
            Err(ThinFilmError::InvalidStack(_))
        ));
        let capped = DopingProfile::Linear {
            front: 1.0,
            back: 2.0,
            sublayers: Some(8),
        };
        assert_eq!(profile_slices(&capped, 100.0, 8).unwrap().len(), 8);
        assert!(profile_slices(&capped, 100.0, 7).is_err());
    }

    #[test]
    fn test_zero_thickness_dose_profiles_are_undoped() {
        for profile in [
            DopingProfile::LinearImplant {
                dose: 1e15,
                front: 1.0,
                back: 1.0,
                sublayers: Some(4),
            },
            DopingProfile::Exponential {
                dose: 1e15,
                width_nm: 10.0,
                sublayers: None,
            },
        ] {
            assert_eq!(
                split(&profile, 0.0).unwrap(),
                vec![ProfileSlice {
                    thickness_nm: 0.0,
                    doping: 0.0
                }]
            );
        }
    }

    #[test]
    fn test_clamp() {
        let limits = DopingLimits::default();
        assert_eq!(limits.clamp(-1e21), -3e20);
        assert_eq!(limits.clamp(1e21), 1e20);
        assert_eq!(limits.clamp(-1e18), -1e18);
        assert_eq!(limits.clamp(5e19), 5e19);
    }
}
