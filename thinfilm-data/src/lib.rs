#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A packed material database, as written by `thinfilm-generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialArchive {
    pub version: String,
    pub tables: Vec<NkTable>,
}

/// Tabulated optical constants for one material.
///
/// `k` is stored as a positive magnitude; the complex index is `n - ik`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NkTable {
    pub name: String,
    pub energy_ev: Vec<f64>,
    pub n: Vec<f64>,
    pub k: Vec<f64>,
}

impl NkTable {
    pub fn len(&self) -> usize {
        self.energy_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy_ev.is_empty()
    }
}

/// Position of an entry or layer within a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerRole {
    Incident,
    Sublayer,
    Substrate,
    Ignored,
    EndOfStack,
}

/// Doping profile through the thickness of one sample entry.
///
/// Concentrations are in cm⁻³ (negative = n-type, positive = p-type),
/// doses in cm⁻², widths in nm. A `sublayers` of `None` selects the
/// default discretization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum DopingProfile {
    #[default]
    None,
    Constant {
        concentration: f64,
    },
    Linear {
        front: f64,
        back: f64,
        sublayers: Option<u32>,
    },
    /// Linear shape with relative heights, scaled so the area equals the dose.
    LinearImplant {
        dose: f64,
        front: f64,
        back: f64,
        sublayers: Option<u32>,
    },
    /// Exponential decay from the front surface with a 1/e width.
    Exponential {
        dose: f64,
        width_nm: f64,
        sublayers: Option<u32>,
    },
}

/// One line of a sample description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    pub role: LayerRole,
    /// Bare database name or bracketed mixture.
    pub material: String,
    pub thickness_nm: f64,
    pub doping: DopingProfile,
    /// Per-entry temperature (K), overriding the run temperature.
    pub temperature: Option<f64>,
    /// Replacement for the real part of the tabulated index.
    pub n_override: Option<f64>,
    /// Replacement for the extinction coefficient (positive magnitude).
    pub k_override: Option<f64>,
}

impl SampleEntry {
    pub fn new(material: impl Into<String>, thickness_nm: f64) -> Self {
        SampleEntry {
            role: LayerRole::Sublayer,
            material: material.into(),
            thickness_nm,
            doping: DopingProfile::None,
            temperature: None,
            n_override: None,
            k_override: None,
        }
    }

    pub fn with_doping(mut self, doping: DopingProfile) -> Self {
        self.doping = doping;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
