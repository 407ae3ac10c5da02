//! Effective-medium mixing of complex refractive indices.
//!
//! All rules work on the dielectric constant ε = n² and return the index
//! branch with a non-negative real part.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThinFilmError};

/// Mixing rule for a bracketed composite material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmaModel {
    /// Volume average of ε.
    #[default]
    Series,
    /// Volume average of 1/ε.
    Parallel,
    /// Symmetric two-phase self-consistent medium.
    Bruggeman,
    /// Volume average of ε^(1/3).
    Looyenga,
    /// Minority phase as inclusions in a majority matrix.
    MaxwellGarnett,
}

impl EmaModel {
    pub const ALL: [EmaModel; 5] = [
        EmaModel::Series,
        EmaModel::Parallel,
        EmaModel::Bruggeman,
        EmaModel::Looyenga,
        EmaModel::MaxwellGarnett,
    ];

    /// Keyword used inside mixture brackets.
    pub fn keyword(self) -> &'static str {
        match self {
            EmaModel::Series => "SERIES",
            EmaModel::Parallel => "PARALLEL",
            EmaModel::Bruggeman => "BRUGGEMAN",
            EmaModel::Looyenga => "LOOYENGA",
            EmaModel::MaxwellGarnett => "MAXWELL-GARNETT",
        }
    }

    /// Whether the rule is defined only for two phases.
    pub fn is_binary(self) -> bool {
        matches!(self, EmaModel::Bruggeman | EmaModel::MaxwellGarnett)
    }

    /// Fail unless the rule accepts `components` phases.
    pub fn check_arity(self, components: usize) -> Result<()> {
        if self.is_binary() && components != 2 {
            return Err(ThinFilmError::ModelArity {
                model: self.keyword(),
                components,
            });
        }
        Ok(())
    }
}

impl fmt::Display for EmaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for EmaModel {
    type Err = ThinFilmError;

    fn from_str(s: &str) -> Result<Self> {
        EmaModel::ALL
            .into_iter()
            .find(|m| m.keyword().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ThinFilmError::Parse(format!("unknown mixing model '{s}'")))
    }
}

/// Mix `(fraction, index)` pairs with `model`.
///
/// Components with a non-positive fraction are dropped and the rest are
/// renormalized. A single remaining component is returned unchanged.
pub fn mix(model: EmaModel, components: &[(f64, Complex64)]) -> Result<Complex64> {
    let active: Vec<(f64, Complex64)> = components
        .iter()
        .copied()
        .filter(|&(f, _)| f > 0.0)
        .collect();
    let total: f64 = active.iter().map(|&(f, _)| f).sum();
    if active.is_empty() || total <= 0.0 {
        return Err(ThinFilmError::Parse(
            "mixture has no component with a positive fraction".to_string(),
        ));
    }
    if active.len() == 1 {
        return Ok(active[0].1);
    }
    model.check_arity(active.len())?;

    let parts = active.iter().map(|&(f, n)| (f / total, n * n));
    let eps: Complex64 = match model {
        EmaModel::Series => parts.map(|(f, e)| e * f).sum(),
        EmaModel::Parallel => {
            let inv: Complex64 = parts.map(|(f, e)| e.inv() * f).sum();
            inv.inv()
        }
        EmaModel::Looyenga => {
            let cube_root: Complex64 = parts.map(|(f, e)| e.powf(1.0 / 3.0) * f).sum();
            cube_root.powi(3)
        }
        EmaModel::MaxwellGarnett => {
            let [a, b]: [(f64, Complex64); 2] = two(parts);
            // host = phase with the strictly larger fraction; ties take the
            // last-listed phase as the inclusion
            let ((f, inclusion), (_, matrix)) = if a.0 < b.0 { (a, b) } else { (b, a) };
            maxwell_garnett(f, inclusion, matrix)
        }
        EmaModel::Bruggeman => {
            let [(f, e1), (_, e2)] = two(parts);
            bruggeman(f, e1, e2)
        }
    };
    Ok(index_from_permittivity(eps))
}

fn two(mut parts: impl Iterator<Item = (f64, Complex64)>) -> [(f64, Complex64); 2] {
    let zero = (0.0, Complex64::new(0.0, 0.0));
    let a = parts.next().unwrap_or(zero);
    let b = parts.next().unwrap_or(zero);
    [a, b]
}

fn maxwell_garnett(f: f64, inclusion: Complex64, matrix: Complex64) -> Complex64 {
    let num = inclusion * (1.0 + 2.0 * f) - matrix * (2.0 * f - 2.0);
    let den = matrix * (2.0 + f) + inclusion * (1.0 - f);
    matrix * num / den
}

/// Root of f(e1-ε)/(e1+2ε) + (1-f)(e2-ε)/(e2+2ε) = 0.
fn bruggeman(f: f64, e1: Complex64, e2: Complex64) -> Complex64 {
    let b = e1 * (3.0 * f - 1.0) + e2 * (2.0 - 3.0 * f);
    ((b * b + e1 * e2 * 8.0).sqrt() + b) / 4.0
}

/// n = √ε on the branch with Re(n) ≥ 0.
pub fn index_from_permittivity(eps: Complex64) -> Complex64 {
    let n = eps.sqrt();
    if n.re < 0.0 { -n } else { n }
}
