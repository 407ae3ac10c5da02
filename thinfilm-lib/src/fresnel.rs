//! Reflectance and transmittance of a planar stack by chained 2×2 transfer
//! matrices.

use std::f64::consts::PI;
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thinfilm_data::LayerRole;

use crate::engine::ThinFilm;
use crate::error::{Result, ThinFilmError};
use crate::layers::Layer;
use crate::sample::Sample;

/// Polarization of the incident beam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarization {
    /// Transverse electric (s).
    Te,
    /// Transverse magnetic (p).
    Tm,
    /// Average of TE and TM.
    #[default]
    Unpolarized,
}

impl FromStr for Polarization {
    type Err = ThinFilmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "te" | "s" => Ok(Polarization::Te),
            "tm" | "p" => Ok(Polarization::Tm),
            "unpolarized" | "unpol" | "random" => Ok(Polarization::Unpolarized),
            _ => Err(ThinFilmError::Parse(format!(
                "unknown polarization '{s}', use te, tm or unpolarized"
            ))),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Polarization::Te => "te",
            Polarization::Tm => "tm",
            Polarization::Unpolarized => "unpolarized",
        })
    }
}

/// Power reflectance and transmittance of a stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reflectance {
    pub reflectance: f64,
    pub transmittance: f64,
}

impl Reflectance {
    /// Power not accounted for by R or T.
    pub fn absorptance(&self) -> f64 {
        1.0 - self.reflectance - self.transmittance
    }
}

/// Convert f64 to Complex64 (real part only).
#[inline]
fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

/// [[a, b], [c, d]]
#[derive(Debug, Clone, Copy)]
struct Matrix2 {
    a: Complex64,
    b: Complex64,
    c: Complex64,
    d: Complex64,
}

impl Matrix2 {
    fn identity() -> Self {
        Matrix2 {
            a: c(1.0),
            b: c(0.0),
            c: c(0.0),
            d: c(1.0),
        }
    }

    fn diagonal(a: Complex64, d: Complex64) -> Self {
        Matrix2 {
            a,
            b: c(0.0),
            c: c(0.0),
            d,
        }
    }
}

impl Mul for Matrix2 {
    type Output = Matrix2;

    fn mul(self, rhs: Matrix2) -> Matrix2 {
        Matrix2 {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
        }
    }
}

/// cos θ inside a medium of index `n` for Snell invariant `s`.
fn cos_theta(s: f64, n: Complex64) -> Complex64 {
    let arg = 1.0 - s * s / n.norm_sqr();
    if arg > 0.0 {
        c(arg.sqrt())
    } else {
        Complex64::new(0.0, (-arg).sqrt())
    }
}

/// Interface matrix from medium i into medium j.
fn interface(
    pol: Polarization,
    (ni, ci): (Complex64, Complex64),
    (nj, cj): (Complex64, Complex64),
) -> Matrix2 {
    let (r, t) = match pol {
        Polarization::Tm => {
            let b = ni * cj + nj * ci;
            ((ni * cj - nj * ci) / b, c(2.0) * ni * ci / b)
        }
        _ => {
            let b = ni * ci + nj * cj;
            ((ni * ci - nj * cj) / b, c(2.0) * ni * ci / b)
        }
    };
    let inv_t = t.inv();
    Matrix2 {
        a: inv_t,
        b: r * inv_t,
        c: r * inv_t,
        d: inv_t,
    }
}

/// Propagation through a layer of `thickness_nm`.
fn propagation(n: Complex64, cos: Complex64, wavelength_nm: f64, thickness_nm: f64) -> Matrix2 {
    let phase = n / cos * c(2.0 * PI / wavelength_nm * thickness_nm);
    let (sin, cos) = (phase.sin(), phase.cos());
    let i = Complex64::i();
    Matrix2::diagonal(cos + i * sin, cos - i * sin)
}

fn solve(angle_rad: f64, pol: Polarization, wavelength_nm: f64, layers: &[Layer]) -> Reflectance {
    let (first, rest) = match layers.split_first() {
        Some(split) => split,
        None => return Reflectance::default(),
    };
    let Some((substrate, interior)) = rest.split_last() else {
        return Reflectance::default();
    };

    let n0 = first.index;
    let s = n0.re * angle_rad.sin();

    let mut total = Matrix2::identity();
    let mut prev = (n0, cos_theta(s, n0));
    for layer in interior
        .iter()
        .filter(|l| l.thickness_nm > 0.0 && l.role != LayerRole::Ignored)
    {
        let here = (layer.index, cos_theta(s, layer.index));
        total = total
            * interface(pol, prev, here)
            * propagation(here.0, here.1, wavelength_nm, layer.thickness_nm);
        prev = here;
    }
    let ns = substrate.index;
    total = total * interface(pol, prev, (ns, cos_theta(s, ns)));

    let reflectance = (total.c / total.a).norm_sqr();

    let sin_out = s / ns.re;
    // NaN (a substrate with zero real index) also falls outside the range
    let transmittance = if !(0.0..=1.0).contains(&sin_out.abs()) {
        0.0
    } else {
        total.a.inv().norm_sqr() * (ns.re / n0.re) * (1.0 - sin_out * sin_out).sqrt()
            / angle_rad.cos()
    };

    Reflectance {
        reflectance,
        transmittance,
    }
}

/// Reflectance and transmittance of an expanded stack.
///
/// `layers[0]` is the incident medium and the last layer the substrate;
/// layers between them with zero or negative thickness are skipped.
///
/// # Arguments
/// * `angle_deg` - Angle of incidence in degrees
/// * `polarization` - TE, TM, or the average of both
/// * `wavelength_nm` - Vacuum wavelength in nm
/// * `layers` - Incident medium, films, substrate
pub fn reflect(
    angle_deg: f64,
    polarization: Polarization,
    wavelength_nm: f64,
    layers: &[Layer],
) -> Result<Reflectance> {
    if layers.len() < 2 {
        return Err(ThinFilmError::InvalidStack(format!(
            "a stack needs an incident medium and a substrate, got {} layer(s)",
            layers.len()
        )));
    }
    if !(wavelength_nm > 0.0) {
        return Err(ThinFilmError::InvalidStack(format!(
            "wavelength must be positive, got {wavelength_nm}"
        )));
    }

    let theta = angle_deg.to_radians();
    let result = match polarization {
        Polarization::Unpolarized => {
            let te = solve(theta, Polarization::Te, wavelength_nm, layers);
            let tm = solve(theta, Polarization::Tm, wavelength_nm, layers);
            Reflectance {
                reflectance: 0.5 * (te.reflectance + tm.reflectance),
                transmittance: 0.5 * (te.transmittance + tm.transmittance),
            }
        }
        pol => solve(theta, pol, wavelength_nm, layers),
    };

    if result.reflectance > 1.0 {
        log::warn!(
            "reflectance {} exceeds 1 at {angle_deg} deg, {wavelength_nm} nm",
            result.reflectance
        );
    }
    Ok(result)
}

/// One film of index `n1` and thickness `thickness_nm` between an incident
/// medium `n0` and a substrate `ns`.
pub fn single_film(
    angle_deg: f64,
    polarization: Polarization,
    wavelength_nm: f64,
    n0: Complex64,
    n1: Complex64,
    ns: Complex64,
    thickness_nm: f64,
) -> Result<Reflectance> {
    let layers = [
        Layer::new(LayerRole::Incident, 0.0, n0),
        Layer::new(LayerRole::Sublayer, thickness_nm, n1),
        Layer::new(LayerRole::EndOfStack, 0.0, ns),
    ];
    reflect(angle_deg, polarization, wavelength_nm, &layers)
}

impl ThinFilm {
    /// Resolve, expand and solve a sample in one call.
    ///
    /// # Arguments
    /// * `sample` - Stack description
    /// * `angle_deg` - Angle of incidence in degrees
    /// * `polarization` - TE, TM, or unpolarized
    /// * `wavelength_nm` - Vacuum wavelength in nm
    /// * `temperature` - Default temperature in K
    pub fn reflectance(
        &mut self,
        sample: &Sample,
        angle_deg: f64,
        polarization: Polarization,
        wavelength_nm: f64,
        temperature: f64,
    ) -> Result<Reflectance> {
        let layers = self.expand_layers(sample, temperature, wavelength_nm)?;
        reflect(angle_deg, polarization, wavelength_nm, &layers)
    }
}
