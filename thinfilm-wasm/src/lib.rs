//! WASM bindings for thinfilm.
//!
//! Build with:
//! ```sh
//! wasm-pack build -p thinfilm-wasm
//! ```

use wasm_bindgen::prelude::*;

use thinfilm::num_complex::Complex64;
use thinfilm::{
    EngineConfig, FreeCarrierModel, Layer, LayerRole, MemorySource, MobilityModel, NkTable,
    Polarization, Sample, ThinFilm,
};

fn to_js(e: thinfilm::ThinFilmError) -> JsError {
    JsError::new(&e.to_string())
}

fn parse_mobility(model: &str) -> Result<MobilityModel, JsError> {
    model.parse().map_err(to_js)
}

fn parse_polarization(polarization: &str) -> Result<Polarization, JsError> {
    polarization.parse().map_err(to_js)
}

// ── Free-carrier absorption ──

/// Free-carrier absorption coefficient (cm⁻¹) of silicon.
///
/// `doping` is negative for n-type. `mobility` is one of "simple",
/// "spline", "klaassen".
#[wasm_bindgen]
pub fn fc_alpha(
    doping: f64,
    excess: f64,
    temperature: f64,
    wavelength_um: f64,
    mobility: &str,
) -> Result<f64, JsError> {
    let model = parse_mobility(mobility)?;
    Ok(FreeCarrierModel::default().alpha(doping, excess, temperature, wavelength_um, model))
}

/// Free-carrier extinction coefficient of silicon.
#[wasm_bindgen]
pub fn fc_k(
    doping: f64,
    excess: f64,
    temperature: f64,
    wavelength_um: f64,
    mobility: &str,
) -> Result<f64, JsError> {
    let model = parse_mobility(mobility)?;
    Ok(FreeCarrierModel::default().k(doping, excess, temperature, wavelength_um, model))
}

// ── Transfer-matrix solver ──

/// Returns `[R, T]` for a stack given as parallel arrays, incident medium
/// first and substrate last. `k` is the positive extinction coefficient.
#[wasm_bindgen]
pub fn reflect(
    angle_deg: f64,
    polarization: &str,
    wavelength_nm: f64,
    n: &[f64],
    k: &[f64],
    thickness_nm: &[f64],
) -> Result<Vec<f64>, JsError> {
    if n.len() != k.len() || n.len() != thickness_nm.len() {
        return Err(JsError::new("n, k and thickness must have the same length"));
    }
    let pol = parse_polarization(polarization)?;
    let layers: Vec<Layer> = n
        .iter()
        .zip(k)
        .zip(thickness_nm)
        .enumerate()
        .map(|(i, ((&n, &k), &z))| {
            let role = if i == 0 {
                LayerRole::Incident
            } else {
                LayerRole::Sublayer
            };
            Layer::new(role, z, Complex64::new(n, -k.abs()))
        })
        .collect();
    let rt = thinfilm::reflect(angle_deg, pol, wavelength_nm, &layers).map_err(to_js)?;
    Ok(vec![rt.reflectance, rt.transmittance])
}

// ── Material engine ──

/// A material cache backed by a packed archive from `thinfilm-generate`.
#[wasm_bindgen]
pub struct Engine {
    inner: ThinFilm,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(archive: &js_sys::Uint8Array) -> Result<Engine, JsError> {
        let source = MemorySource::from_archive(&archive.to_vec()).map_err(to_js)?;
        Ok(Engine {
            inner: ThinFilm::with_source(EngineConfig::default(), source),
        })
    }

    /// An engine with no archive; materials come from `add_material`.
    pub fn empty() -> Engine {
        Engine {
            inner: ThinFilm::with_source(EngineConfig::default(), MemorySource::new()),
        }
    }

    /// Select "simple", "spline" or "klaassen" mobility for later calls.
    pub fn set_mobility_model(&mut self, mobility: &str) -> Result<(), JsError> {
        self.inner.set_mobility_model(parse_mobility(mobility)?);
        Ok(())
    }

    pub fn add_material(
        &mut self,
        name: &str,
        energy_ev: &[f64],
        n: &[f64],
        k: &[f64],
    ) -> Result<(), JsError> {
        self.inner
            .define_material(NkTable {
                name: name.to_string(),
                energy_ev: energy_ev.to_vec(),
                n: n.to_vec(),
                k: k.to_vec(),
            })
            .map(|_| ())
            .map_err(to_js)
    }

    /// Returns `[n, k]` at `wavelength_nm`, with k positive.
    pub fn find_index(&mut self, name: &str, wavelength_nm: f64) -> Result<Vec<f64>, JsError> {
        let index = self.inner.index_of(name, wavelength_nm).map_err(to_js)?;
        Ok(vec![index.re, -index.im])
    }

    /// Returns `[R, T]` for a sample description.
    pub fn reflectance(
        &mut self,
        sample: &str,
        angle_deg: f64,
        polarization: &str,
        wavelength_nm: f64,
        temperature: f64,
    ) -> Result<Vec<f64>, JsError> {
        let pol = parse_polarization(polarization)?;
        let sample = Sample::parse(sample).map_err(to_js)?;
        let rt = self
            .inner
            .reflectance(&sample, angle_deg, pol, wavelength_nm, temperature)
            .map_err(to_js)?;
        Ok(vec![rt.reflectance, rt.transmittance])
    }

    pub fn material_count(&self) -> usize {
        self.inner.material_count()
    }
}
