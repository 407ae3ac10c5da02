use std::collections::HashMap;

use num_complex::Complex64;
use thinfilm_data::NkTable;

use crate::constants::{EV_NM, MAX_MIX_DEPTH, MAX_MIX_TERMS};
use crate::ema::{self, EmaModel};
use crate::engine::ThinFilm;
use crate::error::{Result, ThinFilmError};
use crate::scan::Scanner;
use crate::spline::Spline;

/// Handle to a resolved material inside one [`ThinFilm`] engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A resolved material.
#[derive(Debug, Clone)]
pub struct Material {
    /// Name as first requested.
    pub name: String,
    pub kind: MaterialKind,
}

#[derive(Debug, Clone)]
pub enum MaterialKind {
    /// Tabulated data: n and k against photon energy (eV).
    Leaf { n: Spline, k: Spline },
    /// Normalized `(fraction, component)` pairs combined with `model`.
    Mixture {
        model: EmaModel,
        components: Vec<(f64, MaterialId)>,
    },
}

/// Resolved materials, keyed by lowercase name.
///
/// Components of a mixture always precede it, so index lookups never cycle.
#[derive(Debug, Default)]
pub(crate) struct MaterialRegistry {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    pub(crate) fn lookup(&self, key: &str) -> Option<MaterialId> {
        self.by_name.get(key).copied()
    }

    pub(crate) fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.materials.len()
    }

    fn insert(&mut self, key: String, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        self.by_name.insert(key, id);
        id
    }

    /// Insert, or overwrite the material already registered under `key`.
    fn replace(&mut self, key: String, material: Material) -> MaterialId {
        match self.by_name.get(&key) {
            Some(&id) => {
                self.materials[id.0] = material;
                id
            }
            None => self.insert(key, material),
        }
    }
}

fn cache_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Fit the n and k splines, naming the material if its data is unusable.
fn leaf_from_table(table: &NkTable) -> Result<MaterialKind> {
    let fit = |y: &[f64]| {
        Spline::fit(&table.energy_ev, y).map_err(|e| ThinFilmError::Resolution {
            name: table.name.clone(),
            reason: e.to_string(),
        })
    };
    let k: Vec<f64> = table.k.iter().map(|k| k.abs()).collect();
    Ok(MaterialKind::Leaf {
        n: fit(&table.n)?,
        k: fit(&k)?,
    })
}

impl ThinFilm {
    /// Resolve a material name to a handle, loading and caching it on first
    /// use.
    ///
    /// `name` is either a database name or a bracketed mixture such as
    /// `[BRUGGEMAN 0.7 c-Si 0.3 void]`. Lookup is case-insensitive on the
    /// whole string. Failed resolutions are not cached.
    pub fn resolve_material(&mut self, name: &str) -> Result<MaterialId> {
        self.resolve_at_depth(name, 0)
    }

    /// Register tabulated data directly under `table.name`, replacing any
    /// material already known by that name.
    pub fn define_material(&mut self, table: NkTable) -> Result<MaterialId> {
        let kind = leaf_from_table(&table)?;
        log::debug!("defined material {} ({} points)", table.name, table.len());
        let key = cache_key(&table.name);
        Ok(self.registry.replace(
            key,
            Material {
                name: table.name,
                kind,
            },
        ))
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.registry.get(id)
    }

    /// Number of materials resolved so far.
    pub fn material_count(&self) -> usize {
        self.registry.len()
    }

    /// Complex refractive index `n - ik` of a resolved material.
    ///
    /// # Arguments
    /// * `id` - Handle from [`ThinFilm::resolve_material`]
    /// * `wavelength_nm` - Vacuum wavelength in nm
    pub fn find_index(&self, id: MaterialId, wavelength_nm: f64) -> Result<Complex64> {
        if !(wavelength_nm > 0.0) {
            return Err(ThinFilmError::InvalidStack(format!(
                "wavelength must be positive, got {wavelength_nm}"
            )));
        }
        let material = self
            .registry
            .get(id)
            .ok_or_else(|| ThinFilmError::Resolution {
                name: format!("#{}", id.0),
                reason: "unknown material handle".to_string(),
            })?;

        match &material.kind {
            MaterialKind::Leaf { n, k } => {
                let ev = EV_NM / wavelength_nm;
                Ok(Complex64::new(n.eval(ev), -k.eval(ev)))
            }
            MaterialKind::Mixture { model, components } => {
                let parts = components
                    .iter()
                    .map(|&(fraction, sub)| Ok((fraction, self.find_index(sub, wavelength_nm)?)))
                    .collect::<Result<Vec<_>>>()?;
                ema::mix(*model, &parts)
            }
        }
    }

    /// Resolve and look up in one step.
    pub fn index_of(&mut self, name: &str, wavelength_nm: f64) -> Result<Complex64> {
        let id = self.resolve_material(name)?;
        self.find_index(id, wavelength_nm)
    }

    fn resolve_at_depth(&mut self, name: &str, depth: usize) -> Result<MaterialId> {
        let name = name.trim();
        let key = cache_key(name);
        if key.is_empty() {
            return Err(ThinFilmError::Resolution {
                name: name.to_string(),
                reason: "empty material name".to_string(),
            });
        }
        if let Some(id) = self.registry.lookup(&key) {
            return Ok(id);
        }

        let kind = if name.starts_with('[') {
            if depth >= MAX_MIX_DEPTH {
                return Err(ThinFilmError::Parse(format!(
                    "mixtures nested deeper than {MAX_MIX_DEPTH} levels: {name}"
                )));
            }
            self.parse_mixture(name, depth)?
        } else {
            let table = self.source.load(name)?;
            leaf_from_table(&table)?
        };

        match &kind {
            MaterialKind::Leaf { n, .. } => {
                log::debug!("resolved material {name}: {} points", n.len())
            }
            MaterialKind::Mixture { model, components } => log::debug!(
                "resolved mixture {name}: {model} of {} components",
                components.len()
            ),
        }
        Ok(self.registry.insert(
            key,
            Material {
                name: name.to_string(),
                kind,
            },
        ))
    }

    /// Parse `[ {MODEL} f1 name1 f2 name2 ... ]`, resolving every component.
    fn parse_mixture(&mut self, text: &str, depth: usize) -> Result<MaterialKind> {
        let inner = text
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| ThinFilmError::Parse(format!("unterminated mixture: {text}")))?;
        let mut scan = Scanner::new(inner);
        scan.skip_whitespace();

        let mut model = EmaModel::Series;
        if scan.peek().is_some_and(char::is_alphabetic) {
            model = EmaModel::ALL
                .into_iter()
                .find(|m| {
                    scan.starts_with_ignore_case(m.keyword()) && scan.at_token_end(m.keyword().len())
                })
                .ok_or_else(|| {
                    ThinFilmError::Parse(format!("unknown mixing model at '{}'", scan.rest()))
                })?;
            scan.advance(model.keyword().chars().count());
            scan.skip_whitespace();
        }

        let mut components = Vec::new();
        while !scan.is_at_end() {
            let fraction = scan.read_number().ok_or_else(|| {
                ThinFilmError::Parse(format!(
                    "expected a volume fraction in {text} at '{}'",
                    scan.rest()
                ))
            })?;
            if fraction < 0.0 {
                return Err(ThinFilmError::Parse(format!(
                    "negative volume fraction {fraction} in {text}"
                )));
            }
            let sub = scan.read_material_name()?;
            if sub.is_empty() {
                return Err(ThinFilmError::Parse(format!(
                    "volume fraction {fraction} has no material in {text}"
                )));
            }
            if components.len() == MAX_MIX_TERMS {
                return Err(ThinFilmError::Parse(format!(
                    "more than {MAX_MIX_TERMS} components in {text}"
                )));
            }
            let id = self.resolve_at_depth(&sub, depth + 1)?;
            components.push((fraction, id));
        }

        components.retain(|&(f, _)| f > 0.0);
        let total: f64 = components.iter().map(|&(f, _)| f).sum();
        if components.is_empty() || total <= 0.0 {
            return Err(ThinFilmError::Parse(format!(
                "mixture has no component with a positive fraction: {text}"
            )));
        }
        for (f, _) in &mut components {
            *f /= total;
        }
        if components.len() > 1 {
            model.check_arity(components.len())?;
        }
        Ok(MaterialKind::Mixture { model, components })
    }
}
