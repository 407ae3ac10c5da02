//! Sample descriptions: the ordered list of media from the incident side to
//! the substrate.
//!
//! ```text
//! # medium          thickness   clauses
//! air
//! SiO2              100nm
//! c-Si              2um         linear_implant 1e15 1 0 20  temp=350
//! c-Si                          doping -1e16
//! !CNMAX = 1e20
//! ```

use std::path::Path;

use thinfilm_data::{DopingProfile, LayerRole, SampleEntry};

use crate::error::{Result, ThinFilmError};
use crate::scan::Scanner;

/// A parsed, ordered stack description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    pub entries: Vec<SampleEntry>,
    /// Per-sample cap on n-type concentration, replacing the engine default.
    pub max_n_doping: Option<f64>,
    /// Per-sample cap on p-type concentration, replacing the engine default.
    pub max_p_doping: Option<f64>,
}

/// An edit applied to a loaded sample, by entry number (0 = incident medium).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override {
    Thickness { layer: usize, nm: f64 },
    Doping { layer: usize, value: f64 },
    N { layer: usize, n: f64 },
    K { layer: usize, k: f64 },
}

impl Override {
    pub fn layer(&self) -> usize {
        match *self {
            Override::Thickness { layer, .. }
            | Override::Doping { layer, .. }
            | Override::N { layer, .. }
            | Override::K { layer, .. } => layer,
        }
    }
}

const UNITS: &[(&str, f64)] = &[
    ("nm", 1.0),
    ("um", 1.0e3),
    ("µm", 1.0e3),
    ("mm", 1.0e6),
    ("cm", 1.0e7),
    ("Å", 0.1),
    ("A", 0.1),
];

const TEMPERATURE_CLAUSES: [&str; 3] = ["temperature", "temp", "t"];

impl Sample {
    /// Build a sample from entries, assigning the incident and substrate
    /// roles to the first and last.
    pub fn from_entries(mut entries: Vec<SampleEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ThinFilmError::InvalidStack(
                "sample has no entries".to_string(),
            ));
        }
        let last = entries.len() - 1;
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.role = if i == 0 {
                LayerRole::Incident
            } else if i == last {
                LayerRole::Substrate
            } else if entry.role == LayerRole::Ignored {
                LayerRole::Ignored
            } else {
                LayerRole::Sublayer
            };
        }
        Ok(Sample {
            entries,
            max_n_doping: None,
            max_p_doping: None,
        })
    }

    /// Parse a sample description, one entry per line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut max_n = None;
        let mut max_p = None;

        for (lineno, line) in text.lines().enumerate() {
            let mut scan = Scanner::new(line);
            scan.skip_whitespace();
            if scan.is_at_end() || scan.at_comment() {
                continue;
            }
            let located = |e| at_line(e, lineno + 1);

            if scan.eat('!') {
                parse_directive(&mut scan, &mut max_n, &mut max_p).map_err(located)?;
            } else {
                entries.push(parse_entry(&mut scan).map_err(located)?);
            }
        }

        let mut sample = Sample::from_entries(entries)?;
        sample.max_n_doping = max_n;
        sample.max_p_doping = max_p;
        Ok(sample)
    }

    /// Read and parse a sample file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply overrides in order.
    pub fn apply_overrides(&mut self, overrides: &[Override]) -> Result<()> {
        for ov in overrides {
            let count = self.entries.len();
            let entry = self.entries.get_mut(ov.layer()).ok_or_else(|| {
                ThinFilmError::InvalidStack(format!(
                    "override refers to layer {} but the sample has {count} entries",
                    ov.layer()
                ))
            })?;
            match *ov {
                Override::Thickness { nm, .. } => entry.thickness_nm = nm,
                Override::N { n, .. } => entry.n_override = Some(n),
                Override::K { k, .. } => entry.k_override = Some(k.abs()),
                Override::Doping { value, .. } => {
                    entry.doping = match entry.doping {
                        DopingProfile::None | DopingProfile::Constant { .. } => {
                            DopingProfile::Constant {
                                concentration: value,
                            }
                        }
                        DopingProfile::Linear {
                            back, sublayers, ..
                        } => DopingProfile::Linear {
                            front: value,
                            back,
                            sublayers,
                        },
                        DopingProfile::LinearImplant {
                            front,
                            back,
                            sublayers,
                            ..
                        } => DopingProfile::LinearImplant {
                            dose: value,
                            front,
                            back,
                            sublayers,
                        },
                        DopingProfile::Exponential {
                            width_nm,
                            sublayers,
                            ..
                        } => DopingProfile::Exponential {
                            dose: value,
                            width_nm,
                            sublayers,
                        },
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parse a length such as `150`, `1.5um` or `20 A` into nm.
pub fn parse_thickness(text: &str) -> Result<f64> {
    let mut scan = Scanner::new(text);
    scan.skip_whitespace();
    let nm = read_thickness(&mut scan)?
        .ok_or_else(|| ThinFilmError::Parse(format!("expected a thickness, got '{text}'")))?;
    scan.skip_whitespace();
    if !scan.is_at_end() {
        return Err(ThinFilmError::Parse(format!(
            "unexpected text after thickness: '{}'",
            scan.rest()
        )));
    }
    Ok(nm)
}

fn at_line(err: ThinFilmError, line: usize) -> ThinFilmError {
    match err {
        ThinFilmError::Parse(msg) => ThinFilmError::Parse(format!("line {line}: {msg}")),
        other => other,
    }
}

fn parse_directive(
    scan: &mut Scanner,
    max_n: &mut Option<f64>,
    max_p: &mut Option<f64>,
) -> Result<()> {
    scan.skip_whitespace();
    let (word, targets_n, targets_p) = if scan.starts_with_ignore_case("cpmax") {
        ("cpmax", false, true)
    } else if scan.starts_with_ignore_case("cnmax") {
        ("cnmax", true, false)
    } else if scan.starts_with_ignore_case("cmax") {
        ("cmax", true, true)
    } else {
        log::warn!("ignoring unknown sample directive '!{}'", scan.rest().trim_end());
        return Ok(());
    };
    scan.advance(word.len());
    skip_optional_equals(scan, word)?;
    let cap = number(scan, word)?.abs();
    if targets_n {
        *max_n = Some(cap);
    }
    if targets_p {
        *max_p = Some(cap);
    }
    Ok(())
}

fn parse_entry(scan: &mut Scanner) -> Result<SampleEntry> {
    let material = scan.read_material_name()?;
    let thickness = read_thickness(scan)?.unwrap_or(0.0);
    let mut entry = SampleEntry::new(material, thickness);

    loop {
        scan.skip_whitespace();
        if scan.is_at_end() || scan.at_comment() {
            break;
        }

        if let Some(word) = TEMPERATURE_CLAUSES
            .into_iter()
            .find(|w| scan.starts_with_ignore_case(w))
        {
            scan.advance(word.len());
            skip_optional_equals(scan, word)?;
            entry.temperature = Some(number(scan, "temperature")?);
        } else if scan.starts_with_ignore_case("doping") {
            scan.advance("doping".len());
            skip_optional_equals(scan, "doping")?;
            entry.doping = DopingProfile::Constant {
                concentration: number(scan, "doping concentration")?,
            };
        } else if scan.starts_with_ignore_case("linear_implant") {
            scan.advance("linear_implant".len());
            skip_optional_equals(scan, "linear_implant")?;
            entry.doping = DopingProfile::LinearImplant {
                dose: number(scan, "implant dose")?,
                front: number(scan, "front height")?,
                back: number(scan, "back height")?,
                sublayers: sublayer_count(scan),
            };
        } else if scan.starts_with_ignore_case("linear") {
            scan.advance("linear".len());
            skip_optional_equals(scan, "linear")?;
            entry.doping = DopingProfile::Linear {
                front: number(scan, "front concentration")?,
                back: number(scan, "back concentration")?,
                sublayers: sublayer_count(scan),
            };
        } else if scan.starts_with_ignore_case("exponential") {
            scan.advance("exponential".len());
            skip_optional_equals(scan, "exponential")?;
            entry.doping = DopingProfile::Exponential {
                dose: number(scan, "dose")?,
                width_nm: number(scan, "decay width")?,
                sublayers: sublayer_count(scan),
            };
        } else {
            return Err(ThinFilmError::Parse(format!(
                "unknown clause '{}' for {}",
                scan.rest().trim_end(),
                entry.material
            )));
        }
    }
    Ok(entry)
}

/// A number with an optional unit, in nm. `None` if no number is present.
fn read_thickness(scan: &mut Scanner) -> Result<Option<f64>> {
    let Some(value) = scan.read_number() else {
        return Ok(None);
    };
    let glued = !scan.at_token_end(0);
    scan.skip_whitespace();
    for &(unit, scale) in UNITS {
        let len = unit.chars().count();
        if scan.starts_with_ignore_case(unit) && scan.at_token_end(len) {
            scan.advance(len);
            return Ok(Some(value * scale));
        }
    }
    if glued {
        return Err(ThinFilmError::Parse(format!(
            "unknown thickness unit '{}'",
            scan.rest().split_whitespace().next().unwrap_or_default()
        )));
    }
    Ok(Some(value))
}

/// Optional `=` between a keyword and its value; a number must follow.
fn skip_optional_equals(scan: &mut Scanner, keyword: &str) -> Result<()> {
    scan.skip_whitespace();
    if scan.eat('=') {
        scan.skip_whitespace();
    }
    match scan.peek() {
        Some(c) if c.is_ascii_digit() || matches!(c, '.' | '+' | '-') => Ok(()),
        _ => Err(ThinFilmError::Parse(format!(
            "expected a number after '{keyword}'"
        ))),
    }
}

fn number(scan: &mut Scanner, what: &str) -> Result<f64> {
    scan.skip_whitespace();
    scan.read_number().ok_or_else(|| {
        ThinFilmError::Parse(format!("expected {what}, found '{}'", scan.rest().trim_end()))
    })
}

/// Trailing sublayer count; absent or ≤ 1 selects the default.
fn sublayer_count(scan: &mut Scanner) -> Option<u32> {
    scan.skip_whitespace();
    match scan.read_integer() {
        Some(n) if n > 1 => Some(n.min(u32::MAX as i64) as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thickness_units() {
        for (text, nm) in [
            ("150", 150.0),
            ("150nm", 150.0),
            ("20A", 2.0),
            ("20 Å", 2.0),
            ("1.5um", 1500.0),
            ("1.5 µm", 1500.0),
            ("2mm", 2.0e6),
            ("1E-4 cm", 1000.0),
        ] {
            assert!((parse_thickness(text).unwrap() - nm).abs() < 1e-9, "{text}");
        }
        assert!(parse_thickness("10furlongs").is_err());
        assert!(parse_thickness("10nmx").is_err());
        assert!(parse_thickness("thin").is_err());
    }

    #[test]
    fn test_sublayer_count() {
        let sample = Sample::parse("air\nSi 100 linear 1e18 1e16 3\nSi 100 linear 1 2 1\nSi").unwrap();
        assert_eq!(
            sample.entries[1].doping,
            DopingProfile::Linear {
                front: 1e18,
                back: 1e16,
                sublayers: Some(3)
            }
        );
        assert_eq!(
            sample.entries[2].doping,
            DopingProfile::Linear {
                front: 1.0,
                back: 2.0,
                sublayers: None
            }
        );
    }

    #[test]
    fn test_errors_carry_line_number() {
        let err = Sample::parse("air\nSi 100 sparkle 3\nSi").unwrap_err();
        match err {
            ThinFilmError::Parse(msg) => assert!(msg.starts_with("line 2:"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
