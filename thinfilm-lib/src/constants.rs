/// Photon energy times wavelength (eV·nm), as used by the nk databases
pub const EV_NM: f64 = 1240.0;

/// Nanometres per centimetre
pub const NM_PER_CM: f64 = 1.0e7;

/// Default cap on active n-type concentration (cm⁻³)
pub const DEFAULT_MAX_N_DOPING: f64 = 3.0e20;

/// Default cap on active p-type concentration (cm⁻³)
pub const DEFAULT_MAX_P_DOPING: f64 = 1.0e20;

/// Most components a single mixture may list
pub const MAX_MIX_TERMS: usize = 10;

/// Deepest allowed nesting of bracketed mixtures
pub const MAX_MIX_DEPTH: usize = 8;

/// Default cap on the slices one doping profile may expand into
pub const DEFAULT_MAX_SUBLAYERS: u32 = 10_000;
