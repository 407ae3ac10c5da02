pub mod config;
pub mod constants;
pub mod ema;
pub mod engine;
pub mod error;
pub mod free_carrier;
pub mod fresnel;
pub mod layers;
pub mod material;
pub(crate) mod mobility_db;
pub mod sample;
pub(crate) mod scan;
pub mod source;
pub mod spline;

pub use config::EngineConfig;
pub use ema::EmaModel;
pub use engine::ThinFilm;
pub use error::{Result, ThinFilmError};
pub use free_carrier::{DonorSpecies, EffectiveMass, FreeCarrierModel, MobilityModel};
pub use fresnel::{Polarization, Reflectance, reflect, single_film};
pub use layers::{DopingLimits, Layer, ProfileSlice, profile_slices};
pub use material::{Material, MaterialId, MaterialKind};
pub use sample::{Override, Sample, parse_thickness};
pub use source::{DirectorySource, MaterialSource, MemorySource, parse_nk_table};
pub use spline::{Spline, SplineCursor};
pub use num_complex;
pub use thinfilm_data;
pub use thinfilm_data::{DopingProfile, LayerRole, NkTable, SampleEntry};
