use approx::assert_relative_eq;
use thinfilm::constants::NM_PER_CM;
use thinfilm::{
    EngineConfig, Layer, LayerRole, MemorySource, MobilityModel, NkTable, Override, Polarization,
    Sample, ThinFilm, ThinFilmError,
};

const CO2_LASER_NM: f64 = 10_600.0;

fn flat(name: &str, n: f64, k: f64) -> NkTable {
    NkTable {
        name: name.to_string(),
        energy_ev: vec![0.05, 0.5, 1.0, 5.0],
        n: vec![n; 4],
        k: vec![k; 4],
    }
}

fn engine_with(config: EngineConfig) -> ThinFilm {
    let source = MemorySource::new()
        .with_table(flat("air", 1.0, 0.0))
        .with_table(flat("c-Si", 3.42, 0.0))
        .with_table(flat("SiO2", 1.45, 0.0));
    ThinFilm::with_source(config, source)
}

fn engine() -> ThinFilm {
    engine_with(EngineConfig::default())
}

fn dose_of(layers: &[Layer], entry: usize) -> f64 {
    layers
        .iter()
        .filter(|l| l.entry == entry)
        .map(|l| l.doping * l.thickness_nm / NM_PER_CM)
        .sum()
}

#[test]
fn test_roles_and_back_references() {
    let mut tf = engine();
    let sample = Sample::parse("air\nSiO2 100\nc-Si 500 linear -1e18 -1e16 5\nc-Si").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers.len(), 1 + 1 + 5 + 1);
    assert_eq!(layers[0].role, LayerRole::Incident);
    assert_eq!(layers[7].role, LayerRole::EndOfStack);
    assert!(layers[1..7].iter().all(|l| l.role == LayerRole::Sublayer));
    let entries: Vec<usize> = layers.iter().map(|l| l.entry).collect();
    assert_eq!(entries, vec![0, 1, 2, 2, 2, 2, 2, 3]);
    assert!(layers[2..7].iter().all(|l| l.thickness_nm == 100.0));
    // undoped entries are left alone
    assert_eq!(layers[1].doping, 0.0);
    assert_eq!(layers[1].index.im, 0.0);
}

#[test]
fn test_implant_dose_conserved() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si 400 linear_implant -2e15 1 3 40\nc-Si").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers.iter().filter(|l| l.entry == 1).count(), 40);
    assert_relative_eq!(dose_of(&layers, 1), -2e15, max_relative = 0.01);
}

#[test]
fn test_exponential_dose_conserved() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si 1000 exponential -1e15 80 30\nc-Si").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers.iter().filter(|l| l.entry == 1).count(), 30);
    assert_relative_eq!(dose_of(&layers, 1), -1e15, max_relative = 0.01);

    // default count spans about five decay lengths per slice
    let sample = Sample::parse("air\nc-Si 1000 exponential -1e15 80\nc-Si").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers.iter().filter(|l| l.entry == 1).count(), 63);
    assert_relative_eq!(dose_of(&layers, 1), -1e15, max_relative = 0.01);
}

#[test]
fn test_doping_clamped() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si 10 doping -1e21\nc-Si doping 1e21").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers[1].doping, -3e20);
    assert_eq!(layers[2].doping, 1e20);

    let sample = Sample::parse("!CNMAX 1e19\nair\nc-Si 10 doping -1e21\nc-Si doping 1e21").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers[1].doping, -1e19);
    assert_eq!(layers[2].doping, 1e20);

    let mut config = EngineConfig::default();
    config.max_p_doping = 1e18;
    let mut tf = engine_with(config);
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers[2].doping, 1e18);
}

#[test]
fn test_free_carrier_correction() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si 1000 doping -1e18\nc-Si").unwrap();
    let layers = tf.expand_layers(&sample, 300.0, CO2_LASER_NM).unwrap();
    let k = tf.k(-1e18, 0.0, 300.0, CO2_LASER_NM / 1000.0);
    assert_relative_eq!(layers[1].index.im, -k, epsilon = 1e-15);
    assert_relative_eq!(k, 0.0098634, max_relative = 1e-3);
    assert_eq!(layers[1].index.re, 3.42);
}

#[test]
fn test_entry_temperature_overrides_default() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si 1000 doping -1e18 t=600\nc-Si 1000 doping -1e18\nc-Si")
        .unwrap();
    let layers = tf.expand_layers(&sample, 300.0, CO2_LASER_NM).unwrap();
    let um = CO2_LASER_NM / 1000.0;
    assert_relative_eq!(layers[1].index.im, -tf.k(-1e18, 0.0, 600.0, um), epsilon = 1e-15);
    assert_relative_eq!(layers[2].index.im, -tf.k(-1e18, 0.0, 300.0, um), epsilon = 1e-15);
    assert!(layers[1].index.im != layers[2].index.im);
}

#[test]
fn test_configured_mobility_model() {
    let sample = Sample::parse("air\nc-Si 1000 doping -1e18\nc-Si").unwrap();
    let mut klaassen = engine();
    let mut config = EngineConfig::default();
    config.mobility_model = MobilityModel::Simple;
    let mut simple = engine_with(config);
    let a = klaassen.expand_layers(&sample, 300.0, CO2_LASER_NM).unwrap();
    let b = simple.expand_layers(&sample, 300.0, CO2_LASER_NM).unwrap();
    assert!((a[1].index.im - b[1].index.im).abs() > 1e-6);
}

#[test]
fn test_index_overrides_before_correction() {
    let mut tf = engine();
    let mut sample = Sample::parse("air\nSiO2 100\nc-Si 100 doping -1e18\nc-Si").unwrap();
    sample
        .apply_overrides(&[
            Override::N { layer: 1, n: 2.0 },
            Override::K { layer: 1, k: 0.01 },
            Override::K { layer: 2, k: 0.5 },
        ])
        .unwrap();
    let layers = tf.expand_layers(&sample, 300.0, CO2_LASER_NM).unwrap();
    assert_eq!(layers[1].index.re, 2.0);
    assert_eq!(layers[1].index.im, -0.01);
    let fc = tf.k(-1e18, 0.0, 300.0, CO2_LASER_NM / 1000.0);
    assert_relative_eq!(layers[2].index.im, -0.5 - fc, epsilon = 1e-15);
}

#[test]
fn test_ignored_entries_skipped() {
    let mut tf = engine();
    let mut sample = Sample::parse("air\nSiO2 100\nc-Si").unwrap();
    sample.entries[1].role = LayerRole::Ignored;
    let layers = tf.expand_layers(&sample, 300.0, 633.0).unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1].entry, 2);
}

#[test]
fn test_stack_errors() {
    let mut tf = engine();
    let single = Sample::parse("air").unwrap();
    assert!(matches!(
        tf.expand_layers(&single, 300.0, 633.0),
        Err(ThinFilmError::InvalidStack(_))
    ));
    let unknown = Sample::parse("air\nunobtainium 10\nc-Si").unwrap();
    assert!(matches!(
        tf.expand_layers(&unknown, 300.0, 633.0),
        Err(ThinFilmError::Resolution { .. })
    ));
    let bad_profile = Sample::parse("air\nc-Si 100 exponential 1e15 0\nc-Si").unwrap();
    assert!(tf.expand_layers(&bad_profile, 300.0, 633.0).is_err());
}

#[test]
fn test_oversized_sublayer_counts_rejected() {
    let mut tf = engine();
    for text in [
        "air\nc-Si 1000 linear -1e18 -2e18 4000000000\nc-Si",
        "air\nc-Si 1000 exponential 1e15 1e-6\nc-Si",
    ] {
        let sample = Sample::parse(text).unwrap();
        assert!(
            matches!(
                tf.expand_layers(&sample, 300.0, 633.0),
                Err(ThinFilmError::InvalidStack(_))
            ),
            "{text}"
        );
    }

    let mut config = EngineConfig::default();
    config.max_sublayers = 20;
    let mut strict = engine_with(config);
    let fits = Sample::parse("air\nc-Si 100 linear -1e18 -1e17 20\nc-Si").unwrap();
    assert_eq!(strict.expand_layers(&fits, 300.0, 633.0).unwrap().len(), 22);
    let too_many = Sample::parse("air\nc-Si 100 linear -1e18 -1e17 21\nc-Si").unwrap();
    assert!(strict.expand_layers(&too_many, 300.0, 633.0).is_err());
}

#[test]
fn test_sample_reflectance() {
    let mut tf = engine();
    let sample = Sample::parse("air\nc-Si").unwrap();
    let rt = tf
        .reflectance(&sample, 0.0, Polarization::Te, 1064.0, 300.0)
        .unwrap();
    assert_relative_eq!(rt.reflectance, 0.29976863700579426, epsilon = 1e-12);
    assert!(rt.transmittance > 0.0);

    // a thin heavily doped layer absorbs at 10.6 µm
    let doped = Sample::parse("air\nc-Si 2000 doping -1e20\nc-Si").unwrap();
    let rt = tf
        .reflectance(&doped, 0.0, Polarization::Unpolarized, CO2_LASER_NM, 300.0)
        .unwrap();
    assert!(rt.absorptance() > 0.01, "{rt:?}");
}
