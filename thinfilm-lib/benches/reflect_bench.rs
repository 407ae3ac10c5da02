use criterion::{Criterion, black_box, criterion_group, criterion_main};
use thinfilm::{
    EngineConfig, FreeCarrierModel, MemorySource, MobilityModel, NkTable, Polarization, Sample,
    Spline, ThinFilm, reflect,
};

fn silicon_table() -> NkTable {
    let energy_ev: Vec<f64> = (0..200).map(|i| 0.05 + i as f64 * 0.025).collect();
    let n = energy_ev.iter().map(|e| 3.42 + 0.1 * e * e).collect();
    let k = energy_ev.iter().map(|e| (0.01 * (e - 1.1)).max(0.0)).collect();
    NkTable {
        name: "c-Si".to_string(),
        energy_ev,
        n,
        k,
    }
}

fn engine() -> ThinFilm {
    let air = NkTable {
        name: "air".to_string(),
        energy_ev: vec![0.01, 1.0, 100.0],
        n: vec![1.0; 3],
        k: vec![0.0; 3],
    };
    let source = MemorySource::new()
        .with_table(air)
        .with_table(silicon_table());
    ThinFilm::with_source(EngineConfig::default(), source)
}

fn bench_spline(c: &mut Criterion) {
    let table = silicon_table();
    let spline = Spline::fit(&table.energy_ev, &table.n).unwrap();
    let xs: Vec<f64> = (0..1000).map(|i| 0.05 + i as f64 * 0.005).collect();

    c.bench_function("spline_eval_scattered", |b| {
        b.iter(|| {
            for &x in &xs {
                black_box(spline.eval(black_box(x)));
            }
        });
    });

    c.bench_function("spline_eval_many_sorted", |b| {
        b.iter(|| black_box(spline.eval_many(black_box(&xs))));
    });
}

fn bench_free_carrier(c: &mut Criterion) {
    let model = FreeCarrierModel::default();
    let dopings: Vec<f64> = (0..50).map(|i| -(10f64.powf(14.0 + i as f64 * 0.12))).collect();

    for (name, mode) in [
        ("alpha_klaassen", MobilityModel::Klaassen),
        ("alpha_spline", MobilityModel::Spline),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                for &d in &dopings {
                    black_box(model.alpha(black_box(d), 0.0, 300.0, 10.6, mode));
                }
            });
        });
    }
}

fn bench_reflect(c: &mut Criterion) {
    let mut tf = engine();
    let sample =
        Sample::parse("air\nc-Si 500 exponential -1e15 50 40\nc-Si 600 linear -1e18 -1e16 20\nc-Si")
            .unwrap();
    let layers = tf.expand_layers(&sample, 300.0, 10_600.0).unwrap();

    c.bench_function("reflect_62_layers_unpolarized", |b| {
        b.iter(|| {
            black_box(
                reflect(
                    black_box(45.0),
                    Polarization::Unpolarized,
                    10_600.0,
                    black_box(&layers),
                )
                .unwrap(),
            );
        });
    });

    c.bench_function("sample_reflectance_end_to_end", |b| {
        b.iter(|| {
            black_box(
                tf.reflectance(
                    black_box(&sample),
                    45.0,
                    Polarization::Te,
                    black_box(10_600.0),
                    300.0,
                )
                .unwrap(),
            );
        });
    });
}

criterion_group!(benches, bench_spline, bench_free_carrier, bench_reflect);
criterion_main!(benches);
