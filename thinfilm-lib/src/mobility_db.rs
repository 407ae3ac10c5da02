/// Room-temperature silicon mobility versus ionized impurity concentration
/// (Avant! TSUPREM tables).
///
/// Each entry: (concentration_cm3, electron_mobility, hole_mobility) in cm²/V·s
pub(crate) const MOBILITY_300K: &[(f64, f64, f64)] = &[
    (1.0e14, 1350.0, 495.0),
    (2.0e14, 1345.0, 495.0),
    (4.0e14, 1335.0, 495.0),
    (6.0e14, 1320.0, 495.0),
    (8.0e14, 1310.0, 495.0),
    (1.0e15, 1300.0, 491.1),
    (2.0e15, 1248.0, 487.3),
    (4.0e15, 1200.0, 480.1),
    (6.0e15, 1156.0, 473.3),
    (8.0e15, 1115.0, 466.9),
    (1.0e16, 1076.0, 460.9),
    (2.0e16, 960.0, 434.8),
    (4.0e16, 845.0, 396.5),
    (6.0e16, 760.0, 369.2),
    (8.0e16, 720.0, 348.3),
    (1.0e17, 675.0, 331.5),
    (2.0e17, 524.0, 279.0),
    (4.0e17, 385.0, 229.8),
    (6.0e17, 321.0, 203.8),
    (8.0e17, 279.0, 186.9),
    (1.0e18, 252.0, 178.0),
    (2.0e18, 182.5, 130.0),
    (4.0e18, 140.6, 90.0),
    (6.0e18, 113.6, 74.5),
    (8.0e18, 99.5, 66.6),
    (1.0e19, 90.5, 61.0),
    (2.0e19, 86.9, 55.0),
    (4.0e19, 83.4, 53.7),
    (6.0e19, 78.8, 52.9),
    (8.0e19, 71.6, 52.4),
    (1.0e20, 67.8, 52.0),
    (2.0e20, 52.0, 50.8),
    (4.0e20, 35.5, 49.6),
    (6.0e20, 23.6, 48.9),
    (8.0e20, 19.0, 48.4),
    (1.0e21, 17.8, 48.0),
];

/// Coefficient set of the Reggiani/Klaassen bulk mobility model for one
/// dopant species. Each `(c, p)` pair expands to `c * (T/300)^p`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MobilityParams {
    pub u_max: f64,
    pub c: f64,
    pub gamma: f64,
    pub u0d: (f64, f64),
    pub u0a: (f64, f64),
    pub u1d: (f64, f64),
    pub u1a: (f64, f64),
    pub cr1: (f64, f64),
    pub cr2: (f64, f64),
    pub cs1: (f64, f64),
    pub cs2: (f64, f64),
    pub alpha_1: f64,
    pub alpha_2: f64,
}

pub(crate) const ARSENIC: MobilityParams = MobilityParams {
    u_max: 1441.0,
    c: 0.07,
    gamma: 2.45,
    u0d: (55.0, -0.6),
    u0a: (132.0, -1.3),
    u1d: (42.4, -0.5),
    u1a: (73.5, -1.25),
    cr1: (8.90e16, 3.65),
    cr2: (1.22e17, 2.65),
    cs1: (2.9e20, 0.0),
    cs2: (7.0e20, 0.0),
    alpha_1: 0.68,
    alpha_2: 0.72,
};

pub(crate) const PHOSPHORUS: MobilityParams = MobilityParams {
    u_max: 1441.0,
    c: 0.07,
    gamma: 2.45,
    u0d: (62.2, -0.7),
    u0a: (132.0, -1.3),
    u1d: (48.6, -0.7),
    u1a: (73.5, -1.25),
    cr1: (8.50e16, 3.65),
    cr2: (1.22e17, 2.65),
    cs1: (4.0e20, 0.0),
    cs2: (7.0e20, 0.0),
    alpha_1: 0.68,
    alpha_2: 0.72,
};

pub(crate) const BORON: MobilityParams = MobilityParams {
    u_max: 470.5,
    c: 0.0,
    gamma: 2.16,
    u0d: (90.0, -1.3),
    u0a: (44.0, -0.7),
    u1d: (28.2, -2.0),
    u1a: (28.2, -0.8),
    cr1: (1.30e18, 2.2),
    cr2: (2.45e17, 3.1),
    cs1: (1.1e18, 6.2),
    cs2: (6.1e20, 0.0),
    alpha_1: 0.77,
    alpha_2: 0.719,
};
