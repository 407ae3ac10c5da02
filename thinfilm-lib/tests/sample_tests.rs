use thinfilm::{DopingProfile, LayerRole, Override, Sample, SampleEntry, ThinFilmError};

const OXIDE_ON_SILICON: &str = "\
# incident medium first
air
SiO2      100nm                      % thermal oxide
[BRUGGEMAN 0.7 c-Si 0.3 void] 20 A
c-Si      1.5um  linear_implant = 1e15 1 0 25  temp=350
c-Si      2 um   exponential 2e15 50
c-Si             doping -1e16 // substrate
";

#[test]
fn test_parse_entries_and_roles() {
    let sample = Sample::parse(OXIDE_ON_SILICON).unwrap();
    assert_eq!(sample.len(), 6);

    let roles: Vec<LayerRole> = sample.entries.iter().map(|e| e.role).collect();
    assert_eq!(
        roles,
        vec![
            LayerRole::Incident,
            LayerRole::Sublayer,
            LayerRole::Sublayer,
            LayerRole::Sublayer,
            LayerRole::Sublayer,
            LayerRole::Substrate,
        ]
    );

    let e = &sample.entries;
    assert_eq!(e[0].material, "air");
    assert_eq!(e[0].thickness_nm, 0.0);
    assert_eq!(e[1].thickness_nm, 100.0);
    assert_eq!(e[2].material, "[BRUGGEMAN 0.7 c-Si 0.3 void]");
    assert_eq!(e[2].thickness_nm, 2.0);
    assert_eq!(e[3].thickness_nm, 1500.0);
    assert_eq!(e[3].temperature, Some(350.0));
    assert_eq!(
        e[3].doping,
        DopingProfile::LinearImplant {
            dose: 1e15,
            front: 1.0,
            back: 0.0,
            sublayers: Some(25)
        }
    );
    assert_eq!(e[4].thickness_nm, 2000.0);
    assert_eq!(
        e[4].doping,
        DopingProfile::Exponential {
            dose: 2e15,
            width_nm: 50.0,
            sublayers: None
        }
    );
    assert_eq!(
        e[5].doping,
        DopingProfile::Constant {
            concentration: -1e16
        }
    );
    assert_eq!(e[5].temperature, None);
}

#[test]
fn test_clause_keywords_case_and_prefix() {
    let sample = Sample::parse("air\nSi 10 T 400 DOPING=5e18\nSi Temperature=500 Linear 1e18 1e17").unwrap();
    assert_eq!(sample.entries[1].temperature, Some(400.0));
    assert_eq!(
        sample.entries[1].doping,
        DopingProfile::Constant {
            concentration: 5e18
        }
    );
    assert_eq!(sample.entries[2].temperature, Some(500.0));
    assert_eq!(
        sample.entries[2].doping,
        DopingProfile::Linear {
            front: 1e18,
            back: 1e17,
            sublayers: None
        }
    );
}

#[test]
fn test_directives() {
    let sample = Sample::parse("!CMAX 2e20\n!cnmax = -5e19\n!FROBNICATE 3\nair\nSi").unwrap();
    assert_eq!(sample.max_n_doping, Some(5e19));
    assert_eq!(sample.max_p_doping, Some(2e20));
    assert_eq!(sample.len(), 2);
}

#[test]
fn test_parse_errors() {
    for bad in [
        "air\nSi 10 sparkle",
        "air\nSi 10 doping",
        "air\nSi 10 doping = lots",
        "air\nSi 10 linear 1e18",
        "air\nSi 10 exponential 1e15",
        "air\n[0.5 a 0.5 b 10",
        "air\nSi 10parsecs",
        "!CMAX\nair\nSi",
    ] {
        assert!(
            matches!(Sample::parse(bad), Err(ThinFilmError::Parse(_))),
            "{bad:?}"
        );
    }
}

#[test]
fn test_empty_sample() {
    assert!(matches!(
        Sample::parse("# nothing here\n\n   \n"),
        Err(ThinFilmError::InvalidStack(_))
    ));
    let single = Sample::parse("air").unwrap();
    assert_eq!(single.entries[0].role, LayerRole::Incident);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.txt");
    std::fs::write(&path, OXIDE_ON_SILICON).unwrap();
    assert_eq!(Sample::load(&path).unwrap(), Sample::parse(OXIDE_ON_SILICON).unwrap());
    assert!(matches!(
        Sample::load(dir.path().join("missing.txt")),
        Err(ThinFilmError::Io(_))
    ));
}

#[test]
fn test_from_entries_assigns_roles() {
    let mut middle = SampleEntry::new("SiO2", 50.0);
    middle.role = LayerRole::Ignored;
    let sample = Sample::from_entries(vec![
        SampleEntry::new("air", 0.0),
        middle,
        SampleEntry::new("SiN", 80.0),
        SampleEntry::new("c-Si", 0.0),
    ])
    .unwrap();
    let roles: Vec<LayerRole> = sample.entries.iter().map(|e| e.role).collect();
    assert_eq!(
        roles,
        vec![
            LayerRole::Incident,
            LayerRole::Ignored,
            LayerRole::Sublayer,
            LayerRole::Substrate
        ]
    );
    assert!(Sample::from_entries(Vec::new()).is_err());
}

#[test]
fn test_overrides() {
    let mut sample = Sample::parse(OXIDE_ON_SILICON).unwrap();
    sample
        .apply_overrides(&[
            Override::Thickness { layer: 1, nm: 120.0 },
            Override::Doping { layer: 1, value: -1e17 },
            Override::Doping { layer: 3, value: 3e15 },
            Override::Doping { layer: 4, value: 5e14 },
            Override::Doping { layer: 5, value: -2e16 },
            Override::N { layer: 2, n: 2.5 },
            Override::K { layer: 2, k: -0.05 },
        ])
        .unwrap();

    let e = &sample.entries;
    assert_eq!(e[1].thickness_nm, 120.0);
    assert_eq!(
        e[1].doping,
        DopingProfile::Constant {
            concentration: -1e17
        }
    );
    assert!(matches!(e[3].doping, DopingProfile::LinearImplant { dose, .. } if dose == 3e15));
    assert!(matches!(e[4].doping, DopingProfile::Exponential { dose, width_nm, .. } if dose == 5e14 && width_nm == 50.0));
    assert_eq!(
        e[5].doping,
        DopingProfile::Constant {
            concentration: -2e16
        }
    );
    assert_eq!(e[2].n_override, Some(2.5));
    assert_eq!(e[2].k_override, Some(0.05));
}

#[test]
fn test_override_out_of_range() {
    let mut sample = Sample::parse("air\nc-Si").unwrap();
    assert!(matches!(
        sample.apply_overrides(&[Override::Thickness { layer: 2, nm: 1.0 }]),
        Err(ThinFilmError::InvalidStack(_))
    ));
}
