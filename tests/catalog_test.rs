use fairvis::catalog::Catalog;
use fairvis::config::Settings;
use fairvis::error::FairError;
use std::path::PathBuf;

fn demo_settings() -> Settings {
    Settings::with_data_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

#[test]
fn loads_bundled_demo_data() {
    let settings = demo_settings();
    assert!(settings.template_path().ends_with("FAIR_assessment_template.csv"));
    assert!(settings.assessments_dir().ends_with("assessments"));

    let catalog = Catalog::load(&settings).unwrap();
    assert_eq!(catalog.models.len(), 3);
    assert_eq!(catalog.indicators.len(), 18);
    assert_eq!(catalog.indicators.n_models, 3);
    for indicator in &catalog.indicators.indicators {
        assert_eq!(indicator.counts.total(), 3, "{}", indicator.id);
    }
    println!("✓ catalog with {} indicators", catalog.indicators.len());
}

#[test]
fn model_lookup_and_example_fallback() {
    let catalog = Catalog::load(&demo_settings()).unwrap();

    assert_eq!(catalog.model("GitHub_model").unwrap().model_id, "GitHub_model");
    assert!(matches!(catalog.model("missing"), Err(FairError::ModelNotFound(id)) if id == "missing"));

    assert_eq!(
        catalog.example_model("BioModels_C19_curated").map(|m| m.model_id.as_str()),
        Some("BioModels_C19_curated")
    );
    assert_eq!(
        catalog.example_model("not_there").map(|m| m.model_id.as_str()),
        Some("BioModels_C19_curated")
    );
}

#[test]
fn explicit_paths_override_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = demo_settings();
    settings.assessments = Some(dir.path().to_path_buf());

    let catalog = Catalog::load(&settings).unwrap();
    assert!(catalog.models.is_empty());
    assert!(catalog.example_model("anything").is_none());
    assert!(catalog.indicators.indicators.iter().all(|i| i.counts.total() == 0));

    settings.template = Some(dir.path().join("missing.csv"));
    assert!(Catalog::load(&settings).is_err());
}
