use std::fs;
use std::path::PathBuf;

use healthai_reference::store::{load_list_table, load_precautions, load_workouts, DISEASE_KEY, MEDICATION_COLUMN};
use healthai_reference::{ReferencePaths, ReferenceStore, SymptomCatalog};
use tempfile::TempDir;

fn data_dir() -> PathBuf {
    // crates/healthai-reference -> crates -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().join("test_data")
}

fn fixture_store() -> ReferenceStore {
    let dir = data_dir();
    ReferenceStore::load(&ReferencePaths {
        medications: Some(dir.join("medications.csv")),
        descriptions: Some(dir.join("description.csv")),
        diets: Some(dir.join("diets.csv")),
        precautions: Some(dir.join("precautions_df.csv")),
        workouts: Some(dir.join("workout_df.csv")),
    })
}

#[test]
fn all_fixture_tables_load() {
    assert_eq!(fixture_store().loaded_tables(), vec!["medications", "descriptions", "diets", "precautions", "workouts"]);
}

#[test]
fn medications_decode_list_literals_and_wrap_plain_values() {
    let store = fixture_store();
    assert_eq!(store.medications("Flu"), vec!["Paracetamol", "Rest"]);
    assert_eq!(store.medications("Fungal infection"), vec!["Antifungal Cream", "Fluconazole", "Terbinafine"]);
    assert_eq!(store.medications("Migraine"), vec!["Sumatriptan"]);
    assert_eq!(store.medications("Arthritis"), vec!["[Ibuprofen"]);
    assert!(store.medications("Unknown").is_empty());
}

#[test]
fn diets_follow_the_same_rule() {
    let store = fixture_store();
    assert_eq!(store.diets("Fungal infection"), vec!["Antifungal Diet", "Probiotics", "Garlic"]);
    assert_eq!(store.diets("Flu"), vec!["Warm soup", "Herbal tea"]);
    assert!(store.diets("Migraine").is_empty());
}

#[test]
fn description_is_blank_when_unmatched() {
    let store = fixture_store();
    assert!(store.description("Flu").starts_with("Influenza"));
    assert_eq!(store.description("Arthritis"), "");
}

#[test]
fn precautions_skip_blanks_and_keep_column_order() {
    let store = fixture_store();
    assert_eq!(store.precautions("Flu"), vec!["rest", "drink fluids"]);
    let fungal = store.precautions("Fungal infection");
    assert_eq!(fungal.len(), 4);
    assert_eq!(fungal[0], "bath twice");
    assert_eq!(fungal[3], "use clean cloths");
    for label in ["Fungal infection", "Flu", "Migraine", "Arthritis"] {
        let p = store.precautions(label);
        assert!(p.len() <= 4);
        assert!(p.iter().all(|s| !s.trim().is_empty()));
    }
}

#[test]
fn workouts_collect_every_matching_row_in_order() {
    let store = fixture_store();
    assert_eq!(
        store.workouts("Fungal infection"),
        vec!["Avoid sugary foods", "Consume probiotics", "Increase intake of garlic"]
    );
    assert_eq!(store.workouts("Flu"), vec!["Stay hydrated", "Get plenty of rest"]);
    assert!(store.workouts("Migraine").is_empty());
}

#[test]
fn absent_tables_answer_like_unmatched_labels() {
    let store = ReferenceStore::load(&ReferencePaths::default());
    assert!(store.loaded_tables().is_empty());
    assert!(store.medications("Flu").is_empty());
    assert_eq!(store.description("Flu"), "");
    assert!(store.diets("Flu").is_empty());
    assert!(store.precautions("Flu").is_empty());
    assert!(store.workouts("Flu").is_empty());
}

#[test]
fn missing_file_and_wrong_columns_are_tolerated() {
    let tmp = TempDir::new().unwrap();
    let wrong = tmp.path().join("meds.csv");
    fs::write(&wrong, "disease,Medication\nFlu,Rest\n").unwrap();
    let workouts_wrong_case = tmp.path().join("workouts.csv");
    fs::write(&workouts_wrong_case, "Disease,workout\nFlu,Walk\n").unwrap();

    let store = ReferenceStore::load(&ReferencePaths {
        medications: Some(wrong.clone()),
        descriptions: Some(tmp.path().join("missing.csv")),
        workouts: Some(workouts_wrong_case.clone()),
        ..ReferencePaths::default()
    });
    assert!(store.loaded_tables().is_empty());
    assert!(store.medications("Flu").is_empty());
    assert!(store.workouts("Flu").is_empty());

    assert_eq!(load_list_table(&wrong, DISEASE_KEY, MEDICATION_COLUMN).unwrap_err().kind(), "schema_mismatch");
    assert_eq!(load_workouts(&workouts_wrong_case).unwrap_err().kind(), "schema_mismatch");
    assert_eq!(load_precautions(&tmp.path().join("missing.csv")).unwrap_err().kind(), "not_found");
}

#[test]
fn first_row_wins_for_one_to_one_tables() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("meds.csv");
    fs::write(&path, "Disease,Medication\nFlu,\"['A']\"\nFlu,\"['B']\"\n").unwrap();
    let meds = load_list_table(&path, DISEASE_KEY, MEDICATION_COLUMN).unwrap();
    assert_eq!(meds["Flu"], vec!["A"]);
}

#[test]
fn symptom_catalog_reads_weights_and_optional_urls() {
    let catalog = SymptomCatalog::load(&data_dir().join("symptom-severity.csv")).expect("catalog");
    assert_eq!(catalog.len(), 8);
    let itching = catalog.get("Itching").expect("itching");
    assert_eq!(itching.weight, 1);
    assert_eq!(itching.url.as_deref(), Some("https://example.org/img/itching.png"));
    let rash = catalog.get("skin rash").expect("rash");
    assert_eq!(rash.name, "Skin rash");
    assert_eq!(rash.url, None);

    assert!(SymptomCatalog::load_optional(Some(&data_dir().join("nope.csv"))).is_empty());
    assert!(SymptomCatalog::load_optional(None).is_empty());
}

#[test]
fn catalog_skips_rows_with_bad_weights() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("severity.csv");
    fs::write(&path, "Symptom,weight\nitching,1\nskin_rash,heavy\ncough,\nhigh_fever,7\n").unwrap();

    let catalog = SymptomCatalog::load(&path).expect("catalog");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get("high fever").map(|s| s.weight), Some(7));
    assert!(catalog.get("skin_rash").is_none());
    assert_eq!(SymptomCatalog::load_optional(Some(&path)).len(), 2);
}
