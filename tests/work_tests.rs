//! Work CRUD and composition tests

mod common;

use common::{
    create_test_labor, create_test_material, create_test_work, create_test_work_with, owl,
    setup_test_project,
};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_work_new_creates_file() {
    let tmp = setup_test_project();

    owl()
        .current_dir(tmp.path())
        .args([
            "work",
            "new",
            "--name",
            "Cloison placo BA13",
            "--unit",
            "m²",
            "--no-edit",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created work"));

    let files: Vec<_> = fs::read_dir(tmp.path().join("library/works"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(".owl.yaml"))
        .collect();
    assert_eq!(files.len(), 1);

    let content = fs::read_to_string(files[0].path()).unwrap();
    assert!(content.contains("Cloison placo BA13"));
}

#[test]
fn test_work_new_with_components_caches_costs() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Rail R48", "ml", 2.5);
    let lab_id = create_test_labor(&tmp, "Plaquiste", 40.0);

    let wrk_id = create_test_work_with(
        &tmp,
        "Cloison distributive",
        None,
        &[(&mat_id, 2.0), (&lab_id, 0.5)],
    );
    assert!(wrk_id.starts_with("WRK-"), "got: {}", wrk_id);

    // 2 × 2.5 + 0.5 × 40 = 25, +20% margin = 30
    owl()
        .current_dir(tmp.path())
        .args(["work", "show", &wrk_id, "-o", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_cost: 25"))
        .stdout(predicate::str::contains("recommended_price: 30"));
}

#[test]
fn test_work_new_uses_configured_default_margin() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".owl/config.yaml"), "default_margin: 50\n").unwrap();

    let mat_id = create_test_material(&tmp, "Bloc à bancher", "u", 10.0);
    let wrk_id = create_test_work_with(&tmp, "Muret technique", None, &[(&mat_id, 10.0)]);

    // 100 of cost at the configured 50% margin, not the built-in 20
    owl()
        .current_dir(tmp.path())
        .args(["work", "cost", &wrk_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Margin: €50.00 (50%)"))
        .stdout(predicate::str::contains("Recommended Price: €150.00"));

    // An explicit --margin still wins over the configured default
    let wrk2 = create_test_work_with(&tmp, "Muret nu", Some(0.0), &[(&mat_id, 10.0)]);
    owl()
        .current_dir(tmp.path())
        .args(["work", "cost", &wrk2])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommended Price: €100.00"));
}

#[test]
fn test_work_add_component_by_short_id() {
    let tmp = setup_test_project();
    create_test_material(&tmp, "Isolant GR32", "m²", 7.9);
    let wrk_id = create_test_work(&tmp, "Doublage isolant", "m²");

    // Generate short IDs
    owl()
        .current_dir(tmp.path())
        .args(["mat", "list"])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, "MAT@1:1.05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added material"));

    owl()
        .current_dir(tmp.path())
        .args(["work", "show", &wrk_id, "-o", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: material"))
        .stdout(predicate::str::contains("quantity: 1.05"));
}

#[test]
fn test_work_add_merges_duplicate_component() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Vis TTPC 25", "u", 0.04);
    let wrk_id = create_test_work(&tmp, "Plafond suspendu", "m²");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, &format!("{}:10", mat_id)])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, &format!("{}:5", mat_id)])
        .assert()
        .success();

    // One line at quantity 15, not two lines
    owl()
        .current_dir(tmp.path())
        .args(["work", "show", &wrk_id, "-o", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quantity: 15"));
}

#[test]
fn test_work_add_unknown_reference_fails() {
    let tmp = setup_test_project();
    let wrk_id = create_test_work(&tmp, "Orphelin", "u");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, "MAT-01INCONNU0000000000000000:2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in any catalog"));
}

#[test]
fn test_work_add_rejects_non_positive_quantity() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Sable", "t", 38.0);
    let wrk_id = create_test_work(&tmp, "Remblai", "m³");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, &format!("{}:0", mat_id)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_work_rm_component() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Enduit", "kg", 0.9);
    let wrk_id = create_test_work(&tmp, "Ratissage", "m²");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, &format!("{}:3", mat_id)])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["work", "rm", &wrk_id, &mat_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"))
        .stdout(predicate::str::contains("0 line(s) remaining"));

    owl()
        .current_dir(tmp.path())
        .args(["work", "rm", &wrk_id, &mat_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in work"));
}

#[test]
fn test_work_add_rejects_cycle() {
    let tmp = setup_test_project();
    let a_id = create_test_work(&tmp, "Ouvrage A", "u");
    let b_id = create_test_work(&tmp, "Ouvrage B", "u");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &a_id, &format!("{}:1", b_id)])
        .assert()
        .success();

    // B -> A would close A -> B -> A
    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &b_id, &format!("{}:1", a_id)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn test_work_add_rejects_self_reference() {
    let tmp = setup_test_project();
    let wrk_id = create_test_work(&tmp, "Récursif", "u");

    owl()
        .current_dir(tmp.path())
        .args(["work", "add", &wrk_id, &format!("{}:1", wrk_id)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn test_work_list_unpriced_filter() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Grillage", "m²", 2.2);
    create_test_work_with(&tmp, "Clôture posée", None, &[(&mat_id, 1.0)]);
    create_test_work(&tmp, "Jamais chiffré", "u");

    owl()
        .current_dir(tmp.path())
        .args(["work", "list", "--unpriced", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_delete_referenced_material_blocked_without_force() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Poutre IPN", "ml", 42.0);
    create_test_work_with(&tmp, "Reprise en sous-œuvre", None, &[(&mat_id, 2.0)]);

    owl()
        .current_dir(tmp.path())
        .args(["mat", "delete", &mat_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("referenced by"))
        .stderr(predicate::str::contains("--force"));

    // Forced deletion goes through and leaves a dangling reference
    owl()
        .current_dir(tmp.path())
        .args(["mat", "delete", &mat_id, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dangling"));
}

#[test]
fn test_validate_reports_dangling_reference() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Fer à béton", "kg", 1.1);
    create_test_work_with(&tmp, "Ferraillage", None, &[(&mat_id, 80.0)]);

    owl()
        .current_dir(tmp.path())
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));

    owl()
        .current_dir(tmp.path())
        .args(["mat", "delete", &mat_id, "--force"])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no catalog contains"));

    // Strict mode turns issues into a failing exit
    owl()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_reports_stale_cache() {
    let tmp = setup_test_project();
    let mat_id = create_test_material(&tmp, "Tuile plate", "u", 1.0);
    create_test_work_with(&tmp, "Couverture tuiles", None, &[(&mat_id, 100.0)]);

    // Catalog price moves, the work's cache is now stale
    owl()
        .current_dir(tmp.path())
        .args(["mat", "set-price", &mat_id, "1.4"])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stale cost cache"));

    // Repricing clears the issue
    owl()
        .current_dir(tmp.path())
        .args(["work", "reprice", "--all"])
        .assert()
        .success();

    owl()
        .current_dir(tmp.path())
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}
