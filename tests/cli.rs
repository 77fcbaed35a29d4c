#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(ledger: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kitplan-cli").unwrap();
    cmd.arg("--ledger").arg(ledger).env_remove("KITPLAN_ORG");
    cmd
}

#[test]
fn import_suggest_apply_then_check() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");
    let kits = dir.path().join("kits.csv");
    let shows = dir.path().join("shows.csv");
    fs::write(
        &kits,
        "id,name,code,kit_type,home_base,current_location,ship_days,return_days\n\
         k1,Booth A,,standard,Lyon,,2,2\n",
    )
    .unwrap();
    fs::write(
        &shows,
        "id,name,location,start,end\n\
         s1,Salon,Nice,2025-04-10,2025-04-12\n\
         s2,Expo,Nice,2025-06-10,2025-06-12\n",
    )
    .unwrap();

    cli(&ledger)
        .arg("import-kits")
        .arg("--csv")
        .arg(&kits)
        .assert()
        .success()
        .stdout(contains("1 kit(s) imported"));
    cli(&ledger)
        .arg("import-shows")
        .arg("--csv")
        .arg(&shows)
        .assert()
        .success()
        .stdout(contains("2 show(s) imported"));

    let report = dir.path().join("report.csv");
    cli(&ledger)
        .args(["suggest", "--apply", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stdout(contains("s1 -> k1"))
        .stdout(contains("s2 -> k1"));
    assert!(fs::read_to_string(&report).unwrap().starts_with("show_id,kit_id"));

    cli(&ledger)
        .arg("check")
        .assert()
        .success()
        .stdout(contains("OK: no double booking"));
    cli(&ledger)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("| k1 | s1 |"))
        .stdout(contains("planned"));

    // plus rien à proposer : tous les salons sont couverts
    cli(&ledger)
        .arg("suggest")
        .assert()
        .success()
        .stdout(predicates::str::is_empty());
}

#[test]
fn unassignable_show_exits_with_warning_code() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");
    let kits = dir.path().join("kits.csv");
    let shows = dir.path().join("shows.csv");
    fs::write(
        &kits,
        "id,name,code,kit_type,home_base,current_location,ship_days,return_days\n\
         k1,Booth A,,standard,Lyon,,2,2\n",
    )
    .unwrap();
    fs::write(
        &shows,
        "id,name,location,start,end\n\
         s1,Salon,Nice,2025-04-10,2025-04-12\n\
         s2,Expo,Nice,2025-04-11,2025-04-13\n",
    )
    .unwrap();
    cli(&ledger).arg("import-kits").arg("--csv").arg(&kits).assert().success();
    cli(&ledger).arg("import-shows").arg("--csv").arg(&shows).assert().success();

    cli(&ledger)
        .arg("suggest")
        .assert()
        .code(2)
        .stdout(contains("s2 -> - | no kit available without conflict in requested window"));

    cli(&ledger)
        .args(["assign", "--kit", "k1", "--show", "s1"])
        .assert()
        .success();
    cli(&ledger)
        .args(["assign", "--kit", "k1", "--show", "s2"])
        .assert()
        .failure()
        .stderr(contains("conflicting booking"));
}

#[test]
fn reimported_show_landing_on_a_booking_is_skipped() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.json");
    let kits = dir.path().join("kits.csv");
    let shows = dir.path().join("shows.csv");
    fs::write(
        &kits,
        "id,name,code,kit_type,home_base,current_location,ship_days,return_days\n\
         k1,Booth A,,standard,Lyon,,2,2\n",
    )
    .unwrap();
    fs::write(
        &shows,
        "id,name,location,start,end\n\
         s1,Salon,Nice,2025-04-10,2025-04-12\n\
         s3,Foire,Nice,2025-04-20,2025-04-22\n",
    )
    .unwrap();
    cli(&ledger).arg("import-kits").arg("--csv").arg(&kits).assert().success();
    cli(&ledger).arg("import-shows").arg("--csv").arg(&shows).assert().success();
    for show in ["s1", "s3"] {
        cli(&ledger)
            .args(["assign", "--kit", "k1", "--show", show])
            .assert()
            .success();
    }

    // le calendrier repousse s1 contre s3
    fs::write(
        &shows,
        "id,name,location,start,end\n\
         s1,Salon,Nice,2025-04-18,2025-04-19\n\
         s3,Foire,Nice,2025-04-20,2025-04-22\n",
    )
    .unwrap();
    cli(&ledger)
        .arg("import-shows")
        .arg("--csv")
        .arg(&shows)
        .assert()
        .code(2)
        .stdout(contains("1 show(s) imported"))
        .stderr(contains("warning: show s1 skipped"));

    let saved = fs::read_to_string(&ledger).unwrap();
    assert!(saved.contains("2025-04-10"));
    assert!(!saved.contains("2025-04-18"));
}
