use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cashflow(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cashflow").unwrap();
    cmd.env("CASHFLOW_DATA_DIR", data_dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn add_sample_service(data_dir: &TempDir) {
    cashflow(data_dir)
        .args([
            "service",
            "add",
            "--first",
            "Ada",
            "--last",
            "Lovelace",
            "--gspr",
            "1,000.00",
            "--gspr-due",
            "2024-01-15",
            "--commissionable",
            "1000",
            "--percent",
            "10",
            "--comm-due",
            "2024-01-20",
            "--cosp",
            "200",
            "--cosp-due",
            "2024-01-25",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created service: svc-"));
}

#[test]
fn init_writes_settings() {
    let dir = TempDir::new().unwrap();

    cashflow(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("services.json").exists());
}

#[test]
fn report_buckets_by_month() {
    let dir = TempDir::new().unwrap();
    add_sample_service(&dir);

    cashflow(&dir)
        .args(["report", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jan 2024"))
        .stdout(predicate::str::contains("$1,100.00"))
        .stdout(predicate::str::contains("$900.00"));
}

#[test]
fn report_csv_to_stdout() {
    let dir = TempDir::new().unwrap();
    add_sample_service(&dir);

    cashflow(&dir)
        .args(["report", "--scale", "week", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-W03,2024-W03,1100.00,0.00,1100.00"))
        .stdout(predicate::str::contains("2024-W04,2024-W04,0.00,200.00,-200.00"));
}

#[test]
fn report_json_file() {
    let dir = TempDir::new().unwrap();
    add_sample_service(&dir);
    let out = dir.path().join("report.json");

    cashflow(&dir)
        .args(["report", "--output"])
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["report"]["year"], 2024);
    assert_eq!(json["report"]["buckets"][0]["period_key"], "2024-01");
}

#[test]
fn years_marks_default() {
    let dir = TempDir::new().unwrap();

    cashflow(&dir)
        .arg("years")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dated cash flows yet."));

    add_sample_service(&dir);
    cashflow(&dir)
        .arg("years")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024 (default)"));
}

#[test]
fn clearing_a_leg_removes_it_from_dues() {
    let dir = TempDir::new().unwrap();
    add_sample_service(&dir);

    cashflow(&dir)
        .args(["dues", "--kind", "payable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payable (COSP)"))
        .stdout(predicate::str::contains("$200.00"));

    let services_file = dir.path().join("data").join("services.json");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(services_file).unwrap()).unwrap();
    let id = stored["services"][0]["id"].as_str().unwrap().to_string();

    cashflow(&dir)
        .args(["service", "clear", &id, "--leg", "cosp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as paid"));

    cashflow(&dir)
        .args(["dues", "--kind", "payable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing outstanding."));

    // Cleared legs still count toward the report
    cashflow(&dir)
        .args(["report", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$900.00"));
}

#[test]
fn rejects_invalid_amount() {
    let dir = TempDir::new().unwrap();

    cashflow(&dir)
        .args(["service", "add", "--gspr", "lots", "--gspr-due", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));
}

#[test]
fn show_unknown_service_fails() {
    let dir = TempDir::new().unwrap();

    cashflow(&dir)
        .args(["service", "show", "svc-nothere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Service not found"));
}

#[test]
fn revenue_share_listed_until_paid() {
    let dir = TempDir::new().unwrap();

    cashflow(&dir)
        .args([
            "service",
            "add",
            "--first",
            "Grace",
            "--gspr",
            "800",
            "--gspr-due",
            "2024-03-01",
            "--rev-share",
            "120",
            "--rev-share-due",
            "2024-03-15",
            "--rev-share-to",
            "Northwind",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue share due"));

    cashflow(&dir)
        .args(["dues", "--kind", "revshare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue Share Payable"))
        .stdout(predicate::str::contains("Northwind"))
        .stdout(predicate::str::contains("Payable:    $120.00"));

    // Revenue share is not a cash flow leg
    cashflow(&dir)
        .args(["report", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$800.00"))
        .stdout(predicate::str::contains("$120.00").not());

    let services_file = dir.path().join("data").join("services.json");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(services_file).unwrap()).unwrap();
    let id = stored["services"][0]["id"].as_str().unwrap().to_string();

    cashflow(&dir)
        .args(["service", "clear", &id, "--leg", "revshare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as paid"));

    cashflow(&dir)
        .args(["dues", "--kind", "revshare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing outstanding."));
}

#[test]
fn report_shows_cosp_column() {
    let dir = TempDir::new().unwrap();
    add_sample_service(&dir);

    cashflow(&dir)
        .args(["report", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COSP"))
        .stdout(predicate::str::contains("$200.00"));
}
