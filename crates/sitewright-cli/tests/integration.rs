use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sitewright() -> Command {
    Command::cargo_bin("sitewright").unwrap()
}

fn write_profile(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("profile.yaml");
    std::fs::write(
        &path,
        r#"
business_id: biz-42
name: Austin Comfort Co
trade: hvac
phone: "+1 512-555-0188"
service_areas:
  - postal_code: "78701"
    city: Austin
    region: TX
    country_code: US
    emergency_services_available: true
services:
  - name: HVAC Repair
    description: Diagnosis and repair of AC and heating systems.
    pricing_model: fixed
    unit_price: 150.0
locations:
  - city: Austin
    state: TX
    primary: true
hours:
  - day_of_week: 1
    open: true
    open_time: "08:00"
    close_time: "18:00"
"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// sitewright compose
// ---------------------------------------------------------------------------

#[test]
fn compose_prints_route_summary() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    sitewright()
        .arg("compose")
        .arg(&profile)
        .args(["--website-id", "austin-comfort"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/services/hvac-repair"))
        .stdout(predicate::str::contains("/service-areas/78701"))
        .stdout(predicate::str::contains("Austin Comfort Co"));
}

#[test]
fn compose_json_emits_full_artifact() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    let output = sitewright()
        .arg("compose")
        .arg(&profile)
        .args(["--website-id", "austin-comfort", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let artifact: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(artifact["website_id"], "austin-comfort");
    assert!(artifact["pages"]["/"]["schema_markup"][0]["@type"] == "LocalBusiness");
}

#[test]
fn compose_out_writes_page_tree() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);
    let out = dir.path().join("site");

    sitewright()
        .arg("compose")
        .arg(&profile)
        .args(["--website-id", "austin-comfort"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let home = std::fs::read_to_string(out.join("index.html")).unwrap();
    assert!(home.contains("Austin Comfort Co"));
    assert!(home.contains("application/ld+json"));
    assert!(out.join("services/hvac-repair/index.html").exists());
    assert!(out.join("service-areas/78701/index.html").exists());
}

#[test]
fn compose_rejects_bad_website_id() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    sitewright()
        .arg("compose")
        .arg(&profile)
        .args(["--website-id", "Bad_ID"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("website id"));
}

#[test]
fn compose_rejects_profile_without_service_areas() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.yaml");
    std::fs::write(
        &path,
        "business_id: biz-1\nname: Lonely Co\nservice_areas: []\n",
    )
    .unwrap();

    sitewright()
        .arg("compose")
        .arg(&path)
        .args(["--website-id", "lonely-co"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("service area"));
}

#[test]
fn compose_rejects_missing_profile_file() {
    sitewright()
        .arg("compose")
        .arg("/nonexistent/profile.yaml")
        .args(["--website-id", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading profile"));
}

// ---------------------------------------------------------------------------
// remote commands
// ---------------------------------------------------------------------------

#[test]
fn deploy_fails_cleanly_when_server_is_unreachable() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    sitewright()
        .args(["--server", "http://127.0.0.1:1"])
        .arg("deploy")
        .arg(&profile)
        .args(["--website-id", "austin-comfort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn status_requires_a_uuid() {
    sitewright()
        .arg("status")
        .arg("not-a-uuid")
        .assert()
        .failure();
}
