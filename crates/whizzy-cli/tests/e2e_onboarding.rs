//! E2E tests for the onboarding flow: signup through the weekly view.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn wz_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wz"));
    cmd.current_dir(dir);
    cmd.arg("--db").arg(dir.join("whizzy.sqlite3"));
    cmd.env("WHIZZY_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("XDG_DATA_HOME", dir.join("data"));
    cmd.env_remove("WHIZZY_DB");
    cmd.env_remove("FORMAT");
    cmd
}

fn wz_json(dir: &Path, args: &[&str]) -> Value {
    let output = wz_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("wz should not crash");
    assert!(
        output.status.success(),
        "wz {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn onboard_ana(dir: &Path) -> Value {
    let signup = wz_json(
        dir,
        &["signup", "--email", "ana@example.com", "--password", "secret1"],
    );
    assert_eq!(signup["next"], "profile-setup");

    let profile = wz_json(dir, &["profile", "setup", "--name", "Ana", "--avatar", "2"]);
    assert_eq!(profile["next"], "group-selection");

    let created = wz_json(dir, &["group", "create"]);
    assert_eq!(created["next"], "group-setup");
    assert_eq!(created["group"]["members"], 1);

    let configured = wz_json(
        dir,
        &["group", "configure", "--name", "Casa Ana", "--week-start", "Lunes"],
    );
    assert_eq!(configured["next"], "task-selection");
    configured
}

#[test]
fn signup_to_home_flow_succeeds() {
    let dir = TempDir::new().unwrap();
    let configured = onboard_ana(dir.path());
    let code = configured["group"]["invite_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);

    let scheduled = wz_json(dir.path(), &["tasks", "schedule", "1", "3"]);
    assert_eq!(scheduled["next"], "home");
    assert_eq!(scheduled["day"], "Lunes");
    let tasks = scheduled["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["dia"], "Lunes");

    let week = wz_json(dir.path(), &["week", "--done", "3"]);
    assert_eq!(week["day"], "Lunes");
    let rows = week["tasks"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "1");
    assert_eq!(rows[0]["title"], "Fregar los platos");
    assert_eq!(rows[0]["done"], false);
    assert_eq!(rows[1]["title"], "Poner la mesa");
    assert_eq!(rows[1]["done"], true);

    // Rescheduling replaces the list and keeps the invite code.
    let rescheduled = wz_json(dir.path(), &["tasks", "schedule", "--day", "Martes", "9"]);
    assert_eq!(rescheduled["tasks"].as_array().unwrap().len(), 1);
    let monday = wz_json(dir.path(), &["week"]);
    assert!(monday["tasks"].as_array().unwrap().is_empty());
    let tuesday = wz_json(dir.path(), &["week", "--day", "Martes"]);
    assert_eq!(tuesday["tasks"][0]["id"], "9");

    let overview = wz_json(dir.path(), &["profile", "show"]);
    assert_eq!(overview["current_group"]["invite_code"], code);
}

#[test]
fn returning_user_lands_on_home() {
    let dir = TempDir::new().unwrap();
    onboard_ana(dir.path());
    wz_json(dir.path(), &["tasks", "schedule", "2"]);
    wz_json(dir.path(), &["logout"]);

    let status = wz_json(dir.path(), &["status"]);
    assert_eq!(status["next"], "signed-out");

    let login = wz_json(
        dir.path(),
        &["login", "--email", "ana@example.com", "--password", "secret1"],
    );
    assert_eq!(login["next"], "home");
    assert!(login["group_id"].is_string());
}

#[test]
fn second_member_joins_by_code() {
    let dir = TempDir::new().unwrap();
    let configured = onboard_ana(dir.path());
    let code = configured["group"]["invite_code"].as_str().unwrap().to_string();
    wz_json(dir.path(), &["tasks", "schedule", "1"]);

    wz_json(
        dir.path(),
        &["signup", "--email", "bea@example.com", "--password", "secret2"],
    );
    wz_json(dir.path(), &["profile", "setup", "--name", "Bea", "--avatar", "5"]);
    let joined = wz_json(dir.path(), &["group", "join", &code]);
    assert_eq!(joined["group"]["members"], 2);
    assert_eq!(joined["next"], "home");

    let ranking = wz_json(dir.path(), &["ranking"]);
    let rows = ranking.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["points"] == 0));
    assert!(rows.iter().all(|row| row["mood"] == "sad"));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    wz_json(
        dir.path(),
        &["signup", "--email", "ana@example.com", "--password", "secret1"],
    );

    wz_cmd(dir.path())
        .args(["login", "--email", "ana@example.com", "--password", "nope123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usuario o contraseña incorrectos"));
}

#[test]
fn unknown_invite_code_is_rejected() {
    let dir = TempDir::new().unwrap();
    wz_json(
        dir.path(),
        &["signup", "--email", "ana@example.com", "--password", "secret1"],
    );
    wz_json(dir.path(), &["profile", "setup", "--name", "Ana", "--avatar", "0"]);

    let output = wz_cmd(dir.path())
        .args(["group", "join", "zzzzzz", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["message"], "Código no encontrado");
    assert_eq!(err["error"]["error_code"], "E4004");
}

#[test]
fn empty_selection_leaves_group_untouched() {
    let dir = TempDir::new().unwrap();
    onboard_ana(dir.path());

    wz_cmd(dir.path())
        .args(["tasks", "schedule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Selecciona al menos una tarea antes de continuar.",
        ));

    let status = wz_json(dir.path(), &["status"]);
    assert_eq!(status["next"], "task-selection");
}

#[test]
fn missing_profile_fields_are_listed() {
    let dir = TempDir::new().unwrap();
    wz_json(
        dir.path(),
        &["signup", "--email", "ana@example.com", "--password", "secret1"],
    );

    wz_cmd(dir.path())
        .args(["profile", "setup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Debes escribir tu nombre y elegir un avatar.",
        ));
}

#[test]
fn group_setup_lists_every_problem() {
    let dir = TempDir::new().unwrap();
    wz_json(
        dir.path(),
        &["signup", "--email", "ana@example.com", "--password", "secret1"],
    );
    wz_json(dir.path(), &["profile", "setup", "--name", "Ana", "--avatar", "1"]);
    wz_json(dir.path(), &["group", "create"]);

    wz_cmd(dir.path())
        .args(["group", "configure", "--name", "", "--week-start", "Lundi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("El nombre del grupo es obligatorio."))
        .stderr(predicate::str::contains("Día de la semana no válido."));

    let status = wz_json(dir.path(), &["status"]);
    assert_eq!(status["next"], "group-setup");
}

#[test]
fn commands_need_a_signed_in_user() {
    let dir = TempDir::new().unwrap();
    wz_cmd(dir.path())
        .args(["week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Debes iniciar sesión."));
}

#[test]
fn catalog_lists_rooms() {
    let dir = TempDir::new().unwrap();
    let catalog = wz_json(dir.path(), &["tasks", "catalog"]);
    let rows = catalog.as_array().unwrap();
    assert_eq!(rows[0]["section"], "Cocina");

    let detailed = wz_json(dir.path(), &["tasks", "catalog", "--mode", "detailed"]);
    assert!(detailed[0].get("section").is_none());
}

#[test]
fn broken_config_file_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/whizzy");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "output = [").unwrap();

    wz_cmd(dir.path())
        .args(["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
