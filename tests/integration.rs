use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docspec")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn spec_from_fixture(extra: &[&str]) -> Value {
    let assert = cmd()
        .arg("spec")
        .arg(fixture_path("doclets.json"))
        .args(extra)
        .assert()
        .success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

// -- spec --

#[test]
fn spec_info_from_package_doclet() {
    let spec = spec_from_fixture(&[]);
    assert_eq!(spec["spec"]["version"], "0.1.0");
    assert_eq!(spec["info"]["name"], "shapes");
    assert_eq!(spec["info"]["description"], "Geometry helpers");
    assert_eq!(spec["info"]["version"], "1.4.0");
    assert_eq!(spec["info"]["license"], "MIT");
}

#[test]
fn spec_nests_default_export_and_members() {
    let spec = spec_from_fixture(&[]);
    let module = &spec["entries"]["shapes"];
    assert_eq!(module["kind"], "module");

    let default = &module["entries"]["@default"];
    assert_eq!(default["kind"], "class");
    assert_eq!(default["description"], "Base shape.");
    assert_eq!(default["staticEntries"]["create"]["kind"], "function");
    assert_eq!(default["entries"]["area"]["emits"][0], "module:shapes#event:resized");
    assert_eq!(default["events"]["resized"]["kind"], "event");

    // `exports.*` bindings stay on the module itself.
    assert_eq!(module["entries"]["version"]["kind"], "function");
    assert!(default["entries"].get("version").is_none());
}

#[test]
fn spec_nested_params() {
    let spec = spec_from_fixture(&[]);
    let create = &spec["entries"]["shapes"]["entries"]["@default"]["staticEntries"]["create"];
    let opts = &create["params"][0];
    assert_eq!(opts["name"], "opts");
    assert_eq!(opts["kind"], "ref");
    assert_eq!(opts["type"], "module:shapes~Options");
    assert_eq!(opts["entries"]["sides"]["optional"], true);
    assert_eq!(opts["entries"]["sides"]["defaultValue"], 3);
}

#[test]
fn spec_drops_filtered_and_private() {
    let text = String::from_utf8(
        cmd()
            .arg("spec")
            .arg(fixture_path("doclets.json"))
            .assert()
            .success()
            .get_output()
            .stdout
            .clone(),
    )
    .unwrap();
    assert!(!text.contains("secret"));
    assert!(!text.contains("cache"));
    assert!(!text.contains("ignored"));
    assert!(!text.contains("Movable"));
}

#[test]
fn spec_root_definitions() {
    let spec = spec_from_fixture(&[]);
    assert_eq!(spec["definitions"]["Point"]["kind"], "object");
    assert!(spec["entries"].get("Point").is_none());
}

#[test]
fn spec_warns_about_skipped_doclets() {
    cmd()
        .arg("spec")
        .arg(fixture_path("doclets.json"))
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("default export without module name"))
        .stderr(predicate::str::contains("/src/anon.js"))
        .stderr(predicate::str::contains("untreated kind"))
        .stderr(predicate::str::contains("mixin"));
}

#[test]
fn spec_quiet_hides_warnings() {
    cmd()
        .args(["spec", "-q"])
        .arg(fixture_path("doclets.json"))
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn spec_unrecognized_kind_completes() {
    let assert = cmd()
        .arg("spec")
        .write_stdin(r#"[{"kind":"banana","longname":"b","name":"b"}]"#)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("untreated kind"));
    let spec: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(spec["entries"], serde_json::json!({}));
    assert_eq!(spec["definitions"], serde_json::json!({}));
}

#[test]
fn spec_stdin_scenario() {
    let assert = cmd()
        .arg("spec")
        .write_stdin(
            r#"[{"kind":"module","longname":"module:a"},
                {"kind":"function","longname":"module:a.b","memberof":"module:a","scope":"static","access":"public"}]"#,
        )
        .assert()
        .success();
    let spec: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(spec["entries"]["a"]["entries"]["b"]["kind"], "function");
    assert_eq!(spec["definitions"], serde_json::json!({}));
}

#[test]
fn spec_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    for out in [&first, &second] {
        cmd()
            .arg("spec")
            .arg(fixture_path("doclets.json"))
            .args(["-o", out.to_str().unwrap()])
            .assert()
            .success();
    }
    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
    let text = std::fs::read_to_string(&first).unwrap();
    assert!(text.starts_with("{\n  \"spec\": {\n    \"version\""));
}

#[test]
fn spec_flags_override_package() {
    let spec = spec_from_fixture(&["--name", "Shapes API", "--license", ""]);
    assert_eq!(spec["info"]["name"], "Shapes API");
    assert_eq!(spec["info"]["license"], "");
    assert_eq!(spec["info"]["version"], "1.4.0");
}

#[test]
fn spec_config_file_then_flags() {
    let mut config = NamedTempFile::new().unwrap();
    config
        .write_all(br#"{"name":"From config","version":"9.9.9"}"#)
        .unwrap();
    let spec = spec_from_fixture(&[
        "--config",
        config.path().to_str().unwrap(),
        "--name",
        "From flag",
    ]);
    assert_eq!(spec["info"]["name"], "From flag");
    assert_eq!(spec["info"]["version"], "9.9.9");
}

#[test]
fn spec_reads_directories() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a.json"),
        r#"[{"kind":"class","longname":"A","name":"A"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.json"),
        r#"[{"kind":"function","longname":"A#run","name":"run","memberof":"A","scope":"instance"}]"#,
    )
    .unwrap();
    let assert = cmd()
        .arg("spec")
        .arg(dir.path().to_str().unwrap())
        .assert()
        .success();
    let spec: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(spec["entries"]["A"]["entries"]["run"]["kind"], "function");
}

#[test]
fn spec_unwritable_output_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("missing/spec.json");
    cmd()
        .arg("spec")
        .arg(fixture_path("doclets.json"))
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to write"));
}

#[test]
fn spec_skips_malformed_doclets() {
    let assert = cmd()
        .arg("spec")
        .write_stdin(
            r#"[{"kind":"function","longname":"ok","name":"ok"},
                {"kind":"function","longname":"bad","name":"bad","description":42}]"#,
        )
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("malformed doclet"));
    let spec: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(spec["entries"]["ok"]["kind"], "function");
    assert!(spec["entries"].get("bad").is_none());
}

#[test]
fn spec_invalid_input_fails() {
    cmd()
        .arg("spec")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid doclet JSON"));
}

// -- markdown --

#[test]
fn markdown_from_spec_file() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("spec.json");
    let md = dir.path().join("API.md");

    cmd()
        .arg("spec")
        .arg(fixture_path("doclets.json"))
        .args(["-o", spec.to_str().unwrap()])
        .assert()
        .success();
    cmd()
        .arg("markdown")
        .arg(spec.to_str().unwrap())
        .args(["-o", md.to_str().unwrap()])
        .assert()
        .success();

    let output = std::fs::read_to_string(&md).unwrap();
    assert!(output.starts_with("# shapes\n"));
    assert!(output.contains("## Table of contents"));
    assert!(output.contains("* [shapes](#shapes)"));
    assert!(output.contains("### shapes.@default\n"));
    assert!(output.contains("#### shapes.@default.create\n"));
    assert!(output.contains("#### shapes.@default#event:resized\n"));
    assert!(output.contains("## Definitions"));
    assert!(output.contains("[Options]: #shapesdefaultoptions"));
}

#[test]
fn markdown_from_stdin() {
    cmd()
        .arg("markdown")
        .write_stdin(r#"{"spec":{"version":"0.1.0"},"info":{"name":"tiny"},"entries":{"f":{"kind":"function","description":"Does f."}},"definitions":{}}"#)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# tiny\n"))
        .stdout(predicate::str::contains("## f\n\n> `function`\n\nDoes f."));
}
