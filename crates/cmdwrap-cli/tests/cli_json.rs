//! Integration tests for `cmdwrap --json` output.
//!
//! These tests verify:
//! - every command prints exactly one valid JSON document
//! - `ok` is present and false on failure, with a SCREAMING_SNAKE_CASE code
//! - a failing file in a `wrap` batch does not stop its siblings

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "cmdwrap-cli", "--bin", "cmdwrap", "--quiet", "--"]);
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(root: &Path) {
    write(
        root,
        "package.json",
        r#"{"name":"app","version":"1.0.0","spm":{"main":"index.js","dependencies":{"c":"1.1.1","import-style":"1.0.0"}}}"#,
    );
    write(
        root,
        "index.js",
        "var b = require('./b');\nvar c = require('c');\n",
    );
    write(root, "b.js", "module.exports = 1;\n");
    write(root, "data.json", "{\"a\": 1}\n");
    write(root, "style.css", "@import './base.css';\n.a { color: red; }\n");
    write(root, "base.css", "body { margin: 0; }\n");
    write(
        root,
        "sea-modules/c/1.1.1/package.json",
        r#"{"name":"c","version":"1.1.1","spm":{"main":"index.js"}}"#,
    );
    write(root, "sea-modules/c/1.1.1/index.js", "module.exports = 'c';\n");
    write(
        root,
        "sea-modules/import-style/1.0.0/package.json",
        r#"{"name":"import-style","version":"1.0.0","spm":{"main":"index.js"}}"#,
    );
    write(root, "sea-modules/import-style/1.0.0/index.js", "");
}

fn run_json(cwd: &Path, args: &[&str]) -> (Output, serde_json::Value) {
    let output = cargo_bin()
        .args(args)
        .arg("--json")
        .arg("--cwd")
        .arg(cwd)
        .output()
        .expect("Failed to run cmdwrap");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    (output, json)
}

#[test]
fn test_version() {
    let output = cargo_bin().arg("version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("cmdwrap "));
}

#[test]
fn test_id_json() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (output, json) = run_json(dir.path(), &["id", "index.js"]);
    assert!(output.status.success());
    assert_eq!(json["ok"], true);
    assert_eq!(json["id"], "app/1.0.0/index");
    assert!(json.get("error").is_none());
}

#[test]
fn test_id_json_with_idleading_flag() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (_, json) = run_json(dir.path(), &["id", "b.js", "--idleading", "lib/{{name}}"]);
    assert_eq!(json["id"], "lib/app/b");
}

#[test]
fn test_deps_json() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (output, json) = run_json(dir.path(), &["deps", "index.js"]);
    assert!(output.status.success());
    assert_eq!(json["ok"], true);
    assert_eq!(json["include"], "relative");
    assert_eq!(
        json["deps"],
        serde_json::json!(["app/1.0.0/b", "c/1.1.1/index"])
    );
}

#[test]
fn test_deps_json_include_self_with_ignore() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (_, json) = run_json(
        dir.path(),
        &["deps", "index.js", "--include", "self", "--ignore", "c"],
    );
    assert_eq!(json["include"], "self");
    assert_eq!(json["deps"], serde_json::json!(["app/1.0.0/b", "c"]));
}

#[test]
fn test_deps_json_missing_package() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "bad.js", "require('nope');\n");
    write(
        dir.path(),
        "cmdwrap.json",
        r#"{"entries": ["bad.js"]}"#,
    );

    let (output, json) = run_json(dir.path(), &["deps", "bad.js"]);
    assert!(!output.status.success());
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "TRANSPORT_MISSING_PACKAGE");

    let code = json["error"]["code"].as_str().unwrap();
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
}

#[test]
fn test_options_file_ignore() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "cmdwrap.json", r#"{"ignore": ["c"]}"#);

    let (_, json) = run_json(dir.path(), &["deps", "index.js"]);
    assert_eq!(json["deps"], serde_json::json!(["app/1.0.0/b", "c"]));
}

#[test]
fn test_invalid_options_file() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "cmdwrap.json", r#"{"include": "everything"}"#);

    let (output, json) = run_json(dir.path(), &["id", "index.js"]);
    assert!(!output.status.success());
    assert_eq!(json["error"]["code"], "CONFIG_INVALID");
}

#[test]
fn test_css_json() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "cmdwrap.json", r#"{"entries": ["style.css"]}"#);

    let (output, json) = run_json(dir.path(), &["css", "style.css"]);
    assert!(output.status.success());
    assert_eq!(json["css"], "body { margin: 0; }\n\n.a { color: red; }\n");
}

#[test]
fn test_wrap_batch_continues_past_failure() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "cmdwrap.json", r#"{"entries": ["data.json"]}"#);

    let (output, json) = run_json(
        dir.path(),
        &["wrap", "index.js", "missing.js", "data.json", "-o", "dist"],
    );
    assert!(!output.status.success());
    assert_eq!(json["ok"], false);

    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0]["ok"], true);
    assert_eq!(files[0]["id"], "app/1.0.0/index");
    assert_eq!(files[1]["ok"], false);
    assert_eq!(files[1]["error"]["code"], "IO_ERROR");
    assert_eq!(files[2]["ok"], true);
    assert_eq!(files[2]["id"], "app/1.0.0/data.json");

    let index = fs::read_to_string(dir.path().join("dist/index.js")).unwrap();
    assert!(index.starts_with(
        "define(\"app/1.0.0/index\", [\"app/1.0.0/b\",\"c/1.1.1/index\"], function(require, exports, module){\n"
    ));
    assert!(index.contains("var c = require(\"c/1.1.1/index\");"));

    let data = fs::read_to_string(dir.path().join("dist/data.json.js")).unwrap();
    assert!(data.contains("module.exports = {\"a\": 1};\n"));
}

#[test]
fn test_wrap_concat_appends_relative_modules() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (output, json) = run_json(
        dir.path(),
        &["wrap", "index.js", "--concat", "-o", "dist"],
    );
    assert!(output.status.success());
    assert_eq!(
        json["files"][0]["modules"],
        serde_json::json!(["app/1.0.0/index", "app/1.0.0/b"])
    );

    let bundle = fs::read_to_string(dir.path().join("dist/index.js")).unwrap();
    assert!(bundle.starts_with("define(\"app/1.0.0/index\""));
    assert!(bundle.contains("define(\"app/1.0.0/b\", [], function(require, exports, module){\nmodule.exports = 1;\n"));
    assert!(!bundle.contains("define(\"c/1.1.1/index\""));
}

#[test]
fn test_css_outdir_copies_resources() {
    let dir = tempdir().unwrap();
    project(dir.path());
    write(dir.path(), "css/skin.css", ".s { background: url(../img/s.png); }\n");
    write(dir.path(), "img/s.png", "png");
    write(dir.path(), "cmdwrap.json", r#"{"entries": ["css/skin.css"]}"#);

    let (output, json) = run_json(dir.path(), &["css", "css/skin.css", "-o", "dist"]);
    assert!(output.status.success());
    assert_eq!(json["ok"], true);
    assert_eq!(json["resources"].as_array().unwrap().len(), 1);

    let css = fs::read_to_string(dir.path().join("dist/css/skin.css")).unwrap();
    assert_eq!(css, ".s { background: url(../s.png); }\n");
    assert_eq!(fs::read_to_string(dir.path().join("dist/s.png")).unwrap(), "png");
}

#[test]
fn test_wrap_dependency_file_goes_under_package_dir() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (output, json) = run_json(
        dir.path(),
        &["wrap", "sea-modules/c/1.1.1/index.js", "-o", "dist"],
    );
    assert!(output.status.success());
    assert_eq!(json["files"][0]["id"], "c/1.1.1/index");
    assert!(dir.path().join("dist/c/1.1.1/index.js").is_file());
}

#[test]
fn test_graph_json() {
    let dir = tempdir().unwrap();
    project(dir.path());

    let (output, json) = run_json(dir.path(), &["graph"]);
    assert!(output.status.success());
    assert_eq!(json["root"], "app@1.0.0");

    let packages = json["packages"].as_array().unwrap();
    let ids: Vec<&str> = packages.iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&"c@1.1.1"));
    assert!(ids.contains(&"import-style@1.0.0"));

    let root = &packages[0];
    let files: Vec<&str> = root["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert!(files.contains(&"index.js"));
    assert!(files.contains(&"b.js"));
}

#[test]
fn test_missing_manifest() {
    let dir = tempdir().unwrap();

    let (output, json) = run_json(dir.path(), &["graph"]);
    assert!(!output.status.success());
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "MANIFEST_READ_FAILED");
}
