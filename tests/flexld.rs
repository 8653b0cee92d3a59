// Tests for flexld
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of flexld.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn output(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flexld-cli-{}-{name}", std::process::id()))
}

#[test]
fn link_invalid_argument() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("-q");
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("Unrecognized option:"));

    Ok(())
}

#[test]
fn link_help() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--inheritance-only"));

    Ok(())
}

#[test]
fn link_missing_input_file() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("INPUT"));

    Ok(())
}

#[test]
fn link_missing_output_file() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("-o OUTPUT"));

    Ok(())
}

#[test]
fn link_input_file_does_not_exist() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("foobar");
    cmd.arg("-o").arg(output("missing.order"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fatal: failed to open `foobar`"));

    Ok(())
}

#[test]
fn link_empty_input_file() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/empty.xml");
    cmd.arg("-o").arg(output("empty.order"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing `units` root element"));

    Ok(())
}

#[test]
fn link_invalid_input_file() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/invalid.xml");
    cmd.arg("-o").arg(output("invalid.order"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("found `package`"));

    Ok(())
}

#[test]
fn link_writes_order() -> TestResult {
    let out = output("chain.order");

    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/chain.xml");
    cmd.arg("-o").arg(&out);
    cmd.assert().success();

    assert_eq!("app:C\napp:B\napp:A\n", std::fs::read_to_string(&out)?);

    Ok(())
}

#[test]
fn link_follows_imports() -> TestResult {
    let out = output("main.order");

    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/main.xml");
    cmd.arg("-o").arg(&out);
    cmd.arg("--start").arg("app:Main");
    cmd.assert().success();

    assert_eq!(
        "lib:Base\napp:Main\nlib:Util\n",
        std::fs::read_to_string(&out)?
    );

    Ok(())
}

#[test]
fn link_inheritance_only() -> TestResult {
    let out = output("inheritance.order");

    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/main.xml");
    cmd.arg("-o").arg(&out);
    cmd.args(["-s", "app:Main", "--inheritance-only"]);
    cmd.assert().success();

    // `lib:Util` is only a dependency.
    assert_eq!("lib:Base\napp:Main\n", std::fs::read_to_string(&out)?);

    Ok(())
}

#[test]
fn link_circular_reference() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/cycle.xml");
    cmd.arg("-o").arg(output("cycle.order"));
    cmd.assert().failure().code(1).stderr(predicate::str::contains(
        "app:X -> app:Y -> app:X",
    ));

    Ok(())
}

#[test]
fn link_strict_undefined_symbol() -> TestResult {
    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/externs.xml");
    cmd.arg("-o").arg(output("strict.order"));
    cmd.arg("--strict");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("app:Gone"));

    Ok(())
}

#[test]
fn link_emits_dot_and_report() -> TestResult {
    let out = output("externs.dot");
    let report = output("externs.report.xml");

    let mut cmd = Command::cargo_bin("flexld")?;
    cmd.arg("tests/data/externs.xml");
    cmd.arg("-o").arg(&out);
    cmd.args(["--emit", "dot"]);
    cmd.args(["-x", "flash.display:Sprite", "--allow-external"]);
    cmd.arg("-r").arg(&report);
    cmd.assert().success();

    let dot = std::fs::read_to_string(&out)?;
    assert!(dot.starts_with("digraph"), "{dot}");

    let report = std::fs::read_to_string(&report)?;
    assert!(report.contains(r#"<ext id="flash.display:Sprite"/>"#));
    assert!(report.contains(r#"<missing id="app:Gone"/>"#));

    Ok(())
}
