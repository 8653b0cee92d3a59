// Tests for the linker pipeline
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

use super::*;
use crate::obj::unit::UnitObjError;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// Output path unique to this test process.
fn out(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("flexld-pipeline-{}-{name}", std::process::id()))
}

fn config(inputs: &[&str], output: &str) -> LinkConfig {
    LinkConfig {
        inputs: inputs.iter().map(|name| data(name)).collect(),
        output: out(output),
        ..Default::default()
    }
}

fn syms<const N: usize>(names: [&str; N]) -> SymbolSet {
    names.into_iter().map(String::from).collect()
}

fn names(units: &[Unit]) -> Vec<&str> {
    units.iter().map(|u| u.name.as_str()).collect()
}

#[test]
fn loads_imports_once_after_importer() -> Result<(), LinkerError> {
    let units = load_all(&[data("main.xml")])?;

    assert_eq!(
        vec!["app:Main", "lib:Base", "Object", "lib:Util"],
        names(&units)
    );

    Ok(())
}

#[test]
fn loads_each_input_once() -> Result<(), LinkerError> {
    let units = load_all(&[data("chain.xml"), data("chain.xml")])?;

    assert_eq!(vec!["app:A", "app:B", "app:C"], names(&units));

    Ok(())
}

#[test]
fn missing_input_fails_with_path() {
    let path = data("does-not-exist.xml");

    match load_all(&[&path]) {
        Err(LinkerError::Open(epath, _)) => assert_eq!(path, epath),
        bad => panic!("expected LinkerError::Open: {:?}", bad),
    }
}

#[test]
fn malformed_input_fails_with_path() {
    match load_all(&[data("invalid.xml")]) {
        Err(LinkerError::UnitObj(path, UnitObjError::UnexpectedRoot(root))) => {
            assert!(path.ends_with("invalid.xml"), "{}", path.display());
            assert_eq!("package", root);
        }
        bad => panic!("expected LinkerError::UnitObj: {:?}", bad),
    }

    match load_all(&[data("empty.xml")]) {
        Err(LinkerError::UnitObj(_, UnitObjError::MissingRoot)) => (),
        bad => panic!("expected UnitObjError::MissingRoot: {:?}", bad),
    }
}

#[test]
fn links_in_prerequisite_order() -> Result<(), LinkerError> {
    let config = config(&["chain.xml"], "chain.order");

    link(&config)?;

    assert_eq!(
        "app:C\napp:B\napp:A\n",
        std::fs::read_to_string(&config.output)?
    );

    Ok(())
}

#[test]
fn links_imported_units() -> Result<(), LinkerError> {
    let config = config(&["main.xml"], "main.order");

    link(&config)?;

    // The native unit is never linked.
    assert_eq!(
        "lib:Base\napp:Main\nlib:Util\n",
        std::fs::read_to_string(&config.output)?
    );

    Ok(())
}

#[test]
fn links_from_start_only() -> Result<(), LinkerError> {
    let config = LinkConfig {
        start: Some(vec!["app:B".into()]),
        ..config(&["chain.xml"], "start.order")
    };

    link(&config)?;

    assert_eq!("app:C\napp:B\n", std::fs::read_to_string(&config.output)?);

    Ok(())
}

#[test]
fn externals_break_graph_when_allowed() -> Result<(), LinkerError> {
    let config = LinkConfig {
        externs: syms(["flash.display:Sprite"]),
        options: LinkOptions {
            allow_external: true,
            ..Default::default()
        },
        ..config(&["externs.xml"], "externs-allowed.order")
    };

    link(&config)?;

    assert_eq!("app:View\n", std::fs::read_to_string(&config.output)?);

    Ok(())
}

#[test]
fn externals_link_when_not_allowed() -> Result<(), LinkerError> {
    let config = LinkConfig {
        externs: syms(["flash.display:Sprite"]),
        ..config(&["externs.xml"], "externs-local.order")
    };

    link(&config)?;

    assert_eq!(
        "flash.display:Sprite\napp:View\n",
        std::fs::read_to_string(&config.output)?
    );

    Ok(())
}

#[test]
fn strict_link_fails_on_undefined_symbol() {
    let config = LinkConfig {
        strict: true,
        ..config(&["externs.xml"], "strict.order")
    };

    match link(&config) {
        Err(LinkerError::Link(LinkError::UndefinedSymbol(sym))) => {
            assert_eq!("app:Gone", sym)
        }
        bad => panic!("expected LinkError::UndefinedSymbol: {:?}", bad),
    }
}

#[test]
fn cycle_fails_link() {
    let config = config(&["cycle.xml"], "cycle.order");

    match link(&config) {
        Err(LinkerError::Link(LinkError::CircularReference { path, .. })) => {
            assert_eq!(vec!["app:X", "app:Y", "app:X"], path)
        }
        bad => panic!("expected LinkError::CircularReference: {:?}", bad),
    }
}

#[test]
fn duplicate_definition_fails_link() {
    let config = config(&["duplicate.xml"], "duplicate.order");

    match link(&config) {
        Err(LinkerError::Link(LinkError::MultipleDefinitions {
            def, ..
        })) => assert_eq!("app:Shared", def),
        bad => panic!("expected LinkError::MultipleDefinitions: {:?}", bad),
    }
}

#[test]
fn emits_dot_graph() -> Result<(), LinkerError> {
    let config = LinkConfig {
        emit: Emit::Dot,
        ..config(&["chain.xml"], "chain.dot")
    };

    link(&config)?;

    let dot = std::fs::read_to_string(&config.output)?;

    assert!(dot.starts_with("digraph"), "{dot}");
    assert!(dot.contains("\"app:A\""), "{dot}");

    Ok(())
}

#[test]
fn writes_report() -> Result<(), LinkerError> {
    let config = LinkConfig {
        externs: syms(["flash.display:Sprite"]),
        options: LinkOptions {
            allow_external: true,
            ..Default::default()
        },
        report: Some(out("externs.report.xml")),
        ..config(&["externs.xml"], "report.order")
    };

    link(&config)?;

    let report = std::fs::read_to_string(out("externs.report.xml"))?;

    assert!(report.contains(r#"<script name="app:View">"#), "{report}");
    assert!(report.contains(r#"<ext id="flash.display:Sprite"/>"#));
    assert!(report.contains(r#"<missing id="app:Gone"/>"#));

    Ok(())
}

#[test]
fn undefined_symbols_exclude_natives_and_externals() {
    let mut state = LinkState::new(
        vec![
            Unit::new("a")
                .define("A")
                .prerequisite("Object")
                .prerequisite("Ext")
                .dependency("Gone"),
            Unit::new("Object").define("Object").native(),
        ],
        syms(["Ext"]),
        syms([]),
        Some(syms([])),
    )
    .unwrap();

    let options = LinkOptions {
        allow_external: true,
        ..Default::default()
    };

    traverse(None, &mut state, options, |_: &Unit| ()).unwrap();

    assert_eq!(
        vec!["Gone"],
        undefined_symbols(&state).collect::<Vec<_>>()
    );
}

#[test]
fn linker_error_display_includes_path() {
    let e = LinkerError::UnitObj(
        PathBuf::from("lib/base.xml"),
        UnitObjError::UnassociatedUnit,
    );

    assert_eq!("lib/base.xml: `unit` is missing `@name`", e.to_string());
}
