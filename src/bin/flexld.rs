// flexld linker
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

//! This is the flexld linker.
//!
//! `flexld` reads unit object files and writes the order in which their
//!   units must be loaded.
//!
//! For more information about the linker,
//!   see the [`flexld::ld`] module.

extern crate flexld;

use flexld::ld::{
    pipeline::{link, Emit, LinkConfig},
    LinkOptions,
};
use getopts::{Fail, Matches, Options};
use std::env;

/// Types of commands
enum Command {
    Link(LinkConfig),
    Usage,
}

/// Entrypoint for the linker
pub fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage =
        opts.usage(&format!("Usage: {} [OPTIONS] INPUT... -o OUTPUT", program));

    match parse_options(opts, args) {
        Ok(Command::Link(config)) => {
            if let Err(e) = link(&config) {
                eprintln!("fatal: {}", e);
                std::process::exit(1);
            }
        }
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("o", "output", "set output file name", "OUTPUT");
    opts.optopt("", "emit", "set output type", "order|dot");
    opts.optmulti("x", "extern", "symbol defined outside of link", "SYMBOL");
    opts.optmulti("i", "include", "symbol that must be linked", "SYMBOL");
    opts.optmulti("s", "start", "begin traversal at definition", "DEF");
    opts.optflag("", "allow-external", "do not link external symbols");
    opts.optflag("", "export-includes", "begin traversal at includes");
    opts.optflag("", "inheritance-only", "follow only prerequisites");
    opts.optflag("", "strict", "fail on undefined symbols");
    opts.optopt("r", "report", "write link report", "FILE");
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    if matches.free.is_empty() {
        return Err(Fail::OptionMissing(String::from("INPUT")));
    }

    let emit = match matches.opt_str("emit").as_deref() {
        None | Some("order") => Emit::Order,
        Some("dot") => Emit::Dot,
        Some(_) => {
            return Err(Fail::ArgumentMissing(String::from(
                "--emit order|dot",
            )))
        }
    };

    let output = match matches.opt_str("o") {
        Some(m) => m.into(),
        None => return Err(Fail::OptionMissing(String::from("-o OUTPUT"))),
    };

    let start = Some(matches.opt_strs("s")).filter(|s| !s.is_empty());

    Ok(Command::Link(LinkConfig {
        inputs: matches.free.iter().map(Into::into).collect(),
        output,
        emit,
        externs: symbols(&matches, "x"),
        includes: symbols(&matches, "i"),
        start,
        options: LinkOptions {
            allow_external: matches.opt_present("allow-external"),
            export_includes: matches.opt_present("export-includes"),
            include_inheritance_only: matches.opt_present("inheritance-only"),
        },
        strict: matches.opt_present("strict"),
        report: matches.opt_str("r").map(Into::into),
    }))
}

fn symbols<T: FromIterator<String>>(matches: &Matches, name: &str) -> T {
    matches.opt_strs(name).into_iter().collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn args(args: &[&str]) -> Vec<String> {
        std::iter::once("program")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn parse(given: &[&str]) -> Result<Command, Fail> {
        parse_options(get_opts(), args(given))
    }

    fn config(given: &[&str]) -> LinkConfig {
        match parse(given) {
            Ok(Command::Link(config)) => config,
            Ok(Command::Usage) => panic!("unexpected usage"),
            Err(e) => panic!("unexpected failure: {}", e),
        }
    }

    #[test]
    fn parse_options_help() {
        match parse(&["-h"]) {
            Ok(Command::Usage) => {}
            _ => panic!("Help option did not parse"),
        }
    }

    #[test]
    fn parse_options_help_long() {
        match parse(&["--help"]) {
            Ok(Command::Usage) => {}
            _ => panic!("Long help option did not parse"),
        }
    }

    #[test]
    fn parse_options_invalid() {
        match parse(&["-q"]) {
            Err(Fail::UnrecognizedOption(_)) => {}
            _ => panic!("Invalid option not caught"),
        }
    }

    #[test]
    fn parse_options_missing_input() {
        match parse(&["-o", "out"]) {
            Err(Fail::OptionMissing(message)) => assert_eq!("INPUT", message),
            _ => panic!("Missing input not caught"),
        }
    }

    #[test]
    fn parse_options_missing_output() {
        match parse(&["foo.xml"]) {
            Err(Fail::OptionMissing(message)) => {
                assert_eq!("-o OUTPUT", message)
            }
            _ => panic!("Missing output not caught"),
        }
    }

    #[test]
    fn parse_options_invalid_emit() {
        match parse(&["foo.xml", "-o", "out", "--emit", "graphml"]) {
            Err(Fail::ArgumentMissing(message)) => {
                assert_eq!("--emit order|dot", message)
            }
            _ => panic!("Invalid emit not caught"),
        }
    }

    #[test]
    fn parse_options_defaults() {
        let config = config(&["foo.xml", "-o", "out"]);

        assert_eq!(
            LinkConfig {
                inputs: vec![PathBuf::from("foo.xml")],
                output: PathBuf::from("out"),
                ..Default::default()
            },
            config
        );
    }

    #[test]
    fn parse_options_multiple_inputs() {
        let config = config(&["a.xml", "b.xml", "--output", "out"]);

        assert_eq!(
            vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")],
            config.inputs
        );
    }

    #[test]
    fn parse_options_emit_dot() {
        let config = config(&["foo.xml", "-o", "out", "--emit", "dot"]);

        assert_eq!(Emit::Dot, config.emit);
    }

    #[test]
    fn parse_options_symbols() {
        let config = config(&[
            "foo.xml", "-o", "out", "-x", "Ext2", "--extern", "Ext1", "-i",
            "Inc", "-s", "Main", "--start", "Other",
        ]);

        assert_eq!(
            vec!["Ext1", "Ext2"],
            config.externs.iter().collect::<Vec<_>>()
        );
        assert_eq!(vec!["Inc"], config.includes.iter().collect::<Vec<_>>());
        assert_eq!(
            Some(vec!["Main".to_string(), "Other".to_string()]),
            config.start
        );
    }

    #[test]
    fn parse_options_flags() {
        let config = config(&[
            "foo.xml",
            "-o",
            "out",
            "--allow-external",
            "--export-includes",
            "--inheritance-only",
            "--strict",
            "-r",
            "report.xml",
        ]);

        assert_eq!(
            LinkOptions {
                allow_external: true,
                export_includes: true,
                include_inheritance_only: true,
            },
            config.options
        );
        assert!(config.strict);
        assert_eq!(Some(PathBuf::from("report.xml")), config.report);
    }
}
