// Linker pipeline
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

//! Link unit object files from the filesystem.
//!
//! This ties together the [object file reader](crate::obj::unit),
//!   the [`LinkState`] and its traversal,
//!   and the various outputs of the linker.
//! It is what [`flexld`](../../flexld) runs.
//!
//! Each input file contributes its own units first,
//!   followed by the units of each of its imports
//!     (depth-first, relative to the importing file).
//! A file is loaded only once no matter how many times it is imported.

use super::{
    graph::{link_graph, to_dot},
    report::{ReportError, ReportWriter},
    traverse, LinkError, LinkOptions, LinkState, Linkable, SymbolSet, Unit,
};
use crate::fs::{
    FsCanonicalizer, PathFile, VisitOnceFile, VisitOnceFilesystem,
};
use crate::obj::unit::{read_units, UnitObjError, UnitReader};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{self, Display};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

type LinkerFilesystem = VisitOnceFilesystem<FsCanonicalizer>;

/// Kind of output produced by the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    /// Names of linked units, one per line, in load order.
    #[default]
    Order,
    /// The [link graph](super::graph) in DOT format.
    Dot,
}

/// Everything needed to perform a link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkConfig {
    /// Unit object files to link.
    pub inputs: Vec<PathBuf>,
    /// Destination of the primary output.
    pub output: PathBuf,
    /// Kind of primary output.
    pub emit: Emit,
    /// Symbols provided outside of the link.
    pub externs: SymbolSet,
    /// Symbols whose owners must be linked regardless of references.
    pub includes: SymbolSet,
    /// Definitions from which to begin traversal,
    ///   or [`None`] for every definition.
    pub start: Option<Vec<String>>,
    pub options: LinkOptions,
    /// Undefined symbols are fatal rather than collected.
    pub strict: bool,
    /// Destination of the diagnostic report, if any.
    pub report: Option<PathBuf>,
}

/// Perform a link as described by `config`.
pub fn link(config: &LinkConfig) -> Result<(), LinkerError> {
    let units = load_all(&config.inputs)?;
    let total = units.len();

    let unresolved = (!config.strict).then(SymbolSet::new);
    let mut state = LinkState::new(
        units,
        config.externs.clone(),
        config.includes.clone(),
        unresolved,
    )?;

    let mut order = Vec::with_capacity(total);

    traverse(config.start.clone(), &mut state, config.options, |unit| {
        order.push(unit.name().to_string())
    })?;

    info!("linked {} of {} unit(s)", order.len(), total);

    for sym in undefined_symbols(&state) {
        warn!("undefined symbol `{sym}`");
    }

    let output: String = match config.emit {
        Emit::Order => order.iter().map(|name| format!("{name}\n")).collect(),
        Emit::Dot => to_dot(&link_graph(&state)),
    };

    std::fs::write(&config.output, output)?;
    debug!("wrote {:?} to `{}`", config.emit, config.output.display());

    if let Some(path) = &config.report {
        write_report(path, &state)?;
        debug!("wrote report to `{}`", path.display());
    }

    Ok(())
}

/// Load every unit reachable from `inputs`.
pub fn load_all<P: AsRef<Path>>(
    inputs: &[P],
) -> Result<Vec<Unit>, LinkerError> {
    let mut fs = LinkerFilesystem::new();
    let mut units = Vec::new();

    for input in inputs {
        load_units(input.as_ref(), &mut fs, &mut units)?;
    }

    debug!(
        "loaded {} unit(s) from {} file(s)",
        units.len(),
        fs.visit_len()
    );

    Ok(units)
}

fn load_units(
    path: &Path,
    fs: &mut LinkerFilesystem,
    units: &mut Vec<Unit>,
) -> Result<(), LinkerError> {
    let mut file: PathFile<BufReader<std::fs::File>> = match fs
        .open(path)
        .map_err(|e| LinkerError::Open(path.to_path_buf(), e))?
    {
        VisitOnceFile::FirstVisit(file) => file,
        VisitOnceFile::Visited => return Ok(()),
    };

    let result = read_units(&mut UnitReader::new(file.inner_mut()));
    let object = result
        .map_err(|e| LinkerError::UnitObj(file.path().to_path_buf(), e))?;

    debug!(
        "`{}`: {} unit(s), {} import(s)",
        file.path().display(),
        object.units.len(),
        object.imports.len()
    );

    units.extend(object.units);

    for import in object.imports {
        load_units(&file.relative(import), fs, units)?;
    }

    Ok(())
}

/// Unresolved symbols that are neither external nor owned by a native
///   unit.
fn undefined_symbols<L: Linkable>(
    state: &LinkState<L>,
) -> impl Iterator<Item = &String> {
    state.unresolved().into_iter().flatten().filter(move |sym| {
        !state.external_defs().contains(*sym) && state.owner(sym).is_none()
    })
}

fn write_report<L: Linkable>(
    path: &Path,
    state: &LinkState<L>,
) -> Result<(), LinkerError> {
    let file = BufWriter::new(std::fs::File::create(path)?);
    let mut writer = ReportWriter::new(file);

    writer.write(state)?;
    writer.into_inner().flush()?;

    Ok(())
}

/// Linker error.
///
/// This represents the aggregation of all possible errors that can occur
///   during a link.
#[derive(Debug)]
pub enum LinkerError {
    Io(io::Error),
    /// A unit object file could not be opened.
    Open(PathBuf, io::Error),
    /// A unit object file is malformed.
    UnitObj(PathBuf, UnitObjError),
    Link(LinkError),
    Report(ReportError),
}

impl From<io::Error> for LinkerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LinkError> for LinkerError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<ReportError> for LinkerError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

impl Display for LinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => Display::fmt(e, f),
            Self::Open(path, e) => {
                write!(f, "failed to open `{}`: {e}", path.display())
            }
            Self::UnitObj(path, e) => write!(f, "{}: {e}", path.display()),
            Self::Link(e) => Display::fmt(e, f),
            Self::Report(e) => Display::fmt(e, f),
        }
    }
}

impl Error for LinkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Open(_, e) => Some(e),
            Self::UnitObj(_, e) => Some(e),
            Self::Link(e) => Some(e),
            Self::Report(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod test;
