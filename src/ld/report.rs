// Link report
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

//! Diagnostic link report.
//!
//! The report enumerates every unit visited by the link,
//!   in the order visited,
//!   along with its definitions and references,
//!   followed by the symbols that the link left unresolved:
//!
//! ```xml
//! <report>
//!   <scripts>
//!     <script name="app:Main" mod="1690000000" size="2048" optimizedsize="1536">
//!       <def id="app:Main"/>
//!       <pre id="flash.display:Sprite"/>
//!       <dep id="app:Helper"/>
//!     </script>
//!   </scripts>
//!   <external-defs>
//!     <ext id="flash.display:Sprite"/>
//!     <missing id="app:Gone"/>
//!   </external-defs>
//! </report>
//! ```
//!
//! Only externals that were actually depended upon are listed as `ext`;
//!   `missing` lists every other unresolved symbol,
//!     including references to native units.
//! Unit metadata attributes are omitted when unknown.

use super::{state::SymbolSet, LinkState, Linkable};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Error as XmlError;
use quick_xml::Writer as XmlWriter;
use std::fmt::Display;
use std::io::{Error as IoError, Write};
use std::result;
use std::str::Utf8Error;

pub type Result<T = ()> = result::Result<T, ReportError>;

/// Render the report for `state` into a [`String`].
pub fn dump<L: Linkable>(state: &LinkState<L>) -> Result<String> {
    let mut report = ReportWriter::new(Vec::new());
    report.write(state)?;

    String::from_utf8(report.into_inner()).map_err(|e| e.utf8_error().into())
}

/// Writes link reports as XML.
pub struct ReportWriter<W: Write> {
    writer: XmlWriter<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(write: W) -> Self {
        let writer = XmlWriter::new_with_indent(write, b' ', 2);

        Self { writer }
    }

    /// Consume the writer and return the inner [`Write`] object.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write the report for `state`.
    ///
    /// This is intended to be called after traversal;
    ///   a state that has not yet been traversed has no scripts.
    pub fn write<L: Linkable>(&mut self, state: &LinkState<L>) -> Result {
        let empty = SymbolSet::new();
        let unresolved = state.unresolved().unwrap_or(&empty);

        self.write_element(b"report", |writer| {
            writer
                .write_element(b"scripts", |writer| writer.write_scripts(state))?
                .write_element(b"external-defs", |writer| {
                    writer.write_external_defs(state.external_defs(), unresolved)
                })
        })?;

        Ok(())
    }

    /// Write the opening tag, the content, and the closing tag of an
    ///   element.
    fn write_element<F>(&mut self, name: &[u8], callback: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<&mut Self>,
    {
        self.writer
            .write_event(Event::Start(BytesStart::borrowed_name(name)))?;
        (callback)(self)?;
        self.writer.write_event(Event::End(BytesEnd::borrowed(name)))?;

        Ok(self)
    }

    fn write_scripts<L: Linkable>(
        &mut self,
        state: &LinkState<L>,
    ) -> Result<&mut Self> {
        for linkable in state.visited_linkables() {
            let modified = linkable.last_modified().map(|n| n.to_string());
            let size = linkable.size().map(|n| n.to_string());
            let optimized = linkable.optimized_size().map(|n| n.to_string());

            let mut attrs = vec![("name", linkable.name())];

            if let Some(modified) = &modified {
                attrs.push(("mod", modified.as_str()));
            }
            if let Some(size) = &size {
                attrs.push(("size", size.as_str()));
            }
            if let Some(optimized) = &optimized {
                attrs.push(("optimizedsize", optimized.as_str()));
            }

            self.writer.write_event(Event::Start(
                BytesStart::borrowed_name(b"script").with_attributes(attrs),
            ))?;

            self.write_ids(b"def", linkable.definitions())?
                .write_ids(b"pre", linkable.prerequisites())?
                .write_ids(b"dep", linkable.dependencies())?;

            self.writer
                .write_event(Event::End(BytesEnd::borrowed(b"script")))?;
        }

        Ok(self)
    }

    fn write_external_defs(
        &mut self,
        extdefs: &SymbolSet,
        unresolved: &SymbolSet,
    ) -> Result<&mut Self> {
        // Only externals that we actually depended on.
        let exts = extdefs.iter().filter(|ext| unresolved.contains(*ext));
        let missing = unresolved.iter().filter(|sym| !extdefs.contains(*sym));

        for ext in exts {
            self.write_id(b"ext", ext)?;
        }

        for sym in missing {
            self.write_id(b"missing", sym)?;
        }

        Ok(self)
    }

    fn write_ids(&mut self, name: &[u8], ids: &[String]) -> Result<&mut Self> {
        for id in ids {
            self.write_id(name, id)?;
        }

        Ok(self)
    }

    fn write_id(&mut self, name: &[u8], id: &str) -> Result<&mut Self> {
        self.writer.write_event(Event::Empty(
            BytesStart::borrowed_name(name).with_attributes(vec![("id", id)]),
        ))?;

        Ok(self)
    }
}

/// Error while writing a report.
#[derive(Debug)]
pub enum ReportError {
    /// Propagated IO error.
    Io(IoError),
    /// Report output was not valid UTF-8.
    Utf8(Utf8Error),
    /// Propagated XML error.
    XmlError(XmlError),
}

impl Display for ReportError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(inner) => Display::fmt(inner, fmt),
            Self::Utf8(inner) => Display::fmt(inner, fmt),
            Self::XmlError(inner) => Display::fmt(inner, fmt),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(inner) => Some(inner),
            Self::Utf8(inner) => Some(inner),
            Self::XmlError(inner) => Some(inner),
        }
    }
}

impl From<IoError> for ReportError {
    fn from(err: IoError) -> Self {
        ReportError::Io(err)
    }
}

impl From<Utf8Error> for ReportError {
    fn from(err: Utf8Error) -> Self {
        ReportError::Utf8(err)
    }
}

impl From<XmlError> for ReportError {
    fn from(err: XmlError) -> Self {
        ReportError::XmlError(err)
    }
}
