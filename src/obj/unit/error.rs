// Unit object file errors
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

//! Errors while processing unit object files.

use crate::tpwrap::quick_xml::{Error as XmlError, InnerXmlError};
use std::fmt::Display;
use std::str::Utf8Error;

/// Error during unit object file processing.
///
/// Errors contain only owned values rather than references to original
///   data,
///     since they represent malformed input that requires termination.
#[derive(Debug, PartialEq)]
pub enum UnitObjError {
    /// XML parsing error.
    XmlError(XmlError),
    /// An attribute value was not valid UTF-8.
    InvalidUtf8(Utf8Error),
    /// The file ended before any element was found.
    MissingRoot,
    /// The root node was not `units`.
    UnexpectedRoot(String),
    /// A `unit` element is missing `@name`.
    UnassociatedUnit,
    /// A `unit` element appeared within another.
    NestedUnit(String),
    /// A `def`, `pre`, or `dep` element is missing `@id`.
    UnassociatedRef(String),
    /// A `def`, `pre`, or `dep` element appeared outside of a `unit`.
    OrphanRef(String, String),
    /// An `import` element is missing `@path`.
    UnassociatedImport,
    /// An `import` element appeared within a `unit`.
    NestedImport(String),
    /// A numeric attribute could not be parsed.
    InvalidNumber(String, String),
    /// The file ended within a `unit`.
    UnexpectedEof,
}

impl From<InnerXmlError> for UnitObjError {
    fn from(e: InnerXmlError) -> Self {
        Self::XmlError(e.into())
    }
}

impl From<Utf8Error> for UnitObjError {
    fn from(e: Utf8Error) -> Self {
        Self::InvalidUtf8(e)
    }
}

impl Display for UnitObjError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        use UnitObjError::*;

        match self {
            XmlError(e) => Display::fmt(e, fmt),
            InvalidUtf8(e) => Display::fmt(e, fmt),
            MissingRoot => write!(fmt, "missing `units` root element"),
            UnexpectedRoot(name) => {
                write!(fmt, "expected `units` root element, found `{name}`")
            }
            UnassociatedUnit => write!(fmt, "`unit` is missing `@name`"),
            NestedUnit(name) => {
                write!(fmt, "unit `{name}` must not appear within another unit")
            }
            UnassociatedRef(ele) => write!(fmt, "`{ele}` is missing `@id`"),
            OrphanRef(ele, id) => {
                write!(fmt, "`{ele}` of `{id}` must appear within a unit")
            }
            UnassociatedImport => write!(fmt, "`import` is missing `@path`"),
            NestedImport(path) => {
                write!(fmt, "import of `{path}` must not appear within a unit")
            }
            InvalidNumber(attr, value) => {
                write!(fmt, "invalid number `{value}` for `@{attr}`")
            }
            UnexpectedEof => write!(fmt, "unexpected end of file within unit"),
        }
    }
}

impl std::error::Error for UnitObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlError(e) => Some(e),
            Self::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}
