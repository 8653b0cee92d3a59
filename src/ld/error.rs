// Linker errors
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

//! Errors resulting from linking.

use std::{
    error::Error,
    fmt::{self, Display},
};

/// A fatal error in the structure of the link graph.
///
/// None of these errors are transient;
///   they each represent a defect in the set of units being linked and
///   must be corrected by the user
///     (or by the compiler that produced those units).
///
/// Symbols that are legitimately external or native are _not_ errors;
///   they are recorded as unresolved and linking proceeds around them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Two units share the same name.
    DuplicateSymbol(String),

    /// Two units claim the same definition.
    ///
    /// This holds the definition,
    ///   the unit that attempted to define it,
    ///   and the unit that had already defined it.
    MultipleDefinitions {
        def: String,
        unit: String,
        prev_unit: String,
    },

    /// A unit mixes external and non-external definitions.
    ///
    /// This holds the unit,
    ///   its offending non-external definition,
    ///   and the external definition that it conflicts with.
    PartialExterns {
        unit: String,
        def: String,
        external: String,
    },

    /// A referenced symbol has no owner and no unresolved set was
    ///   provided to absorb it.
    UndefinedSymbol(String),

    /// The prerequisites of a unit refer back to a unit that is still
    ///   being processed.
    ///
    /// The path lists the names of the units forming the cycle,
    ///   beginning and ending with the same unit.
    CircularReference { unit: String, path: Vec<String> },
}

impl Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LinkError::*;

        match self {
            DuplicateSymbol(name) => {
                write!(f, "duplicate symbol `{name}`")
            }

            MultipleDefinitions {
                def,
                unit,
                prev_unit,
            } => write!(
                f,
                "multiple definitions of `{def}` \
                   (in `{unit}`, previously defined in `{prev_unit}`)"
            ),

            PartialExterns {
                unit,
                def,
                external,
            } => write!(
                f,
                "`{unit}` defines `{def}`, but its definition \
                   `{external}` is external; \
                   a unit must be entirely external or not at all"
            ),

            UndefinedSymbol(name) => {
                write!(f, "undefined symbol `{name}`")
            }

            CircularReference { unit, path } if path.is_empty() => {
                write!(
                    f,
                    "prerequisites of `{unit}` contain a circular reference"
                )
            }

            CircularReference { unit, path } => write!(
                f,
                "prerequisites of `{unit}` contain a circular reference: {}",
                path.join(" -> "),
            ),
        }
    }
}

impl Error for LinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
