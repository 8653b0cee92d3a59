// Linkable units
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

//! Units of linking.
//!
//! A [`Linkable`] is anything the linker is able to order:
//!   it has a unique name,
//!   provides a set of definitions,
//!   and references other definitions either as _prerequisites_
//!     (which must be visited before it)
//!   or as _dependencies_
//!     (which must be linked,
//!       but may appear anywhere in the output).
//!
//! The linker never inspects the contents of a unit;
//!   [`Unit`] is the owned representation produced by the
//!   [object file reader](crate::obj::unit),
//!     but callers are free to provide their own implementation.

use std::fmt::{self, Display};

/// A named unit that can be ordered by the linker.
///
/// Every definition name must be unique across the entire set of
///   linkables provided to [`LinkState`](super::LinkState);
///     see [`LinkError`](super::LinkError) for the invariants that are
///     checked when the state is constructed.
pub trait Linkable {
    /// Name uniquely identifying this unit.
    fn name(&self) -> &str;

    /// Symbols provided by this unit, in declaration order.
    fn definitions(&self) -> &[String];

    /// Symbols whose owners must be visited strictly before this unit.
    ///
    /// These are "inheritance" edges:
    ///   a superclass must be loaded before its subclass.
    fn prerequisites(&self) -> &[String];

    /// Symbols that must be linked but need not precede this unit.
    fn dependencies(&self) -> &[String];

    /// Whether the unit is provided by the runtime itself.
    ///
    /// Native units are always treated as external and are never
    ///   visited.
    fn is_native(&self) -> bool {
        false
    }

    /// Modification time of the unit's source, if known.
    fn last_modified(&self) -> Option<u64> {
        None
    }

    /// Size in bytes of the compiled unit, if known.
    fn size(&self) -> Option<u64> {
        None
    }

    /// Size in bytes of the compiled unit after optimization, if known.
    fn optimized_size(&self) -> Option<u64> {
        None
    }
}

impl<L: Linkable + ?Sized> Linkable for &L {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn definitions(&self) -> &[String] {
        (**self).definitions()
    }

    fn prerequisites(&self) -> &[String] {
        (**self).prerequisites()
    }

    fn dependencies(&self) -> &[String] {
        (**self).dependencies()
    }

    fn is_native(&self) -> bool {
        (**self).is_native()
    }

    fn last_modified(&self) -> Option<u64> {
        (**self).last_modified()
    }

    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn optimized_size(&self) -> Option<u64> {
        (**self).optimized_size()
    }
}

/// An owned [`Linkable`].
///
/// ```
/// use flexld::ld::{Linkable, Unit};
///
/// let unit = Unit::new("app:Main")
///     .define("app:Main")
///     .prerequisite("flash.display:Sprite")
///     .dependency("app:Helper");
///
/// assert_eq!("app:Main", unit.name());
/// assert_eq!(&["flash.display:Sprite".to_string()], unit.prerequisites());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unit {
    pub name: String,
    pub definitions: Vec<String>,
    pub prerequisites: Vec<String>,
    pub dependencies: Vec<String>,
    pub native: bool,
    pub last_modified: Option<u64>,
    pub size: Option<u64>,
    pub optimized_size: Option<u64>,
}

impl Unit {
    /// New unit with no definitions or references.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a definition.
    pub fn define<S: Into<String>>(mut self, def: S) -> Self {
        self.definitions.push(def.into());
        self
    }

    /// Add a prerequisite reference.
    pub fn prerequisite<S: Into<String>>(mut self, pre: S) -> Self {
        self.prerequisites.push(pre.into());
        self
    }

    /// Add a dependency reference.
    pub fn dependency<S: Into<String>>(mut self, dep: S) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Mark this unit as native to the runtime.
    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }
}

impl Linkable for Unit {
    fn name(&self) -> &str {
        &self.name
    }

    fn definitions(&self) -> &[String] {
        &self.definitions
    }

    fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn is_native(&self) -> bool {
        self.native
    }

    fn last_modified(&self) -> Option<u64> {
        self.last_modified
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn optimized_size(&self) -> Option<u64> {
        self.optimized_size
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unit `{}`", self.name)
    }
}
