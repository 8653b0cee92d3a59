// Unit object files
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

//! Unit object file processing.
//!
//! A unit object file describes compiled units to the linker.
//! The compiled bytes themselves are of no concern to the linker;
//!   only the symbols that each unit defines and references,
//!   along with some metadata for reporting.
//!
//! The general structure of a unit object file consists of:
//!   - Imports of other unit object files,
//!       relative to the importing file; and
//!   - Units,
//!       each with its definitions,
//!       prerequisites
//!         (references that must be linked _before_ the unit),
//!       and dependencies
//!         (references that must be linked anywhere).
//!
//! For example:
//!
//! ```xml
//! <units>
//!   <import path="framework.xml" />
//!
//!   <unit name="app:Main" mod="1690000000" size="2048" optimizedsize="1536">
//!     <def id="app:Main" />
//!     <pre id="flash.display:Sprite" />
//!     <dep id="app:Helper" />
//!   </unit>
//!
//!   <unit name="Object" native="true">
//!     <def id="Object" />
//!   </unit>
//! </units>
//! ```
//!
//! Elements and attributes that are not recognized are ignored.

mod error;
mod reader;

pub use error::UnitObjError;
pub use reader::{read_units, UnitAttrs, UnitEvent, UnitObject, UnitReader};

/// Result of reading a unit object file.
pub type UnitResult<T> = Result<T, UnitObjError>;
