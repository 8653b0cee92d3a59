// flexld linker library
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

//! The [linker][] is responsible for determining the order in which
//!   individually compiled units must be loaded.
//!
//! Its user-facing binary is [`flexld`][flexld].
//!
//! [linker]: https://en.wikipedia.org/wiki/Linker_(computing)
//! [flexld]: ../../flexld
//!
//! Units and Symbols
//! -----------------
//! Each [`Linkable`] unit defines a set of symbols and references
//!   symbols defined by other units,
//!     either as _prerequisites_
//!       (the owner must be loaded before the unit)
//!     or as _dependencies_
//!       (the owner must be loaded,
//!         but may be loaded after the unit).
//! A [`LinkState`] indexes every unit by the symbols it defines,
//!   validating along the way that the set of units is well-formed.
//!
//! Ordering
//! --------
//! [`traverse`] walks the state from a set of starting definitions,
//!   visiting each reachable unit exactly once and only after all of its
//!   prerequisites,
//!     producing a topological order of the prerequisite graph.
//! Dependencies are queued and walked afterward,
//!   so dependency cycles are permitted while prerequisite cycles are
//!   reported as a [`LinkError::CircularReference`].
//!
//! Not every reference must be linked.
//! External definitions may be treated as breaks in the graph,
//!   units native to the runtime are never linked,
//!   and undefined symbols may be collected rather than treated as
//!   errors;
//!     see [`LinkState::resolve`] for the full policy.
//!
//! Output
//! ------
//! Beyond the visit order itself,
//!   the linker can produce a diagnostic [`report`] of everything that
//!   was linked and left unresolved,
//!   and a [`graph`] of the units for visualization.
//! [`pipeline`] ties all of this together for files on disk.

pub mod graph;
pub mod pipeline;
pub mod report;

mod error;
mod linkable;
mod state;
mod walk;

pub use error::LinkError;
pub use linkable::{Linkable, Unit};
pub use state::{
    ContextIndex, LinkOptions, LinkState, LinkableContext, Resolution,
    SymbolSet,
};
pub use walk::{traverse, DependencyWalker};
