// flexld library
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

//! A dependency-graph linker for compiled script units.
//!
//! Given a set of units that define and reference symbols,
//!   the linker determines an order in which those units can be loaded
//!   such that every unit appears after its prerequisites.
//! See the [`ld`] module to get started.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod fs;
pub mod ld;
pub mod obj;
pub mod tpwrap;
