// Light filesystem abstractions
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

//! Opening unit object files by path.
//!
//! Unit object files may import one another,
//!   and a file may be reachable both from the command line and through
//!   any number of imports.
//! [`VisitOnceFilesystem`] hands out a file the first time its canonical
//!   path is requested and [`VisitOnceFile::Visited`] thereafter,
//!     so that each file contributes its units exactly once
//!     and import cycles terminate.

use fxhash::FxBuildHasher;
use std::collections::HashSet;
use std::fs;
use std::hash::BuildHasher;
use std::io::{BufReader, Result};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Something that can be opened from a path.
pub trait File: Sized {
    fn open(path: &Path) -> Result<Self>;
}

impl File for fs::File {
    fn open(path: &Path) -> Result<Self> {
        Self::open(path)
    }
}

impl<F: File + std::io::Read> File for BufReader<F> {
    fn open(path: &Path) -> Result<Self> {
        F::open(path).map(BufReader::new)
    }
}

/// A file that remembers where it came from,
///   so that its imports can be found.
#[derive(Debug, PartialEq)]
pub struct PathFile<F> {
    path: PathBuf,
    inner: F,
}

impl<F> PathFile<F> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inner_mut(&mut self) -> &mut F {
        &mut self.inner
    }

    /// Resolve an import `path` against the directory of this file.
    ///
    /// Absolute paths are returned unchanged.
    pub fn relative<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(path),
            None => path.as_ref().to_path_buf(),
        }
    }
}

impl<F: File> File for PathFile<F> {
    fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            inner: F::open(path)?,
        })
    }
}

/// Result of [`VisitOnceFilesystem::open`].
#[derive(Debug, PartialEq)]
pub enum VisitOnceFile<F> {
    FirstVisit(F),
    Visited,
}

/// Produces a canonical form of a path,
///   used as the identity of a file.
pub trait Canonicalizer {
    fn canonicalize(path: &Path) -> Result<PathBuf>;
}

/// Canonicalize against the real filesystem.
///
/// This fails if `path` does not exist.
pub struct FsCanonicalizer;

impl Canonicalizer for FsCanonicalizer {
    fn canonicalize(path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// Opens each canonical path at most once.
///
/// Files are opened by their canonical path,
///   so a [`PathFile`] reports the canonical path.
/// A path that fails to open is not recorded.
pub struct VisitOnceFilesystem<C, S = FxBuildHasher> {
    visited: HashSet<PathBuf, S>,
    _c: PhantomData<C>,
}

impl<C, S> VisitOnceFilesystem<C, S>
where
    C: Canonicalizer,
    S: BuildHasher + Default,
{
    pub fn new() -> Self {
        Self {
            visited: Default::default(),
            _c: PhantomData,
        }
    }

    /// Number of files opened so far.
    pub fn visit_len(&self) -> usize {
        self.visited.len()
    }

    pub fn open<F: File>(&mut self, path: &Path) -> Result<VisitOnceFile<F>> {
        let cpath = C::canonicalize(path)?;

        if self.visited.contains(&cpath) {
            return Ok(VisitOnceFile::Visited);
        }

        let file = F::open(&cpath)?;
        self.visited.insert(cpath);

        Ok(VisitOnceFile::FirstVisit(file))
    }
}

impl<C, S> Default for VisitOnceFilesystem<C, S>
where
    C: Canonicalizer,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}
