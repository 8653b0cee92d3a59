// Link state
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

//! Symbol table and traversal state shared between link passes.
//!
//! A [`LinkState`] is built once from the full set of [`Linkable`]s.
//! Construction validates the integrity of the set
//!   (see [`LinkError`] for the invariants)
//!   and produces a symbol table mapping each definition to the context
//!   of the unit that owns it.
//!
//! The state is then threaded through one or more calls to
//!   [`traverse`](super::traverse).
//! Traversals mutate it:
//!   units are marked as visited,
//!   include symbols reached through the graph are consumed,
//!   externals proven to be locally resolvable are demoted,
//!   and unresolved symbols accumulate.
//! A unit visited by one traversal will therefore never be visited by a
//!   subsequent one,
//!     which allows e.g. an application to be linked before its
//!     resource modules using the same state.

use super::{LinkError, Linkable};
use fixedbitset::FixedBitSet;
use fxhash::FxHashMap;
use std::collections::BTreeSet;

/// Ordered set of symbol names.
///
/// Symbol sets are ordered so that seeding and reporting are
///   deterministic between runs.
pub type SymbolSet = BTreeSet<String>;

/// Policy flags for a single traversal.
///
/// The default policy is strict:
///   externals are linked if they can be found,
///   includes are consumed as they are reached,
///   and all dependencies are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkOptions {
    /// Treat symbols in the external set as breaks in the graph rather
    ///   than linking their owners.
    pub allow_external: bool,

    /// Seed the traversal with every include symbol and leave includes
    ///   in place as they are reached.
    pub export_includes: bool,

    /// Follow only prerequisite edges,
    ///   ignoring all other dependencies.
    pub include_inheritance_only: bool,
}

/// Index of a [`LinkableContext`] within its [`LinkState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextIndex(pub(super) usize);

impl From<ContextIndex> for usize {
    fn from(ci: ContextIndex) -> Self {
        ci.0
    }
}

/// Outcome of resolving a symbol.
///
/// Reaching an external or native symbol is expected and is not an error;
///   those symbols are [`Deferred`](Resolution::Deferred) and the
///   traversal continues around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The symbol is owned by a unit that will be linked.
    Resolved(ContextIndex),

    /// The symbol will be resolved by something other than this link.
    Deferred,
}

/// Positions within a unit's prerequisites and dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursors {
    pre: usize,
    /// [`None`] if dependencies are not to be followed.
    dep: Option<usize>,
}

/// A [`Linkable`] with its traversal position.
///
/// The cursors are undefined until the context is first resolved,
///   at which point they are [activated](Self::activate) exactly once.
#[derive(Debug)]
pub struct LinkableContext<L> {
    linkable: L,
    cursors: Option<Cursors>,
}

impl<L: Linkable> LinkableContext<L> {
    fn new(linkable: L) -> Self {
        Self {
            linkable,
            cursors: None,
        }
    }

    /// The wrapped unit.
    pub fn linkable(&self) -> &L {
        &self.linkable
    }

    /// Whether resolution of this context has begun.
    pub fn is_active(&self) -> bool {
        self.cursors.is_some()
    }

    /// Begin resolution of this context.
    ///
    /// This has no effect if the context is already active;
    ///   in particular,
    ///     `include_inheritance_only` is honored only by the first call.
    pub fn activate(&mut self, include_inheritance_only: bool) {
        self.cursors.get_or_insert(Cursors {
            pre: 0,
            dep: (!include_inheritance_only).then_some(0),
        });
    }

    /// Advance the prerequisite cursor.
    pub(super) fn next_prerequisite(&mut self) -> Option<String> {
        let cursors = self.cursors.as_mut()?;
        let pre = self.linkable.prerequisites().get(cursors.pre)?;

        cursors.pre += 1;
        Some(pre.clone())
    }

    /// Advance the dependency cursor.
    pub(super) fn next_dependency(&mut self) -> Option<String> {
        let pos = self.cursors.as_mut()?.dep.as_mut()?;
        let dep = self.linkable.dependencies().get(*pos)?;

        *pos += 1;
        Some(dep.clone())
    }
}

/// Symbol table and mutable bookkeeping for linking a set of
///   [`Linkable`]s.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug)]
pub struct LinkState<L> {
    /// Every unit,
    ///   in the order provided by the caller.
    contexts: Vec<LinkableContext<L>>,

    /// Unit name to context.
    lmap: FxHashMap<String, ContextIndex>,

    /// Definition name to the context of its owning unit.
    defs: FxHashMap<String, ContextIndex>,

    /// Definitions to be resolved outside of this link.
    extdefs: SymbolSet,

    /// Definitions to be forced into the link.
    includes: SymbolSet,

    /// Sink for symbols that could not be resolved locally.
    ///
    /// If [`None`],
    ///   undefined symbols are fatal.
    unresolved: Option<SymbolSet>,

    /// Contexts whose units have been passed to a visitor.
    visited: FixedBitSet,

    /// Contexts currently on the traversal stack.
    ///
    /// Reaching one of these through a prerequisite means that the
    ///   prerequisites form a cycle.
    progress: FixedBitSet,

    /// Visited contexts in the order in which they were visited.
    visit_order: Vec<ContextIndex>,
}

impl<L: Linkable> LinkState<L> {
    /// Build the symbol table for `linkables`,
    ///   validating the integrity of the set.
    ///
    /// Errors
    /// ======
    /// - [`LinkError::DuplicateSymbol`] if two units share a name;
    /// - [`LinkError::MultipleDefinitions`] if two units share a
    ///   definition; and
    /// - [`LinkError::PartialExterns`] if a unit mixes external and
    ///   non-external definitions.
    pub fn new<I: IntoIterator<Item = L>>(
        linkables: I,
        extdefs: SymbolSet,
        includes: SymbolSet,
        unresolved: Option<SymbolSet>,
    ) -> Result<Self, LinkError> {
        let iter = linkables.into_iter();
        let (cap, _) = iter.size_hint();

        let mut state = Self {
            contexts: Vec::with_capacity(cap),
            lmap: Default::default(),
            defs: Default::default(),
            extdefs,
            includes,
            unresolved,
            visited: FixedBitSet::with_capacity(cap),
            progress: FixedBitSet::with_capacity(cap),
            visit_order: Vec::new(),
        };

        for linkable in iter {
            state.add(linkable)?;
        }

        let len = state.contexts.len();
        state.visited.grow(len);
        state.progress.grow(len);

        Ok(state)
    }

    fn add(&mut self, linkable: L) -> Result<(), LinkError> {
        let name = linkable.name();

        if self.lmap.contains_key(name) {
            return Err(LinkError::DuplicateSymbol(name.into()));
        }

        let ci = ContextIndex(self.contexts.len());

        let mut first_external: Option<&str> = None;
        let mut first_local: Option<&str> = None;

        for def in linkable.definitions() {
            if let Some(&prev) = self.defs.get(def) {
                // `ci` has not yet been pushed onto `contexts`
                let prev_unit = match self.contexts.get(prev.0) {
                    Some(context) if prev != ci => context.linkable.name(),
                    _ => name,
                };

                return Err(LinkError::MultipleDefinitions {
                    def: def.clone(),
                    unit: name.into(),
                    prev_unit: prev_unit.into(),
                });
            }

            self.defs.insert(def.clone(), ci);

            if self.extdefs.contains(def) {
                if let Some(local) = first_local {
                    return Err(partial_externs(name, local, def));
                }

                first_external.get_or_insert(def);
            } else {
                if let Some(external) = first_external {
                    return Err(partial_externs(name, def, external));
                }

                first_local.get_or_insert(def);
            }
        }

        self.lmap.insert(name.into(), ci);
        self.contexts.push(LinkableContext::new(linkable));

        Ok(())
    }

    /// Decide whether `name` is to be linked,
    ///   activating the context of its owner if so.
    ///
    /// The policy is evaluated in this order:
    ///
    ///   1. If externals are allowed and `name` is external,
    ///        it is recorded as unresolved and deferred;
    ///   2. Unless includes are exported,
    ///        `name` is removed from the include set,
    ///        since it has now been reached through the graph;
    ///   3. If `name` has no owner,
    ///        it is recorded as unresolved and deferred,
    ///        or fails if there is no unresolved set;
    ///   4. If its owner is native,
    ///        it is recorded as unresolved and deferred;
    ///   5. If externals are not allowed,
    ///        `name` is removed from the external set,
    ///        since it was resolved locally; and
    ///   6. The owner's context is activated and resolved.
    ///
    /// Errors
    /// ======
    /// - [`LinkError::UndefinedSymbol`] if `name` has no owner and this
    ///   state has no unresolved set.
    pub fn resolve(
        &mut self,
        name: &str,
        options: LinkOptions,
    ) -> Result<Resolution, LinkError> {
        if options.allow_external && self.extdefs.contains(name) {
            self.record_unresolved(name);
            return Ok(Resolution::Deferred);
        }

        if !options.export_includes {
            self.includes.remove(name);
        }

        let ci = match self.defs.get(name) {
            Some(&ci) => ci,
            None if self.unresolved.is_some() => {
                self.record_unresolved(name);
                return Ok(Resolution::Deferred);
            }
            None => return Err(LinkError::UndefinedSymbol(name.into())),
        };

        if self.contexts[ci.0].linkable.is_native() {
            self.record_unresolved(name);
            return Ok(Resolution::Deferred);
        }

        if !options.allow_external {
            self.extdefs.remove(name);
        }

        self.contexts[ci.0].activate(options.include_inheritance_only);

        Ok(Resolution::Resolved(ci))
    }

    fn record_unresolved(&mut self, name: &str) {
        if let Some(unresolved) = self.unresolved.as_mut() {
            if !unresolved.contains(name) {
                unresolved.insert(name.into());
            }
        }
    }

    /// Symbols that could not be resolved locally,
    ///   including externals and natives that were reached.
    ///
    /// This is [`None`] if the state was constructed without an
    ///   unresolved set.
    pub fn unresolved(&self) -> Option<&SymbolSet> {
        self.unresolved.as_ref()
    }

    /// Definitions still considered to be external.
    ///
    /// This shrinks as externals are resolved by traversals that do not
    ///   allow them.
    pub fn external_defs(&self) -> &SymbolSet {
        &self.extdefs
    }

    /// Definitions still awaiting forced inclusion.
    ///
    /// This shrinks as includes are reached by traversals that do not
    ///   export them.
    pub fn includes(&self) -> &SymbolSet {
        &self.includes
    }

    /// Every definition of every unit,
    ///   in unit and declaration order.
    pub fn def_names(&self) -> impl Iterator<Item = &str> {
        self.contexts
            .iter()
            .flat_map(|c| c.linkable.definitions())
            .map(String::as_str)
    }

    /// Every unit,
    ///   in the order provided at construction.
    pub fn linkables(&self) -> impl Iterator<Item = &L> {
        self.contexts.iter().map(LinkableContext::linkable)
    }

    /// Units that have been visited,
    ///   in the order in which they were visited.
    pub fn visited_linkables(&self) -> impl Iterator<Item = &L> {
        self.visit_order
            .iter()
            .map(|ci| self.contexts[ci.0].linkable())
    }

    /// Whether the unit named `name` has been visited.
    pub fn is_visited(&self, name: &str) -> bool {
        self.lmap
            .get(name)
            .map(|&ci| self.visited.contains(ci.0))
            .unwrap_or(false)
    }

    /// The unit that defines `def`,
    ///   if any.
    pub fn owner(&self, def: &str) -> Option<&L> {
        self.defs.get(def).map(|ci| self.contexts[ci.0].linkable())
    }

    /// Context of the unit named `name`,
    ///   if any.
    pub fn context(&self, name: &str) -> Option<&LinkableContext<L>> {
        self.lmap.get(name).map(|ci| &self.contexts[ci.0])
    }

    /// Definitions that are to be linked when no explicit starting
    ///   definitions are provided.
    pub(super) fn default_seeds(&self) -> Vec<String> {
        self.def_names()
            .filter(|def| !self.extdefs.contains(*def))
            .map(String::from)
            .collect()
    }

    pub(super) fn at(&self, ci: ContextIndex) -> &LinkableContext<L> {
        &self.contexts[ci.0]
    }

    pub(super) fn at_mut(&mut self, ci: ContextIndex) -> &mut LinkableContext<L> {
        &mut self.contexts[ci.0]
    }

    pub(super) fn visited_at(&self, ci: ContextIndex) -> bool {
        self.visited.contains(ci.0)
    }

    pub(super) fn in_progress(&self, ci: ContextIndex) -> bool {
        self.progress.contains(ci.0)
    }

    pub(super) fn begin(&mut self, ci: ContextIndex) {
        self.progress.insert(ci.0);
    }

    /// Mark a context as visited,
    ///   ending its progress.
    pub(super) fn finish(&mut self, ci: ContextIndex) {
        self.progress.set(ci.0, false);

        if !self.visited.put(ci.0) {
            self.visit_order.push(ci);
        }
    }

    /// Abandon all contexts in progress.
    pub(super) fn abandon(&mut self) {
        self.progress.clear();
    }
}

fn partial_externs(unit: &str, def: &str, external: &str) -> LinkError {
    LinkError::PartialExterns {
        unit: unit.into(),
        def: def.into(),
        external: external.into(),
    }
}
