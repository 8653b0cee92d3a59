// Dependency graph traversal
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

//! Topological traversal of the link graph.
//!
//! Prerequisites form a directed acyclic graph whose edges point from a
//!   unit to the units that must precede it
//!     (that is,
//!       the graph is transposed relative to the order of the output).
//! A topological sort of a graph is equivalent to a post-order
//!   depth-first search (DFS) of its transpose,
//!     and so that is what this traversal performs.
//!
//! Dependencies that are not prerequisites impose no ordering;
//!   they are placed on a FIFO work queue and walked only after the DFS
//!   from which they were discovered completes.
//! Linkables connected only by dependencies are therefore visited in an
//!   order that is deterministic between runs but otherwise unspecified.
//!
//! The DFS uses an explicit stack rather than recursion,
//!   since prerequisite chains of large programs may be very deep.
//! Each context on the stack retains its own prerequisite cursor,
//!   so the stack holds only context indexes.
//!
//! A prerequisite that refers to a context that is still on the stack
//!   forms a cycle.
//! There is no correct place to break a cycle,
//!   so the entire traversal fails with
//!   [`LinkError::CircularReference`].

use super::{
    state::{ContextIndex, Resolution},
    LinkError, LinkOptions, LinkState, Linkable,
};
use std::collections::VecDeque;

/// Visit each [`Linkable`] reachable from `start` exactly once,
///   each only after all of its prerequisites.
///
/// If `start` is [`None`],
///   traversal begins with every definition that is not external,
///   unless [`LinkOptions::include_inheritance_only`] is set,
///     in which case there are no starting definitions of its own.
/// If [`LinkOptions::export_includes`] is set,
///   every include is added to the starting definitions;
///     with both options set,
///     traversal begins only at the includes.
///
/// ```
/// use flexld::ld::{traverse, LinkOptions, LinkState, Linkable, Unit};
///
/// let units = vec![
///     Unit::new("A").define("A").prerequisite("B"),
///     Unit::new("B").define("B").prerequisite("C"),
///     Unit::new("C").define("C"),
/// ];
///
/// let mut state =
///     LinkState::new(units, Default::default(), Default::default(), None)
///         .unwrap();
///
/// let mut order = Vec::new();
/// traverse(
///     Some(vec!["A".into()]),
///     &mut state,
///     LinkOptions::default(),
///     |unit: &Unit| order.push(unit.name().to_string()),
/// )
/// .unwrap();
///
/// assert_eq!(vec!["C", "B", "A"], order);
/// ```
///
/// Errors
/// ======
/// - [`LinkError::UndefinedSymbol`] if a symbol has no owner and the
///   state has no unresolved set; and
/// - [`LinkError::CircularReference`] if prerequisites form a cycle.
///
/// Units visited before an error remain visited in `state`,
///   but no context is left in progress.
pub fn traverse<L, F>(
    start: Option<Vec<String>>,
    state: &mut LinkState<L>,
    options: LinkOptions,
    visitor: F,
) -> Result<(), LinkError>
where
    L: Linkable,
    F: FnMut(&L),
{
    DependencyWalker::new(state, options).walk(start, visitor)
}

/// Initial capacity of the [`DependencyWalker`] stack.
///
/// The stack holds only the current prerequisite chain,
///   which is rarely deeper than a class hierarchy.
const INIT_STACK_CAP: usize = 32;

/// Traversal over a [`LinkState`].
///
/// See the [module-level documentation](self) for more information.
pub struct DependencyWalker<'s, L> {
    state: &'s mut LinkState<L>,
    options: LinkOptions,

    /// DFS stack of the prerequisite walk.
    ///
    /// Every context on the stack is in progress;
    ///   the stack is empty between entries of [`Self::queue`].
    stack: Vec<ContextIndex>,

    /// Contexts awaiting their own prerequisite walk.
    ///
    /// A context may be enqueued any number of times;
    ///   it is skipped if it has been visited by the time it is dequeued.
    queue: VecDeque<ContextIndex>,
}

impl<'s, L: Linkable> DependencyWalker<'s, L> {
    pub fn new(state: &'s mut LinkState<L>, options: LinkOptions) -> Self {
        Self {
            state,
            options,
            stack: Vec::with_capacity(INIT_STACK_CAP),
            queue: VecDeque::new(),
        }
    }

    /// Perform the traversal,
    ///   invoking `visitor` for each unit in dependency order.
    pub fn walk<F: FnMut(&L)>(
        mut self,
        start: Option<Vec<String>>,
        mut visitor: F,
    ) -> Result<(), LinkError> {
        for def in self.seeds(start) {
            self.enqueue(&def)?;
        }

        while let Some(qc) = self.queue.pop_front() {
            if self.state.visited_at(qc) {
                continue;
            }

            self.state.begin(qc);
            self.stack.push(qc);

            if let Err(e) = self.drain_stack(&mut visitor) {
                self.stack.clear();
                self.state.abandon();

                return Err(e);
            }
        }

        Ok(())
    }

    fn seeds(&self, start: Option<Vec<String>>) -> Vec<String> {
        let mut seeds = start.unwrap_or_else(|| {
            if self.options.include_inheritance_only {
                Vec::new()
            } else {
                self.state.default_seeds()
            }
        });

        if self.options.export_includes {
            seeds.extend(self.state.includes().iter().cloned());
        }

        seeds
    }

    /// Resolve `def` and place its owner on the work queue if it has yet
    ///   to be visited.
    fn enqueue(&mut self, def: &str) -> Result<(), LinkError> {
        if let Resolution::Resolved(ci) = self.state.resolve(def, self.options)?
        {
            if !self.state.visited_at(ci) {
                self.queue.push_back(ci);
            }
        }

        Ok(())
    }

    /// Walk prerequisites depth-first until the stack is empty.
    fn drain_stack<F: FnMut(&L)>(
        &mut self,
        visitor: &mut F,
    ) -> Result<(), LinkError> {
        while let Some(&c) = self.stack.last() {
            if self.state.visited_at(c) {
                self.stack.pop();
                continue;
            }

            if let Some(pre) = self.state.at_mut(c).next_prerequisite() {
                if let Resolution::Resolved(prereq) =
                    self.state.resolve(&pre, self.options)?
                {
                    if self.state.in_progress(prereq) {
                        return Err(self.circular_reference(c, prereq));
                    }

                    if !self.state.visited_at(prereq) {
                        self.state.begin(prereq);
                        self.stack.push(prereq);
                    }
                }

                continue;
            }

            visitor(self.state.at(c).linkable());
            self.state.finish(c);
            self.stack.pop();

            while let Some(dep) = self.state.at_mut(c).next_dependency() {
                self.enqueue(&dep)?;
            }
        }

        Ok(())
    }

    /// Error for a prerequisite of `c` that refers back to `prereq`,
    ///   which is still on the stack.
    fn circular_reference(
        &self,
        c: ContextIndex,
        prereq: ContextIndex,
    ) -> LinkError {
        let name = |ci| self.state.at(ci).linkable().name().to_string();

        let path = self
            .stack
            .iter()
            .position(|&ci| ci == prereq)
            .map(|pos| {
                self.stack[pos..]
                    .iter()
                    .copied()
                    .chain(Some(prereq))
                    .map(name)
                    .collect()
            })
            .unwrap_or_default();

        LinkError::CircularReference {
            unit: name(c),
            path,
        }
    }
}
