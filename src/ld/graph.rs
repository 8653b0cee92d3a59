// Link graph export
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

//! Export of the link graph.
//!
//! This produces a [`petgraph`] graph of the units of a [`LinkState`],
//!   with an edge from each unit to the owner of every symbol that it
//!   references.
//! References that will not be linked
//!   (undefined symbols, externals, and natives)
//!   are omitted,
//!     so the graph depicts only what the linker itself is able to order.
//!
//! The graph is intended for humans;
//!   see [`to_dot`] to render it in the DOT graph description language.

use super::{LinkState, Linkable};
use fxhash::FxHashMap;
use petgraph::{
    dot::Dot,
    graph::{DiGraph, NodeIndex},
};
use std::fmt::{self, Display};

/// Kind of reference represented by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Prerequisite,
    Dependency,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Prerequisite => write!(f, "pre"),
            Self::Dependency => write!(f, "dep"),
        }
    }
}

/// Graph of unit names.
pub type LinkGraph<'a> = DiGraph<&'a str, EdgeKind>;

/// Build a graph of every unit in `state`.
///
/// Nodes are added in the order the units were provided to the state.
pub fn link_graph<L: Linkable>(state: &LinkState<L>) -> LinkGraph<'_> {
    let mut graph = LinkGraph::new();

    let nodes: FxHashMap<&str, NodeIndex> = state
        .linkables()
        .filter(|l| !l.is_native())
        .map(|l| (l.name(), graph.add_node(l.name())))
        .collect();

    for linkable in state.linkables() {
        let from = match nodes.get(linkable.name()) {
            Some(&from) => from,
            None => continue,
        };

        let pres = linkable
            .prerequisites()
            .iter()
            .map(|sym| (sym, EdgeKind::Prerequisite));
        let deps = linkable
            .dependencies()
            .iter()
            .map(|sym| (sym, EdgeKind::Dependency));

        for (sym, kind) in pres.chain(deps) {
            if state.external_defs().contains(sym) {
                continue;
            }

            let to = state
                .owner(sym)
                .and_then(|owner| nodes.get(owner.name()).copied());

            if let Some(to) = to {
                graph.add_edge(from, to, kind);
            }
        }
    }

    graph
}

/// Render a graph in the DOT graph description language.
pub fn to_dot(graph: &LinkGraph) -> String {
    Dot::new(graph).to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ld::Unit;

    fn state(units: Vec<Unit>, extdefs: &[&str]) -> LinkState<Unit> {
        let extdefs = extdefs.iter().map(|s| s.to_string()).collect();

        LinkState::new(units, extdefs, Default::default(), None).unwrap()
    }

    #[test]
    fn edges_point_to_owners() {
        let sut = state(
            vec![
                Unit::new("a").define("A").prerequisite("B").dependency("C2"),
                Unit::new("b").define("B"),
                Unit::new("c").define("C1").define("C2"),
            ],
            &[],
        );

        let graph = link_graph(&sut);

        assert_eq!(3, graph.node_count());
        assert_eq!(2, graph.edge_count());

        let edges = graph
            .raw_edges()
            .iter()
            .map(|e| (graph[e.source()], graph[e.target()], e.weight))
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                ("a", "b", EdgeKind::Prerequisite),
                ("a", "c", EdgeKind::Dependency),
            ],
            edges,
        );
    }

    #[test]
    fn omits_unlinkable_references() {
        let sut = state(
            vec![
                Unit::new("a")
                    .define("A")
                    .prerequisite("Object")
                    .prerequisite("Ext")
                    .dependency("Missing"),
                Unit::new("Object").define("Object").native(),
                Unit::new("ext").define("Ext"),
            ],
            &["Ext"],
        );

        let graph = link_graph(&sut);

        // The native unit is not a node at all.
        assert_eq!(2, graph.node_count());
        assert_eq!(0, graph.edge_count());
    }

    #[test]
    fn renders_dot() {
        let sut = state(
            vec![
                Unit::new("a").define("A").prerequisite("B"),
                Unit::new("b").define("B"),
            ],
            &[],
        );

        let dot = to_dot(&link_graph(&sut));

        assert!(dot.starts_with("digraph"), "{dot}");
        assert!(dot.contains("\"pre\""), "{dot}");
        assert!(dot.contains("\"a\""), "{dot}");
    }
}
