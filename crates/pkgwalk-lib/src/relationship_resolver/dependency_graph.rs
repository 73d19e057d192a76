//! A petgraph view of the dependencies recorded by a [`Marker`].

use std::collections::BTreeMap;

use petgraph::prelude::*;
use serde::{Serialize, Deserialize};

use crate::metadb::package::*;
use super::Marker;

/// Edges point from a package to the packages it depends on.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
	pub graph: StableDiGraph<PackageIdentifier, ()>,
}

impl DependencyGraph {
	pub fn from_marker(marker: &Marker) -> Self {
		use crate::metadb::PackageRepository;

		let mut graph = StableDiGraph::<PackageIdentifier, ()>::default();
		let mut indices = BTreeMap::<PackageIdentifier, NodeIndex>::new();

		let mut get_or_add = |graph: &mut StableDiGraph<PackageIdentifier, ()>, identifier: &PackageIdentifier| {
			*indices.entry(identifier.clone()).or_insert_with(|| graph.add_node(identifier.clone()))
		};

		for package in marker.get_packages() {
			get_or_add(&mut graph, &package.identifier);
		}
		for (dependent, dependency) in marker.edges() {
			let from = get_or_add(&mut graph, dependent);
			let to = get_or_add(&mut graph, dependency);
			graph.update_edge(from, to, ());
		}

		Self { graph }
	}

	pub fn get_node_index(&self, identifier: &PackageIdentifier) -> Option<NodeIndex> {
		self.graph.node_indices().find(|&i| &self.graph[i] == identifier)
	}

	/// The packages `identifier` directly depends on.
	pub fn dependencies_of(&self, identifier: &PackageIdentifier) -> Vec<&PackageIdentifier> {
		let Some(index) = self.get_node_index(identifier) else { return Vec::new() };
		let mut dependencies = self.graph.neighbors_directed(index, Outgoing).map(|i| &self.graph[i]).collect::<Vec<_>>();
		dependencies.sort();
		dependencies
	}

	/// Every group of packages that depend on each other in a loop, including packages depending on themselves.
	///
	/// Packages in a group are sorted and so are the groups.
	pub fn cycles(&self) -> Vec<Vec<PackageIdentifier>> {
		let mut cycles = petgraph::algo::tarjan_scc(&self.graph)
			.into_iter()
			.filter(|component| component.len() > 1 || self.graph.find_edge(component[0], component[0]).is_some())
			.map(|component| {
				let mut cycle = component.into_iter().map(|i| self.graph[i].clone()).collect::<Vec<_>>();
				cycle.sort();
				cycle
			})
			.collect::<Vec<_>>();
		cycles.sort();
		cycles
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn package(id: &str) -> Package {
		Package::new(PackageIdentifier::new(id, PackageVersion::new("1.0").unwrap()))
	}

	#[test]
	fn dependency_graph_cycles() {
		let mut marker = Marker::new();
		let (a, b, c) = (package("A"), package("B"), package("C"));
		for p in [&a, &b, &c] {
			marker.mark_visited(p);
		}
		marker.add_dependent(&a.identifier, &b.identifier);
		marker.add_dependent(&b.identifier, &a.identifier);
		marker.add_dependent(&b.identifier, &c.identifier);

		let graph = DependencyGraph::from_marker(&marker);
		assert_eq!(graph.cycles(), vec![vec![a.identifier.clone(), b.identifier.clone()]]);
		assert_eq!(graph.dependencies_of(&b.identifier), vec![&a.identifier, &c.identifier]);
	}

	#[test]
	fn dependency_graph_self_loop_is_a_cycle() {
		let mut marker = Marker::new();
		let a = package("A");
		marker.mark_visited(&a);
		marker.add_dependent(&a.identifier, &a.identifier);
		assert_eq!(DependencyGraph::from_marker(&marker).cycles().len(), 1);
	}
}
