//! Compilation-unit dependency ordering using petgraph
//!
//! The declaration pass requires strict dependency order: a unit's imports
//! must be fully declared before the importer is processed. This module
//! builds the import graph and produces a topological order, reporting
//! circular or unresolved imports as diagnostics.

use crate::ast::Unit;
use crate::error::UnitGraphError;
use petgraph::{algo, graph::NodeIndex, Graph as PetGraph};
use std::collections::HashMap;

/// Import graph over compilation units
#[derive(Debug, Default)]
pub struct UnitGraph {
    graph: PetGraph<String, ()>,
    unit_to_node: HashMap<String, NodeIndex>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.unit_to_node.get(name) {
            return node;
        }
        let node = self.graph.add_node(name.to_string());
        self.unit_to_node.insert(name.to_string(), node);
        node
    }

    /// Add a unit and its import edges. Importing an unknown unit is detected
    /// later, in [`Self::compilation_order`], once every unit is present.
    pub fn add_unit(&mut self, unit: &Unit) {
        let node = self.get_or_create_node(&unit.name);
        for import in &unit.imports {
            let dependency = self.get_or_create_node(import);
            // Edge from dependency to importer: dependencies sort first
            self.graph.add_edge(dependency, node, ());
        }
    }

    /// Units in dependency order, imports first
    pub fn compilation_order(&self, known_units: &[&str]) -> Result<Vec<String>, UnitGraphError> {
        for (name, &node) in &self.unit_to_node {
            if !known_units.contains(&name.as_str()) {
                let importer = self
                    .graph
                    .neighbors_directed(node, petgraph::Direction::Outgoing)
                    .next()
                    .map(|n| self.graph[n].clone())
                    .unwrap_or_default();
                return Err(UnitGraphError::UnresolvedImport {
                    unit: importer,
                    import: name.clone(),
                });
            }
        }
        match algo::toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|n| self.graph[n].clone()).collect()),
            Err(cycle) => {
                let start = cycle.node_id();
                Err(UnitGraphError::CircularImport {
                    cycle: self.extract_cycle(start),
                })
            }
        }
    }

    /// Walk one strongly connected component to name the cycle members
    fn extract_cycle(&self, start: NodeIndex) -> Vec<String> {
        for component in algo::kosaraju_scc(&self.graph) {
            if component.len() > 1 && component.contains(&start) {
                let mut names: Vec<String> =
                    component.iter().map(|n| self.graph[*n].clone()).collect();
                names.sort();
                return names;
            }
        }
        vec![self.graph[start].clone()]
    }
}
