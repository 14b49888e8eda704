//! Dependency resolution using Kahn's topological sort
//!
//! Edges point from a plugin to the plugins it depends on. `before`
//! constraints are rewritten into ordinary edges on their target before
//! sorting. Among plugins whose dependencies are all satisfied, the one
//! submitted first is released first, so the order is a pure function of
//! the batch.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::builder::Registration;
use crate::error::{RemiError, Result};

/// Orders a batch of fresh registrations
pub struct DependencyResolver<'a> {
    /// Names already present in the target's registry
    registered: &'a HashSet<String>,

    /// Plugin forced to run first
    main: Option<&'a str>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registered: &'a HashSet<String>) -> Self {
        Self {
            registered,
            main: None,
        }
    }

    pub fn with_main(mut self, main: Option<&'a str>) -> Self {
        self.main = main;
        self
    }

    /// Resolve the execution order of `batch`.
    ///
    /// `batch` must not contain names that are already registered, and
    /// names must be unique.
    pub fn resolve(&self, batch: &[Arc<Registration>]) -> Result<Vec<Arc<Registration>>> {
        let position: HashMap<&str, usize> = batch
            .iter()
            .enumerate()
            .map(|(idx, reg)| (reg.name.as_str(), idx))
            .collect();

        let main_idx = match self.main {
            Some(main) => match position.get(main) {
                Some(&idx) => Some(idx),
                None if self.registered.contains(main) => None,
                None => return Err(RemiError::main_plugin_missing(main)),
            },
            None => None,
        };

        let dependencies = self.expand_before(batch, &position)?;

        if let Some(idx) = main_idx {
            if !dependencies[idx].is_empty() {
                return Err(RemiError::main_plugin_has_dependencies(
                    &batch[idx].name,
                    dependencies[idx].iter().cloned().collect(),
                ));
            }
        }

        let edges = self.in_batch_edges(batch, &position, &dependencies, main_idx)?;
        let sorted = Self::topological_order(batch, &edges, main_idx)?;

        let mut order = Vec::with_capacity(batch.len());
        if let Some(idx) = main_idx {
            order.push(Arc::clone(&batch[idx]));
        }
        order.extend(sorted.into_iter().map(|idx| Arc::clone(&batch[idx])));

        debug!(
            order = ?order.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Resolved plugin order"
        );
        Ok(order)
    }

    /// Dependency sets per plugin, with `before` constraints folded in
    fn expand_before(
        &self,
        batch: &[Arc<Registration>],
        position: &HashMap<&str, usize>,
    ) -> Result<Vec<BTreeSet<String>>> {
        let mut dependencies: Vec<BTreeSet<String>> =
            batch.iter().map(|reg| reg.dependencies.clone()).collect();

        for reg in batch {
            for target in &reg.before {
                let idx = position
                    .get(target.as_str())
                    .copied()
                    .ok_or_else(|| RemiError::unknown_before_target(target, &reg.name))?;
                dependencies[idx].insert(reg.name.clone());
            }
        }

        Ok(dependencies)
    }

    /// For each plugin, the batch positions it has to wait for.
    ///
    /// Dependencies on registered plugins and on the main plugin are
    /// already satisfied and produce no edge.
    fn in_batch_edges(
        &self,
        batch: &[Arc<Registration>],
        position: &HashMap<&str, usize>,
        dependencies: &[BTreeSet<String>],
        main_idx: Option<usize>,
    ) -> Result<Vec<Vec<usize>>> {
        let mut edges = vec![Vec::new(); batch.len()];

        for (idx, deps) in dependencies.iter().enumerate() {
            for dep in deps {
                match position.get(dep.as_str()) {
                    Some(&dep_idx) if Some(dep_idx) == main_idx => {}
                    Some(&dep_idx) => edges[idx].push(dep_idx),
                    None if self.registered.contains(dep) => {}
                    None => return Err(RemiError::unknown_dependency(dep, &batch[idx].name)),
                }
            }
        }

        Ok(edges)
    }

    /// Kahn's algorithm releasing ready plugins in batch order
    fn topological_order(
        batch: &[Arc<Registration>],
        edges: &[Vec<usize>],
        main_idx: Option<usize>,
    ) -> Result<Vec<usize>> {
        let n = batch.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents = vec![Vec::new(); n];

        for (idx, deps) in edges.iter().enumerate() {
            in_degree[idx] = deps.len();
            for &dep in deps {
                dependents[dep].push(idx);
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&idx| Some(idx) != main_idx && in_degree[idx] == 0)
            .map(Reverse)
            .collect();

        let expected = n - usize::from(main_idx.is_some());
        let mut order = Vec::with_capacity(expected);

        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < expected {
            let placed: HashSet<usize> = order.iter().copied().chain(main_idx).collect();
            return Err(RemiError::cyclic_dependency(Self::find_cycle(
                batch, edges, &placed,
            )));
        }

        Ok(order)
    }

    /// Names of the first dependency cycle among the unplaced plugins
    fn find_cycle(
        batch: &[Arc<Registration>],
        edges: &[Vec<usize>],
        placed: &HashSet<usize>,
    ) -> Vec<String> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: HashMap<usize, NodeIndex> = (0..batch.len())
            .filter(|idx| !placed.contains(idx))
            .map(|idx| (idx, graph.add_node(idx)))
            .collect();

        for (&idx, &node) in &nodes {
            for dep in &edges[idx] {
                if let Some(&dep_node) = nodes.get(dep) {
                    graph.add_edge(node, dep_node, ());
                }
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<usize> = scc.into_iter().map(|n| graph[n]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        cycles.sort();

        cycles
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|idx| batch[idx].name.clone())
            .collect()
    }
}
