//! Weighted directed graph with adjacency lists.
//!
//! Vertices are dense `usize` indices, arcs carry non-negative `u32`
//! weights. The value `u32::MAX` is reserved as the "unreachable" distance
//! and can never be stored on an arc.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Index of a vertex in the graph.
pub type VertexId = usize;

/// Distance reported for a destination that cannot be reached.
pub const INFINITY: u32 = u32::MAX;

/// Errors from graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex index is not below the vertex count
    #[error("vertex {vertex} does not exist (graph has {len} vertices)")]
    VertexOutOfRange { vertex: VertexId, len: usize },

    /// The arc weight equals the unreachable sentinel
    #[error("weight {0} is reserved for unreachable vertices")]
    ReservedWeight(u32),

    /// No arc joins the two vertices
    #[error("no arc from {from} to {to}")]
    ArcNotFound { from: VertexId, to: VertexId },
}

/// An outgoing arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub destination: VertexId,
    pub weight: u32,
}

/// Result of a single-pair shortest path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    /// Total weight, or [`INFINITY`] when the destination was not reached.
    pub distance: u32,
    /// Vertices from origin to destination; just `[destination]` when
    /// unreachable or when origin and destination coincide.
    pub path: Vec<VertexId>,
}

impl ShortestPath {
    pub fn is_reachable(&self) -> bool {
        self.distance != INFINITY
    }
}

/// Directed graph with non-negative arc weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<Arc>>,
}

impl Graph {
    /// Create a graph with `vertices` vertices and no arcs.
    pub fn new(vertices: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertices],
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of arcs over all vertices.
    pub fn num_arcs(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Change the number of vertices.
    ///
    /// Growing keeps every existing adjacency list. Shrinking drops the
    /// trailing lists; arcs pointing into the dropped vertices must have been
    /// removed beforehand.
    pub fn resize(&mut self, vertices: usize) {
        self.adjacency.resize_with(vertices, Vec::new);
    }

    /// Append an arc from `i` to `j`. Parallel arcs are allowed.
    pub fn add_arc(&mut self, i: VertexId, j: VertexId, weight: u32) -> Result<(), GraphError> {
        self.check_vertex(i)?;
        self.check_vertex(j)?;
        if weight == INFINITY {
            return Err(GraphError::ReservedWeight(weight));
        }
        self.adjacency[i].push(Arc {
            destination: j,
            weight,
        });
        Ok(())
    }

    /// Remove the most recently added arc from `i` to `j`.
    pub fn remove_arc(&mut self, i: VertexId, j: VertexId) -> Result<(), GraphError> {
        self.check_vertex(i)?;
        self.check_vertex(j)?;
        let list = &mut self.adjacency[i];
        let pos = list
            .iter()
            .rposition(|arc| arc.destination == j)
            .ok_or(GraphError::ArcNotFound { from: i, to: j })?;
        list.remove(pos);
        Ok(())
    }

    /// Weight of the first arc from `i` to `j`.
    pub fn weight(&self, i: VertexId, j: VertexId) -> Result<u32, GraphError> {
        self.check_vertex(i)?;
        self.adjacency[i]
            .iter()
            .find(|arc| arc.destination == j)
            .map(|arc| arc.weight)
            .ok_or(GraphError::ArcNotFound { from: i, to: j })
    }

    /// Outgoing arcs of `i`, in insertion order.
    pub fn arcs(&self, i: VertexId) -> Result<&[Arc], GraphError> {
        self.check_vertex(i)?;
        Ok(&self.adjacency[i])
    }

    pub fn out_degree(&self, i: VertexId) -> Result<usize, GraphError> {
        self.arcs(i).map(<[Arc]>::len)
    }

    /// Dijkstra's shortest path from `origin` to `destination`.
    ///
    /// Vertices are settled in order of tentative distance, ties going to the
    /// lowest vertex id, and the search stops as soon as `destination` is
    /// settled. Scratch buffers are allocated per call.
    pub fn shortest_path(
        &self,
        origin: VertexId,
        destination: VertexId,
    ) -> Result<ShortestPath, GraphError> {
        self.check_vertex(origin)?;
        self.check_vertex(destination)?;

        if origin == destination {
            return Ok(ShortestPath {
                distance: 0,
                path: vec![destination],
            });
        }

        let n = self.adjacency.len();
        let mut distance = vec![INFINITY; n];
        let mut predecessor: Vec<Option<VertexId>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut queue = BinaryHeap::new();

        distance[origin] = 0;
        queue.push(Reverse((0u32, origin)));

        while let Some(Reverse((dist, u))) = queue.pop() {
            if settled[u] {
                continue;
            }
            settled[u] = true;

            if u == destination {
                break;
            }

            for arc in &self.adjacency[u] {
                let v = arc.destination;
                if settled[v] {
                    continue;
                }
                // A saturated sum equals INFINITY and never improves a label.
                let candidate = dist.saturating_add(arc.weight);
                if candidate < distance[v] {
                    distance[v] = candidate;
                    predecessor[v] = Some(u);
                    queue.push(Reverse((candidate, v)));
                }
            }
        }

        if predecessor[destination].is_none() {
            return Ok(ShortestPath {
                distance: INFINITY,
                path: vec![destination],
            });
        }

        let mut path = vec![destination];
        let mut current = destination;
        while let Some(prev) = predecessor[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        Ok(ShortestPath {
            distance: distance[destination],
            path,
        })
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<(), GraphError> {
        if vertex >= self.adjacency.len() {
            return Err(GraphError::VertexOutOfRange {
                vertex,
                len: self.adjacency.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: VertexId = 0;
    const B: VertexId = 1;
    const C: VertexId = 2;
    const D: VertexId = 3;

    fn diamond() -> Graph {
        let mut g = Graph::new(4);
        g.add_arc(A, B, 5).unwrap();
        g.add_arc(A, C, 2).unwrap();
        g.add_arc(C, B, 2).unwrap();
        g.add_arc(B, D, 1).unwrap();
        g.add_arc(C, D, 10).unwrap();
        g
    }

    #[test]
    fn new_graph_is_empty() {
        let g = Graph::new(3);
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_arcs(), 0);
        assert_eq!(g.out_degree(2), Ok(0));
    }

    #[test]
    fn add_arc_rejects_missing_vertices() {
        let mut g = Graph::new(2);
        assert_eq!(
            g.add_arc(2, 0, 1),
            Err(GraphError::VertexOutOfRange { vertex: 2, len: 2 })
        );
        assert_eq!(
            g.add_arc(0, 5, 1),
            Err(GraphError::VertexOutOfRange { vertex: 5, len: 2 })
        );
        assert_eq!(g.num_arcs(), 0);
    }

    #[test]
    fn add_arc_rejects_sentinel_weight() {
        let mut g = Graph::new(2);
        assert_eq!(g.add_arc(0, 1, INFINITY), Err(GraphError::ReservedWeight(INFINITY)));
        assert!(g.add_arc(0, 1, INFINITY - 1).is_ok());
    }

    #[test]
    fn parallel_arcs_are_kept() {
        let mut g = Graph::new(2);
        g.add_arc(0, 1, 4).unwrap();
        g.add_arc(0, 1, 9).unwrap();
        assert_eq!(g.out_degree(0), Ok(2));
        // weight() reports the first one
        assert_eq!(g.weight(0, 1), Ok(4));
    }

    #[test]
    fn remove_arc_takes_most_recent() {
        let mut g = Graph::new(3);
        g.add_arc(0, 1, 4).unwrap();
        g.add_arc(0, 2, 1).unwrap();
        g.add_arc(0, 1, 9).unwrap();

        g.remove_arc(0, 1).unwrap();
        assert_eq!(
            g.arcs(0).unwrap(),
            &[
                Arc { destination: 1, weight: 4 },
                Arc { destination: 2, weight: 1 }
            ]
        );

        g.remove_arc(0, 1).unwrap();
        assert_eq!(g.remove_arc(0, 1), Err(GraphError::ArcNotFound { from: 0, to: 1 }));
        assert_eq!(g.num_arcs(), 1);
    }

    #[test]
    fn remove_arc_rejects_missing_vertices() {
        let mut g = Graph::new(2);
        assert!(matches!(
            g.remove_arc(3, 0),
            Err(GraphError::VertexOutOfRange { vertex: 3, .. })
        ));
        assert!(matches!(
            g.remove_arc(0, 3),
            Err(GraphError::VertexOutOfRange { vertex: 3, .. })
        ));
    }

    #[test]
    fn weight_lookup() {
        let g = diamond();
        assert_eq!(g.weight(A, C), Ok(2));
        assert_eq!(g.weight(C, D), Ok(10));
        assert_eq!(g.weight(D, A), Err(GraphError::ArcNotFound { from: D, to: A }));
        assert!(matches!(g.weight(9, A), Err(GraphError::VertexOutOfRange { .. })));
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut g = diamond();
        g.resize(6);
        assert_eq!(g.num_vertices(), 6);
        assert_eq!(g.num_arcs(), 5);
        g.add_arc(4, 5, 1).unwrap();

        g.resize(4);
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g, diamond());
    }

    #[test]
    fn dijkstra_finds_cheapest_route() {
        let g = diamond();
        let sp = g.shortest_path(A, D).unwrap();
        // 2 + 2 + 1, beating the direct A -> B -> D at 6
        assert_eq!(sp.distance, 5);
        assert_eq!(sp.path, vec![A, C, B, D]);
        assert!(sp.is_reachable());
    }

    #[test]
    fn trivial_query() {
        let g = diamond();
        for v in 0..g.num_vertices() {
            let sp = g.shortest_path(v, v).unwrap();
            assert_eq!(sp.distance, 0);
            assert_eq!(sp.path, vec![v]);
        }
    }

    #[test]
    fn unreachable_query() {
        let g = diamond();
        let sp = g.shortest_path(D, A).unwrap();
        assert_eq!(sp.distance, INFINITY);
        assert_eq!(sp.path, vec![A]);
        assert!(!sp.is_reachable());
    }

    #[test]
    fn shortest_path_rejects_missing_vertices() {
        let g = diamond();
        assert!(g.shortest_path(A, 4).is_err());
        assert!(g.shortest_path(4, A).is_err());
    }

    #[test]
    fn ties_go_to_lowest_vertex() {
        // Two equal routes 0 -> 1 -> 3 and 0 -> 2 -> 3.
        let mut g = Graph::new(4);
        g.add_arc(0, 2, 1).unwrap();
        g.add_arc(0, 1, 1).unwrap();
        g.add_arc(2, 3, 1).unwrap();
        g.add_arc(1, 3, 1).unwrap();

        let sp = g.shortest_path(0, 3).unwrap();
        assert_eq!(sp.distance, 2);
        assert_eq!(sp.path, vec![0, 1, 3]);
    }

    #[test]
    fn zero_weight_arcs() {
        let mut g = Graph::new(3);
        g.add_arc(0, 1, 0).unwrap();
        g.add_arc(1, 2, 0).unwrap();
        let sp = g.shortest_path(0, 2).unwrap();
        assert_eq!(sp.distance, 0);
        assert_eq!(sp.path, vec![0, 1, 2]);
    }

    #[test]
    fn repeated_queries_do_not_interfere() {
        let g = diamond();
        let first = g.shortest_path(A, D).unwrap();
        let _ = g.shortest_path(D, A).unwrap();
        let _ = g.shortest_path(C, B).unwrap();
        assert_eq!(g.shortest_path(A, D).unwrap(), first);
    }

    #[test]
    fn error_display() {
        let err = GraphError::VertexOutOfRange { vertex: 7, len: 3 };
        assert_eq!(err.to_string(), "vertex 7 does not exist (graph has 3 vertices)");
        let err = GraphError::ArcNotFound { from: 1, to: 2 };
        assert_eq!(err.to_string(), "no arc from 1 to 2");
    }
}
