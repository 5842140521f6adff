//! Max-flow / min-cut solver for the segmentation energy.
//!
//! Dinic's algorithm over an explicit residual graph. Pixel nodes are indexed
//! `0..node_count`; two extra terminals (source = foreground, sink =
//! background) are appended internally. After [`FlowGraph::max_flow`] the cut
//! side of each pixel is read with [`FlowGraph::is_source_side`].

use std::collections::VecDeque;

const EPS: f64 = 1e-10;

struct Edge {
    to: u32,
    cap: f64,
}

pub struct FlowGraph {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<u32>>,
    source: usize,
    sink: usize,
    level: Vec<i32>,
    next_edge: Vec<usize>,
}

impl FlowGraph {
    pub fn new(node_count: usize) -> Self {
        let total = node_count + 2;
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); total],
            source: node_count,
            sink: node_count + 1,
            level: vec![-1; total],
            next_edge: vec![0; total],
        }
    }

    /// Connect a pixel to the two terminals. Capacities must be non-negative.
    pub fn add_terminal_weights(&mut self, node: usize, to_source: f64, to_sink: f64) {
        if to_source > EPS {
            self.add_edge(self.source, node, to_source, 0.0);
        }
        if to_sink > EPS {
            self.add_edge(node, self.sink, to_sink, 0.0);
        }
    }

    /// Add a symmetric neighborhood link between two pixels.
    pub fn add_neighbor_weight(&mut self, a: usize, b: usize, weight: f64) {
        if weight > EPS {
            self.add_edge(a, b, weight, weight);
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: f64, rev_cap: f64) {
        self.adjacency[from].push(self.edges.len() as u32);
        self.edges.push(Edge {
            to: to as u32,
            cap,
        });
        self.adjacency[to].push(self.edges.len() as u32);
        self.edges.push(Edge {
            to: from as u32,
            cap: rev_cap,
        });
    }

    pub fn max_flow(&mut self) -> f64 {
        let mut flow = 0.0;
        while self.build_levels() {
            self.next_edge.iter_mut().for_each(|e| *e = 0);
            loop {
                let pushed = self.augment(self.source, f64::INFINITY);
                if pushed <= EPS {
                    break;
                }
                flow += pushed;
            }
        }
        flow
    }

    /// True when the node ends on the source (foreground) side of the
    /// minimum cut. Valid only after [`max_flow`](Self::max_flow); the final
    /// level graph doubles as the reachability set.
    pub fn is_source_side(&self, node: usize) -> bool {
        self.level[node] >= 0
    }

    fn build_levels(&mut self) -> bool {
        self.level.iter_mut().for_each(|l| *l = -1);
        self.level[self.source] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(self.source);
        while let Some(u) = queue.pop_front() {
            for &edge_index in &self.adjacency[u] {
                let edge = &self.edges[edge_index as usize];
                let v = edge.to as usize;
                if edge.cap > EPS && self.level[v] < 0 {
                    self.level[v] = self.level[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        self.level[self.sink] >= 0
    }

    fn augment(&mut self, u: usize, pushed: f64) -> f64 {
        if u == self.sink {
            return pushed;
        }
        while self.next_edge[u] < self.adjacency[u].len() {
            let edge_index = self.adjacency[u][self.next_edge[u]] as usize;
            let (to, cap) = {
                let edge = &self.edges[edge_index];
                (edge.to as usize, edge.cap)
            };
            if cap > EPS && self.level[to] == self.level[u] + 1 {
                let sent = self.augment(to, pushed.min(cap));
                if sent > EPS {
                    self.edges[edge_index].cap -= sent;
                    self.edges[edge_index ^ 1].cap += sent;
                    return sent;
                }
            }
            self.next_edge[u] += 1;
        }
        0.0
    }
}
