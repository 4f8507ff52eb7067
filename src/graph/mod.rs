//! Message Dependency Graph
//!
//! One node per message, plus proxy nodes for referenced types that are not
//! among the given messages (external or well-known types). An edge T -> M
//! means "T must be emitted before M".
//!
//! Ordering is computed over strongly connected components so that mutually
//! recursive messages can still be laid out; [`TypeGraph::sort`] is the strict
//! variant that reports every unorderable cycle.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::descriptor::Message;
use crate::error::{CompileError, Result};

/// A graph node
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Message(&'a Message),
    /// Referenced type without a descriptor in this graph
    Proxy(String),
}

impl<'a> Node<'a> {
    pub fn name(&self) -> &str {
        match self {
            Node::Message(message) => &message.full_name,
            Node::Proxy(name) => name,
        }
    }

    fn message(&self) -> Option<&'a Message> {
        match self {
            Node::Message(message) => Some(*message),
            Node::Proxy(_) => None,
        }
    }
}

/// Dependency graph over messages, keyed by full name
pub struct TypeGraph<'a> {
    graph: DiGraph<Node<'a>, ()>,
    index: HashMap<&'a str, NodeIndex>,
    proxies: HashMap<String, NodeIndex>,
}

impl<'a> TypeGraph<'a> {
    /// Build the graph. Node order follows the iteration order of `messages`,
    /// which also serves as the tie-break for every ordering query.
    pub fn new(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let mut order = Vec::new();

        for message in messages {
            let node = graph.add_node(Node::Message(message));
            index.insert(message.full_name.as_str(), node);
            order.push((node, message));
        }

        let mut this = Self {
            graph,
            index,
            proxies: HashMap::new(),
        };

        for (node, message) in order {
            for field in message.typed_fields().filter(|f| f.is_message()) {
                let dependency = this.node_for(&field.type_name);
                if !this.graph.contains_edge(dependency, node) {
                    this.graph.add_edge(dependency, node, ());
                }
            }
        }

        this
    }

    fn node_for(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(name) {
            return node;
        }
        if let Some(&node) = self.proxies.get(name) {
            return node;
        }

        let node = self.graph.add_node(Node::Proxy(name.to_string()));
        self.proxies.insert(name.to_string(), node);
        node
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Strict topological order; fails with every unorderable cycle set
    pub fn sort(&self) -> Result<Vec<&'a Message>> {
        let cycles: Vec<Vec<String>> = self
            .components()
            .into_iter()
            .filter(|component| self.is_cycle(component))
            .map(|component| {
                component
                    .iter()
                    .map(|&n| self.graph[n].name().to_string())
                    .collect()
            })
            .collect();

        if !cycles.is_empty() {
            return Err(CompileError::Cycle(cycles));
        }

        Ok(self.order())
    }

    /// Topological order that tolerates cycles: each cycle is laid out as a
    /// block in declaration order wherever it sits in the dependency order.
    pub fn order(&self) -> Vec<&'a Message> {
        self.ordered_nodes()
            .into_iter()
            .filter_map(|n| self.graph[n].message())
            .collect()
    }

    /// The closure of `roots` (everything that must exist before them, roots
    /// included), in global order. Unknown root names are ignored.
    pub fn sort_to<'n>(&self, roots: impl IntoIterator<Item = &'n str>) -> Vec<&'a Message> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut worklist: Vec<NodeIndex> = Vec::new();

        for root in roots {
            if let Some(&node) = self.index.get(root) {
                if visited.insert(node) {
                    worklist.push(node);
                }
            }
        }

        while let Some(node) = worklist.pop() {
            for edge in self.graph.edges_directed(node, Direction::Incoming) {
                let source = edge.source();
                if visited.insert(source) {
                    worklist.push(source);
                }
            }
        }

        self.ordered_nodes()
            .into_iter()
            .filter(|n| visited.contains(n))
            .filter_map(|n| self.graph[n].message())
            .collect()
    }

    /// Strongly connected components, members sorted by node index
    fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut components = kosaraju_scc(&self.graph);
        for component in &mut components {
            component.sort();
        }
        components.sort_by_key(|c| c[0]);
        components
    }

    fn is_cycle(&self, component: &[NodeIndex]) -> bool {
        match component {
            [single] => self.graph.contains_edge(*single, *single),
            _ => true,
        }
    }

    /// Kahn's algorithm over the condensation, always releasing the ready
    /// component with the lowest node index first
    fn ordered_nodes(&self) -> Vec<NodeIndex> {
        let components = self.components();

        let mut component_of = vec![0; self.graph.node_count()];
        for (ci, component) in components.iter().enumerate() {
            for node in component {
                component_of[node.index()] = ci;
            }
        }

        let mut successors: Vec<HashSet<usize>> = vec![HashSet::new(); components.len()];
        let mut in_degree = vec![0usize; components.len()];
        for edge in self.graph.edge_references() {
            let from = component_of[edge.source().index()];
            let to = component_of[edge.target().index()];
            if from != to && successors[from].insert(to) {
                in_degree[to] += 1;
            }
        }

        // Components are sorted by first member, so the component index is the tie-break
        let mut ready: BinaryHeap<Reverse<usize>> = (0..components.len())
            .filter(|&ci| in_degree[ci] == 0)
            .map(Reverse)
            .collect();

        let mut nodes = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(ci)) = ready.pop() {
            nodes.extend_from_slice(&components[ci]);

            let mut next: Vec<usize> = successors[ci].iter().copied().collect();
            next.sort_unstable();
            for succ in next {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.push(Reverse(succ));
                }
            }
        }

        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{File, FileDescriptorProto};

    fn file(messages: &str) -> File {
        let json = format!(r#"{{"name": "g.proto", "package": "g", "messageType": {messages}}}"#);
        let proto: FileDescriptorProto = serde_json::from_str(&json).unwrap();
        File::build(&proto).unwrap()
    }

    fn msg_field(name: &str, target: &str) -> String {
        format!(
            r#"{{"name": "{name}", "number": 1, "type": "TYPE_MESSAGE", "typeName": "{target}"}}"#
        )
    }

    fn names(messages: &[&Message]) -> Vec<String> {
        messages.iter().map(|m| m.full_name.clone()).collect()
    }

    #[test]
    fn test_dependencies_come_first() {
        let file = file(&format!(
            r#"[
                {{"name": "A", "field": [{}]}},
                {{"name": "B", "field": [{}]}},
                {{"name": "C"}}
            ]"#,
            msg_field("b", ".g.B"),
            msg_field("c", ".g.C"),
        ));
        let graph = TypeGraph::new(&file.messages);

        assert_eq!(names(&graph.sort().unwrap()), vec![".g.C", ".g.B", ".g.A"]);
    }

    #[test]
    fn test_independent_messages_keep_declaration_order() {
        let file = file(r#"[{"name": "X"}, {"name": "Y"}, {"name": "Z"}]"#);
        let graph = TypeGraph::new(&file.messages);
        assert_eq!(names(&graph.sort().unwrap()), vec![".g.X", ".g.Y", ".g.Z"]);
    }

    #[test]
    fn test_proxy_nodes_for_external_types() {
        let file = file(&format!(
            r#"[{{"name": "Event", "field": [{}, {}]}}]"#,
            msg_field("at", ".google.protobuf.Timestamp"),
            msg_field("until", ".google.protobuf.Timestamp"),
        ));
        let graph = TypeGraph::new(&file.messages);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.proxy_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(names(&graph.sort().unwrap()), vec![".g.Event"]);
    }

    #[test]
    fn test_sort_reports_every_cycle() {
        let file = file(&format!(
            r#"[
                {{"name": "A", "field": [{}]}},
                {{"name": "B", "field": [{}]}},
                {{"name": "Node", "field": [{}]}},
                {{"name": "Leaf"}}
            ]"#,
            msg_field("b", ".g.B"),
            msg_field("a", ".g.A"),
            msg_field("next", ".g.Node"),
        ));
        let graph = TypeGraph::new(&file.messages);

        match graph.sort() {
            Err(CompileError::Cycle(cycles)) => {
                assert_eq!(
                    cycles,
                    vec![
                        vec![".g.A".to_string(), ".g.B".to_string()],
                        vec![".g.Node".to_string()],
                    ]
                );
            }
            other => panic!("expected cycle error, got {other:?}"),
        }

        // The tolerant order still covers every message
        assert_eq!(names(&graph.order()), vec![".g.A", ".g.B", ".g.Node", ".g.Leaf"]);
    }

    #[test]
    fn test_cycle_placed_after_its_dependencies() {
        let file = file(&format!(
            r#"[
                {{"name": "A", "field": [{}, {}]}},
                {{"name": "B", "field": [{}]}},
                {{"name": "Base"}}
            ]"#,
            msg_field("b", ".g.B"),
            msg_field("base", ".g.Base"),
            msg_field("a", ".g.A"),
        ));
        let graph = TypeGraph::new(&file.messages);
        assert_eq!(names(&graph.order()), vec![".g.Base", ".g.A", ".g.B"]);
    }

    #[test]
    fn test_sort_to_closure() {
        let file = file(&format!(
            r#"[
                {{"name": "Request", "field": [{}]}},
                {{"name": "Filter", "field": [{}]}},
                {{"name": "Range"}},
                {{"name": "Unrelated"}}
            ]"#,
            msg_field("filter", ".g.Filter"),
            msg_field("range", ".g.Range"),
        ));
        let graph = TypeGraph::new(&file.messages);

        let closure = graph.sort_to([".g.Request", ".g.Missing"]);
        assert_eq!(names(&closure), vec![".g.Range", ".g.Filter", ".g.Request"]);
    }

    #[test]
    fn test_sort_to_terminates_on_cycles() {
        let file = file(&format!(
            r#"[
                {{"name": "A", "field": [{}]}},
                {{"name": "B", "field": [{}]}}
            ]"#,
            msg_field("b", ".g.B"),
            msg_field("a", ".g.A"),
        ));
        let graph = TypeGraph::new(&file.messages);
        assert_eq!(names(&graph.sort_to([".g.B"])), vec![".g.A", ".g.B"]);
    }
}
