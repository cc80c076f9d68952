use super::dependency_graph::DependencyGraph;

/// Partition of graph nodes into strongly connected components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SccPartition {
    /// `component_of[node]` is the id of the component containing `node`.
    pub(crate) component_of: Vec<usize>,
    /// Members of each component, ascending.
    pub(crate) components: Vec<Vec<usize>>,
}

impl SccPartition {
    pub(crate) fn n_components(&self) -> usize {
        self.components.len()
    }
}

const UNVISITED: usize = usize::MAX;

/// Tarjan's algorithm, O(N + E), with an explicit call stack.
///
/// Component ids are assigned in the order components are completed, which for Tarjan is a
/// reverse topological order of the graph. Callers should not rely on that.
pub(crate) fn strongly_connected_components(graph: &DependencyGraph) -> SccPartition {
    let n = graph.n_nodes();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0;

    let mut component_of = vec![UNVISITED; n];
    let mut components: Vec<Vec<usize>> = Vec::new();

    // (node, position in its successor list)
    let mut call: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call.push((root, 0));

        while let Some(frame) = call.last_mut() {
            let v = frame.0;
            let succ = graph.successors(v);
            if frame.1 < succ.len() {
                let w = succ[frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let id = components.len();
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component_of[w] = id;
                    members.push(w);
                    if w == v {
                        break;
                    }
                }
                members.sort_unstable();
                components.push(members);
            }
        }
    }

    SccPartition {
        component_of,
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sorted_components(p: &SccPartition) -> Vec<Vec<usize>> {
        let mut comps = p.components.clone();
        comps.sort();
        comps
    }

    #[test]
    fn two_cycles_joined_by_an_edge() {
        // 0 <-> 1 -> 2 <-> 3, and 4 on its own
        let g = DependencyGraph::from_successors(vec![
            vec![1],
            vec![0, 2],
            vec![3],
            vec![2],
            vec![],
        ]);
        let p = strongly_connected_components(&g);
        assert_eq!(sorted_components(&p), vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert_eq!(p.component_of[0], p.component_of[1]);
        assert_ne!(p.component_of[1], p.component_of[2]);
    }

    #[test]
    fn dag_gives_singletons() {
        let g = DependencyGraph::from_successors(vec![vec![1, 2], vec![2], vec![]]);
        let p = strongly_connected_components(&g);
        assert_eq!(p.n_components(), 3);
    }

    #[test]
    fn long_cycle_does_not_recurse() {
        let n = 100_000;
        let g = DependencyGraph::from_successors((0..n).map(|i| vec![(i + 1) % n]).collect());
        let p = strongly_connected_components(&g);
        assert_eq!(p.n_components(), 1);
        assert_eq!(p.components[0].len(), n);
    }
}
