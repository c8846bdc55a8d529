//! Plan validation and wave partitioning.
//!
//! [`validate`] checks that a plan is a well-formed DAG and partitions its
//! nodes into ordered waves. Wave `k` holds exactly the nodes whose longest
//! dependency chain has length `k`, so every node's dependencies live in
//! strictly earlier waves and each wave is maximal.
//!
//! The function is pure: the same plan always yields the same partition, and
//! node order inside a wave follows plan order.

use super::entities::Plan;
use super::value_objects::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Reasons a plan is rejected before execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Dependency cycle detected among: {}", format_ids(.0))]
    CycleDetected(Vec<TaskId>),

    #[error("Task {task} depends on unknown task {reference}")]
    UnknownDependency { task: TaskId, reference: TaskId },

    #[error("Duplicate task id: {0}")]
    DuplicateId(TaskId),

    #[error("Plan has no tasks")]
    EmptyPlan,
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ordered partition of a plan's nodes into execution waves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionWaves {
    waves: Vec<Vec<TaskId>>,
}

impl ExecutionWaves {
    pub fn waves(&self) -> &[Vec<TaskId>] {
        &self.waves
    }

    /// Number of waves
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Index of the wave containing `id`
    pub fn wave_of(&self, id: &TaskId) -> Option<usize> {
        self.waves.iter().position(|wave| wave.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<TaskId>> {
        self.waves.iter()
    }
}

/// Validate a plan and partition it into waves.
///
/// Checks, in order: non-empty, unique ids, known dependencies, acyclicity.
/// On a cycle, the error names exactly the nodes that sit on a cycle (nodes
/// merely downstream of one are not included), in plan order.
pub fn validate(plan: &Plan) -> Result<ExecutionWaves, ValidationError> {
    if plan.nodes.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }

    let mut index: HashMap<&TaskId, usize> = HashMap::with_capacity(plan.nodes.len());
    for (i, node) in plan.nodes.iter().enumerate() {
        if index.insert(&node.id, i).is_some() {
            return Err(ValidationError::DuplicateId(node.id.clone()));
        }
    }

    // deps[i] = indices node i depends on
    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(plan.nodes.len());
    for node in &plan.nodes {
        let mut node_deps = Vec::with_capacity(node.depends_on.len());
        for dep in &node.depends_on {
            match index.get(dep) {
                Some(&j) => {
                    if !node_deps.contains(&j) {
                        node_deps.push(j);
                    }
                }
                None => {
                    return Err(ValidationError::UnknownDependency {
                        task: node.id.clone(),
                        reference: dep.clone(),
                    });
                }
            }
        }
        deps.push(node_deps);
    }

    let n = plan.nodes.len();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut remaining: Vec<usize> = deps.iter().map(|d| d.len()).collect();
    for (i, node_deps) in deps.iter().enumerate() {
        for &j in node_deps {
            dependents[j].push(i);
        }
    }

    // Layered Kahn: each layer is one wave
    let mut level = vec![usize::MAX; n];
    let mut frontier: Vec<usize> = (0..n).filter(|&i| remaining[i] == 0).collect();
    let mut waves: Vec<Vec<usize>> = Vec::new();
    let mut placed = 0;

    while !frontier.is_empty() {
        frontier.sort_unstable();
        let wave_index = waves.len();
        let mut next = Vec::new();
        for &i in &frontier {
            level[i] = wave_index;
            placed += 1;
            for &d in &dependents[i] {
                remaining[d] -= 1;
                if remaining[d] == 0 {
                    next.push(d);
                }
            }
        }
        waves.push(std::mem::take(&mut frontier));
        frontier = next;
    }

    if placed < n {
        let unresolved: HashSet<usize> = (0..n).filter(|&i| level[i] == usize::MAX).collect();
        let on_cycle = nodes_on_cycles(&deps, &unresolved);
        let ids = on_cycle
            .into_iter()
            .map(|i| plan.nodes[i].id.clone())
            .collect();
        return Err(ValidationError::CycleDetected(ids));
    }

    Ok(ExecutionWaves {
        waves: waves
            .into_iter()
            .map(|wave| wave.into_iter().map(|i| plan.nodes[i].id.clone()).collect())
            .collect(),
    })
}

/// Nodes belonging to a non-trivial strongly connected component (or with a
/// self-dependency) within `subset`, sorted by index.
fn nodes_on_cycles(deps: &[Vec<usize>], subset: &HashSet<usize>) -> Vec<usize> {
    // Iterative Tarjan: stack depth never depends on chain length
    let n = deps.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut counter = 0;
    let mut result = Vec::new();
    // (node, next dependency to examine)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    let mut roots: Vec<usize> = subset.iter().copied().collect();
    roots.sort_unstable();

    for root in roots {
        if index[root].is_some() {
            continue;
        }
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if index[v].is_none() {
                index[v] = Some(counter);
                lowlink[v] = counter;
                counter += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            if let Some(&w) = deps[v].get(frame.1) {
                frame.1 += 1;
                if !subset.contains(&w) {
                    continue;
                }
                match index[w] {
                    None => frames.push((w, 0)),
                    Some(iw) if on_stack[w] => lowlink[v] = lowlink[v].min(iw),
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if index[v] == Some(lowlink[v]) {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                if component.len() > 1 || deps[v].contains(&v) {
                    result.extend(component);
                }
            }
        }
    }

    result.sort_unstable();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::TaskNode;

    fn node(id: &str, deps: &[&str]) -> TaskNode {
        deps.iter().fold(
            TaskNode::new(id, "legal_advisor", format!("do {}", id)),
            |n, d| n.with_dependency(*d),
        )
    }

    fn plan(nodes: Vec<TaskNode>) -> Plan {
        nodes.into_iter().fold(Plan::new("test"), |p, n| p.with_node(n))
    }

    fn ids(wave: &[TaskId]) -> Vec<&str> {
        wave.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_two_roots_and_a_join() {
        let p = plan(vec![
            node("T1", &[]),
            node("T2", &[]),
            node("T3", &["T1", "T2"]),
        ]);
        let waves = validate(&p).unwrap();
        assert_eq!(waves.len(), 2);
        assert_eq!(ids(&waves.waves()[0]), vec!["T1", "T2"]);
        assert_eq!(ids(&waves.waves()[1]), vec!["T3"]);
    }

    #[test]
    fn test_wave_index_exceeds_dependency_indices() {
        let p = plan(vec![
            node("A", &[]),
            node("B", &["A"]),
            node("C", &["A"]),
            node("D", &["B", "C"]),
            node("E", &["A", "D"]),
            node("F", &[]),
        ]);
        let waves = validate(&p).unwrap();
        for n in &p.nodes {
            let w = waves.wave_of(&n.id).unwrap();
            for d in &n.depends_on {
                assert!(w > waves.wave_of(d).unwrap(), "{} must follow {}", n.id, d);
            }
        }
        assert_eq!(ids(&waves.waves()[0]), vec!["A", "F"]);
        assert_eq!(ids(&waves.waves()[3]), vec!["E"]);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let p = plan(vec![
            node("T3", &["T1"]),
            node("T1", &[]),
            node("T2", &["T1"]),
        ]);
        let first = validate(&p).unwrap();
        let second = validate(&p).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first.waves()[1]), vec!["T3", "T2"]);
    }

    #[test]
    fn test_cycle_names_exactly_cycle_members() {
        // B <-> C is a cycle; D is only downstream of it; A is fine
        let p = plan(vec![
            node("A", &[]),
            node("B", &["A", "C"]),
            node("C", &["B"]),
            node("D", &["C"]),
        ]);
        assert_eq!(
            validate(&p),
            Err(ValidationError::CycleDetected(vec![
                TaskId::new("B"),
                TaskId::new("C")
            ]))
        );
    }

    #[test]
    fn test_node_between_two_cycles_is_not_named() {
        let p = plan(vec![
            node("A", &["B"]),
            node("B", &["A"]),
            node("X", &["A"]),
            node("C", &["X", "D"]),
            node("D", &["C"]),
        ]);
        assert_eq!(
            validate(&p),
            Err(ValidationError::CycleDetected(vec![
                TaskId::new("A"),
                TaskId::new("B"),
                TaskId::new("C"),
                TaskId::new("D"),
            ]))
        );
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let p = plan(vec![node("T1", &["T1"]), node("T2", &[])]);
        assert_eq!(
            validate(&p),
            Err(ValidationError::CycleDetected(vec![TaskId::new("T1")]))
        );
    }

    #[test]
    fn test_long_cycle_does_not_exhaust_stack() {
        const LEN: usize = 50_000;
        let nodes = (0..LEN)
            .map(|i| {
                let next = format!("N{}", (i + 1) % LEN);
                node(&format!("N{}", i), &[next.as_str()])
            })
            .collect();
        match validate(&plan(nodes)) {
            Err(ValidationError::CycleDetected(ids)) => assert_eq!(ids.len(), LEN),
            other => panic!("expected cycle, got {:?}", other.map(|w| w.len())),
        }
    }

    #[test]
    fn test_long_chain_into_cycle_names_only_cycle() {
        const LEN: usize = 20_000;
        let mut nodes: Vec<TaskNode> = (0..LEN)
            .map(|i| {
                let next = format!("N{}", i + 1);
                node(&format!("N{}", i), &[next.as_str()])
            })
            .collect();
        nodes.push(node(&format!("N{}", LEN), &["X"]));
        nodes.push(node("X", &[format!("N{}", LEN).as_str()]));
        assert_eq!(
            validate(&plan(nodes)),
            Err(ValidationError::CycleDetected(vec![
                TaskId::new(format!("N{}", LEN)),
                TaskId::new("X"),
            ]))
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let p = plan(vec![node("T1", &[]), node("T2", &["T9"])]);
        assert_eq!(
            validate(&p),
            Err(ValidationError::UnknownDependency {
                task: TaskId::new("T2"),
                reference: TaskId::new("T9"),
            })
        );
    }

    #[test]
    fn test_duplicate_id() {
        let p = plan(vec![node("T1", &[]), node("T1", &[])]);
        assert_eq!(
            validate(&p),
            Err(ValidationError::DuplicateId(TaskId::new("T1")))
        );
    }

    #[test]
    fn test_empty_plan() {
        assert_eq!(validate(&Plan::new("x")), Err(ValidationError::EmptyPlan));
    }

    #[test]
    fn test_cycle_error_display() {
        let err = ValidationError::CycleDetected(vec![TaskId::new("B"), TaskId::new("C")]);
        assert_eq!(err.to_string(), "Dependency cycle detected among: B, C");
    }
}
