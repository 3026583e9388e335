//! Property tests for the hierarchy service.
//!
//! - Any sequence of link attempts leaves the stored graph acyclic, and the
//!   service accepts exactly the links the in-memory model accepts.
//! - Cascading completion reaches the same end state whatever order the
//!   leaves are completed in.

use proptest::prelude::*;
use std::collections::BTreeSet;

use trellis_core::graph::MemoryHierarchy;
use trellis_core::model::{NewTask, TaskId, TaskStatus, UserId, UserRole};
use trellis_core::HierarchyService;

fn service_with_tasks(count: usize) -> (HierarchyService, UserId, Vec<TaskId>) {
    let mut svc = HierarchyService::in_memory().expect("in-memory service");
    let owner = svc
        .create_user("owner", None, UserRole::User)
        .expect("create owner");
    let ids = (0..count)
        .map(|i| {
            svc.create_task(&NewTask::new(format!("t{i}")), owner.id)
                .expect("create task")
                .id
        })
        .collect();
    (svc, owner.id, ids)
}

/// Forward edges `(i, j)` with `i < j` over `n` nodes, hence acyclic.
fn arb_forest(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=max_nodes).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>()
        });
        (Just(n), edges)
    })
}

/// Expected completion state: a leaf is complete iff chosen; an inner task
/// is complete iff all of its children are.
fn expected_completion(n: usize, edges: &[(usize, usize)], chosen: &BTreeSet<usize>) -> Vec<bool> {
    let mut done = vec![false; n];
    for node in (0..n).rev() {
        let kids: Vec<usize> = edges
            .iter()
            .filter(|(parent, _)| *parent == node)
            .map(|(_, child)| *child)
            .collect();
        done[node] = if kids.is_empty() {
            chosen.contains(&node)
        } else {
            kids.iter().all(|&kid| done[kid])
        };
    }
    done
}

fn complete_in_order(
    n: usize,
    edges: &[(usize, usize)],
    order: &[usize],
) -> Vec<TaskStatus> {
    let (mut svc, owner, ids) = service_with_tasks(n);
    for &(parent, child) in edges {
        svc.create_hierarchy(ids[parent], ids[child], owner)
            .expect("forward edge is acyclic");
    }
    for &leaf in order {
        svc.update_status(ids[leaf], TaskStatus::Completed, owner)
            .expect("complete leaf");
    }
    ids.iter()
        .map(|&id| svc.get_task(id).expect("get task").status)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_links_never_form_a_cycle(
        attempts in prop::collection::vec((0usize..8, 0usize..8), 0..40)
    ) {
        let (mut svc, owner, ids) = service_with_tasks(8);
        let mut model = MemoryHierarchy::new();

        for (p, c) in attempts {
            let stored = svc.create_hierarchy(ids[p], ids[c], owner);
            let modeled = model.link(ids[p], ids[c]);

            prop_assert_eq!(stored.is_ok(), modeled.is_ok(), "link {} → {}", p, c);
            if let Err(err) = stored {
                prop_assert!(err.is_cycle(), "unexpected error: {}", err);
            }
        }

        let report = svc.verify_hierarchy().expect("verify");
        prop_assert!(report.is_clean(), "cycles: {:?}", report.cycles);
        prop_assert_eq!(report.edge_count, model.edge_count());
    }

    #[test]
    fn completion_is_order_independent(
        (n, edges) in arb_forest(7),
        mask in prop::collection::vec(any::<bool>(), 7),
        keys in prop::collection::vec(any::<u32>(), 7),
    ) {
        let parents: BTreeSet<usize> = edges.iter().map(|(p, _)| *p).collect();
        let chosen: BTreeSet<usize> = (0..n)
            .filter(|i| !parents.contains(i) && mask[*i])
            .collect();

        let ascending: Vec<usize> = chosen.iter().copied().collect();
        let mut shuffled = ascending.clone();
        shuffled.sort_by_key(|&i| keys[i]);

        let forward = complete_in_order(n, &edges, &ascending);
        let scrambled = complete_in_order(n, &edges, &shuffled);
        prop_assert_eq!(&forward, &scrambled);

        let expected = expected_completion(n, &edges, &chosen);
        for (i, status) in forward.iter().enumerate() {
            prop_assert_eq!(status.is_terminal(), expected[i], "task index {}", i);
        }
    }
}
