//! Prerequisite (interface inheritance) queries.
//!
//! Prerequisites form a DAG. `Model::add_prerequisite` refuses edges that
//! would close a cycle, so every walk here terminates.

use std::collections::{HashMap, HashSet};

use crate::model::{Model, TypeId};

/// `id` followed by every transitive prerequisite, depth-first pre-order,
/// each type listed at its first occurrence only.
pub fn deep_ancestors(model: &Model, id: TypeId) -> Vec<TypeId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current);
        stack.extend(model.ty(current).prerequisites().iter().rev().copied());
    }
    out
}

pub use self::deep_ancestors as ancestry_of;

/// Drops every candidate that is a strict ancestor of another candidate.
///
/// Survivors keep their first-seen input order; backends emit base-class
/// lists in this order, so it must not depend on anything else. An empty
/// input yields an empty list.
pub fn inherit_reduce(model: &Model, candidates: &[TypeId]) -> Vec<TypeId> {
    let strict: Vec<HashSet<TypeId>> = candidates
        .iter()
        .map(|&candidate| {
            deep_ancestors(model, candidate)
                .into_iter()
                .skip(1)
                .collect()
        })
        .collect();
    let mut reduced = Vec::new();
    for (idx, &candidate) in candidates.iter().enumerate() {
        if reduced.contains(&candidate) {
            continue;
        }
        let redundant = strict
            .iter()
            .enumerate()
            .any(|(other, ancestors)| other != idx && ancestors.contains(&candidate));
        if !redundant {
            reduced.push(candidate);
        }
    }
    reduced
}

/// Minimal direct-ancestor list of an interface.
pub fn reduce_ancestors(model: &Model, id: TypeId) -> Vec<TypeId> {
    inherit_reduce(model, model.ty(id).prerequisites())
}

/// True when `ancestor` is reachable from `id` through prerequisites.
pub fn is_strict_ancestor(model: &Model, ancestor: TypeId, id: TypeId) -> bool {
    ancestor != id && deep_ancestors(model, id).contains(&ancestor)
}

/// Longest path from `start` along `next`, in edges. Each node is expanded
/// once, so shared diamonds cost no more than a plain chain.
fn longest_chain<'a, F>(start: TypeId, next: F) -> usize
where
    F: Fn(TypeId) -> &'a [TypeId],
{
    let mut memo: HashMap<TypeId, usize> = HashMap::new();
    let mut stack = vec![(start, false)];
    while let Some((current, expanded)) = stack.pop() {
        if memo.contains_key(&current) {
            continue;
        }
        if expanded {
            let height = next(current)
                .iter()
                .filter_map(|succ| memo.get(succ))
                .map(|height| height + 1)
                .max()
                .unwrap_or(0);
            memo.insert(current, height);
            continue;
        }
        stack.push((current, true));
        stack.extend(
            next(current)
                .iter()
                .filter(|succ| !memo.contains_key(succ))
                .map(|&succ| (succ, false)),
        );
    }
    memo.get(&start).copied().unwrap_or(0)
}

/// Longest prerequisite chain below `id`, in edges.
pub(crate) fn chain_height(model: &Model, id: TypeId) -> usize {
    longest_chain(id, |current| model.ty(current).prerequisites())
}

/// Longest chain of interfaces deriving from `id`, in edges.
pub(crate) fn chain_depth(model: &Model, id: TypeId) -> usize {
    let mut derived: HashMap<TypeId, Vec<TypeId>> = HashMap::new();
    for interface in model.interfaces() {
        for &prerequisite in model.ty(interface).prerequisites() {
            derived.entry(prerequisite).or_default().push(interface);
        }
    }
    longest_chain(id, |current| {
        derived.get(&current).map_or(&[][..], Vec::as_slice)
    })
}
