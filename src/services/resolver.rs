use crate::domain::errors::{EngineError, EngineResult};
use crate::services::registry::SubsystemRegistry;
use std::collections::{BTreeMap, HashSet};

struct Frame<'a> {
    id: &'a str,
    deps: Vec<&'a str>,
    next: usize,
}

impl<'a> Frame<'a> {
    fn open(registry: &'a SubsystemRegistry, id: &'a str) -> EngineResult<Self> {
        let spec = registry.get(id)?;
        Ok(Self {
            id,
            deps: spec.dependencies.iter().map(String::as_str).collect(),
            next: 0,
        })
    }
}

/// Topological order of every registered id: dependencies first, ties by
/// ascending id. Iterative DFS so deep chains cannot exhaust the call stack.
pub fn resolve(registry: &SubsystemRegistry) -> EngineResult<Vec<String>> {
    let mut order = Vec::with_capacity(registry.len());
    let mut done: HashSet<&str> = HashSet::new();
    let mut visiting: HashSet<&str> = HashSet::new();

    for root in registry.ids() {
        if done.contains(root) {
            continue;
        }
        let mut stack = vec![Frame::open(registry, root)?];
        visiting.insert(root);

        while let Some(top) = stack.last_mut() {
            if top.next < top.deps.len() {
                let dep = top.deps[top.next];
                top.next += 1;
                if done.contains(dep) {
                    continue;
                }
                if visiting.contains(dep) {
                    let start = stack.iter().position(|f| f.id == dep).unwrap_or(0);
                    let mut members: Vec<String> =
                        stack[start..].iter().map(|f| f.id.to_string()).collect();
                    members.push(dep.to_string());
                    return Err(EngineError::CyclicDependency { members });
                }
                let frame = Frame::open(registry, dep)?;
                visiting.insert(dep);
                stack.push(frame);
            } else {
                let id = top.id;
                stack.pop();
                visiting.remove(id);
                done.insert(id);
                order.push(id.to_string());
            }
        }
    }

    Ok(order)
}

/// Groups an order into dependency depth levels. Members of one level never
/// depend on each other, so they may be evaluated concurrently.
pub fn levels(registry: &SubsystemRegistry, order: &[String]) -> EngineResult<Vec<Vec<String>>> {
    let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
    let mut out: Vec<Vec<String>> = Vec::new();
    for id in order {
        let spec = registry.get(id)?;
        let mut d = 0;
        for dep in &spec.dependencies {
            let dep_depth = depth
                .get(dep.as_str())
                .ok_or_else(|| EngineError::UnknownSubsystem(dep.clone()))?;
            d = d.max(dep_depth + 1);
        }
        depth.insert(id.as_str(), d);
        if out.len() <= d {
            out.resize_with(d + 1, Vec::new);
        }
        out[d].push(id.clone());
    }
    Ok(out)
}
