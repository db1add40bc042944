//! Cycle detection over resource dependency edges.

use std::collections::{BTreeMap, HashMap};

use super::Resource;

/// Find a dependency cycle, returning the path closed on the repeated
/// name (`a -> b -> a`) if one exists.
///
/// The apply recursion pre-visits dependencies and would never terminate
/// on a cyclic graph, so validation runs this before any action.
pub(super) fn find_cycle(resources: &BTreeMap<String, Resource>) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        Visiting,
        Visited,
    }

    let mut state: HashMap<&str, State> = resources
        .keys()
        .map(|name| (name.as_str(), State::Unvisited))
        .collect();

    let mut path: Vec<String> = Vec::new();

    fn dfs<'a>(
        node: &'a str,
        resources: &'a BTreeMap<String, Resource>,
        state: &mut HashMap<&'a str, State>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        state.insert(node, State::Visiting);
        path.push(node.to_string());

        if let Some(resource) = resources.get(node) {
            for dep in &resource.deps {
                match state.get(dep.as_str()) {
                    Some(State::Visiting) => {
                        // dep is on the current path; close the loop on it
                        let start = path.iter().position(|name| name == dep).unwrap();
                        let mut cycle: Vec<String> = path[start..].to_vec();
                        cycle.push(dep.clone());
                        return Some(cycle);
                    }
                    Some(State::Unvisited) | None => {
                        if let Some(cycle) = dfs(dep, resources, state, path) {
                            return Some(cycle);
                        }
                    }
                    Some(State::Visited) => {}
                }
            }
        }

        path.pop();
        state.insert(node, State::Visited);
        None
    }

    for name in resources.keys() {
        if state.get(name.as_str()) == Some(&State::Unvisited) {
            if let Some(cycle) = dfs(name, resources, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }

    None
}
