use std::collections::{BTreeMap, BTreeSet};

/// Follow the rename chain for `name` to its final net name.
///
/// A malformed chain that loops back on itself stops at the first name seen
/// twice.
pub fn normalize_net_name<'a>(name: &'a str, aliases: &BTreeMap<&'a str, &'a str>) -> &'a str {
    let mut visited = BTreeSet::new();
    let mut current = name;
    while let Some(&next) = aliases.get(current) {
        if !visited.insert(current) {
            break;
        }
        current = next;
    }
    current
}
