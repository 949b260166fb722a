/// Per-node payload storage for an `Octree`.
///
/// The tree only knows where things are; providers keep what is there in
/// one of these, keyed by `NodeDataReference`.

use super::NodeDataReference;

#[derive(Debug, Clone)]
pub struct OctreeContents<T> {
    entries: Vec<Vec<T>>,
}

impl<T> OctreeContents<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Make sure `num_nodes` references can be addressed.
    pub fn ensure_capacity(&mut self, num_nodes: usize) {
        if self.entries.len() < num_nodes {
            self.entries.resize_with(num_nodes, Vec::new);
        }
    }

    pub fn push(&mut self, node: NodeDataReference, value: T) {
        self.ensure_capacity(node as usize + 1);
        self.entries[node as usize].push(value);
    }

    /// Contents of `node`, empty for unknown references.
    pub fn contents(&self, node: NodeDataReference) -> &[T] {
        self.entries.get(node as usize).map_or(&[], Vec::as_slice)
    }

    /// Empty every node, keeping allocations for the next rebuild.
    pub fn clear_all(&mut self) {
        for entry in &mut self.entries {
            entry.clear();
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.entries.len()
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }
}

impl<T: PartialEq> OctreeContents<T> {
    /// Swap-remove `value` from `node`. Returns false if it was not there.
    pub fn remove(&mut self, node: NodeDataReference, value: &T) -> bool {
        let Some(entry) = self.entries.get_mut(node as usize) else {
            return false;
        };
        match entry.iter().position(|item| item == value) {
            Some(index) => {
                entry.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for OctreeContents<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_grows_on_demand() {
        let mut contents = OctreeContents::new();
        contents.push(5, 'a');
        assert_eq!(contents.num_nodes(), 6);
        assert_eq!(contents.contents(5), &['a']);
        assert!(contents.contents(2).is_empty());
        assert!(contents.contents(99).is_empty());
    }

    #[test]
    fn test_remove_swaps_last() {
        let mut contents = OctreeContents::new();
        for value in [1, 2, 3] {
            contents.push(0, value);
        }
        assert!(contents.remove(0, &1));
        assert_eq!(contents.contents(0), &[3, 2]);
        assert!(!contents.remove(0, &1));
        assert!(!contents.remove(7, &1));
    }

    #[test]
    fn test_clear_all_keeps_nodes() {
        let mut contents = OctreeContents::new();
        contents.push(3, 1u32);
        contents.push(1, 2u32);
        assert_eq!(contents.len(), 2);
        contents.clear_all();
        assert!(contents.is_empty());
        assert_eq!(contents.num_nodes(), 4);
    }
}
