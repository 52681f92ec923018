use std::collections::BTreeMap;

/// Named parameter arrays of a model at some optimization step.
///
/// Published to actors as an immutable `Arc` snapshot and replaced
/// wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightSet {
    iteration: usize,
    arrays: BTreeMap<String, Vec<f32>>,
}

impl WeightSet {
    pub fn new(iteration: usize) -> Self {
        Self {
            iteration,
            arrays: BTreeMap::new(),
        }
    }
    pub fn with(mut self, name: &str, array: Vec<f32>) -> Self {
        self.arrays.insert(name.to_string(), array);
        self
    }
    pub fn iteration(&self) -> usize {
        self.iteration
    }
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.arrays.get(name).map(Vec::as_slice)
    }
    /// Total number of scalar parameters.
    pub fn size(&self) -> usize {
        self.arrays.values().map(Vec::len).sum()
    }
}
