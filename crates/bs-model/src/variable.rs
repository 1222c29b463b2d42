//! Unit-tagged time-series variables.

use bs_core::{BsError, BsResult, Real};

/// A named time series with one value per simulated step.
///
/// The buffer is sized by [`Variable::initialise`] at the start of every run
/// and keeps that length until the next run.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    key: String,
    unit: String,
    values: Vec<Real>,
}

impl Variable {
    pub fn new(key: &str, unit: &str) -> Self {
        Self {
            key: key.to_string(),
            unit: unit.to_string(),
            values: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// (Re)allocate the buffer to `n_time_steps` zeros.
    pub fn initialise(&mut self, n_time_steps: usize) {
        self.values.clear();
        self.values.resize(n_time_steps, 0.0);
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, time_index: usize) -> BsResult<Real> {
        self.values
            .get(time_index)
            .copied()
            .ok_or(BsError::IndexOob {
                what: "variable values",
                index: time_index,
                len: self.values.len(),
            })
    }

    pub fn set(&mut self, time_index: usize, value: Real) -> BsResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(time_index).ok_or(BsError::IndexOob {
            what: "variable values",
            index: time_index,
            len,
        })?;
        *slot = value;
        Ok(())
    }
}

/// Variables of one component, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    items: Vec<Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any existing one with the same key in place.
    pub fn add(&mut self, variable: Variable) {
        match self.items.iter_mut().find(|v| v.key == variable.key) {
            Some(existing) => *existing = variable,
            None => self.items.push(variable),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Variable> {
        let index = self.items.iter().position(|v| v.key == key)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.items.iter().find(|v| v.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Variable> {
        self.items.iter_mut().find(|v| v.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Variable::key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialise_resets_length_and_values() {
        let mut v = Variable::new("T_s0", "°C");
        v.initialise(3);
        v.set(2, 21.5).unwrap();
        assert_eq!(v.values(), &[0.0, 0.0, 21.5]);

        v.initialise(2);
        assert_eq!(v.values(), &[0.0, 0.0]);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut v = Variable::new("q_cd", "W/m²");
        v.initialise(1);
        assert!(matches!(v.value(1), Err(BsError::IndexOob { index: 1, len: 1, .. })));
        assert!(v.set(5, 1.0).is_err());
    }

    #[test]
    fn add_replaces_same_key() {
        let mut set = VariableSet::new();
        set.add(Variable::new("a", "m"));
        set.add(Variable::new("b", "m"));
        set.add(Variable::new("a", "s"));
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.get("a").map(Variable::unit), Some("s"));
        assert!(set.remove("b").is_some());
        assert!(!set.contains("b"));
    }
}
