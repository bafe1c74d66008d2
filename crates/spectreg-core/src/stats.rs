use std::collections::HashMap;

/// Collects named scalar diagnostics published by the registration pipeline.
#[derive(Debug, Clone, Default)]
pub struct StatisticsManager {
    samples: HashMap<String, Vec<f64>>,
}

impl StatisticsManager {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample under `key`.
    pub fn add_sample(&mut self, key: &str, value: f64) {
        self.samples.entry(key.to_string()).or_default().push(value);
    }

    /// All samples recorded under `key`, if any.
    pub fn samples(&self, key: &str) -> Option<&[f64]> {
        self.samples.get(key).map(Vec::as_slice)
    }

    /// Arithmetic mean of the samples under `key`, if any.
    pub fn mean(&self, key: &str) -> Option<f64> {
        self.samples.get(key).and_then(|values| {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        })
    }

    /// Iterate over the recorded keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_samples_accumulate_per_key() {
        let mut manager = StatisticsManager::new();
        manager.add_sample("confidence", 1.0);
        manager.add_sample("confidence", 3.0);
        manager.add_sample("duration", 0.5);

        assert_eq!(manager.samples("confidence"), Some(&[1.0, 3.0][..]));
        assert_relative_eq!(manager.mean("confidence").unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(manager.samples("missing"), None);
        assert_eq!(manager.keys().count(), 2);
    }
}
