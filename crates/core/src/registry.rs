//! Ordered list of calibrations offered to the user

use crate::calibration::CalibrationSource;

/// Non-empty, ordered calibration list; the index is the selection key
#[derive(Debug)]
pub struct CalibrationRegistry {
    sources: Vec<CalibrationSource>,
}

impl CalibrationRegistry {
    /// `None` when `sources` is empty
    pub fn new(sources: Vec<CalibrationSource>) -> Option<Self> {
        if sources.is_empty() {
            return None;
        }
        Some(Self { sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CalibrationSource> {
        self.sources.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalibrationSource> {
        self.sources.iter()
    }

    /// Menu labels in registry order
    pub fn labels(&self) -> Vec<String> {
        self.sources.iter().map(CalibrationSource::label).collect()
    }

    /// Index of the row whose label is exactly `label`
    pub fn position_of_label(&self, label: &str) -> Option<usize> {
        self.sources.iter().position(|source| source.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::tests::StubProvider;

    fn objectives() -> CalibrationRegistry {
        CalibrationRegistry::new(vec![
            CalibrationSource::fixed("FluoroScope 5x", 0.9058, "um", 1.0),
            CalibrationSource::fixed("FluoroScope 20x", 1.81, "um", 1.0),
            CalibrationSource::provider(StubProvider { value: Some(1.0) }),
        ])
        .unwrap()
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(CalibrationRegistry::new(Vec::new()).is_none());
    }

    #[test]
    fn labels_keep_registry_order() {
        assert_eq!(
            objectives().labels(),
            vec![
                "FluoroScope 5x      (0.9058 pixels/um)".to_owned(),
                "FluoroScope 20x      (1.81 pixels/um)".to_owned(),
                "Stub provider".to_owned(),
            ]
        );
    }

    #[test]
    fn finds_rows_by_label() {
        let registry = objectives();
        assert_eq!(registry.position_of_label("FluoroScope 20x      (1.81 pixels/um)"), Some(1));
        assert_eq!(registry.position_of_label("Stub provider"), Some(2));
        assert_eq!(registry.position_of_label("FluoroScope 20x"), None);
    }
}
