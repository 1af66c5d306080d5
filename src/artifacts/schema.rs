use serde::{Deserialize, Serialize};

/// Ordered feature names fixed when the models were trained.
///
/// Defines both the length and the column order of every feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        FeatureSchema { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSchema {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        FeatureSchema::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keeps_order() {
        let schema: FeatureSchema = serde_json::from_str(r#"["age", "kps", "chemo"]"#).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.names()[1], "kps");
        assert_eq!(serde_json::to_string(&schema).unwrap(), r#"["age","kps","chemo"]"#);
    }
}
