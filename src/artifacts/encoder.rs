use serde::{Deserialize, Serialize};

/// One categorical field and the categories seen for it at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedField {
    pub name: String,
    pub categories: Vec<String>,
}

/// Pre-fitted one-hot encoder.
///
/// Produces one column per (field, category) named `{field}_{category}`.
/// A value never seen during training encodes as all zeros for its field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    fields: Vec<EncodedField>,
}

impl OneHotEncoder {
    pub fn new(fields: Vec<EncodedField>) -> Self {
        OneHotEncoder { fields }
    }

    pub fn fields(&self) -> &[EncodedField] {
        &self.fields
    }

    /// Total number of output columns
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.categories.len()).sum()
    }

    /// Encode `(field, value)` pairs into named one-hot columns.
    ///
    /// Columns are emitted in the encoder's field order. Fields the encoder
    /// knows but `values` omits encode as zeros, as do unseen values.
    pub fn encode(&self, values: &[(&str, &str)]) -> Vec<(String, f64)> {
        let mut columns = Vec::with_capacity(self.width());
        for field in &self.fields {
            let value = values
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, value)| *value);
            for category in &field.categories {
                let hot = value.map_or(false, |v| v == category);
                columns.push((
                    format!("{}_{}", field.name, category),
                    if hot { 1.0 } else { 0.0 },
                ));
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> OneHotEncoder {
        OneHotEncoder::new(vec![
            EncodedField {
                name: "gender".to_string(),
                categories: vec!["F".to_string(), "M".to_string()],
            },
            EncodedField {
                name: "stage".to_string(),
                categories: vec!["Stage 1".to_string(), "Stage 2".to_string()],
            },
        ])
    }

    #[test]
    fn known_category_is_hot() {
        let columns = encoder().encode(&[("gender", "M"), ("stage", "Stage 2")]);
        assert_eq!(
            columns,
            vec![
                ("gender_F".to_string(), 0.0),
                ("gender_M".to_string(), 1.0),
                ("stage_Stage 1".to_string(), 0.0),
                ("stage_Stage 2".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn unseen_category_is_all_zero() {
        let columns = encoder().encode(&[("gender", "unknown"), ("stage", "Stage 1")]);
        assert_eq!(columns[0].1 + columns[1].1, 0.0);
        assert_eq!(columns[2].1, 1.0);
    }

    #[test]
    fn missing_field_is_all_zero() {
        let columns = encoder().encode(&[("gender", "F")]);
        assert_eq!(columns.iter().map(|(_, v)| v).sum::<f64>(), 1.0);
        assert_eq!(encoder().width(), 4);
    }
}
