//! Policy row document stored in the `casbin_rule` collection.
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};

/// Number of positional value columns a row can carry.
pub const MAX_VALUES: usize = 6;

const VALUE_FIELDS: [&str; MAX_VALUES] = ["v0", "v1", "v2", "v3", "v4", "v5"];

/// One policy (`p*`) or grouping (`g*`) rule.
///
/// Unused trailing values are empty and are not written to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasbinRule {
    pub ptype: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v0: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v2: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v3: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v4: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub v5: String,
}

impl CasbinRule {
    /// Build a row from a model rule. Returns `None` for empty rules or rules
    /// with more than [`MAX_VALUES`] values.
    pub fn from_line(ptype: &str, values: &[String]) -> Option<Self> {
        if values.is_empty() || values.len() > MAX_VALUES {
            return None;
        }
        let mut rule = CasbinRule {
            ptype: ptype.to_string(),
            ..Default::default()
        };
        for (slot, value) in rule.slots_mut().into_iter().zip(values) {
            *slot = value.clone();
        }
        Some(rule)
    }

    /// Model section this row belongs to (`p` or `g`).
    pub fn section(&self) -> Option<&str> {
        match self.ptype.get(..1) {
            Some(sec @ ("p" | "g")) => Some(sec),
            _ => None,
        }
    }

    /// Rule values with trailing empty columns dropped.
    pub fn values(&self) -> Vec<String> {
        let mut values: Vec<String> = self.slots().iter().map(|v| v.to_string()).collect();
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }
        values
    }

    /// Whether the row passes a load filter. Empty filter entries match anything.
    pub fn matches_filter(&self, filter: &[&str]) -> bool {
        self.slots()
            .iter()
            .zip(filter)
            .all(|(value, wanted)| wanted.is_empty() || value == wanted)
    }

    /// Filter selecting rows equal to `ptype` + `values`.
    pub fn exact_filter(ptype: &str, values: &[String]) -> Document {
        let mut filter = doc! { "ptype": ptype };
        for (field, value) in VALUE_FIELDS.iter().zip(values) {
            filter.insert(*field, value.as_str());
        }
        filter
    }

    /// Filter selecting rows whose values starting at `field_index` match
    /// `field_values`; empty values are wildcards.
    ///
    /// Returns `None` when the values run past the last column, since such a
    /// filter cannot be expressed without dropping constraints.
    pub fn field_filter(
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Option<Document> {
        let fields = VALUE_FIELDS.get(field_index..field_index.checked_add(field_values.len())?)?;
        let mut filter = doc! { "ptype": ptype };
        for (field, value) in fields.iter().zip(field_values) {
            if !value.is_empty() {
                filter.insert(*field, value.as_str());
            }
        }
        Some(filter)
    }

    fn slots(&self) -> [&str; MAX_VALUES] {
        [&self.v0, &self.v1, &self.v2, &self.v3, &self.v4, &self.v5]
    }

    fn slots_mut(&mut self) -> [&mut String; MAX_VALUES] {
        [
            &mut self.v0,
            &mut self.v1,
            &mut self.v2,
            &mut self.v3,
            &mut self.v4,
            &mut self.v5,
        ]
    }
}
