use serde::{Deserialize, Serialize};

/// A single named attribute of a borehole record, e.g. `("tiefe", "24.5")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoreholeField {
    pub name: String,
    pub value: String,
}

/// Kataster metadata of one borehole as an ordered list of fields (a
/// transposed record), in the column order of the borehole table.
///
/// An empty `BoreholeInfo` means no record exists for the station.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoreholeInfo {
    pub fields: Vec<BoreholeField>,
}

impl BoreholeInfo {
    pub fn new(fields: Vec<BoreholeField>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Value of the first field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
    }
}
