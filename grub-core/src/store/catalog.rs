//! Weights and nutrient facts keyed for prefix scans.
//!
//! Rows are stored under composite keys, `"<food_id>,<seq>"` for weights and
//! `"<food_id>,<nutrient_id>"` for nutrient values, in ordered maps. Looking up
//! everything for one food is a range scan from `"<food_id>,"` that stops at
//! the first key without that prefix.

use std::collections::BTreeMap;
use std::ops::Bound;

use grub_types::{CatalogError, Nutrient, NutrientDef, NutrientValue, Weight};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Per-food weights and nutrient values.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Catalog {
    weights: BTreeMap<String, Weight>,
    nutrient_defs: FxHashMap<String, NutrientDef>,
    nutrient_values: BTreeMap<String, NutrientValue>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a weight, replacing any row with the same food and sequence.
    pub fn insert_weight(&mut self, weight: Weight) {
        let key = composite_key(&weight.food_id, &weight.seq);
        self.weights.insert(key, weight);
    }

    /// Stores a nutrient definition.
    pub fn insert_nutrient_def(&mut self, def: NutrientDef) {
        self.nutrient_defs.insert(def.id.clone(), def);
    }

    /// Stores a nutrient value, replacing any row for the same food and nutrient.
    pub fn insert_nutrient_value(&mut self, value: NutrientValue) {
        let key = composite_key(&value.food_id, &value.nutrient_id);
        self.nutrient_values.insert(key, value);
    }

    /// Returns the weights recorded for a food in sequence-key order.
    pub fn weights(&self, food_id: &str) -> Vec<&Weight> {
        scan_prefix(&self.weights, food_id).collect()
    }

    /// Returns the nutrients of a food, joined with their definitions and
    /// ordered by the definitions' sort order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingNutrientDef`] if a value names a
    /// definition that was never loaded.
    pub fn nutrients(&self, food_id: &str) -> Result<Vec<Nutrient>, CatalogError> {
        let mut joined = Vec::new();
        for value in scan_prefix(&self.nutrient_values, food_id) {
            let def = self.nutrient_defs.get(&value.nutrient_id).ok_or_else(|| {
                CatalogError::MissingNutrientDef {
                    food_id: value.food_id.clone(),
                    nutrient_id: value.nutrient_id.clone(),
                }
            })?;
            joined.push((def, value));
        }

        joined.sort_by(|(a, _), (b, _)| {
            let a_sort = a.sort.unwrap_or(f64::INFINITY);
            let b_sort = b.sort.unwrap_or(f64::INFINITY);
            a_sort.total_cmp(&b_sort).then_with(|| a.id.cmp(&b.id))
        });

        Ok(joined
            .into_iter()
            .map(|(def, value)| Nutrient {
                name: def.description.clone(),
                value: value.value,
                unit: def.units.clone(),
            })
            .collect())
    }

    /// Number of stored weights.
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    /// Number of stored nutrient definitions.
    pub fn nutrient_def_count(&self) -> usize {
        self.nutrient_defs.len()
    }

    /// Number of stored nutrient values.
    pub fn nutrient_value_count(&self) -> usize {
        self.nutrient_values.len()
    }
}

fn composite_key(food_id: &str, rest: &str) -> String {
    let mut key = String::with_capacity(food_id.len() + 1 + rest.len());
    key.push_str(food_id);
    key.push(',');
    key.push_str(rest);
    key
}

fn scan_prefix<'a, V>(map: &'a BTreeMap<String, V>, food_id: &str) -> impl Iterator<Item = &'a V> {
    let prefix = composite_key(food_id, "");
    map.range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
        .take_while(move |(key, _)| key.starts_with(&prefix))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(food_id: &str, seq: &str, grams: f64) -> Weight {
        Weight {
            food_id: food_id.into(),
            seq: seq.into(),
            amount: Some(1.0),
            description: format!("measure {seq}"),
            grams: Some(grams),
            data_points: None,
            std_dev: None,
        }
    }

    fn def(id: &str, description: &str, units: &str, sort: Option<f64>) -> NutrientDef {
        NutrientDef {
            id: id.into(),
            units: units.into(),
            tag_name: String::new(),
            description: description.into(),
            decimals: "2".into(),
            sort,
        }
    }

    fn value(food_id: &str, nutrient_id: &str, v: f64) -> NutrientValue {
        NutrientValue {
            food_id: food_id.into(),
            nutrient_id: nutrient_id.into(),
            value: Some(v),
            data_points: None,
            std_error: None,
        }
    }

    #[test]
    fn weights_scan_only_matching_food() {
        let mut catalog = Catalog::new();
        catalog.insert_weight(weight("01001", "1", 14.2));
        catalog.insert_weight(weight("01001", "2", 5.0));
        catalog.insert_weight(weight("010010", "1", 99.0));
        catalog.insert_weight(weight("01002", "1", 3.0));

        let found = catalog.weights("01001");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].seq, "1");
        assert_eq!(found[1].seq, "2");

        assert_eq!(catalog.weights("010010").len(), 1);
        assert!(catalog.weights("99999").is_empty());
        assert!(catalog.weights("").is_empty());
    }

    #[test]
    fn nutrients_join_and_sort() {
        let mut catalog = Catalog::new();
        catalog.insert_nutrient_def(def("203", "Protein", "g", Some(600.0)));
        catalog.insert_nutrient_def(def("208", "Energy", "kcal", Some(300.0)));
        catalog.insert_nutrient_def(def("999", "Unsorted", "mg", None));
        catalog.insert_nutrient_value(value("01001", "203", 0.85));
        catalog.insert_nutrient_value(value("01001", "999", 1.0));
        catalog.insert_nutrient_value(value("01001", "208", 717.0));
        catalog.insert_nutrient_value(value("01002", "203", 0.49));

        let nutrients = catalog.nutrients("01001").unwrap();
        let names: Vec<&str> = nutrients.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Energy", "Protein", "Unsorted"]);
        assert_eq!(nutrients[0].unit, "kcal");
        assert_eq!(nutrients[0].value, Some(717.0));
    }

    #[test]
    fn nutrients_missing_definition() {
        let mut catalog = Catalog::new();
        catalog.insert_nutrient_value(value("01001", "203", 0.85));

        assert_eq!(
            catalog.nutrients("01001"),
            Err(CatalogError::MissingNutrientDef {
                food_id: "01001".into(),
                nutrient_id: "203".into(),
            })
        );
        assert_eq!(catalog.nutrients("01002"), Ok(Vec::new()));
    }

    #[test]
    fn reinsert_replaces_row() {
        let mut catalog = Catalog::new();
        catalog.insert_weight(weight("01001", "1", 14.2));
        catalog.insert_weight(weight("01001", "1", 20.0));
        assert_eq!(catalog.weight_count(), 1);
        assert_eq!(catalog.weights("01001")[0].grams, Some(20.0));
    }
}
