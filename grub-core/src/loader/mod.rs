//! USDA SR source loader.
//!
//! Reads `FOOD_DES.txt` and, when present, `WEIGHT.txt`, `NUTR_DEF.txt` and
//! `NUT_DATA.txt` from one directory. Any malformed row aborts the load; a
//! partially read dataset is never returned.

pub mod usda;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use grub_types::{BuildError, FoodRecord, NutrientDef, NutrientValue, Weight};
use thiserror::Error;
use tracing::{info, warn};

use crate::index::{FoodIndex, IndexBuilder};
use usda::Schema;

/// Errors raised while reading source files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("reading {}: {}", path.display(), source)]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A field could not be parsed.
    #[error("{file}:{line}:{column}: {reason}")]
    Malformed {
        /// Source file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// One-based field number.
        column: usize,
        /// What was wrong with the field.
        reason: String,
    },
    /// A row had the wrong number of fields.
    #[error("{file}:{line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// Source file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// Fields the schema requires.
        expected: usize,
        /// Fields present in the row.
        found: usize,
    },
}

/// Everything read from one SR release.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    /// Rows of `FOOD_DES`.
    pub foods: Vec<FoodRecord>,
    /// Rows of `WEIGHT`.
    pub weights: Vec<Weight>,
    /// Rows of `NUTR_DEF`.
    pub nutrient_defs: Vec<NutrientDef>,
    /// Rows of `NUT_DATA`.
    pub nutrient_values: Vec<NutrientValue>,
}

impl Dataset {
    /// Loads every known source file under `dir`.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if `FOOD_DES.txt` is missing or any file cannot be
    /// read, and [`LoadError::Malformed`] or [`LoadError::FieldCount`] for the
    /// first bad row.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let mut dataset = Self::default();

        let data = read_required(dir, &usda::FOOD_DES)?;
        dataset.foods = parse_all(&usda::FOOD_DES, &data, usda::parse_food)?;

        if let Some(data) = read_optional(dir, &usda::WEIGHT)? {
            dataset.weights = parse_all(&usda::WEIGHT, &data, usda::parse_weight)?;
        }
        if let Some(data) = read_optional(dir, &usda::NUTR_DEF)? {
            dataset.nutrient_defs = parse_all(&usda::NUTR_DEF, &data, usda::parse_nutrient_def)?;
        }
        if let Some(data) = read_optional(dir, &usda::NUT_DATA)? {
            dataset.nutrient_values =
                parse_all(&usda::NUT_DATA, &data, usda::parse_nutrient_value)?;
        }

        Ok(dataset)
    }

    /// Builds a searchable index from the loaded rows.
    ///
    /// # Errors
    ///
    /// See [`IndexBuilder::build`].
    pub fn into_index(self) -> Result<FoodIndex, BuildError> {
        IndexBuilder::new()
            .records(self.foods)
            .weights(self.weights)
            .nutrients(self.nutrient_defs, self.nutrient_values)
            .build()
    }
}

fn read_required(dir: &Path, schema: &Schema) -> Result<Vec<u8>, LoadError> {
    let path = dir.join(schema.file);
    fs::read(&path).map_err(|source| LoadError::Io { path, source })
}

fn read_optional(dir: &Path, schema: &Schema) -> Result<Option<Vec<u8>>, LoadError> {
    let path = dir.join(schema.file);
    match fs::read(&path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "optional source file missing, skipping");
            Ok(None)
        }
        Err(source) => Err(LoadError::Io { path, source }),
    }
}

fn parse_all<T, F>(schema: &Schema, data: &[u8], parse: F) -> Result<Vec<T>, LoadError>
where
    F: Fn(usda::Row<'_>) -> Result<T, LoadError>,
{
    let mut out = Vec::new();
    usda::for_each_row(schema, data, |row| {
        out.push(parse(row)?);
        Ok(())
    })?;
    info!(file = schema.file, rows = out.len(), "source file loaded");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOODS: &str = "\
~01001~^~0100~^~Butter, salted~^~BUTTER,WITH SALT~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87
~01009~^~0100~^~Cheese, cheddar~^~CHEESE,CHEDDAR~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87
~01017~^~0100~^~Cheese, cream~^~CHEESE,CREAM~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87
";

    const WEIGHTS: &str = "\
~01009~^~1~^1^~cup, diced~^132^^
~01009~^~2~^1^~oz~^28.35^^
";

    const DEFS: &str = "\
~203~^~g~^~PROCNT~^~Protein~^~2~^~600~
~204~^~g~^~FAT~^~Total lipid (fat)~^~2~^~800~
";

    const VALUES: &str = "\
~01009~^~204~^33.31^16^0.211^~1~^~~^~~^~~^^^^^^^~~^~11/1976~^
~01009~^~203~^24.90^14^0.167^~1~^~~^~~^~~^^^^^^^~~^~11/1976~^
";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn loads_full_release() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "FOOD_DES.txt", FOODS);
        write(dir.path(), "WEIGHT.txt", WEIGHTS);
        write(dir.path(), "NUTR_DEF.txt", DEFS);
        write(dir.path(), "NUT_DATA.txt", VALUES);

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        assert_eq!(dataset.foods.len(), 3);
        assert_eq!(dataset.weights.len(), 2);
        assert_eq!(dataset.nutrient_defs.len(), 2);
        assert_eq!(dataset.nutrient_values.len(), 2);

        let index = dataset.into_index().unwrap();
        let hits = index.search("cheese").unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.food.id.as_str()).collect();
        assert_eq!(ids, ["01009", "01017"]);

        let nutrients = index.catalog().nutrients("01009").unwrap();
        let names: Vec<_> = nutrients.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Protein", "Total lipid (fat)"]);
        assert_eq!(index.catalog().weights("01009")[1].description, "oz");
    }

    #[test]
    fn optional_files_may_be_missing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "FOOD_DES.txt", FOODS);

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        assert_eq!(dataset.foods.len(), 3);
        assert!(dataset.weights.is_empty());
        assert!(dataset.nutrient_values.is_empty());
    }

    #[test]
    fn missing_food_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Io { ref path, .. } if path.ends_with("FOOD_DES.txt")));
    }

    #[test]
    fn malformed_row_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "FOOD_DES.txt", FOODS);
        write(dir.path(), "WEIGHT.txt", "~01009~^~1~^one^~cup~^132^^\n");

        let err = Dataset::load_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Malformed { file: "WEIGHT.txt", line: 1, column: 3, .. }
        ));
        assert_eq!(err.to_string().split(':').take(3).collect::<Vec<_>>(), ["WEIGHT.txt", "1", "3"]);
    }

    #[test]
    fn duplicate_food_ids_fail_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let doubled = format!("{FOODS}{}", FOODS.lines().next().unwrap());
        write(dir.path(), "FOOD_DES.txt", &doubled);

        let dataset = Dataset::load_dir(dir.path()).unwrap();
        assert_eq!(
            dataset.into_index().unwrap_err(),
            BuildError::DuplicateId { id: "01001".into() }
        );
    }
}
