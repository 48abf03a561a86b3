//! Row parsing for the SR relational ASCII files.
//!
//! Every line is one row. Fields are separated by `^` and text fields are
//! wrapped in `~`. Files are ISO-8859-1, so each byte maps to the code point
//! of the same value.

use grub_types::{FoodRecord, NutrientDef, NutrientValue, Weight};
use memchr::memchr_iter;

use super::LoadError;

/// Column layout of one source file.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// File name, e.g. `FOOD_DES.txt`.
    pub file: &'static str,
    /// Number of fields a row must carry.
    pub fields: usize,
    /// Whether rows may carry more than `fields` columns.
    pub trailing: bool,
}

/// Food descriptions.
pub const FOOD_DES: Schema = Schema {
    file: "FOOD_DES.txt",
    fields: 14,
    trailing: false,
};

/// Household gram weights.
pub const WEIGHT: Schema = Schema {
    file: "WEIGHT.txt",
    fields: 7,
    trailing: false,
};

/// Nutrient definitions.
pub const NUTR_DEF: Schema = Schema {
    file: "NUTR_DEF.txt",
    fields: 6,
    trailing: false,
};

/// Nutrient values per food. Only the first five columns are kept.
pub const NUT_DATA: Schema = Schema {
    file: "NUT_DATA.txt",
    fields: 5,
    trailing: true,
};

/// One split row with its position for error reporting.
#[derive(Debug)]
pub struct Row<'s> {
    schema: &'s Schema,
    line: usize,
    fields: Vec<String>,
}

impl Row<'_> {
    /// Text column, `~` quotes removed. `col` is zero-based.
    pub fn text(&mut self, col: usize) -> String {
        std::mem::take(&mut self.fields[col])
    }

    /// Optional numeric column: empty is `None`.
    pub fn number(&self, col: usize) -> Result<Option<f64>, LoadError> {
        let raw = self.fields[col].trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|e| self.malformed(col, format!("invalid number {raw:?}: {e}")))
    }

    /// `Y` flag column: `Y` is true, empty is false.
    pub fn flag(&self, col: usize) -> Result<bool, LoadError> {
        match self.fields[col].as_str() {
            "Y" => Ok(true),
            "" => Ok(false),
            other => Err(self.malformed(col, format!("invalid flag {other:?}"))),
        }
    }

    fn malformed(&self, col: usize, reason: String) -> LoadError {
        LoadError::Malformed {
            file: self.schema.file,
            line: self.line,
            column: col + 1,
            reason,
        }
    }
}

/// Splits `data` into rows, checking each against `schema`.
///
/// Blank lines are skipped and `\r\n` line endings are accepted. `visit`
/// receives every row in file order; the first error stops the scan.
pub fn for_each_row<F>(schema: &Schema, data: &[u8], mut visit: F) -> Result<usize, LoadError>
where
    F: FnMut(Row<'_>) -> Result<(), LoadError>,
{
    let mut rows = 0;
    let mut start = 0;
    let ends = memchr_iter(b'\n', data).chain(std::iter::once(data.len()));

    for (idx, end) in ends.enumerate() {
        let mut line = &data[start..end];
        start = end + 1;
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        let count_ok = if schema.trailing {
            fields.len() >= schema.fields
        } else {
            fields.len() == schema.fields
        };
        if !count_ok {
            return Err(LoadError::FieldCount {
                file: schema.file,
                line: idx + 1,
                expected: schema.fields,
                found: fields.len(),
            });
        }

        visit(Row {
            schema,
            line: idx + 1,
            fields,
        })?;
        rows += 1;
    }

    Ok(rows)
}

fn split_fields(line: &[u8]) -> Vec<String> {
    let mut fields = Vec::with_capacity(16);
    let mut start = 0;
    for caret in memchr_iter(b'^', line) {
        fields.push(decode_field(&line[start..caret]));
        start = caret + 1;
    }
    fields.push(decode_field(&line[start..]));
    fields
}

fn decode_field(raw: &[u8]) -> String {
    let mut raw = raw;
    while let [b'~', rest @ ..] = raw {
        raw = rest;
    }
    while let [rest @ .., b'~'] = raw {
        raw = rest;
    }
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Parses a `FOOD_DES` row.
pub fn parse_food(mut row: Row<'_>) -> Result<FoodRecord, LoadError> {
    Ok(FoodRecord {
        survey: row.flag(6)?,
        refuse: row.number(8)?,
        nitrogen_factor: row.number(10)?,
        protein_factor: row.number(11)?,
        fat_factor: row.number(12)?,
        carbohydrate_factor: row.number(13)?,
        id: row.text(0),
        food_group_id: row.text(1),
        long_desc: row.text(2),
        short_desc: row.text(3),
        common_names: row.text(4),
        manufacturer: row.text(5),
        refuse_desc: row.text(7),
        scientific_name: row.text(9),
    })
}

/// Parses a `WEIGHT` row.
pub fn parse_weight(mut row: Row<'_>) -> Result<Weight, LoadError> {
    Ok(Weight {
        amount: row.number(2)?,
        grams: row.number(4)?,
        data_points: row.number(5)?,
        std_dev: row.number(6)?,
        food_id: row.text(0),
        seq: row.text(1),
        description: row.text(3),
    })
}

/// Parses a `NUTR_DEF` row.
pub fn parse_nutrient_def(mut row: Row<'_>) -> Result<NutrientDef, LoadError> {
    Ok(NutrientDef {
        sort: row.number(5)?,
        id: row.text(0),
        units: row.text(1),
        tag_name: row.text(2),
        description: row.text(3),
        decimals: row.text(4),
    })
}

/// Parses the leading columns of a `NUT_DATA` row.
pub fn parse_nutrient_value(mut row: Row<'_>) -> Result<NutrientValue, LoadError> {
    Ok(NutrientValue {
        value: row.number(2)?,
        data_points: row.number(3)?,
        std_error: row.number(4)?,
        food_id: row.text(0),
        nutrient_id: row.text(1),
    })
}
