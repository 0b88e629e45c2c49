//! Custom properties for unrecognized columns.
//!
//! Every unrecognized header becomes a property definition before any row
//! is committed. Its type is read off the first non-empty cell of the
//! column.

use chrono::NaiveDate;
use sheetproj_core::{
    CustomPropertyManager, CustomValue, CustomValues, PropertyId, PropertyType, TypedValue,
};

use crate::source::Row;
use crate::warning::{WarningCode, Warnings};

/// A custom column bound to its definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomColumn {
    pub column: usize,
    pub name: String,
    pub property: PropertyId,
    pub property_type: PropertyType,
}

/// Declare (or reuse) one definition per custom column.
///
/// `rows` are the data rows of the table, used for type inference.
pub fn register_columns<'h>(
    columns: impl IntoIterator<Item = (usize, &'h str)>,
    rows: &[Row],
    manager: &mut CustomPropertyManager,
    date_format: &str,
) -> Vec<CustomColumn> {
    columns
        .into_iter()
        .map(|(column, name)| {
            let inferred = rows
                .iter()
                .find_map(|row| row.value(column))
                .map_or(PropertyType::Text, |cell| infer_type(cell, date_format));
            let (definition, created) = manager.get_or_create(name, inferred);
            if created {
                tracing::debug!(property = name, property_type = %definition.property_type, "declared custom property");
            }
            CustomColumn {
                column,
                name: name.to_string(),
                property: definition.id,
                property_type: definition.property_type,
            }
        })
        .collect()
}

/// Narrowest type that accepts `cell`
pub fn infer_type(cell: &str, date_format: &str) -> PropertyType {
    [
        PropertyType::Boolean,
        PropertyType::Integer,
        PropertyType::Double,
        PropertyType::Date,
    ]
    .into_iter()
    .find(|&ty| typed_value(cell, ty, date_format).is_some())
    .unwrap_or(PropertyType::Text)
}

/// Read `cell` as a value of `property_type`
pub fn typed_value(cell: &str, property_type: PropertyType, date_format: &str) -> Option<TypedValue> {
    let cell = cell.trim();
    match property_type {
        PropertyType::Text => Some(TypedValue::Text(cell.to_string())),
        PropertyType::Integer => cell.parse().ok().map(TypedValue::Integer),
        PropertyType::Double => cell
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(TypedValue::Double),
        PropertyType::Date => NaiveDate::parse_from_str(cell, date_format)
            .ok()
            .map(TypedValue::Date),
        PropertyType::Boolean => match cell.to_lowercase().as_str() {
            "true" => Some(TypedValue::Boolean(true)),
            "false" => Some(TypedValue::Boolean(false)),
            _ => None,
        },
    }
}

/// Store the custom cells of one record.
///
/// The literal text is always kept; a literal that does not fit the
/// column's type has no typed reading and is reported.
pub fn store_values(
    values: &mut CustomValues,
    columns: &[CustomColumn],
    cells: &[(usize, String)],
    row: usize,
    date_format: &str,
    warnings: &mut Warnings,
) {
    for (index, literal) in cells {
        let Some(column) = columns.iter().find(|c| c.column == *index) else {
            continue;
        };
        let typed = typed_value(literal, column.property_type, date_format);
        if typed.is_none() {
            warnings.at(
                row,
                WarningCode::CustomValueTypeMismatch,
                format!(
                    "'{}' in column '{}' is not a {} value",
                    literal, column.name, column.property_type
                ),
            );
        }
        values.set(column.property, CustomValue::new(literal.clone(), typed));
    }
}
