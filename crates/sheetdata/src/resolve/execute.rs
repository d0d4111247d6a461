//! Row materialization.

use std::collections::HashMap;

use log::trace;

use sheetdata_core::{
    grid::GridView,
    value::{Key, Value},
};
use sheetdata_parser::error::{Diagnostic, ErrorCode};

use super::{
    catalog::{RecordShape, TypeCatalog},
    convert::convert_text,
    plan::{ColumnPlan, Step, container},
};

/// Build one value per data row and check primary key uniqueness.
///
/// `key_fields` are the emitted names of the entity's primary key fields.
///
/// # Errors
///
/// - `E303` for a blank cell whose path neither crosses a list nor ends in
///   a nullable value
/// - `E302` for text that does not convert to the path's leaf type
/// - `E304` for a row repeating an earlier row's key
pub fn materialize(
    grid: GridView<'_>,
    rows: &[usize],
    plans: &[ColumnPlan],
    entity: &RecordShape,
    key_fields: &[String],
    catalog: &TypeCatalog<'_>,
) -> Result<Vec<Value>, Diagnostic> {
    let mut values = Vec::with_capacity(rows.len());
    let mut seen: HashMap<Key, usize> = HashMap::new();

    for &row in rows {
        let mut value = catalog.zero_shape(entity);

        for plan in plans {
            let cell_ref = grid.cell_ref(row, plan.col);
            let Some(text) = grid.cell(row, plan.col) else {
                if plan.allows_blank() {
                    continue;
                }
                return Err(Diagnostic::error(format!("`{}` requires a value", plan.path))
                    .with_code(ErrorCode::E303)
                    .with_label(cell_ref, "blank cell")
                    .with_help("only list elements and nullable fields may be left blank"));
            };

            let converted = convert_text(catalog, plan.leaf(), text).map_err(|err| {
                Diagnostic::error(err.to_string())
                    .with_code(ErrorCode::E302)
                    .with_label(cell_ref, format!("expected `{}`", err.expected))
            })?;
            assign(&mut value, &plan.steps, converted, catalog).map_err(|expected| {
                let message = format!("`{}` does not reach {expected} in this row", plan.path);
                Diagnostic::error(message)
                    .with_code(ErrorCode::E301)
                    .with_label(cell_ref, "value not assigned")
            })?;
        }

        let key = Key(key_fields
            .iter()
            .map(|name| value.get(name).cloned().unwrap_or(Value::Null))
            .collect());
        if let Some(&first) = seen.get(&key) {
            return Err(Diagnostic::error(format!("duplicate key `{key}`"))
                .with_code(ErrorCode::E304)
                .with_label(grid.cell_ref(row, 0), "duplicate key")
                .with_secondary_label(grid.cell_ref(first, 0), "first used here")
                .with_help("every data row needs a distinct primary key"));
        }
        trace!(row = grid.absolute_row(row) + 1, key = key.to_string(); "Row materialized");
        seen.insert(key, row);
        values.push(value);
    }

    Ok(values)
}

/// Write `value` at the end of `steps`, creating records and growing lists
/// on the way.
///
/// Fails with the kind of container a step expected when the row holds
/// something else at that point.
fn assign(
    target: &mut Value,
    steps: &[Step],
    value: Value,
    catalog: &TypeCatalog<'_>,
) -> Result<(), &'static str> {
    let Some((step, rest)) = steps.split_first() else {
        *target = value;
        return Ok(());
    };

    let slot = match step {
        Step::Field { name, .. } => target
            .as_record_mut()
            .ok_or("a record")?
            .entry(name.clone())
            .or_insert(Value::Null),
        Step::Index { index, ty } => {
            let items = target.as_list_mut().ok_or("a list")?;
            while items.len() <= *index {
                items.push(catalog.list_filler(ty));
            }
            &mut items[*index]
        }
    };

    if !rest.is_empty() && slot.is_null() {
        *slot = catalog.zero(container(step.ty()));
    }
    assign(slot, rest, value, catalog)
}
