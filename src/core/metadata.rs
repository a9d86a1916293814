use crate::domain::model::{ColumnMeta, DatasetMetadata, TypeMap};

/// Normalize raw dataset metadata into a field_name -> data type lookup and
/// an ordered tabular description of the columns.
///
/// Duplicate field names are not validated; the last occurrence wins in the
/// type map while the tabular description keeps every entry in source order.
pub fn normalize_metadata(raw: &DatasetMetadata) -> (TypeMap, Vec<ColumnMeta>) {
    let mut dtypes = TypeMap::new();
    let mut table = Vec::with_capacity(raw.columns.len());

    for column in &raw.columns {
        dtypes.insert(column.field_name.clone(), column.data_type_name.clone());
        table.push(ColumnMeta {
            field_name: column.field_name.clone(),
            column_name: column.name.clone(),
            description: column.description.clone(),
            data_type: column.data_type_name.clone(),
        });
    }

    (dtypes, table)
}
