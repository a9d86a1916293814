pub mod etl;
pub mod flatten;
pub mod metadata;
pub mod pipeline;
pub mod soql;

pub use crate::domain::model::{
    ColumnMeta, DatasetMetadata, FlatTable, QueryOutput, RawDataset, Record, TypeMap,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use flatten::{flatten_results, parse_location, LocationComponents};
pub use metadata::normalize_metadata;
