mod hydrate;
mod result_set;
mod row;

pub use hydrate::{hydrate_batch_response, hydrate_field, hydrate_records, hydrate_response};
pub use result_set::{QueryResult, Records};
pub use row::CustomDbRow;
