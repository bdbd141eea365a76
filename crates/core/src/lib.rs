#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod prompt;
pub mod rubric;
pub mod safety;
pub mod time;

pub use catalog::{AnswerValidationError, CatalogError, ContentCatalog};
pub use model::Stage;
pub use time::Clock;
