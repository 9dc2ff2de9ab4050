pub mod language_model;

pub use language_model::{CallResult, LanguageModelService};
