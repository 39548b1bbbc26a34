/// Built-in record models and their typed Rust counterparts

mod builtin;
mod records;

pub use builtin::{builtin_models, company_model, connection_model};
pub use records::{Company, Connection, Page, Record};
