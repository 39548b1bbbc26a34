/// GraphQL operation catalog
///
/// This module derives the operation templates (queries, mutations and
/// subscriptions) from model definitions, renders them in the layout of the
/// generated client modules and verifies their structure.

mod builder;
pub mod naming;
mod operation;
mod render;
mod verify;

pub use builder::CatalogBuilder;
pub use naming::plural_name;
pub use operation::{Action, Catalog, Operation, OperationKind, Selection, Variable};
pub use render::{
    render_document, render_files, render_graphql_module, render_js_module, write_files,
    GeneratedFile,
};
pub use verify::{verify_catalog, VerificationReport, Violation};
