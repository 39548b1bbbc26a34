/// Rendering of operation documents and generated modules
///
/// Documents use two-space indentation. Variable definitions and field
/// arguments stay on one line when it fits in 80 columns (measured as
/// embedded in a JS template, i.e. with two extra leading spaces), otherwise
/// they are broken one per line.

use crate::catalog::operation::{Catalog, Operation, OperationKind, Selection};
use crate::config::OutputFormat;
use crate::error::{ContactGraphError, Result};

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const PRINT_WIDTH: usize = 80;

/// Indentation of documents embedded in generated JS modules
const TEMPLATE_INDENT: usize = 2;

const GENERATED_BANNER: &str = "this is an auto generated file. This will be overwritten";

/// Render the GraphQL document of an operation
pub fn render_document(operation: &Operation, typename: bool) -> String {
    let mut out = String::new();
    let head = format!("{} {}", operation.kind().keyword(), operation.operation_name());
    let definitions: Vec<String> = operation.variables.iter().map(|v| v.to_string()).collect();

    push_call(&mut out, 0, &head, &definitions);

    let arguments: Vec<String> = operation
        .variables
        .iter()
        .map(|v| format!("{}: ${}", v.name, v.name))
        .collect();
    push_call(&mut out, 1, &operation.name, &arguments);

    match &operation.selection {
        Selection::Record { fields } => push_fields(&mut out, 2, fields, typename),
        Selection::Page { items } => {
            push_line(&mut out, 2, "items {");
            push_fields(&mut out, 3, items, typename);
            push_line(&mut out, 2, "}");
            push_line(&mut out, 2, "nextToken");
            if typename {
                push_line(&mut out, 2, "__typename");
            }
        }
    }

    push_line(&mut out, 1, "}");
    push_line(&mut out, 0, "}");
    out
}

/// `name(a, b) {` or, when too wide, `name(` / one item per line / `) {`
fn push_call(out: &mut String, depth: usize, name: &str, items: &[String]) {
    if items.is_empty() {
        push_line(out, depth, &format!("{} {{", name));
        return;
    }

    let inline = format!("{}({}) {{", name, items.join(", "));
    if fits(depth, &inline) {
        push_line(out, depth, &inline);
    } else {
        push_line(out, depth, &format!("{}(", name));
        for item in items {
            push_line(out, depth + 1, item);
        }
        push_line(out, depth, ") {");
    }
}

fn push_fields(out: &mut String, depth: usize, fields: &[String], typename: bool) {
    for field in fields {
        push_line(out, depth, field);
    }
    if typename {
        push_line(out, depth, "__typename");
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "{:width$}{}", "", text, width = depth * 2);
}

fn fits(depth: usize, line: &str) -> bool {
    TEMPLATE_INDENT + depth * 2 + line.len() <= PRINT_WIDTH
}

fn indent(document: &str, width: usize) -> String {
    document
        .lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{:width$}{}\n", "", line, width = width)
            }
        })
        .collect()
}

/// JS module exporting every operation as a template string
pub fn render_js_module<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> String {
    let mut out = format!("/* eslint-disable */\n// {}\n\n", GENERATED_BANNER);
    for operation in operations {
        let _ = write!(
            out,
            "export const {} = /* GraphQL */ `\n{}`;\n",
            operation.name,
            indent(&operation.document, TEMPLATE_INDENT)
        );
    }
    out
}

/// Plain `.graphql` file holding every operation document
pub fn render_graphql_module<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> String {
    let documents: Vec<&str> = operations.into_iter().map(|op| op.document.as_str()).collect();
    format!("# {}\n\n{}", GENERATED_BANNER, documents.join("\n"))
}

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub contents: String,
}

/// One file per operation kind that has operations
pub fn render_files(catalog: &Catalog, format: OutputFormat) -> Vec<GeneratedFile> {
    OperationKind::ALL
        .iter()
        .filter(|kind| catalog.by_kind(**kind).next().is_some())
        .map(|kind| {
            let operations = catalog.by_kind(*kind);
            let contents = match format {
                OutputFormat::Js => render_js_module(operations),
                OutputFormat::Graphql => render_graphql_module(operations),
            };
            GeneratedFile {
                file_name: format!("{}.{}", kind.file_stem(), format),
                contents,
            }
        })
        .collect()
}

/// Write the generated files into `out_dir`, creating it if needed
pub fn write_files(catalog: &Catalog, format: OutputFormat, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if catalog.is_empty() {
        return Err(ContactGraphError::Codegen(
            "Refusing to write an empty catalog".to_string(),
        ));
    }

    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for file in render_files(catalog, format) {
        let path = out_dir.join(&file.file_name);
        fs::write(&path, &file.contents).map_err(|e| {
            ContactGraphError::Codegen(format!("Failed to write '{}': {}", path.display(), e))
        })?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
