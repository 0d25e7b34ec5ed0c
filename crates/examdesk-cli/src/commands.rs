//! Subcommand implementations
//!
//! Every command writes its report to `out`; logs go to stderr.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use examdesk_api::{ApiClient, HttpUploader};
use examdesk_forms::{
    default_values, render as render_form, Control, FieldPath, FieldView, FormData, FormError,
    FormRenderer, FormView, LogNotifier, PageEditor, RenderOutcome, SectionView, UploadFile,
    UploadState, UploadStates,
};
use examdesk_schema::SchemaRegistry;
use serde_json::Value as JsonValue;

use crate::cli::{Cli, Command};
use crate::config::CliConfig;

/// Run one parsed command line
///
/// # Errors
/// Returns error if loading inputs, talking to the backend, or writing output fails
pub async fn run(cli: Cli, config: &CliConfig, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let registry = load_registry(cli.schemas.as_deref().or(config.schemas.as_deref()))?;

    match cli.command {
        Command::Types => types(&registry, out)?,
        Command::Render {
            page_type,
            data,
            json,
        } => render(&registry, page_type.as_deref(), data.as_deref(), json, out)?,
        Command::Scaffold {
            page_type,
            sections,
        } => scaffold(&registry, &page_type, &sections, out)?,
        Command::Validate { page_type, data } => {
            if !validate(&registry, page_type.as_deref(), &data, out)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Upload {
            page_type,
            data,
            field,
            file,
        } => {
            let client = ApiClient::new(config.api.clone()).context("building HTTP client")?;
            upload(&registry, &client, page_type.as_deref(), &data, &field, &file, out).await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Built-in page types, or the ones in `schemas`
///
/// # Errors
/// Returns error if the schema document cannot be loaded
pub fn load_registry(schemas: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    match schemas {
        Some(path) => SchemaRegistry::load(path)
            .with_context(|| format!("loading schemas from {}", path.display())),
        None => Ok(SchemaRegistry::builtin().clone()),
    }
}

/// Read a page document
///
/// # Errors
/// Returns error if the file cannot be read or is not JSON
pub fn read_document(path: &Path) -> anyhow::Result<JsonValue> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn document_page_type<'a>(explicit: Option<&'a str>, record: Option<&'a JsonValue>) -> Option<&'a str> {
    explicit.or_else(|| record?.get("page_type")?.as_str())
}

/// `types`: one `key<TAB>label` line per page type
///
/// # Errors
/// Returns error if writing fails
pub fn types(registry: &SchemaRegistry, out: &mut dyn Write) -> anyhow::Result<()> {
    for (key, label) in registry.options() {
        writeln!(out, "{key}\t{label}")?;
    }
    Ok(())
}

/// `render`: outline or JSON view of the form
///
/// # Errors
/// Returns error if the document cannot be read or hydrated, or writing fails
pub fn render(
    registry: &SchemaRegistry,
    page_type: Option<&str>,
    data: Option<&Path>,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let record = data.map(read_document).transpose()?;
    let form = match &record {
        Some(record) => FormData::hydrate(record)?,
        None => FormData::new(),
    };
    let page_type = document_page_type(page_type, record.as_ref());

    let outcome = render_form(registry, page_type, &form, &UploadStates::new());
    if json {
        serde_json::to_writer_pretty(&mut *out, &outcome)?;
        writeln!(out)?;
        return Ok(());
    }

    match outcome {
        RenderOutcome::Form(view) => write_outline(&view, out)?,
        other => writeln!(out, "{}", other.placeholder().unwrap_or_default())?,
    }
    Ok(())
}

fn write_outline(view: &FormView, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "{} ({})", view.label, view.page_type)?;
    for field in &view.fields {
        write_field(field, 1, out)?;
    }

    if view.sections.is_empty() {
        return Ok(());
    }
    writeln!(out, "Sections:")?;
    for section in &view.sections {
        match section {
            SectionView::Absent {
                section_type,
                add_label,
            } => writeln!(out, "  [ ] {section_type}: {add_label}")?,
            SectionView::Present {
                section_type,
                label,
                index,
                order,
                fields,
            } => {
                writeln!(out, "  [{index}] {section_type}: {label} (order {order})")?;
                for field in fields {
                    write_field(field, 3, out)?;
                }
            }
        }
    }
    Ok(())
}

fn write_field(field: &FieldView, depth: usize, out: &mut dyn Write) -> anyhow::Result<()> {
    let indent = "  ".repeat(depth);
    let marker = if field.required { "*" } else { " " };
    let kind = control_name(&field.control);

    match &field.control {
        Control::Repeater { items } => {
            writeln!(out, "{indent}{marker}{} [{kind}] {} item(s)", field.label, items.len())?;
            for item in items {
                writeln!(out, "{indent}  #{}", item.index)?;
                for sub in &item.fields {
                    write_field(sub, depth + 2, out)?;
                }
            }
        }
        Control::FileSelect { busy: true, .. } => {
            writeln!(out, "{indent}{marker}{} [{kind}] uploading...", field.label)?;
        }
        control => {
            let value = control.text().unwrap_or_default();
            writeln!(out, "{indent}{marker}{} [{kind}] {value:?}", field.label)?;
        }
    }
    Ok(())
}

fn control_name(control: &Control) -> &'static str {
    match control {
        Control::TextInput { .. } => "text",
        Control::TextArea { .. } => "textarea",
        Control::RichText { .. } => "editor",
        Control::DatePicker { .. } => "date",
        Control::NumberInput { .. } => "number",
        Control::FileSelect { .. } => "file",
        Control::Repeater { .. } => "array",
    }
}

/// `scaffold`: empty document with the requested sections
///
/// # Errors
/// Returns error if the page type or a section type is unknown, or writing fails
pub fn scaffold(
    registry: &SchemaRegistry,
    page_type: &str,
    sections: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let renderer = FormRenderer::for_page_type(registry, Some(page_type))?;
    let mut form = FormData::new();
    form.fields = default_values(&renderer.schema().fields);
    for section in sections {
        form = renderer
            .add_section(&form, section)
            .with_context(|| format!("adding section `{section}`"))?;
    }

    serde_json::to_writer_pretty(&mut *out, &form.to_payload(Some(page_type)))?;
    writeln!(out)?;
    Ok(())
}

/// `validate`: print every issue; returns whether the document is valid
///
/// # Errors
/// Returns error if the document cannot be read, has no known page type, or writing fails
pub fn validate(
    registry: &SchemaRegistry,
    page_type: Option<&str>,
    data: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let record = read_document(data)?;
    let page_type = document_page_type(page_type, Some(&record))
        .ok_or_else(|| anyhow!("{} has no page_type; pass --page-type", data.display()))?;
    let renderer = FormRenderer::for_page_type(registry, Some(page_type))?;
    let form = FormData::hydrate(&record)?;

    match examdesk_forms::validate(renderer.schema(), &form) {
        Ok(()) => {
            writeln!(out, "{}: ok", data.display())?;
            Ok(true)
        }
        Err(report) => {
            for issue in &report.issues {
                writeln!(out, "{}: {issue}", data.display())?;
            }
            writeln!(out, "{} issue(s)", report.len())?;
            Ok(false)
        }
    }
}

/// `upload`: send a file through the backend and store its name in the document
///
/// The document is only rewritten when the upload succeeds.
///
/// # Errors
/// Returns error if inputs cannot be read, the path is not a file field, the
/// upload fails, or the document cannot be written
pub async fn upload(
    registry: &SchemaRegistry,
    client: &ApiClient,
    page_type: Option<&str>,
    data: &Path,
    field: &str,
    file: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let record = read_document(data)?;
    let path: FieldPath = field.parse()?;
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", file.display()))?;
    let mut upload = UploadFile::new(file_name, bytes);
    if let Some(content_type) = guess_content_type(file) {
        upload = upload.with_content_type(content_type);
    }

    let mut editor = PageEditor::new(
        registry,
        Arc::new(HttpUploader::new(client.clone())),
        Arc::new(LogNotifier),
    );
    editor.open(page_type, &record)?;
    if editor.page_type().is_none() {
        return Err(FormError::NoPageType.into());
    }
    editor.upload(path.clone(), upload).await?;

    match editor.upload_state(&path) {
        UploadState::Succeeded { stored } => {
            let mut document = editor.payload();
            if let (Some(id), Some(object)) = (record.get("id"), document.as_object_mut()) {
                object.insert("id".to_string(), id.clone());
            }
            let text = serde_json::to_string_pretty(&document)?;
            fs::write(data, text + "\n").with_context(|| format!("writing {}", data.display()))?;
            writeln!(out, "{path} = {stored}")?;
            Ok(())
        }
        UploadState::Failed { message } => bail!("upload failed: {message}"),
        state => bail!("upload did not finish: {state:?}"),
    }
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(guess_content_type(Path::new("a/B.JPG")), Some("image/jpeg"));
        assert_eq!(guess_content_type(Path::new("brochure.pdf")), Some("application/pdf"));
        assert_eq!(guess_content_type(Path::new("notes.txt")), None);
        assert_eq!(guess_content_type(Path::new("README")), None);
    }

    #[test]
    fn explicit_page_type_wins() {
        let record = serde_json::json!({ "page_type": "city_page" });
        assert_eq!(document_page_type(Some("course_page"), Some(&record)), Some("course_page"));
        assert_eq!(document_page_type(None, Some(&record)), Some("city_page"));
        assert_eq!(document_page_type(None, None), None);
    }
}
