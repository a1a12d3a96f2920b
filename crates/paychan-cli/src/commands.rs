//! Subcommand implementations

use crate::config::Config;
use anyhow::{Context, Result, bail};
use paychan_ir::Value;
use paychan_pipeline::{BatchApplier, Error as BatchError};
use paychan_schema::{ApiDocument, FieldDefinition, load_value};
use paychan_transform::{TransformEngine, TransformRule};
use paychan_validation::{MappingDefinition, MappingValidator};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

pub fn transform(config: &Config, value: &str, rule: &str) -> Result<ExitCode> {
    let value = parse_value_arg(value);
    let rule = read_rule(rule)?;

    let engine = TransformEngine::with_config(config.apply.transform.clone());
    let report = engine.test(&value, &rule);
    print_json(&report)?;

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn fields(document: &Path) -> Result<ExitCode> {
    let document = load_document(document)?;
    print_json(&document.fields())?;
    Ok(ExitCode::SUCCESS)
}

pub fn endpoints(document: &Path) -> Result<ExitCode> {
    let document = load_document(document)?;
    print_json(&document.endpoints())?;
    Ok(ExitCode::SUCCESS)
}

pub fn validate(mappings: &Path, doc: Option<&Path>, fields: Option<&Path>) -> Result<ExitCode> {
    let definitions = read_list(mappings)?
        .iter()
        .enumerate()
        .map(|(index, record)| {
            MappingDefinition::from_value(record)
                .with_context(|| format!("Mapping #{index} in {}", mappings.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let channel_fields = match (doc, fields) {
        (Some(doc), _) => load_document(doc)?.fields(),
        (None, Some(fields)) => read_fields(fields)?,
        (None, None) => bail!("Either --doc or --fields is required"),
    };
    debug!(
        "Validating {} mappings against {} fields",
        definitions.len(),
        channel_fields.len()
    );

    let report = MappingValidator::new().validate_mappings(&definitions, &channel_fields);
    print_json(&report)?;

    if report.valid {
        info!("All {} mappings are valid", definitions.len());
        Ok(ExitCode::SUCCESS)
    } else {
        info!(
            "{} of {} mappings are invalid",
            report.errors.len(),
            definitions.len()
        );
        Ok(ExitCode::FAILURE)
    }
}

pub fn apply(
    config: &Config,
    payload: &Path,
    mappings: &Path,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let payload_value = load_value(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let payload_object = match payload_value {
        Value::Object(object) => object,
        other => bail!(
            "Payload {} must be an object, found {}",
            payload.display(),
            other.type_name()
        ),
    };
    let records = read_list(mappings)?;

    let applier = BatchApplier::with_config(config.apply.clone());
    match applier.apply_records(&payload_object, &records) {
        Ok(fields) => {
            let rendered = serde_json::to_string_pretty(&Value::Object(fields))?;
            match output {
                Some(path) => {
                    fs::write(path, rendered + "\n")
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(BatchError::Aggregate { errors }) => {
            for error in &errors {
                eprintln!("{error}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// JSON when it parses, otherwise the raw text as a string
fn parse_value_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn read_rule(raw: &str) -> Result<TransformRule> {
    if let Some(path) = raw.strip_prefix('@') {
        let path = Path::new(path);
        let value = load_value(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        return TransformRule::from_value(&value)
            .with_context(|| format!("Invalid rule in {}", path.display()))?
            .with_context(|| format!("Rule file {} holds no rule", path.display()));
    }
    raw.parse().context("Invalid rule")
}

fn load_document(path: &Path) -> Result<ApiDocument> {
    ApiDocument::load_from_file(path)
        .with_context(|| format!("Failed to load API document {}", path.display()))
}

fn read_list(path: &Path) -> Result<Vec<Value>> {
    match load_value(path).with_context(|| format!("Failed to read {}", path.display()))? {
        Value::Array(items) => Ok(items),
        other => bail!(
            "{} must hold a list, found {}",
            path.display(),
            other.type_name()
        ),
    }
}

fn read_fields(path: &Path) -> Result<Vec<FieldDefinition>> {
    read_list(path)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(serde_json::Value::from(record))
                .with_context(|| format!("Field #{index} in {}", path.display()))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
