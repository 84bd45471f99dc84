use std::error::Error;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error as ThisError;

use tnlens_core::ScanConfig;
use tnlens_core::harvest_csv;
use tnlens_core::scan;
use tnlens_session::ScriptedSession;

use crate::capture::Capture;
use crate::presenter::Presenter;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("no field matches {0:?}")]
    FieldNotFound(String),

    #[error("no table found on the captured screen")]
    NoTable,
}

impl CliError {
    pub fn suggestion(&self) -> &'static str {
        match self {
            CliError::FieldNotFound(_) => {
                "Run 'tnlens fields <capture>' without a pattern to list the labels, or use a match mode like CONTAIN_ANY_CASE:"
            }
            CliError::NoTable => {
                "Tables are detected by column-heading attributes; check the attr plane of the capture"
            }
        }
    }
}

pub struct HandlerContext<'a> {
    pub presenter: &'a dyn Presenter,
    pub config: ScanConfig,
}

pub fn handle_scan(ctx: &HandlerContext<'_>, capture: &Path) -> Result<(), Box<dyn Error>> {
    let snapshot = Capture::load(capture)?;
    let model = scan(&snapshot, &ctx.config);
    ctx.presenter.present_model(&model);
    Ok(())
}

pub fn handle_fields(
    ctx: &HandlerContext<'_>,
    capture: &Path,
    pattern: Option<&str>,
    input_only: bool,
    display_only: bool,
) -> Result<(), Box<dyn Error>> {
    let snapshot = Capture::load(capture)?;
    let model = scan(&snapshot, &ctx.config);

    match pattern {
        Some(pattern) => {
            if !display_only {
                if let Some(field) = model.input_field(pattern) {
                    ctx.presenter.present_kv(&field.label, &field.value);
                    return Ok(());
                }
            }
            if !input_only {
                if let Some((label, value)) = model.display_entry(pattern) {
                    ctx.presenter.present_kv(label, value);
                    return Ok(());
                }
            }
            Err(CliError::FieldNotFound(pattern.to_string()).into())
        }
        None => {
            if !input_only {
                ctx.presenter.present_header("Display fields");
                for (key, value) in sorted_keys(&model.display_fields) {
                    ctx.presenter.present_kv(key, value);
                }
            }
            if !display_only {
                ctx.presenter.present_header("Input fields");
                let mut keys: Vec<_> = model.input_fields.keys().collect();
                keys.sort();
                for key in keys {
                    ctx.presenter.present_kv(key, &model.input_fields[key].value);
                }
            }
            Ok(())
        }
    }
}

pub fn handle_table(
    ctx: &HandlerContext<'_>,
    captures: &[PathBuf],
) -> Result<(), Box<dyn Error>> {
    let mut pages = Vec::with_capacity(captures.len());
    for path in captures {
        pages.push(Capture::load(path)?);
    }

    let mut session = ScriptedSession::new(pages);
    let csv = harvest_csv(&mut session, &ctx.config);
    if csv.is_empty() {
        return Err(CliError::NoTable.into());
    }
    ctx.presenter.present_raw(&csv);
    Ok(())
}

fn sorted_keys(map: &std::collections::HashMap<String, String>) -> Vec<(&String, &String)> {
    let mut out: Vec<_> = map.iter().collect();
    out.sort_by(|a, b| a.0.cmp(b.0));
    out
}
