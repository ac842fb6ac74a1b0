//! Hook catalog listing.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use flowhook_core::error::AppError;
use flowhook_hooks::{HookFamily, HookPoint};

use crate::output::{self, OutputFormat};

/// Arguments for the hooks command
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Only list hooks of one family (export, import, platform)
    #[arg(long)]
    pub family: Option<String>,
}

/// One catalog row.
#[derive(Debug, Serialize, Tabled)]
pub struct HookRow {
    /// Script-facing hook name.
    #[tabled(rename = "Hook")]
    pub hook: &'static str,
    /// Export, import, or platform.
    #[tabled(rename = "Family")]
    pub family: &'static str,
    /// Unit of work per invocation.
    #[tabled(rename = "Invoked per")]
    pub unit: &'static str,
    /// What a failure aborts.
    #[tabled(rename = "Failure fails")]
    pub failure_scope: &'static str,
    /// Whether the reply is one entry per input record.
    #[tabled(rename = "Record-indexed")]
    pub record_indexed: bool,
}

impl From<HookPoint> for HookRow {
    fn from(hook: HookPoint) -> Self {
        Self {
            hook: hook.as_str(),
            family: hook.family().as_str(),
            unit: hook.unit().as_str(),
            failure_scope: hook.failure_scope().as_str(),
            record_indexed: hook.is_record_indexed(),
        }
    }
}

/// Execute the hooks command
pub fn execute(args: &HooksArgs, format: OutputFormat) -> Result<(), AppError> {
    let family = args.family.as_deref().map(parse_family).transpose()?;

    let rows: Vec<HookRow> = HookPoint::ALL
        .into_iter()
        .filter(|hook| family.is_none_or(|f| hook.family() == f))
        .map(HookRow::from)
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

fn parse_family(name: &str) -> Result<HookFamily, AppError> {
    [HookFamily::Export, HookFamily::Import, HookFamily::Platform]
        .into_iter()
        .find(|f| f.as_str().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| AppError::validation(format!("Unknown hook family '{}'", name)))
}
