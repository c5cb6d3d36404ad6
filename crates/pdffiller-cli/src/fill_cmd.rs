use std::path::Path;

use pdffiller::ApplyReport;
use tracing::info;

use crate::cli::OnFailure;
use crate::data;
use crate::exit_codes::ERROR_ENCOUNTERED;
use crate::shared::open_form;

/// Arguments of the `fill-form` subcommand.
pub struct FillArgs<'a> {
    pub file: &'a Path,
    pub output: &'a Path,
    pub data: Option<&'a str>,
    pub input_data: Option<&'a str>,
    pub flatten: bool,
    pub on_failure: OnFailure,
    pub password: Option<&'a str>,
}

/// Whether the skipped entries of `report` fail the command under `policy`.
pub fn policy_failed(policy: OnFailure, report: &ApplyReport) -> bool {
    match policy {
        OnFailure::Ignore => false,
        OnFailure::NoneApplied => report.applied.is_empty() && !report.issues.is_empty(),
        OnFailure::Any => !report.issues.is_empty(),
    }
}

pub fn run(args: &FillArgs<'_>) -> Result<(), i32> {
    let mut form = open_form(args.file, args.password)?;
    let values = data::load(args.data, args.input_data)?;

    let report = form.fill(values).map_err(|e| {
        eprintln!("Error: failed to fill {}: {e}", args.file.display());
        ERROR_ENCOUNTERED
    })?;
    for issue in &report.issues {
        eprintln!("Warning: {issue}");
    }
    info!(
        applied = report.applied.len(),
        skipped = report.issues.len(),
        "filled form"
    );

    if args.flatten {
        let flattened = form.flatten().map_err(|e| {
            eprintln!("Error: failed to flatten {}: {e}", args.file.display());
            ERROR_ENCOUNTERED
        })?;
        for issue in &flattened.issues {
            eprintln!("Warning: {issue}");
        }
        info!(
            drawn = flattened.drawn,
            discarded = flattened.discarded,
            "flattened form"
        );
    }

    form.save(args.output).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", args.output.display());
        ERROR_ENCOUNTERED
    })?;

    if policy_failed(args.on_failure, &report) {
        eprintln!(
            "Error: {} of {} entries could not be applied",
            report.issues.len(),
            report.issues.len() + report.applied.len()
        );
        return Err(ERROR_ENCOUNTERED);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdffiller::FieldIssue;

    fn report(applied: &[&str], unknown: &[&str]) -> ApplyReport {
        ApplyReport {
            applied: applied.iter().map(|s| s.to_string()).collect(),
            issues: unknown.iter().map(|s| FieldIssue::unknown(*s)).collect(),
        }
    }

    #[test]
    fn ignore_never_fails() {
        assert!(!policy_failed(OnFailure::Ignore, &report(&[], &["x"])));
    }

    #[test]
    fn none_applied_policy() {
        assert!(policy_failed(OnFailure::NoneApplied, &report(&[], &["x"])));
        assert!(!policy_failed(OnFailure::NoneApplied, &report(&["name"], &["x"])));
        assert!(!policy_failed(OnFailure::NoneApplied, &report(&[], &[])));
    }

    #[test]
    fn any_policy() {
        assert!(policy_failed(OnFailure::Any, &report(&["name"], &["x"])));
        assert!(!policy_failed(OnFailure::Any, &report(&["name"], &[])));
    }
}
