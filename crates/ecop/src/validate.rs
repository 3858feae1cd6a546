use anyhow::Result;
use clap::Args;
use ecop_compile::{format_validation, validate, validate_grounded};
use thiserror::Error;

use crate::compile::print_warnings;
use crate::inputs::InputArgs;

#[derive(Debug, Error)]
#[error("{errors} validation error(s) in commands")]
pub struct ValidationFailed {
    pub errors: usize,
}

#[derive(Args, Debug, Clone)]
#[command(about = "Validate a commands file against a catalog and snapshot")]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let inputs = args.inputs.load()?;
    print_warnings(inputs.catalog.warnings());

    let report = match &inputs.allowed_parts {
        Some(allowed) => validate_grounded(
            &inputs.commands,
            allowed,
            &inputs.catalog,
            inputs.snapshot.as_ref(),
        ),
        None => validate(&inputs.commands, &inputs.catalog, inputs.snapshot.as_ref()),
    };
    println!("{}", format_validation(&report));

    if report.ok() {
        Ok(())
    } else {
        Err(ValidationFailed {
            errors: report.errors.len(),
        }
        .into())
    }
}
