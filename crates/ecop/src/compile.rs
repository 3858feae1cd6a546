use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use ecop_compile::{CompileOptions, Compiled, Compiler};
use ecop_sch::io::write_json;

use crate::config::EcopConfig;
use crate::inputs::InputArgs;

#[derive(Args, Debug, Clone)]
#[command(about = "Validate and compile a commands file into an actions file")]
pub struct CompileArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Where to write the actions file
    #[arg(short, long, value_name = "FILE", default_value = "actions.json")]
    pub out: PathBuf,

    /// Placement configuration (ecop.toml)
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Also print the actions JSON to stdout
    #[arg(long)]
    pub print: bool,
}

pub fn execute(args: CompileArgs) -> Result<()> {
    let config = EcopConfig::load_optional(args.config.as_deref())?;
    let inputs = args.inputs.load()?;

    let options = CompileOptions {
        placement: config.placement,
        allowed_parts: inputs.allowed_parts,
    };
    let compiled = Compiler::with_options(&inputs.catalog, options)
        .compile(&inputs.commands, inputs.snapshot.as_ref())?;

    write_json(&args.out, &compiled.actions)
        .with_context(|| format!("Failed to write actions to {}", args.out.display()))?;

    if args.print {
        println!("{}", compiled.actions.to_json_pretty()?);
    }

    eprintln!(
        "{} Compiled {} commands into {} actions: {}",
        "✓".green(),
        inputs.commands.len(),
        compiled.actions.len(),
        args.out.display()
    );
    let summary = phase_summary(&compiled);
    if !summary.is_empty() {
        eprintln!("  {summary}");
    }
    print_warnings(
        inputs
            .catalog
            .warnings()
            .iter()
            .chain(compiled.warnings.iter()),
    );

    Ok(())
}

/// Action counts per tag, in emission order: `ADD 2, PLACE 2, CONNECT 2`.
fn phase_summary(compiled: &Compiled) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for tag in compiled.actions.tags() {
        match counts.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((tag, 1)),
        }
    }
    counts
        .iter()
        .map(|(tag, count)| format!("{tag} {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_warnings<'a>(warnings: impl IntoIterator<Item = &'a String>) {
    let warnings: Vec<&String> = warnings.into_iter().collect();
    if warnings.is_empty() {
        return;
    }
    eprintln!("{}", format!("Warnings ({}):", warnings.len()).yellow());
    for warning in warnings {
        eprintln!("  - {warning}");
    }
}
