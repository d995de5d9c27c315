use crate::bundle::collect_paths;
use crate::cli::FastaArgs;
use crate::error::{CliError, Result};
use idpconfgen::core::io::read_structure_from_path;
use std::fmt::Write as _;
use tracing::{error, info};

pub fn run(args: FastaArgs) -> Result<()> {
    let bundle = collect_paths(&args.structures, &["pdb", "cif"])?;
    if bundle.paths.is_empty() {
        return Err(CliError::Argument(
            "no structure files found in the inputs".into(),
        ));
    }

    let mut out = String::new();
    let mut failures = 0usize;
    for path in &bundle.paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        match read_structure_from_path(path) {
            Ok(model) => {
                for (chain, sequence) in model.fasta() {
                    writeln!(out, ">{stem}_{chain}").expect("writing to a String cannot fail");
                    writeln!(out, "{sequence}").expect("writing to a String cannot fail");
                }
            }
            Err(e) => {
                failures += 1;
                error!("skipping {}: {e}", path.display());
            }
        }
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &out)?;
            info!("FASTA written to {}", path.display());
        }
        None => print!("{out}"),
    }

    if failures > 0 {
        return Err(CliError::Argument(format!(
            "{failures} structure(s) could not be read"
        )));
    }
    Ok(())
}
