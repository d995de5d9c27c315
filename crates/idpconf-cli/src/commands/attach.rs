use crate::cli::AttachArgs;
use crate::config::PartialAttachConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use idpconfgen::core::io::pdb::PdbFile;
use idpconfgen::core::io::read_structure_from_path;
use idpconfgen::core::io::traits::StructureFile;
use idpconfgen::core::radii::RadiiSet;
use idpconfgen::engine::error::EngineError;
use idpconfgen::engine::progress::ProgressReporter;
use idpconfgen::workflows::attach;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: AttachArgs) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialAttachConfig::from_file(path)?,
        None => PartialAttachConfig::default(),
    };
    info!("merging configuration from file and CLI arguments");
    let (config, radii_path) = partial.merge_with_cli(&args)?;

    let radii = match radii_path {
        Some(path) => RadiiSet::from_toml_path(&path).map_err(EngineError::from)?,
        None => RadiiSet::default(),
    };
    info!("using van der Waals radii set '{}'", radii.name());

    info!("loading folded structure from {}", args.folded.display());
    let folded = read_structure_from_path(&args.folded)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Attaching {} conformer(s) as {}...",
        args.idp.len(),
        config.case
    );

    let total = args.idp.len();
    let mut written = 0usize;
    for (i, conformer_path) in args.idp.iter().enumerate() {
        let fragment = read_structure_from_path(conformer_path)?;

        match attach::run(&folded, &fragment, &config, &radii, &reporter) {
            Ok(attachment) => {
                let output_path = generate_output_path(&args.output, i + 1, total);
                PdbFile::write_to_path(&attachment.structure, &output_path)?;
                println!(
                    "✓ Grafted {} ({} clashes, {} rotations) -> {}",
                    conformer_path.display(),
                    attachment.clashes,
                    attachment.rotations,
                    output_path.display()
                );
                written += 1;
            }
            Err(EngineError::TooManyClashes { rotations }) => {
                warn!(
                    "no clash-free orientation for {} after {rotations} rotations",
                    conformer_path.display()
                );
                println!(
                    "✗ Skipped {} (no clash-free orientation)",
                    conformer_path.display()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    if written == 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "no conformer could be attached without clashes"
        )));
    }
    Ok(())
}

// With several conformers the index lands before the extension:
// out.pdb -> out_1.pdb, out_2.pdb, ...
fn generate_output_path(template: &Path, index: usize, total: usize) -> PathBuf {
    if total == 1 {
        return template.to_path_buf();
    }
    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("attached");
    let extension = template
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("pdb");
    template.with_file_name(format!("{stem}_{index}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_output_keeps_the_template() {
        let path = generate_output_path(Path::new("out/final.pdb"), 1, 1);
        assert_eq!(path, PathBuf::from("out/final.pdb"));
    }

    #[test]
    fn multiple_outputs_are_numbered_before_the_extension() {
        let path = generate_output_path(Path::new("out/final.pdb"), 2, 5);
        assert_eq!(path, PathBuf::from("out/final_2.pdb"));
    }

    #[test]
    fn extensionless_template_defaults_to_pdb() {
        let path = generate_output_path(Path::new("final"), 3, 5);
        assert_eq!(path, PathBuf::from("final_3.pdb"));
    }
}
