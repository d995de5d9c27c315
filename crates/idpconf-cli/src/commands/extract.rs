use crate::bundle::{OutputSink, collect_paths};
use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use idpconfgen::core::dssp::DsspEntry;
use idpconfgen::core::io::pdb::PdbFile;
use idpconfgen::core::io::traits::StructureFile;
use idpconfgen::engine::extract::{AtomFilter, ExtractConfig, SsSelection, extract_elements};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use tracing::{error, info, warn};

pub fn run(args: ExtractArgs) -> Result<()> {
    let ss_data: BTreeMap<String, DsspEntry> =
        serde_json::from_reader(File::open(&args.ss_data)?)?;
    info!(
        "loaded {} secondary-structure entries from {}",
        ss_data.len(),
        args.ss_data.display()
    );

    let config = build_config(&args)?;
    let bundle = collect_paths(&args.pdbs, &["pdb"])?;
    let mut sink = OutputSink::create(&args.destination)?;

    let mut isolated = 0usize;
    let mut skipped = 0usize;
    for path in &bundle.paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("unusable file name: {}", path.display());
            skipped += 1;
            continue;
        };
        let Some(entry) = ss_data.get(stem) else {
            warn!("no secondary-structure entry for '{stem}', skipping");
            skipped += 1;
            continue;
        };

        let elements = PdbFile::read_from_path(path)
            .map_err(CliError::from)
            .and_then(|model| Ok(extract_elements(stem, &model, entry, &config)?));
        match elements {
            Ok(elements) => {
                for (name, element) in elements {
                    let text = PdbFile::write_to_string(&element)?;
                    sink.save(&name, text.as_bytes())?;
                    isolated += 1;
                }
            }
            Err(e) => {
                error!("skipping {}: {e}", path.display());
                skipped += 1;
            }
        }
    }
    sink.finish()?;

    println!(
        "Isolated {isolated} secondary-structure elements into {}.",
        args.destination.display()
    );
    if skipped > 0 {
        warn!("{skipped} inputs were skipped");
    }
    Ok(())
}

fn build_config(args: &ExtractArgs) -> Result<ExtractConfig> {
    let structures = if args.structure.eq_ignore_ascii_case("all") {
        SsSelection::All
    } else {
        let codes: BTreeSet<char> = args
            .structure
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if codes.is_empty() {
            return Err(CliError::Argument(
                "no secondary-structure classes given".into(),
            ));
        }
        SsSelection::Subset(codes)
    };

    let atoms = if args.atoms.eq_ignore_ascii_case("all") {
        AtomFilter::All
    } else {
        let names: BTreeSet<String> = args
            .atoms
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            return Err(CliError::Argument("no atom names given".into()));
        }
        AtomFilter::Names(names)
    };

    Ok(ExtractConfig {
        structures,
        atoms,
        minimum: args.minimum,
    })
}
