use crate::bundle::{OutputSink, collect_paths};
use crate::cli::SscalcArgs;
use crate::dssp::run_dssp;
use crate::error::{CliError, Result};
use idpconfgen::core::dssp::{DsspEntry, DsspTable};
use idpconfgen::core::io::pdb::PdbFile;
use idpconfgen::core::io::traits::StructureFile;
use idpconfgen::workflows::segment::{SegmentedEntry, split_entry};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{error, info, warn};

pub async fn run(args: SscalcArgs) -> Result<()> {
    if args.output.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(CliError::Argument(format!(
            "output must be a .json file, got '{}'",
            args.output.display()
        )));
    }

    info!("reading input paths");
    let bundle = collect_paths(&args.pdbs, &["pdb"])?;
    if bundle.paths.is_empty() {
        return Err(CliError::Argument("no PDB files found in the inputs".into()));
    }
    info!("calculating secondary structure for {} files", bundle.paths.len());

    let pb = ProgressBar::new(bundle.paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Failed to create progress style template")
            .progress_chars("##-"),
    );
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(2));
    pb.set_message("sscalc");

    // DSSP runs are process-bound; fan them out over the rayon pool.
    let results: Vec<_> = tokio::task::block_in_place(|| {
        bundle
            .paths
            .par_iter()
            .map(|path| {
                let outcome = process_one(&args.cmd, path, args.reduced, args.minimum);
                pb.inc(1);
                (path.clone(), outcome)
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut database: BTreeMap<String, DsspEntry> = BTreeMap::new();
    let mut sink = OutputSink::create(&args.destination)?;
    let mut failures = 0usize;

    for (path, outcome) in results {
        match outcome {
            Ok(segments) => {
                for segment in segments {
                    sink.save(&format!("{}.pdb", segment.key), segment.pdb.as_bytes())?;
                    database.insert(segment.key, segment.entry);
                }
            }
            Err(e) => {
                failures += 1;
                error!("skipping {}: {e}", path.display());
            }
        }
    }
    sink.finish()?;

    serde_json::to_writer_pretty(File::create(&args.output)?, &database)?;
    info!(
        "saved {} segments to {} and {}",
        database.len(),
        args.destination.display(),
        args.output.display()
    );
    println!(
        "Secondary structure calculated for {} entries ({} segments).",
        bundle.paths.len() - failures,
        database.len()
    );
    if failures > 0 {
        warn!("{failures} entries failed and were skipped");
    }
    Ok(())
}

fn process_one(
    cmd: &str,
    path: &Path,
    reduced: bool,
    minimum: usize,
) -> Result<Vec<SegmentedEntry>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::Argument(format!("unusable file name: {}", path.display())))?;

    let dssp_text = run_dssp(cmd, path)?;
    let table = DsspTable::parse(&dssp_text)?;
    let entry = table.to_entry(reduced);

    let model = PdbFile::read_from_path(path)?;
    Ok(split_entry(stem, &model, &entry, minimum)?)
}
