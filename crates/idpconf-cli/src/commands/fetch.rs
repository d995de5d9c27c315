use crate::cli::FetchArgs;
use crate::error::{CliError, Result};
use futures_util::StreamExt;
use idpconfgen::core::identifiers::PdbCatalog;
use idpconfgen::core::io::pdb::PdbFile;
use idpconfgen::core::io::read_structure;
use idpconfgen::core::io::traits::StructureFile;
use idpconfgen::core::models::atom::RecordKind;
use idpconfgen::core::selection::Selection;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub async fn run(args: FetchArgs) -> Result<()> {
    info!("reading input PDB lists");
    let requested = read_requested(&args.pdbids)?;
    info!("requested: {requested}");

    let existing = PdbCatalog::from_dir(&args.destination)?;
    let todo = requested
        .difference(&existing)
        .difference(&PdbCatalog::blocked());
    info!("found {} entries to download", todo.len());

    if todo.is_empty() {
        println!("There is nothing to download.");
        println!("All requested IDs are already at the destination folder.");
        return Ok(());
    }
    if !args.update {
        println!(
            "{} entries pending; re-run with --update to download them.",
            todo.len()
        );
        return Ok(());
    }

    std::fs::create_dir_all(&args.destination)?;
    let client = reqwest::Client::new();
    let grouped = todo.chains_by_code();

    let pb = ProgressBar::new(grouped.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .expect("Failed to create progress style template")
        .progress_chars("#>-"),
    );
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(2));

    let mut downloads = futures_util::stream::iter(grouped.into_iter().map(|(code, chains)| {
        let client = client.clone();
        let destination = args.destination.clone();
        async move {
            let outcome = fetch_entry(&client, &code, &chains, &destination).await;
            (code, outcome)
        }
    }))
    .buffer_unordered(args.ncores.max(1));

    while let Some((code, outcome)) = downloads.next().await {
        pb.inc(1);
        if let Err(e) = outcome {
            error!("failed {code}: {e}");
        }
    }
    pb.finish_with_message("done");

    report_missing(&requested, &args.destination)?;
    Ok(())
}

fn read_requested(sources: &[String]) -> Result<PdbCatalog> {
    let mut entries: Vec<String> = Vec::new();
    for source in sources {
        let path = Path::new(source);
        if path.is_file() {
            entries.extend(std::fs::read_to_string(path)?.lines().map(str::to_string));
        } else {
            // Not a file on disk: treat as a literal identifier.
            entries.push(source.clone());
        }
    }
    Ok(PdbCatalog::from_entries(&entries)?)
}

async fn fetch_entry(
    client: &reqwest::Client,
    code: &str,
    chains: &[Option<String>],
    destination: &Path,
) -> Result<()> {
    let data = download_any(client, code).await?;
    let model = read_structure(&data)?;

    // An entry without an explicit chain requests every chain present.
    let wanted: Vec<char> = if chains.iter().any(Option::is_none) {
        model.chain_ids().into_iter().collect()
    } else {
        chains
            .iter()
            .filter_map(|c| c.as_ref().and_then(|s| s.chars().next()))
            .collect()
    };

    for chain in wanted {
        let selection = Selection::new()
            .with_records(&[RecordKind::Atom])
            .with_chain(chain);
        match selection.extract(&model) {
            Ok(per_chain) => {
                let path = destination.join(format!("{code}_{chain}.pdb"));
                PdbFile::write_to_path(&per_chain, &path)?;
                info!("saved {}", path.display());
            }
            Err(e) => {
                warn!("empty filter for {code} chain {chain}: {e}");
            }
        }
    }
    Ok(())
}

async fn download_any(client: &reqwest::Client, code: &str) -> Result<String> {
    for ext in ["pdb", "cif"] {
        let url = format!("https://files.rcsb.org/download/{code}.{ext}");
        match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => {
                info!("completed from {url}");
                return Ok(response.text().await?);
            }
            Err(e) => {
                warn!("failed from {url}: {e}");
            }
        }
    }
    Err(CliError::DownloadFailed(code.to_string()))
}

fn report_missing(requested: &PdbCatalog, destination: &PathBuf) -> Result<()> {
    let now = PdbCatalog::from_dir(destination)?;
    let have_codes: BTreeSet<&str> = now.iter().map(|id| id.code()).collect();
    let blocked = PdbCatalog::blocked();

    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !have_codes.contains(id.code()) && !blocked.contains(id))
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() {
        info!("PDB downloader finished with all entries present");
    } else {
        warn!("{} entries could not be fetched", missing.len());
        for id in &missing {
            debug!("not fetched: {id}");
        }
    }
    Ok(())
}
