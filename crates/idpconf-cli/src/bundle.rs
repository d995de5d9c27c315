use crate::error::{CliError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, Header};
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

/// Input paths gathered from files, folders, archives, and list files.
///
/// Paths extracted from `.tar` archives point into temporary directories;
/// the bundle keeps those directories alive until it is dropped.
#[derive(Debug)]
pub struct PathBundle {
    pub paths: Vec<PathBuf>,
    _extracted: Vec<TempDir>,
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn has_any_ext(path: &Path, exts: &[&str]) -> bool {
    exts.iter().any(|ext| has_ext(path, ext))
}

fn files_with_exts(dir: &Path, exts: &[&str], max_depth: usize) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_any_ext(e.path(), exts))
        .map(|e| e.into_path())
        .collect()
}

/// Gathers every input path carrying one of the wanted extensions.
///
/// Each input may be a file of a wanted extension, a folder (searched one
/// level deep), a `.tar` archive (unpacked to a temporary directory and
/// searched recursively), or a `.list` file of newline-separated paths.
///
/// # Errors
///
/// Returns an error for inputs that do not exist or archives that cannot be
/// unpacked.
pub fn collect_paths(inputs: &[PathBuf], exts: &[&str]) -> Result<PathBundle> {
    let mut paths = Vec::new();
    let mut extracted = Vec::new();

    for input in inputs {
        if input.is_dir() {
            paths.extend(files_with_exts(input, exts, 1));
        } else if has_ext(input, "tar") {
            let tmp = tempfile::tempdir()?;
            Archive::new(File::open(input)?).unpack(tmp.path())?;
            debug!("unpacked {} into {}", input.display(), tmp.path().display());
            paths.extend(files_with_exts(tmp.path(), exts, usize::MAX));
            extracted.push(tmp);
        } else if has_ext(input, "list") {
            for line in fs::read_to_string(input)?.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                paths.push(PathBuf::from(line));
            }
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(CliError::Argument(format!(
                "input path does not exist: {}",
                input.display()
            )));
        }
    }

    paths.sort();
    Ok(PathBundle {
        paths,
        _extracted: extracted,
    })
}

/// Where batch pipelines store their output files: a plain directory or a
/// `.tar` archive, chosen by the destination's extension.
pub enum OutputSink {
    Directory(PathBuf),
    Tar(Builder<File>),
}

impl OutputSink {
    /// Creates the sink, making the directory or the archive file.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination cannot be created.
    pub fn create(destination: &Path) -> Result<Self> {
        if has_ext(destination, "tar") {
            let file = File::create(destination)?;
            Ok(OutputSink::Tar(Builder::new(file)))
        } else {
            fs::create_dir_all(destination)?;
            Ok(OutputSink::Directory(destination.to_path_buf()))
        }
    }

    /// Stores one named file.
    ///
    /// # Errors
    ///
    /// Returns an error when writing fails.
    pub fn save(&mut self, name: &str, data: &[u8]) -> Result<()> {
        match self {
            OutputSink::Directory(dir) => {
                fs::write(dir.join(name), data)?;
            }
            OutputSink::Tar(builder) => {
                let mut header = Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                builder.append_data(&mut header, name, data)?;
            }
        }
        Ok(())
    }

    /// Flushes and closes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error when finishing the archive fails.
    pub fn finish(self) -> Result<()> {
        if let OutputSink::Tar(builder) = self {
            builder.into_inner()?.sync_all()?;
        }
        Ok(())
    }
}
