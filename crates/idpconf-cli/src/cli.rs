use clap::{Args, Parser, Subcommand, ValueEnum};
use idpconfgen::engine::graft::DisorderCase;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The IDPConfGen Developers",
    version,
    about = "IDPConfGen CLI - Curate structural databases and graft disordered regions for IDP conformer generation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download PDB/mmCIF entries from RCSB and split them into per-chain PDB files.
    Fetch(FetchArgs),
    /// Calculate secondary-structure profiles with an external DSSP executable.
    Sscalc(SscalcArgs),
    /// Isolate secondary-structure elements from curated entries.
    Extract(ExtractArgs),
    /// Print per-chain FASTA sequences of structure files.
    Fasta(FastaArgs),
    /// Attach a disordered tail conformer onto a folded structure.
    Attach(AttachArgs),
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// PDBID list files and/or literal PDBIDs (e.g. 12AS, 12AS_A).
    #[arg(required = true, value_name = "IDS_OR_FILES")]
    pub pdbids: Vec<String>,

    /// Destination folder for the per-chain PDB files.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub destination: PathBuf,

    /// Actually download; without this flag only the pending set is reported.
    #[arg(short, long)]
    pub update: bool,

    /// Number of simultaneous downloads.
    #[arg(short, long, value_name = "NUM", default_value_t = 1)]
    pub ncores: usize,
}

/// Arguments for the `sscalc` subcommand.
#[derive(Args, Debug)]
pub struct SscalcArgs {
    /// PDB files, folders of PDB files, or a .tar archive of them.
    #[arg(required = true, value_name = "PDBS")]
    pub pdbs: Vec<PathBuf>,

    /// The DSSP executable to run.
    #[arg(short, long, value_name = "CMD", default_value = "mkdssp")]
    pub cmd: String,

    /// Path for the secondary-structure JSON dictionary (.json).
    #[arg(short, long, value_name = "PATH", default_value = "sscalc.json")]
    pub output: PathBuf,

    /// Destination folder or .tar archive for the split PDB files.
    #[arg(short, long, value_name = "PATH", default_value = "sscalc_splitted.tar")]
    pub destination: PathBuf,

    /// Reduce the DSSP alphabet to H/E/L.
    #[arg(short, long)]
    pub reduced: bool,

    /// Minimum segment size, in residues.
    #[arg(short, long, value_name = "INT", default_value_t = 2)]
    pub minimum: usize,
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PDB files, folders of PDB files, or a .tar archive of them.
    #[arg(required = true, value_name = "PDBS")]
    pub pdbs: Vec<PathBuf>,

    /// The secondary-structure JSON dictionary produced by `sscalc`.
    #[arg(short = 's', long, value_name = "PATH")]
    pub ss_data: PathBuf,

    /// Secondary-structure classes to isolate (e.g. "H", "HE"); "all" keeps every class.
    #[arg(short = 't', long, value_name = "CLASSES", default_value = "all")]
    pub structure: String,

    /// Atom names to keep (comma-separated); "all" keeps every atom.
    #[arg(short, long, value_name = "NAMES", default_value = "all")]
    pub atoms: String,

    /// Minimum element length, in residues.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub minimum: usize,

    /// Destination folder or .tar archive for the isolated elements.
    #[arg(short, long, value_name = "PATH", default_value = "extracted.tar")]
    pub destination: PathBuf,
}

/// Arguments for the `fasta` subcommand.
#[derive(Args, Debug)]
pub struct FastaArgs {
    /// Structure files (PDB or mmCIF), folders, or a .tar archive of them.
    #[arg(required = true, value_name = "STRUCTURES")]
    pub structures: Vec<PathBuf>,

    /// Write the FASTA to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// The disorder case of the fragment being attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseArg {
    /// Tail preceding the folded N-terminus.
    #[value(name = "n-idr")]
    NIdr,
    /// Linker between folded regions.
    #[value(name = "break-idr")]
    BreakIdr,
    /// Tail following the folded C-terminus.
    #[value(name = "c-idr")]
    CIdr,
}

impl From<CaseArg> for DisorderCase {
    fn from(value: CaseArg) -> Self {
        match value {
            CaseArg::NIdr => DisorderCase::NTail,
            CaseArg::BreakIdr => DisorderCase::Linker,
            CaseArg::CIdr => DisorderCase::CTail,
        }
    }
}

/// Arguments for the `attach` subcommand.
#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Path to the folded structure (PDB or mmCIF).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub folded: PathBuf,

    /// Disordered fragment conformers to attach, one output per conformer.
    #[arg(short, long, required = true, value_name = "PATH", num_args(1..))]
    pub idp: Vec<PathBuf>,

    /// Path template for the grafted structures.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Where the fragment attaches. Overrides the config file.
    #[arg(long, value_enum, value_name = "CASE")]
    pub case: Option<CaseArg>,

    /// Clash tolerance in [0, 1]. Overrides the config file.
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Maximum random orientations to try. Overrides the derived budget.
    #[arg(long, value_name = "INT")]
    pub max_rotation: Option<usize>,

    /// Maximum acceptable clashes. Overrides the derived budget.
    #[arg(long, value_name = "INT")]
    pub max_clash: Option<usize>,

    /// Optional TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Optional TOML file with a custom van der Waals radii set.
    #[arg(long, value_name = "PATH")]
    pub radii: Option<PathBuf>,
}
