use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Identifiers excluded from database curation.
///
/// Entries whose size or assembly makes them unusable for torsion-angle
/// database building (whole-capsid and ribosome depositions).
pub const BLOCKED_IDS: &[&str] = &["3J3Q", "3J3Y", "4V4G", "6EK0"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdbIdError {
    #[error("PDB code format not valid: '{0}'. No known pattern matches")]
    Unrecognized(String),
}

/// A downloadable/storable PDB unit: a four-character code plus an optional
/// chain identifier.
///
/// Accepted input formats (`X` is any ASCII letter or digit, `C*` one or
/// more of the same):
///
/// - `XXXX`
/// - `XXXXC*`
/// - `XXXX_C*`
/// - any of the above with a `.pdb` extension
///
/// The code is canonicalized to uppercase; chain identifiers are
/// case-sensitive and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PdbId {
    code: String,
    chain: Option<String>,
}

impl PdbId {
    /// Creates an identifier from a code and an optional chain.
    ///
    /// # Errors
    ///
    /// Returns [`PdbIdError::Unrecognized`] when the code is not four
    /// alphanumeric characters or the chain contains other characters.
    pub fn new(code: &str, chain: Option<&str>) -> Result<Self, PdbIdError> {
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PdbIdError::Unrecognized(code.to_string()));
        }
        if let Some(chain) = chain {
            if chain.is_empty() || !chain.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(PdbIdError::Unrecognized(format!("{code}_{chain}")));
            }
        }
        Ok(Self {
            code: code.to_ascii_uppercase(),
            chain: chain.map(str::to_string),
        })
    }

    /// The four-character PDB code, uppercase.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The chain identifier, when the unit names a single chain.
    pub fn chain(&self) -> Option<&str> {
        self.chain.as_deref()
    }
}

impl FromStr for PdbId {
    type Err = PdbIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.split_whitespace().next().unwrap_or("");
        let token = token.strip_suffix(".pdb").unwrap_or(token);
        // Chain-split PDB files are written as CODE_CHAIN.pdb; a path may
        // still carry directories in front.
        let token = token.rsplit(['/', '\\']).next().unwrap_or(token);

        if token.len() < 4 {
            return Err(PdbIdError::Unrecognized(s.to_string()));
        }

        let (code, rest) = token.split_at(4);
        let chain = match rest {
            "" => None,
            r => Some(r.strip_prefix('_').unwrap_or(r)),
        };
        PdbId::new(code, chain).map_err(|_| PdbIdError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for PdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chain {
            Some(chain) => write!(f, "{}_{}", self.code, chain),
            None => write!(f, "{}", self.code),
        }
    }
}

/// An ordered set of [`PdbId`]s with the set algebra the curation pipeline
/// needs: building from heterogeneous text sources, diffing against already
/// fetched entries, and grouping chains per code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdbCatalog {
    set: BTreeSet<PdbId>,
}

impl PdbCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from text entries.
    ///
    /// Empty lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first unparsable entry.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, PdbIdError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            set.insert(entry.parse()?);
        }
        Ok(Self { set })
    }

    /// Builds a catalog from the `*.pdb` file stems found in a directory.
    ///
    /// Stems that do not parse as identifiers are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let mut set = BTreeSet::new();
        if !dir.as_ref().is_dir() {
            return Ok(Self { set });
        }
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pdb") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                match stem.parse::<PdbId>() {
                    Ok(id) => {
                        set.insert(id);
                    }
                    Err(_) => {
                        tracing::debug!("skipping non-identifier file stem: {stem}");
                    }
                }
            }
        }
        Ok(Self { set })
    }

    /// The compiled-in blocklist as a catalog.
    pub fn blocked() -> Self {
        Self::from_entries(BLOCKED_IDS).expect("compiled-in blocklist entries are valid")
    }

    pub fn insert(&mut self, id: PdbId) {
        self.set.insert(id);
    }

    pub fn contains(&self, id: &PdbId) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PdbId> {
        self.set.iter()
    }

    /// Entries of `self` not present in `other`.
    ///
    /// Comparison happens on the canonical string form, so `12AS` and
    /// `12AS_A` are distinct entries.
    pub fn difference(&self, other: &PdbCatalog) -> PdbCatalog {
        PdbCatalog {
            set: self.set.difference(&other.set).cloned().collect(),
        }
    }

    /// Groups the catalog by PDB code, collecting the requested chains.
    ///
    /// An entry without a chain requests all chains of that code and is
    /// represented by `None`.
    pub fn chains_by_code(&self) -> BTreeMap<String, Vec<Option<String>>> {
        let mut map: BTreeMap<String, Vec<Option<String>>> = BTreeMap::new();
        for id in &self.set {
            map.entry(id.code().to_string())
                .or_default()
                .push(id.chain().map(str::to_string));
        }
        map
    }

    /// Writes the identifiers, one per line in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut text: String = self
            .set
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        fs::write(path, text)
    }
}

impl fmt::Display for PdbCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdbCatalog with {} elements", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_code() {
        let id: PdbId = "12as".parse().unwrap();
        assert_eq!(id.code(), "12AS");
        assert_eq!(id.chain(), None);
        assert_eq!(id.to_string(), "12AS");
    }

    #[test]
    fn parses_code_with_appended_chain() {
        let id: PdbId = "12ASA".parse().unwrap();
        assert_eq!(id.code(), "12AS");
        assert_eq!(id.chain(), Some("A"));
        assert_eq!(id.to_string(), "12AS_A");
    }

    #[test]
    fn parses_underscore_form_and_long_chains() {
        let id: PdbId = "12AS_BB".parse().unwrap();
        assert_eq!(id.chain(), Some("BB"));
    }

    #[test]
    fn parses_pdb_filenames_and_paths() {
        let id: PdbId = "12AS_A.pdb".parse().unwrap();
        assert_eq!(id.to_string(), "12AS_A");

        let id: PdbId = "some/dir/1xyz.pdb".parse().unwrap();
        assert_eq!(id.to_string(), "1XYZ");
    }

    #[test]
    fn chain_case_is_preserved() {
        let upper: PdbId = "12AS_A".parse().unwrap();
        let lower: PdbId = "12AS_a".parse().unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("xx".parse::<PdbId>().is_err());
        assert!("12A!".parse::<PdbId>().is_err());
        assert!("1ABC_".parse::<PdbId>().is_err());
        assert!("".parse::<PdbId>().is_err());
    }

    #[test]
    fn catalog_skips_comments_and_blank_lines() {
        let catalog =
            PdbCatalog::from_entries(["# comment", "", "12AS_A", "1XYZ"]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&"12AS_A".parse().unwrap()));
    }

    #[test]
    fn catalog_difference_removes_exact_entries() {
        let all = PdbCatalog::from_entries(["12AS_A", "12AS_B", "1XYZ"]).unwrap();
        let have = PdbCatalog::from_entries(["12AS_B"]).unwrap();
        let todo = all.difference(&have);
        assert_eq!(todo.len(), 2);
        assert!(!todo.contains(&"12AS_B".parse().unwrap()));
    }

    #[test]
    fn chains_by_code_groups_entries() {
        let catalog = PdbCatalog::from_entries(["12AS_A", "12AS_B", "1XYZ"]).unwrap();
        let grouped = catalog.chains_by_code();
        assert_eq!(grouped["12AS"].len(), 2);
        assert_eq!(grouped["1XYZ"], vec![None]);
    }

    #[test]
    fn catalog_round_trips_through_directory_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("12AS_A.pdb"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("junk!.pdb"), "").unwrap();

        let catalog = PdbCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(&"12AS_A".parse().unwrap()));
    }

    #[test]
    fn scanning_a_missing_directory_yields_an_empty_catalog() {
        let catalog = PdbCatalog::from_dir("/definitely/not/here").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn blocklist_parses() {
        let blocked = PdbCatalog::blocked();
        assert_eq!(blocked.len(), BLOCKED_IDS.len());
    }

    #[test]
    fn write_emits_sorted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.list");
        let catalog = PdbCatalog::from_entries(["1XYZ", "12AS_A"]).unwrap();
        catalog.write_to_path(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "12AS_A\n1XYZ\n");
    }
}
