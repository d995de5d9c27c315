use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsspError {
    #[error("Could not find the `#  RESIDUE` header in the DSSP output")]
    MissingHeader,
    #[error("DSSP row on line {line} is too short")]
    ShortLine { line: usize },
    #[error("Invalid residue number on line {line} (value: '{value}')")]
    InvalidResidueNumber { line: usize, value: String },
    #[error("Invalid residue id list entry: '{0}'")]
    InvalidResidList(String),
}

/// The eight-class DSSP secondary-structure alphabet.
///
/// `P` (κ-helix/polyproline II) appears in DSSP 4 output; the blank code of
/// the classic format maps to [`SsCode::Loop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsCode {
    /// α-helix.
    H,
    /// Isolated β-bridge.
    B,
    /// Extended β-strand.
    E,
    /// 3₁₀-helix.
    G,
    /// π-helix.
    I,
    /// Turn.
    T,
    /// Bend.
    S,
    /// κ-helix (polyproline II), DSSP 4.
    P,
    /// Loop or irregular.
    Loop,
}

impl SsCode {
    /// Maps a DSSP output character to a code; unrecognized characters are
    /// treated as loop.
    pub fn from_char(c: char) -> Self {
        match c {
            'H' => SsCode::H,
            'B' => SsCode::B,
            'E' => SsCode::E,
            'G' => SsCode::G,
            'I' => SsCode::I,
            'T' => SsCode::T,
            'S' => SsCode::S,
            'P' => SsCode::P,
            _ => SsCode::Loop,
        }
    }

    /// The character used when storing the full alphabet; loop renders as
    /// `L` so stored strings stay whitespace-free.
    pub fn to_char(self) -> char {
        match self {
            SsCode::H => 'H',
            SsCode::B => 'B',
            SsCode::E => 'E',
            SsCode::G => 'G',
            SsCode::I => 'I',
            SsCode::T => 'T',
            SsCode::S => 'S',
            SsCode::P => 'P',
            SsCode::Loop => 'L',
        }
    }

    /// Reduces the eight-class alphabet to H/E/L.
    ///
    /// Helical classes (H, G, I) collapse to `H`, strand classes (E, B) to
    /// `E`, everything else to `L`.
    pub fn reduce(self) -> char {
        match self {
            SsCode::H | SsCode::G | SsCode::I => 'H',
            SsCode::E | SsCode::B => 'E',
            _ => 'L',
        }
    }
}

/// The per-residue table parsed from classic `mkdssp` text output.
#[derive(Debug, Clone, PartialEq)]
pub struct DsspTable {
    /// Residue sequence numbers as reported by DSSP.
    pub resids: Vec<isize>,
    /// Chain identifier per residue.
    pub chains: Vec<char>,
    /// One-letter amino acid codes per residue.
    pub fasta: String,
    /// Secondary-structure code per residue.
    pub codes: Vec<SsCode>,
}

impl DsspTable {
    /// Parses classic DSSP output.
    ///
    /// Rows are read by fixed columns after the `#  RESIDUE` header; chain
    /// break rows (`!`) are skipped. Lowercase amino acid letters denote
    /// SS-bonded cysteines and are folded back to `C`.
    ///
    /// # Errors
    ///
    /// Returns an error when the header is absent or a row is malformed.
    pub fn parse(data: &str) -> Result<Self, DsspError> {
        let mut lines = data.lines().enumerate();
        let header_found = lines
            .by_ref()
            .any(|(_, line)| line.trim_start().starts_with("#  RESIDUE"));
        if !header_found {
            return Err(DsspError::MissingHeader);
        }

        let mut resids = Vec::new();
        let mut chains = Vec::new();
        let mut fasta = String::new();
        let mut codes = Vec::new();

        for (idx, line) in lines {
            let line_num = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            if line.len() < 14 {
                return Err(DsspError::ShortLine { line: line_num });
            }

            let aa = line.as_bytes()[13] as char;
            if aa == '!' {
                continue;
            }

            let resid_str = line[5..10].trim();
            let resid: isize =
                resid_str
                    .parse()
                    .map_err(|_| DsspError::InvalidResidueNumber {
                        line: line_num,
                        value: resid_str.to_string(),
                    })?;
            let chain = line.as_bytes()[11] as char;
            let ss = line.as_bytes().get(16).map(|&b| b as char).unwrap_or(' ');

            resids.push(resid);
            chains.push(chain);
            fasta.push(if aa.is_ascii_lowercase() { 'C' } else { aa });
            codes.push(SsCode::from_char(ss));
        }

        Ok(Self {
            resids,
            chains,
            fasta,
            codes,
        })
    }

    /// The number of residues in the table.
    pub fn len(&self) -> usize {
        self.resids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resids.is_empty()
    }

    /// Renders the table into a serializable entry.
    ///
    /// With `reduced`, secondary-structure codes collapse to the H/E/L
    /// alphabet.
    pub fn to_entry(&self, reduced: bool) -> DsspEntry {
        let dssp: String = self
            .codes
            .iter()
            .map(|c| if reduced { c.reduce() } else { c.to_char() })
            .collect();
        let resids: Vec<String> = self.resids.iter().map(|r| r.to_string()).collect();
        DsspEntry {
            dssp,
            fasta: self.fasta.clone(),
            resids: resids.join(","),
        }
    }
}

/// The per-structure record stored in the secondary-structure database
/// (`sscalc.json`): parallel strings of SS codes and one-letter residues,
/// plus the comma-joined residue numbers they correspond to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsspEntry {
    pub dssp: String,
    pub fasta: String,
    pub resids: String,
}

impl DsspEntry {
    /// Parses the residue number list back into integers.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-numeric entry.
    pub fn resid_numbers(&self) -> Result<Vec<isize>, DsspError> {
        if self.resids.is_empty() {
            return Ok(Vec::new());
        }
        self.resids
            .split(',')
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|_| DsspError::InvalidResidList(s.to_string()))
            })
            .collect()
    }

    /// The number of residues described by this entry.
    pub fn len(&self) -> usize {
        self.dssp.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.dssp.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DSSP_FIXTURE: &str = "\
==== Secondary Structure Definition by the program DSSP ====
REFERENCE W. KABSCH AND C.SANDER, BIOPOLYMERS 22 (1983) 2577-2637
  #  RESIDUE AA STRUCTURE BP1 BP2  ACC     N-H-->O    O-->H-N
    1    1 A M              0   0  235
    2    2 A S  H  >         0   0  100
    3    3 A D  H  4         0   0   90
    4    4 A K  E             0   0   80
    5        !               0   0    0
    6    6 A a               0   0   70
";

    #[test]
    fn parses_rows_and_skips_chain_breaks() {
        let table = DsspTable::parse(DSSP_FIXTURE).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.resids, vec![1, 2, 3, 4, 6]);
        assert_eq!(table.fasta, "MSDKC");
        assert_eq!(
            table.codes,
            vec![SsCode::Loop, SsCode::H, SsCode::H, SsCode::E, SsCode::Loop]
        );
        assert!(table.chains.iter().all(|&c| c == 'A'));
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = DsspTable::parse("no table here\n").unwrap_err();
        assert_eq!(err, DsspError::MissingHeader);
    }

    #[test]
    fn short_row_reports_its_line() {
        let data = "  #  RESIDUE AA STRUCTURE\n    1    1\n";
        let err = DsspTable::parse(data).unwrap_err();
        assert_eq!(err, DsspError::ShortLine { line: 2 });
    }

    #[test]
    fn invalid_residue_number_reports_value() {
        let data = "  #  RESIDUE AA STRUCTURE\n    1    x A M\n";
        let err = DsspTable::parse(data).unwrap_err();
        assert_eq!(
            err,
            DsspError::InvalidResidueNumber {
                line: 2,
                value: "x".to_string(),
            }
        );
    }

    #[test]
    fn entry_rendering_full_and_reduced() {
        let table = DsspTable::parse(DSSP_FIXTURE).unwrap();

        let full = table.to_entry(false);
        assert_eq!(full.dssp, "LHHEL");
        assert_eq!(full.fasta, "MSDKC");
        assert_eq!(full.resids, "1,2,3,4,6");

        let reduced = table.to_entry(true);
        assert_eq!(reduced.dssp, "LHHEL");
    }

    #[test]
    fn reduction_collapses_helix_and_strand_classes() {
        assert_eq!(SsCode::G.reduce(), 'H');
        assert_eq!(SsCode::I.reduce(), 'H');
        assert_eq!(SsCode::B.reduce(), 'E');
        assert_eq!(SsCode::T.reduce(), 'L');
        assert_eq!(SsCode::S.reduce(), 'L');
        assert_eq!(SsCode::P.reduce(), 'L');
    }

    #[test]
    fn entry_resid_numbers_round_trip() {
        let entry = DsspEntry {
            dssp: "HEL".into(),
            fasta: "MSD".into(),
            resids: "4,5,9".into(),
        };
        assert_eq!(entry.resid_numbers().unwrap(), vec![4, 5, 9]);
        assert_eq!(entry.len(), 3);

        let bad = DsspEntry {
            dssp: "H".into(),
            fasta: "M".into(),
            resids: "4,x".into(),
        };
        assert!(matches!(
            bad.resid_numbers(),
            Err(DsspError::InvalidResidList(_))
        ));
    }
}
