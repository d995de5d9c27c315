use crate::core::models::atom::RecordKind;
use crate::core::models::builder::{AtomSpec, StructureBuilder};
use crate::core::models::system::StructureModel;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not find `_atom_site.` entries in the mmCIF data")]
    MissingAtomSite,
    #[error("Could not find the '#' terminating the `_atom_site` loop")]
    UnterminatedLoop,
    #[error("Data row on line {line} has {found} values but {expected} tags were declared")]
    RowMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Missing `_atom_site` field '{field}' on line {line}")]
    MissingField { line: usize, field: &'static str },
    #[error("Invalid integer for '{field}' on line {line} (value: '{value}')")]
    InvalidInt {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("Invalid float for '{field}' on line {line} (value: '{value}')")]
    InvalidFloat {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Reader for the `_atom_site` loop of mmCIF files.
///
/// Only the atom records are interpreted; every other data block is skipped.
/// `label_*` tags are preferred, with `auth_*` fallbacks both when a tag is
/// absent and when its value is a `?`/`.` placeholder, matching how
/// coordinate archives mix the two families.
pub struct CifFile;

struct AtomSiteLoop {
    tags: Vec<String>,
    tag_index: HashMap<String, usize>,
    first_row_line: usize,
}

impl CifFile {
    /// Parses mmCIF text into a structure model.
    ///
    /// # Errors
    ///
    /// Returns an error when the `_atom_site` block is missing, the loop is
    /// not terminated, or a row has malformed values.
    pub fn read_str(data: &str) -> Result<StructureModel, CifError> {
        let lines: Vec<&str> = data.lines().collect();
        let atom_site = find_atom_site_loop(&lines)?;

        let mut builder = StructureBuilder::new();
        let mut atoms_parsed = 0usize;
        let mut current_chain: Option<char> = None;
        let mut current_residue: Option<(isize, char)> = None;

        let mut terminated = false;
        for (offset, raw) in lines[atom_site.first_row_line..].iter().enumerate() {
            let line_num = atom_site.first_row_line + offset + 1;
            if raw.starts_with('#') {
                terminated = true;
                break;
            }
            if raw.trim().is_empty() {
                continue;
            }

            let values = split_cif_line(raw);
            if values.len() < atom_site.tags.len() {
                return Err(CifError::RowMismatch {
                    line: line_num,
                    expected: atom_site.tags.len(),
                    found: values.len(),
                });
            }

            let row = Row {
                loop_: &atom_site,
                values: &values,
                line: line_num,
            };

            let record = row
                .get("_atom_site.group_PDB")
                .and_then(|v| RecordKind::from_str(v).ok())
                .unwrap_or(RecordKind::Atom);

            let serial: usize = row.parse_int("_atom_site.id", "id")?;
            let name = row.fallback("_atom_site.label_atom_id", "_atom_site.auth_atom_id");
            let name = name.ok_or(CifError::MissingField {
                line: line_num,
                field: "atom_id",
            })?;

            let alt_loc = row
                .fallback("_atom_site.label_alt_id", "_atom_site.auth_alt_id")
                .and_then(|v| v.chars().next())
                .unwrap_or(' ');
            if alt_loc != ' ' && alt_loc != 'A' {
                continue;
            }

            let res_name = row
                .fallback("_atom_site.label_comp_id", "_atom_site.auth_comp_id")
                .ok_or(CifError::MissingField {
                    line: line_num,
                    field: "comp_id",
                })?;
            let chain_id = row
                .fallback("_atom_site.label_asym_id", "_atom_site.auth_asym_id")
                .and_then(|v| v.chars().next())
                .unwrap_or('A');
            let res_seq = row.parse_seq_id()?;
            let icode = row
                .get("_atom_site.pdbx_PDB_ins_code")
                .and_then(|v| v.chars().next())
                .unwrap_or(' ');

            let x = row.parse_float("_atom_site.Cartn_x", "Cartn_x")?;
            let y = row.parse_float("_atom_site.Cartn_y", "Cartn_y")?;
            let z = row.parse_float("_atom_site.Cartn_z", "Cartn_z")?;

            let occupancy = row.parse_optional_float("_atom_site.occupancy", "occupancy")?;
            let temp_factor =
                row.parse_optional_float("_atom_site.B_iso_or_equiv", "B_iso_or_equiv")?;
            let element = row.get("_atom_site.type_symbol");
            let charge = row.get("_atom_site.pdbx_formal_charge").unwrap_or_default();

            if current_chain != Some(chain_id) {
                builder.start_chain(chain_id);
                current_chain = Some(chain_id);
                current_residue = None;
            }
            if current_residue != Some((res_seq, icode)) {
                builder.start_residue(res_seq, res_name, icode);
                current_residue = Some((res_seq, icode));
            }

            builder.add_atom(AtomSpec {
                serial,
                name,
                record,
                alt_loc,
                element,
                position: Point3::new(x, y, z),
                occupancy,
                temp_factor,
                charge,
            });
            atoms_parsed += 1;
        }

        if !terminated {
            return Err(CifError::UnterminatedLoop);
        }
        if atoms_parsed == 0 {
            return Err(CifError::MissingAtomSite);
        }
        Ok(builder.build())
    }

    /// Parses mmCIF data from a buffered reader.
    pub fn read_from(reader: &mut impl BufRead) -> Result<StructureModel, CifError> {
        let mut data = String::new();
        reader.read_to_string(&mut data)?;
        Self::read_str(&data)
    }
}

fn find_atom_site_loop(lines: &[&str]) -> Result<AtomSiteLoop, CifError> {
    let mut tags = Vec::new();
    let mut found = false;

    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("_atom_site.") {
            found = true;
            tags.push(line.trim().to_string());
        } else if found {
            let tag_index = tags
                .iter()
                .enumerate()
                .map(|(idx, tag)| (tag.clone(), idx))
                .collect();
            return Ok(AtomSiteLoop {
                tags,
                tag_index,
                first_row_line: i,
            });
        }
    }
    Err(CifError::MissingAtomSite)
}

struct Row<'a> {
    loop_: &'a AtomSiteLoop,
    values: &'a [String],
    line: usize,
}

impl Row<'_> {
    /// Returns the value for `tag` with `?`/`.` placeholders mapped to `None`.
    fn get(&self, tag: &str) -> Option<&str> {
        let idx = *self.loop_.tag_index.get(tag)?;
        let value = self.values[idx].as_str();
        match value {
            "?" | "." | "" => None,
            v => Some(v),
        }
    }

    fn fallback(&self, label_tag: &str, auth_tag: &str) -> Option<&str> {
        self.get(label_tag).or_else(|| self.get(auth_tag))
    }

    fn parse_int(&self, tag: &str, field: &'static str) -> Result<usize, CifError> {
        let value = self.get(tag).ok_or(CifError::MissingField {
            line: self.line,
            field,
        })?;
        value.parse().map_err(|_| CifError::InvalidInt {
            line: self.line,
            field,
            value: value.into(),
        })
    }

    fn parse_seq_id(&self) -> Result<isize, CifError> {
        let value = self
            .get("_atom_site.label_seq_id")
            .filter(|v| v.parse::<isize>().is_ok())
            .or_else(|| self.get("_atom_site.auth_seq_id"))
            .ok_or(CifError::MissingField {
                line: self.line,
                field: "seq_id",
            })?;
        value.parse().map_err(|_| CifError::InvalidInt {
            line: self.line,
            field: "seq_id",
            value: value.into(),
        })
    }

    fn parse_float(&self, tag: &str, field: &'static str) -> Result<f64, CifError> {
        let value = self.get(tag).ok_or(CifError::MissingField {
            line: self.line,
            field,
        })?;
        value.parse().map_err(|_| CifError::InvalidFloat {
            line: self.line,
            field,
            value: value.into(),
        })
    }

    fn parse_optional_float(
        &self,
        tag: &str,
        field: &'static str,
    ) -> Result<Option<f64>, CifError> {
        match self.get(tag) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| CifError::InvalidFloat {
                line: self.line,
                field,
                value: value.into(),
            }),
        }
    }
}

// Tokenizes one data row: single- and double-quoted substrings are single
// tokens, everything else splits on whitespace.
fn split_cif_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '\'' || c == '"' {
            let quote = c;
            chars.next();
            let mut token = String::new();
            for ch in chars.by_ref() {
                if ch == quote {
                    break;
                }
                token.push(ch);
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(token);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_CIF: &str = "\
data_1ABC
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.type_symbol
_atom_site.pdbx_formal_charge
ATOM   1 N  . GLY A 1 ? 11.104 6.134 -6.504 1.00 0.00 N ?
ATOM   2 CA . GLY A 1 ? 11.639 6.071 -5.147 1.00 0.00 C ?
ATOM   3 N  . ALA A 2 ? 10.101 5.978 -3.250 1.00 0.00 N ?
HETATM 4 O  . HOH B 101 ? 2.000 3.000 4.000 1.00 20.00 O ?
#
";

    #[test]
    fn parses_atom_site_loop() {
        let model = CifFile::read_str(MINIMAL_CIF).unwrap();
        assert_eq!(model.atom_count(), 4);
        assert_eq!(model.residue_count(), 3);
        assert_eq!(model.chains_ordered().count(), 2);

        let chain_a = model.find_chain_by_id('A').unwrap();
        let gly = model.find_residue_by_id(chain_a, 1, ' ').unwrap();
        let ca = model.residue(gly).unwrap().atom_by_name("CA").unwrap();
        let atom = model.atom(ca).unwrap();
        assert!((atom.position.x - 11.639).abs() < 1e-9);
        assert_eq!(atom.element, "C");
    }

    #[test]
    fn placeholder_seq_id_without_auth_fallback_is_an_error() {
        let data = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
HETATM 1 O HOH B . 2.0 3.0 4.0
#
";
        let err = CifFile::read_str(data).unwrap_err();
        assert!(matches!(
            err,
            CifError::MissingField {
                field: "seq_id",
                ..
            }
        ));
    }

    #[test]
    fn auth_tags_backfill_missing_label_values() {
        let data = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.auth_atom_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
ATOM 1 CA GLY A . 7 1.0 2.0 3.0
#
";
        let model = CifFile::read_str(data).unwrap();
        let chain_a = model.find_chain_by_id('A').unwrap();
        assert!(model.find_residue_by_id(chain_a, 7, ' ').is_some());
    }

    #[test]
    fn quoted_values_stay_single_tokens() {
        let tokens = split_cif_line("ATOM 1 \"C1'\" 'O 2' rest");
        assert_eq!(tokens, vec!["ATOM", "1", "C1'", "O 2", "rest"]);
    }

    #[test]
    fn missing_atom_site_block_is_an_error() {
        let err = CifFile::read_str("data_block\n_cell.length_a 10\n#\n").unwrap_err();
        assert!(matches!(err, CifError::MissingAtomSite));
    }

    #[test]
    fn unterminated_loop_is_an_error() {
        let data = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
ATOM 1 N GLY A 1 1.0 2.0 3.0
";
        let err = CifFile::read_str(data).unwrap_err();
        assert!(matches!(err, CifError::UnterminatedLoop));
    }

    #[test]
    fn short_row_reports_expected_and_found_counts() {
        let data = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
ATOM 1 N
#
";
        let err = CifFile::read_str(data).unwrap_err();
        match err {
            CifError::RowMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, 9);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
