use crate::core::io::traits::StructureFile;
use crate::core::models::atom::RecordKind;
use crate::core::models::builder::{AtomSpec, StructureBuilder};
use crate::core::models::system::StructureModel;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach the coordinate columns)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line_num: usize, s: &str, columns: &str) -> Result<f64, PdbError> {
    s.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: s.into(),
        },
    })
}

/// PDB format v3, `ATOM`/`HETATM` records only.
///
/// Reading keeps the first alternate location (blank or `A`) and stops at
/// the first `END`/`ENDMDL`, so multi-model files yield model 1. Writing
/// follows the v3 column discipline, including the atom-name alignment rule
/// for short names of the organic elements.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<StructureModel, Self::Error> {
        let mut builder = StructureBuilder::new();
        let mut atoms_parsed = 0usize;

        let mut current_chain: Option<char> = None;
        let mut current_residue: Option<(isize, char)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_str = slice_and_trim(&line, 0, 6);
            let record = match RecordKind::from_str(record_str) {
                Ok(r) => r,
                Err(()) => {
                    if record_str == "END" || record_str == "ENDMDL" {
                        break;
                    }
                    continue;
                }
            };

            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let alt_loc = line.get(16..17).and_then(|s| s.chars().next()).unwrap_or(' ');
            if alt_loc != ' ' && alt_loc != 'A' {
                continue;
            }

            let name = slice_and_trim(&line, 12, 16);
            if name.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField {
                        columns: "13-16".into(),
                    },
                });
            }

            let serial_str = slice_and_trim(&line, 6, 11);
            let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "7-11".into(),
                    value: serial_str.into(),
                },
            })?;

            let res_name = slice_and_trim(&line, 17, 20);
            let chain_id = line.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
            let chain_id = if chain_id == ' ' { 'A' } else { chain_id };

            let res_seq_str = slice_and_trim(&line, 22, 26);
            let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let icode = line.get(26..27).and_then(|s| s.chars().next()).unwrap_or(' ');

            let x = parse_float(line_num, slice_and_trim(&line, 30, 38), "31-38")?;
            let y = parse_float(line_num, slice_and_trim(&line, 38, 46), "39-46")?;
            let z = parse_float(line_num, slice_and_trim(&line, 46, 54), "47-54")?;

            let occupancy = match slice_and_trim(&line, 54, 60) {
                "" => None,
                s => Some(parse_float(line_num, s, "55-60")?),
            };
            let temp_factor = match slice_and_trim(&line, 60, 66) {
                "" => None,
                s => Some(parse_float(line_num, s, "61-66")?),
            };
            let element = slice_and_trim(&line, 76, 78);
            let charge = slice_and_trim(&line, 78, 80);

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
                element: if element.is_empty() {
                    None
                } else {
                    Some(element)
                },
                position: Point3::new(x, y, z),
                occupancy,
                temp_factor,
                charge,
            });
            atoms_parsed += 1;
        }

        if atoms_parsed == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(builder.build())
    }

    fn write_to(model: &StructureModel, writer: &mut impl Write) -> Result<(), Self::Error> {
        for (_, chain) in model.chains_ordered() {
            for &residue_id in chain.residues() {
                let residue = match model.residue(residue_id) {
                    Some(r) => r,
                    None => continue,
                };
                for &atom_id in residue.atoms() {
                    let atom = match model.atom(atom_id) {
                        Some(a) => a,
                        None => continue,
                    };
                    writeln!(
                        writer,
                        "{:<6}{:>5} {}{}{:<3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}{:>2}{:<2}",
                        atom.record.label(),
                        atom.serial,
                        format_atom_name(&atom.name),
                        atom.alt_loc,
                        residue.name,
                        chain.id,
                        residue.number,
                        residue.icode,
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.temp_factor,
                        "",
                        atom.element,
                        atom.charge,
                    )?;
                }
            }
        }
        Ok(())
    }
}

// PDB v3 left-pads short names of the organic elements so the element
// aligns with column 14.
fn format_atom_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.len() < 4 && trimmed.starts_with(['C', 'N', 'O', 'S']) {
        format!(" {:<3}", trimmed)
    } else {
        format!("{:<4}", trimmed)
    }
}
