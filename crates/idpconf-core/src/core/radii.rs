use phf::phf_map;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

// Tsai, Taylor & Chothia (1999), J. Mol. Biol. 290, 253-266.
static TSAI_1999: phf::Map<&'static str, f64> = phf_map! {
    "C" => 1.70,
    "H" => 1.00,
    "N" => 1.625,
    "O" => 1.480,
    "P" => 1.871,
    "S" => 1.782,
};

#[derive(Debug, Error)]
pub enum RadiiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse radii file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No van der Waals radius known for element '{element}' in set '{set}'")]
    UnknownElement { element: String, set: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RadiiFileData {
    name: Option<String>,
    radii: HashMap<String, f64>,
}

/// A named set of per-element van der Waals radii, in Angstroms.
///
/// The built-in set is the Tsai-1999 parameterization used for steric clash
/// checks. Alternative sets load from TOML files of the form:
///
/// ```toml
/// name = "my-radii"
///
/// [radii]
/// C = 1.75
/// N = 1.60
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RadiiSet {
    name: String,
    map: HashMap<String, f64>,
}

impl RadiiSet {
    /// The built-in Tsai-1999 radii.
    pub fn tsai_1999() -> Self {
        Self {
            name: "tsai-1999".to_string(),
            map: TSAI_1999
                .entries()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Loads a radii set from a TOML file.
    ///
    /// Element symbols are canonicalized to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, RadiiError> {
        let text = std::fs::read_to_string(&path)?;
        let data: RadiiFileData = toml::from_str(&text)?;
        let name = data.name.unwrap_or_else(|| {
            path.as_ref()
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom")
                .to_string()
        });
        Ok(Self {
            name,
            map: data
                .radii
                .into_iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v))
                .collect(),
        })
    }

    /// The name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The radius for an element symbol (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`RadiiError::UnknownElement`] naming the element and set.
    pub fn get(&self, element: &str) -> Result<f64, RadiiError> {
        let key = element.trim().to_ascii_uppercase();
        self.map
            .get(&key)
            .copied()
            .ok_or_else(|| RadiiError::UnknownElement {
                element: element.to_string(),
                set: self.name.clone(),
            })
    }
}

impl Default for RadiiSet {
    fn default() -> Self {
        Self::tsai_1999()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_set_carries_the_organic_elements() {
        let radii = RadiiSet::tsai_1999();
        assert_eq!(radii.name(), "tsai-1999");
        assert!((radii.get("C").unwrap() - 1.70).abs() < 1e-12);
        assert!((radii.get("N").unwrap() - 1.625).abs() < 1e-12);
        assert!((radii.get("O").unwrap() - 1.480).abs() < 1e-12);
        assert!((radii.get("S").unwrap() - 1.782).abs() < 1e-12);
        assert!((radii.get("H").unwrap() - 1.00).abs() < 1e-12);
        assert!((radii.get("P").unwrap() - 1.871).abs() < 1e-12);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let radii = RadiiSet::tsai_1999();
        assert_eq!(radii.get("c").unwrap(), radii.get("C").unwrap());
        assert_eq!(radii.get(" n ").unwrap(), radii.get("N").unwrap());
    }

    #[test]
    fn unknown_element_names_the_set() {
        let radii = RadiiSet::tsai_1999();
        match radii.get("SE") {
            Err(RadiiError::UnknownElement { element, set }) => {
                assert_eq!(element, "SE");
                assert_eq!(set, "tsai-1999");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn loads_custom_set_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"fat-carbons\"\n\n[radii]\nc = 2.0\nN = 1.5").unwrap();

        let radii = RadiiSet::from_toml_path(file.path()).unwrap();
        assert_eq!(radii.name(), "fat-carbons");
        assert!((radii.get("C").unwrap() - 2.0).abs() < 1e-12);
        assert!((radii.get("n").unwrap() - 1.5).abs() < 1e-12);
        assert!(radii.get("O").is_err());
    }

    #[test]
    fn file_without_name_falls_back_to_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slim.toml");
        std::fs::write(&path, "[radii]\nC = 1.1\n").unwrap();

        let radii = RadiiSet::from_toml_path(&path).unwrap();
        assert_eq!(radii.name(), "slim");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "radii = \"not a table\"").unwrap();
        assert!(matches!(
            RadiiSet::from_toml_path(&path),
            Err(RadiiError::Parse(_))
        ));
    }
}
