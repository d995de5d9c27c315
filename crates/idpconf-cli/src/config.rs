use crate::cli::AttachArgs;
use crate::error::{CliError, Result};
use idpconfgen::engine::config::{AttachConfig, AttachConfigBuilder};
use idpconfgen::engine::graft::DisorderCase;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The attach configuration as it appears in a TOML file; every field is
/// optional so command-line arguments can fill the gaps.
///
/// ```toml
/// case = "c-idr"
/// tolerance = 0.4
/// max-rotation = 64
/// radii = "my-radii.toml"
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialAttachConfig {
    pub case: Option<String>,
    pub tolerance: Option<f64>,
    pub max_rotation: Option<usize>,
    pub max_clash: Option<usize>,
    pub radii: Option<PathBuf>,
}

impl PartialAttachConfig {
    /// Loads the partial configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        debug!("loaded attach configuration from {}", path.display());
        Ok(config)
    }

    /// Merges file values with command-line arguments; arguments win.
    ///
    /// Returns the final engine configuration and the radii file to use, if
    /// any.
    ///
    /// # Errors
    ///
    /// Returns an error when the case is given by neither source, or when a
    /// value fails validation.
    pub fn merge_with_cli(&self, args: &AttachArgs) -> Result<(AttachConfig, Option<PathBuf>)> {
        let case: DisorderCase = match (&args.case, &self.case) {
            (Some(arg), _) => (*arg).into(),
            (None, Some(text)) => text
                .parse()
                .map_err(|e| CliError::Config(format!("{e}")))?,
            (None, None) => {
                return Err(CliError::Config(
                    "disorder case missing: pass --case or set `case` in the config file"
                        .to_string(),
                ));
            }
        };

        let mut builder = AttachConfigBuilder::new().case(case);
        if let Some(tolerance) = args.tolerance.or(self.tolerance) {
            if !(0.0..=1.0).contains(&tolerance) {
                return Err(CliError::Argument(format!(
                    "tolerance must be within [0, 1], got {tolerance}"
                )));
            }
            builder = builder.tolerance(tolerance);
        }
        if let Some(max_rotation) = args.max_rotation.or(self.max_rotation) {
            builder = builder.max_rotation(max_rotation);
        }
        if let Some(max_clash) = args.max_clash.or(self.max_clash) {
            builder = builder.max_clash(max_clash);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        let radii = args.radii.clone().or_else(|| self.radii.clone());
        Ok((config, radii))
    }
}
