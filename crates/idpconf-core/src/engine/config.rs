use crate::engine::clash::{ClashParams, derive_budgets};
use crate::engine::graft::DisorderCase;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Configuration for attaching a disordered fragment onto a folded domain.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachConfig {
    /// Where the fragment attaches.
    pub case: DisorderCase,
    /// The tolerance knob the budgets were derived from.
    pub tolerance: f64,
    /// How many random orientations to try before giving up.
    pub max_rotation: usize,
    /// Clash-counting budgets.
    pub clash: ClashParams,
}

/// Builds an [`AttachConfig`], deriving rotation and clash budgets from the
/// tolerance unless explicitly overridden.
#[derive(Default)]
pub struct AttachConfigBuilder {
    case: Option<DisorderCase>,
    tolerance: Option<f64>,
    max_rotation: Option<usize>,
    max_clash: Option<usize>,
}

impl AttachConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case(mut self, case: DisorderCase) -> Self {
        self.case = Some(case);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn max_rotation(mut self, rotations: usize) -> Self {
        self.max_rotation = Some(rotations);
        self
    }

    pub fn max_clash(mut self, clashes: usize) -> Self {
        self.max_clash = Some(clashes);
        self
    }

    pub fn build(self) -> Result<AttachConfig, ConfigError> {
        let case = self.case.ok_or(ConfigError::MissingParameter("case"))?;
        let tolerance = self.tolerance.unwrap_or(0.4);

        let (derived_rotation, mut clash) = derive_budgets(tolerance);
        if let Some(max_clash) = self.max_clash {
            clash.max_clash = max_clash;
        }

        Ok(AttachConfig {
            case,
            tolerance,
            max_rotation: self.max_rotation.unwrap_or(derived_rotation),
            clash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_is_required() {
        let err = AttachConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("case"));
    }

    #[test]
    fn budgets_derive_from_default_tolerance() {
        let config = AttachConfigBuilder::new()
            .case(DisorderCase::CTail)
            .build()
            .unwrap();

        assert_eq!(config.case, DisorderCase::CTail);
        assert!((config.tolerance - 0.4).abs() < 1e-12);
        assert_eq!(config.max_rotation, 153);
        assert_eq!(config.clash.max_clash, 32);
    }

    #[test]
    fn explicit_overrides_win() {
        let config = AttachConfigBuilder::new()
            .case(DisorderCase::NTail)
            .tolerance(0.1)
            .max_rotation(5)
            .max_clash(2)
            .build()
            .unwrap();

        assert_eq!(config.max_rotation, 5);
        assert_eq!(config.clash.max_clash, 2);
        assert!((config.clash.dist_tolerance - 0.1).abs() < 1e-12);
    }
}
