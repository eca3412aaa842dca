use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its allowed range or set of options
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Settings for the [`DirectSolver`](crate::solver::DirectSolver)

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverSettings<T: FloatT> {
    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///direct solve method ("auto", "qdldl" or "lu").  "auto" uses
    ///qdldl for symmetric matrices and lu otherwise
    #[builder(default = r#""auto".to_string()"#)]
    pub direct_solve_method: String,

    ///fill reducing AMD ordering.  Natural ordering if disabled
    #[builder(default = "true")]
    pub reorder_enable: bool,

    ///scaling of the AMD dense row threshold
    #[builder(default = "1.0")]
    pub amd_dense_scale: f64,

    ///enable LDL dynamic regularization
    #[builder(default = "false")]
    pub regularize_enable: bool,

    ///LDL dynamic regularization threshold
    #[builder(default = "(1e-12).as_T()")]
    pub regularize_eps: T,

    ///LDL dynamic regularization shift
    #[builder(default = "(1e-7).as_T()")]
    pub regularize_delta: T,

    ///LU partial pivoting threshold.  The diagonal is kept as the pivot
    ///when at least this fraction of the largest entry in its column
    #[builder(default = "(0.1).as_T()")]
    pub pivot_threshold: T,

    ///LU pivots no larger than this in magnitude are treated as zero
    #[builder(default = "(1e-14).as_T()")]
    pub pivot_tolerance: T,
}

impl<T> Default for SolverSettings<T>
where
    T: FloatT,
{
    fn default() -> SolverSettings<T> {
        SolverSettings {
            verbose: false,
            direct_solve_method: "auto".to_string(),
            reorder_enable: true,
            amd_dense_scale: 1.0,
            regularize_enable: false,
            regularize_eps: (1e-12).as_T(),
            regularize_delta: (1e-7).as_T(),
            pivot_threshold: (0.1).as_T(),
            pivot_tolerance: (1e-14).as_T(),
        }
    }
}

impl<T> SolverSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid: string options name a known
    /// method and numerical values lie in their allowed ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_direct_solve_method(&self.direct_solve_method)?;
        validate_amd_dense_scale(self.amd_dense_scale)?;
        validate_nonnegative("regularize_eps", self.regularize_eps)?;
        validate_nonnegative("regularize_delta", self.regularize_delta)?;
        validate_pivot_threshold(self.pivot_threshold)?;
        validate_nonnegative("pivot_tolerance", self.pivot_tolerance)?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SolverSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SolverSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SolverSettingsBuilder<T>
where
    T: FloatT,
{
    /// check every field that has been set explicitly
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(ref direct_solve_method) = self.direct_solve_method {
            validate_direct_solve_method(direct_solve_method)?;
        }
        if let Some(amd_dense_scale) = self.amd_dense_scale {
            validate_amd_dense_scale(amd_dense_scale)?;
        }
        if let Some(eps) = self.regularize_eps {
            validate_nonnegative("regularize_eps", eps)?;
        }
        if let Some(delta) = self.regularize_delta {
            validate_nonnegative("regularize_delta", delta)?;
        }
        if let Some(threshold) = self.pivot_threshold {
            validate_pivot_threshold(threshold)?;
        }
        if let Some(tol) = self.pivot_tolerance {
            validate_nonnegative("pivot_tolerance", tol)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_direct_solve_method(direct_solve_method: &str) -> Result<(), SettingsError> {
    match direct_solve_method {
        "auto" => Ok(()),
        "qdldl" => Ok(()),
        "lu" => Ok(()),
        _ => Err(SettingsError::BadFieldValue("direct_solve_method")),
    }
}

fn validate_amd_dense_scale(scale: f64) -> Result<(), SettingsError> {
    if scale > 0.0 && scale.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("amd_dense_scale"))
    }
}

fn validate_pivot_threshold<T: FloatT>(threshold: T) -> Result<(), SettingsError> {
    if threshold >= T::zero() && threshold <= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("pivot_threshold"))
    }
}

// NaN fails the comparison and is rejected too
fn validate_nonnegative<T: FloatT>(field: &'static str, value: T) -> Result<(), SettingsError> {
    if value >= T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    assert!(SolverSettings::<f64>::default().validate().is_ok());
    assert!(SolverSettingsBuilder::<f64>::default().build().is_ok());

    // fail on a bad method
    let mut settings = SolverSettings::<f64>::default();
    settings.direct_solve_method = "foo".to_string();
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("direct_solve_method"))
    );

    let builder = SolverSettingsBuilder::<f64>::default()
        .direct_solve_method("foo".to_string())
        .build();
    assert!(builder.is_err());

    // numerical ranges
    for builder in [
        SolverSettingsBuilder::<f64>::default()
            .amd_dense_scale(0.0)
            .build(),
        SolverSettingsBuilder::<f64>::default()
            .pivot_threshold(1.5)
            .build(),
        SolverSettingsBuilder::<f64>::default()
            .pivot_tolerance(-1.0)
            .build(),
        SolverSettingsBuilder::<f64>::default()
            .regularize_eps(f64::NAN)
            .build(),
    ] {
        assert!(builder.is_err());
    }

    // limits of the pivot threshold are allowed
    for threshold in [0.0, 1.0] {
        let settings = SolverSettingsBuilder::<f64>::default()
            .pivot_threshold(threshold)
            .build();
        assert!(settings.is_ok());
    }
}
