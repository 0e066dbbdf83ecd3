use crate::solver::core::traits::Settings;
use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard-form solver type implementing the [`Settings`](crate::solver::core::traits::Settings) trait

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "4000")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///start from the previous solution
    #[builder(default = "false")]
    pub warm_start: bool,

    ///absolute convergence tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub eps_abs: T,

    ///relative convergence tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub eps_rel: T,

    ///primal infeasibility tolerance
    #[builder(default = "(1e-7).as_T()")]
    pub eps_prim_inf: T,

    ///dual infeasibility tolerance
    #[builder(default = "(1e-7).as_T()")]
    pub eps_dual_inf: T,

    ///initial ADMM step size
    #[builder(default = "(0.1).as_T()")]
    pub rho: T,

    ///ADMM primal regularization
    #[builder(default = "(1e-6).as_T()")]
    pub sigma: T,

    ///ADMM relaxation parameter, in (0,2)
    #[builder(default = "(1.6).as_T()")]
    pub alpha: T,

    ///enable adaptive step size
    #[builder(default = "true")]
    pub adaptive_rho: bool,

    ///iterations between step size updates
    #[builder(default = "10")]
    pub adaptive_rho_interval: u32,

    ///minimum ratio between new and old step size
    ///before the KKT system is refactored
    #[builder(default = "(5.0).as_T()")]
    pub adaptive_rho_tolerance: T,

    ///enable solution polishing
    #[builder(default = "true")]
    pub polish: bool,

    ///regularization used in the polishing system
    #[builder(default = "(1e-6).as_T()")]
    pub polish_delta: T,

    ///iterative refinement steps in polishing
    #[builder(default = "3")]
    pub polish_refine_iter: u32,

    ///enable data equilibration pre-scaling
    #[builder(default = "true")]
    pub equilibrate_enable: bool,

    /// maximum equilibration scaling iterations
    #[builder(default = "10")]
    pub equilibrate_max_iter: u32,

    ///minimum equilibration scaling allowed
    #[builder(default = "(1e-4).as_T()")]
    pub equilibrate_min_scaling: T,

    ///maximum equilibration scaling allowed
    #[builder(default = "(1e+4).as_T()")]
    pub equilibrate_max_scaling: T,

    ///constraint bounds at or beyond this magnitude are infinite
    #[builder(default = "(1e20).as_T()")]
    pub infinite_bound: T,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        // all fields carry builder defaults, and these pass validation
        match DefaultSettingsBuilder::<T>::default().build() {
            Ok(settings) => settings,
            Err(e) => unreachable!("default settings are invalid: {e}"),
        }
    }
}

macro_rules! check_immutable_setting {
    ($self:expr, $prev:expr, $field:ident) => {
        if $self.$field != $prev.$field {
            return Err(SettingsError::ImmutableSetting(stringify!($field)));
        }
    };
}

// fails if `$cond` does not hold for the field value
macro_rules! check_field {
    ($val:expr, $field:ident, $cond:expr) => {
        if let Some(v) = $val {
            if !($cond)(v) {
                return Err(SettingsError::BadFieldValue(stringify!($field)));
            }
        }
    };
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    //NB: CoreSettings is typedef'd to DefaultSettings
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }

    /// Checks that the settings are valid, i.e. that tolerances are
    /// positive and that the ADMM parameters are in their legal ranges.
    fn validate(&self) -> Result<(), SettingsError> {
        validate_fields(
            Some(self.time_limit),
            Some(self.eps_abs),
            Some(self.eps_rel),
            Some(self.eps_prim_inf),
            Some(self.eps_dual_inf),
            Some(self.rho),
            Some(self.sigma),
            Some(self.alpha),
            Some(self.adaptive_rho_tolerance),
            Some(self.polish_delta),
            Some(self.equilibrate_min_scaling),
            Some(self.equilibrate_max_scaling),
            Some(self.infinite_bound),
        )?;

        if self.equilibrate_min_scaling > self.equilibrate_max_scaling {
            return Err(SettingsError::BadFieldValue("equilibrate_min_scaling"));
        }
        Ok(())
    }

    /// check that a settings object is valid as an updated collection
    /// of settings for a solver that has already been initialized.   This
    /// should reject changed to parameters that are only applicable during
    /// solver initialization.  Calls `validate()` internally to check
    /// that values are also legal.
    fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError> {
        self.validate()?;

        check_immutable_setting!(self, prev, equilibrate_enable);
        check_immutable_setting!(self, prev, equilibrate_max_iter);
        check_immutable_setting!(self, prev, equilibrate_min_scaling);
        check_immutable_setting!(self, prev, equilibrate_max_scaling);
        check_immutable_setting!(self, prev, infinite_bound);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check that any explicitly set values are valid
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_fields(
            self.time_limit,
            self.eps_abs,
            self.eps_rel,
            self.eps_prim_inf,
            self.eps_dual_inf,
            self.rho,
            self.sigma,
            self.alpha,
            self.adaptive_rho_tolerance,
            self.polish_delta,
            self.equilibrate_min_scaling,
            self.equilibrate_max_scaling,
            self.infinite_bound,
        )
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn validate_fields<T: FloatT>(
    time_limit: Option<f64>,
    eps_abs: Option<T>,
    eps_rel: Option<T>,
    eps_prim_inf: Option<T>,
    eps_dual_inf: Option<T>,
    rho: Option<T>,
    sigma: Option<T>,
    alpha: Option<T>,
    adaptive_rho_tolerance: Option<T>,
    polish_delta: Option<T>,
    equilibrate_min_scaling: Option<T>,
    equilibrate_max_scaling: Option<T>,
    infinite_bound: Option<T>,
) -> Result<(), SettingsError> {
    let nonneg = |v: T| v >= T::zero();
    let positive = |v: T| v > T::zero() && v.is_finite();

    check_field!(time_limit, time_limit, |v: f64| v >= 0.);
    check_field!(eps_abs, eps_abs, nonneg);
    check_field!(eps_rel, eps_rel, nonneg);
    check_field!(eps_prim_inf, eps_prim_inf, positive);
    check_field!(eps_dual_inf, eps_dual_inf, positive);
    check_field!(rho, rho, positive);
    check_field!(sigma, sigma, positive);
    check_field!(alpha, alpha, |v: T| v > T::zero() && v < (2.).as_T());
    check_field!(adaptive_rho_tolerance, adaptive_rho_tolerance, |v: T| v >= T::one());
    check_field!(polish_delta, polish_delta, positive);
    check_field!(equilibrate_min_scaling, equilibrate_min_scaling, positive);
    check_field!(equilibrate_max_scaling, equilibrate_max_scaling, positive);
    check_field!(infinite_bound, infinite_bound, positive);

    // both tolerances zero can never converge
    if let (Some(a), Some(r)) = (eps_abs, eps_rel) {
        if a == T::zero() && r == T::zero() {
            return Err(SettingsError::BadFieldValue("eps_abs"));
        }
    }

    Ok(())
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = DefaultSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings, DefaultSettings::default());
    assert_eq!(settings.max_iter, 4000);
    assert_eq!(settings.rho, 0.1);

    // fail on out of range values
    assert!(DefaultSettingsBuilder::<f64>::default()
        .alpha(2.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .rho(-1.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .eps_abs(0.0)
        .eps_rel(0.0)
        .build()
        .is_err());

    // directly construct a bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        sigma: 0.0,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("sigma"))
    );

    let settings = DefaultSettings::<f64> {
        equilibrate_min_scaling: 10.,
        equilibrate_max_scaling: 1.,
        ..DefaultSettings::default()
    };
    assert!(settings.validate().is_err());

    // try to overlay prohibited update values
    let oldsettings = DefaultSettings::<f64>::default();
    let newsettings = DefaultSettings::<f64> {
        equilibrate_enable: false,
        ..DefaultSettings::default()
    };
    assert_eq!(
        newsettings.validate_as_update(&oldsettings),
        Err(SettingsError::ImmutableSetting("equilibrate_enable"))
    );

    let newsettings = DefaultSettings::<f64> {
        infinite_bound: 1e10,
        ..DefaultSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_err());

    // try to overlay allowed update values
    let oldsettings = DefaultSettings::<f64> {
        max_iter: 10,
        ..DefaultSettings::default()
    };

    let newsettings = DefaultSettings::<f64> {
        max_iter: 11,
        rho: 1.0,
        warm_start: true,
        ..DefaultSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_ok());
}
