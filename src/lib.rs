pub mod comparison;
pub mod constants;
pub mod greenwave_errors;
pub mod index_math;
pub mod observations;
pub mod phenology;
pub mod time;

pub use comparison::{compare_series, SeriesComparison};
pub use constants::{DayOfYear, IndexValue, Reflectance, Series};
pub use greenwave_errors::GreenwaveError;
pub use index_math::{dvi, ndvi};
pub use observations::{DataSource, Observation, SeriesExt, SeriesKey};
pub use phenology::fitter::{fit_phenology, rmse};
pub use phenology::model::double_logistic;
pub use phenology::series_fit::{
    fit_result_for, FitSummary, FullFitResult, ObsCountStats, SeriesSet, SeriesSetFit,
};
pub use phenology::{FitParams, FitParamsBuilder, ParamDomain, PhenologyParams, PARAM_DOMAINS};
