//! Pointwise vegetation-index formulas computed from spectral band reflectances.

use crate::constants::{IndexValue, Reflectance};

/// Normalized Difference Vegetation Index, `(nir - red) / (nir + red)`.
///
/// Returns exactly `0.0` when `nir + red == 0` so that a fully dark pixel
/// never produces a division by zero or a NaN.
///
/// Arguments
/// ---------
/// * `nir`: near-infrared band reflectance
/// * `red`: red band reflectance
///
/// Return
/// ------
/// * the NDVI value
pub fn ndvi(nir: Reflectance, red: Reflectance) -> IndexValue {
    let denom = nir + red;
    if denom == 0.0 {
        return 0.0;
    }
    (nir - red) / denom
}

/// Difference Vegetation Index, `nir - red`. No domain restriction.
pub fn dvi(nir: Reflectance, red: Reflectance) -> IndexValue {
    nir - red
}

#[cfg(test)]
mod index_math_test {
    use super::*;

    #[test]
    fn test_ndvi_nominal() {
        let v = ndvi(0.5, 0.1);
        assert!((v - 0.4 / 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_ndvi_zero_denominator() {
        assert_eq!(ndvi(0.0, 0.0), 0.0);
        assert_eq!(ndvi(0.3, -0.3), 0.0);
    }

    #[test]
    fn test_dvi() {
        assert_eq!(dvi(0.5, 0.1), 0.4);
        assert_eq!(dvi(0.1, 0.5), -0.4);
    }
}
