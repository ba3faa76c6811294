//! Filename labels derived from λ values.
//!
//! The encoding is lossy: the value is rendered with six fractional digits, a
//! leading `0.` is dropped, and the string is cut where the run of zeros that
//! ends at the rightmost `0` begins. Published sweep outputs are named this
//! way, so the cut is kept even when it lands inside the digits
//! (`0.120345` → `_12`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::types::LambdaPair;

pub const MODEL_EXTENSION: &str = ".xml";

pub fn lambda_label(value: f64) -> String {
    let rendered = format!("{value:.6}");
    let digits = rendered.strip_prefix("0.").unwrap_or(&rendered);

    let Some(last_zero) = digits.rfind('0') else {
        return format!("_{digits}");
    };
    let bytes = digits.as_bytes();
    let mut cut = last_zero;
    while cut > 0 && bytes[cut - 1] == b'0' {
        cut -= 1;
    }
    format!("_{}", &digits[..cut])
}

/// `<prefix><label(λ1)><label(λ2)>.xml`, used for every fitted sweep pair.
pub fn sweep_output_path(prefix: &Path, pair: LambdaPair) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(lambda_label(pair.lambda1));
    name.push(lambda_label(pair.lambda2));
    name.push(MODEL_EXTENSION);
    PathBuf::from(name)
}

/// `<prefix>.xml`, used in single-pair mode.
pub fn single_output_path(prefix: &Path) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(MODEL_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_values_drop_prefix_and_trailing_zeros() {
        assert_eq!(lambda_label(0.1), "_1");
        assert_eq!(lambda_label(0.25), "_25");
        assert_eq!(lambda_label(0.1000), "_1");
        assert_eq!(lambda_label(0.333), "_333");
        assert_eq!(lambda_label(0.105), "_105");
        assert_eq!(lambda_label(0.05), "_05");
    }

    #[test]
    fn values_without_zero_digits_are_left_intact() {
        assert_eq!(lambda_label(0.123456), "_123456");
        assert_eq!(lambda_label(0.333333), "_333333");
    }

    #[test]
    fn cut_lands_at_rightmost_zero_run() {
        assert_eq!(lambda_label(0.120345), "_12");
        assert_eq!(lambda_label(0.0), "_");
        assert_eq!(lambda_label(1.0), "_1.");
        assert_eq!(lambda_label(10.0), "_10.");
        assert_eq!(lambda_label(2.5), "_2.5");
    }

    #[test]
    fn encoding_is_deterministic_but_lossy() {
        assert_eq!(lambda_label(0.7), lambda_label(0.7));
        // Seven significant fractional digits collapse to six.
        assert_eq!(lambda_label(0.1000001), lambda_label(0.1));
    }

    #[test]
    fn output_paths_append_labels_to_prefix() {
        let pair = LambdaPair::new(0.1, 0.25).unwrap();
        assert_eq!(
            sweep_output_path(Path::new("out/run"), pair),
            PathBuf::from("out/run_1_25.xml")
        );
        assert_eq!(
            single_output_path(Path::new("out/run")),
            PathBuf::from("out/run.xml")
        );
    }
}
