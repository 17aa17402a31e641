//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (USV_GUIDE_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A parameter whose value is outside its allowed range.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Parameter {name} = {value} is invalid, it must be {requirement}")]
pub struct InvalidParam {
    pub name: &'static str,
    pub value: f64,
    pub requirement: &'static str,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$USV_GUIDE_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError> 
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_guide_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path, ignoring the software root.
pub fn load_from_path<P, T>(path: T) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    T: AsRef<Path>
{
    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e))
    };

    from_toml_str(params_str.as_str())
}

/// Parse parameters from a TOML string
pub fn from_toml_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

/// Require that `valid` holds for a parameter value.
///
/// `valid` should be written so that a NaN value makes it false.
pub fn require(
    name: &'static str,
    value: f64,
    valid: bool,
    requirement: &'static str
) -> Result<(), InvalidParam> {
    if valid {
        Ok(())
    }
    else {
        Err(InvalidParam { name, value, requirement })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct TestParams {
        gain: f64,
        names: Vec<String>
    }

    #[test]
    fn test_from_toml_str() {
        let p: TestParams = from_toml_str("gain = 1.5\nnames = [\"a\", \"b\"]").unwrap();
        assert_eq!(p.gain, 1.5);
        assert_eq!(p.names.len(), 2);

        let bad: Result<TestParams, _> = from_toml_str("gain = \"high\"");
        assert!(matches!(bad, Err(LoadError::DeserialiseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let res: Result<TestParams, _> = load_from_path("/definitely/not/a/params.toml");
        assert!(matches!(res, Err(LoadError::FileLoadError(_))));
    }

    #[test]
    fn test_require() {
        assert!(require("gain", 1.0, 1.0 > 0.0, "positive").is_ok());

        let err = require("gain", std::f64::NAN, std::f64::NAN > 0.0, "positive").unwrap_err();
        assert_eq!(err.name, "gain");
        assert_eq!(err.requirement, "positive");
    }
}
