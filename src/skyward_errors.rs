use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkywardError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unable to load Earth orientation corrections: {0}")]
    CorrectionsLoadError(String),

    #[error("Unable to read the planetary ephemeris: {0}")]
    EphemerisError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Base dir creation error for the correction cache: {0}")]
    UnableToCreateBaseDir(String),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Wall clock unavailable: {0}")]
    ClockError(String),
}

impl From<hifitime::HifitimeError> for SkywardError {
    fn from(err: hifitime::HifitimeError) -> Self {
        SkywardError::ClockError(err.to_string())
    }
}

impl PartialEq for SkywardError {
    fn eq(&self, other: &Self) -> bool {
        use SkywardError::*;
        match (self, other) {
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (InvalidValue(a), InvalidValue(b)) => a == b,
            (CorrectionsLoadError(a), CorrectionsLoadError(b)) => a == b,
            (EphemerisError(a), EphemerisError(b)) => a == b,

            // Not comparable: same variant means equal
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "download")]
            (ReqwestError(_), ReqwestError(_)) => true,

            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (ClockError(a), ClockError(b)) => a == b,

            _ => false,
        }
    }
}

#[cfg(test)]
mod skyward_errors_test {
    use super::*;

    #[test]
    fn test_error_equality() {
        assert_eq!(
            SkywardError::InvalidDate("month 13".into()),
            SkywardError::InvalidDate("month 13".into())
        );
        assert_ne!(
            SkywardError::InvalidDate("month 13".into()),
            SkywardError::InvalidValue("month 13".into())
        );

        let io_a: SkywardError = std::io::Error::new(std::io::ErrorKind::NotFound, "a").into();
        let io_b: SkywardError = std::io::Error::other("b").into();
        assert_eq!(io_a, io_b);
    }

    #[test]
    fn test_error_display() {
        let err = SkywardError::CorrectionsLoadError("finals2000A.all".into());
        assert_eq!(
            err.to_string(),
            "Unable to load Earth orientation corrections: finals2000A.all"
        );
    }
}
