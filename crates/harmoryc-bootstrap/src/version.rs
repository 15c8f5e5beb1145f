//! Python version parsing and the minimum-version gate.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::BootstrapError;

/// Minimum interpreter for the packaging variant.
pub const BUILD_MIN_VERSION: PythonVersion = PythonVersion::new(3, 9, 0);

/// A CPython `major.minor.patch` version. Ordering is lexicographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from `python --version` output, e.g.
    /// `Python 3.11.4` or `Python 3.13.0rc1`. Python 2 prints to stderr, so
    /// callers pass both streams.
    pub fn from_version_output(output: &str) -> Option<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE.get_or_init(|| {
            Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex")
        });
        let caps = re.captures(output)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses `3`, `3.9` or `3.9.1`.
impl FromStr for PythonVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(format!("expected MAJOR[.MINOR[.PATCH]], got '{}'", s));
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("'{}' is not a version number", part))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

/// Gate: `found` must be at least `required`.
pub fn check_version(found: PythonVersion, required: PythonVersion) -> Result<(), BootstrapError> {
    if found < required {
        return Err(BootstrapError::VersionTooLow {
            detected: found,
            required,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_version_output() {
        assert_eq!(
            PythonVersion::from_version_output("Python 3.11.4\n"),
            Some(PythonVersion::new(3, 11, 4))
        );
        assert_eq!(
            PythonVersion::from_version_output("Python 3.13.0rc1"),
            Some(PythonVersion::new(3, 13, 0))
        );
        assert_eq!(
            PythonVersion::from_version_output("Python 3.9"),
            Some(PythonVersion::new(3, 9, 0))
        );
        assert_eq!(PythonVersion::from_version_output("command not found"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3.9".parse::<PythonVersion>(), Ok(PythonVersion::new(3, 9, 0)));
        assert_eq!("3".parse::<PythonVersion>(), Ok(PythonVersion::new(3, 0, 0)));
        assert_eq!(
            "3.10.2".parse::<PythonVersion>(),
            Ok(PythonVersion::new(3, 10, 2))
        );
        assert!("3.x".parse::<PythonVersion>().is_err());
        assert!("3.9.1.1".parse::<PythonVersion>().is_err());
        assert!("".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(PythonVersion::new(3, 10, 0) > PythonVersion::new(3, 9, 18));
        assert!(PythonVersion::new(2, 7, 18) < BUILD_MIN_VERSION);
    }

    #[test]
    fn test_check_version_gate() {
        assert!(check_version(PythonVersion::new(3, 9, 0), BUILD_MIN_VERSION).is_ok());
        assert!(check_version(PythonVersion::new(3, 12, 1), BUILD_MIN_VERSION).is_ok());

        let err = check_version(PythonVersion::new(3, 8, 10), BUILD_MIN_VERSION).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        let msg = err.to_string();
        assert!(msg.contains("3.8.10"), "message should report detected version: {msg}");
        assert!(msg.contains("3.9.0"));
    }
}
