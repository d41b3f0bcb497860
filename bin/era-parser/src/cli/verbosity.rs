use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level(&self) -> Level {
        match self {
            Verbosity::Error => Level::ERROR,
            Verbosity::Warn => Level::WARN,
            Verbosity::Info => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Trace => Level::TRACE,
        }
    }
}

/// Parses the `--verbosity` flag's `1..=5` scale into a `Verbosity`,
/// matching the teacher's error/warn/info/debug/trace ladder.
pub fn verbosity_parser(s: &str) -> Result<Verbosity, String> {
    match s.parse::<u8>() {
        Ok(1) => Ok(Verbosity::Error),
        Ok(2) => Ok(Verbosity::Warn),
        Ok(3) => Ok(Verbosity::Info),
        Ok(4) => Ok(Verbosity::Debug),
        Ok(5) => Ok(Verbosity::Trace),
        _ => Err("verbosity must be an integer between 1 and 5".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_valid_level() {
        assert_eq!(verbosity_parser("1").unwrap(), Verbosity::Error);
        assert_eq!(verbosity_parser("5").unwrap(), Verbosity::Trace);
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(verbosity_parser("0").is_err());
        assert!(verbosity_parser("6").is_err());
        assert!(verbosity_parser("not-a-number").is_err());
    }
}
