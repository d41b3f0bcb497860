use crate::error::RemoteError;

/// A range of era numbers as accepted on the command line: a single era, an
/// inclusive range, or an open-ended range (everything from a start era
/// onward, discovered by probing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraRange {
    Single(u64),
    Inclusive(u64, u64),
    OpenEnded(u64),
}

impl EraRange {
    pub fn parse(text: &str) -> Result<Self, RemoteError> {
        let text = text.trim();
        if let Some(start) = text.strip_suffix('+') {
            let start: u64 = start
                .parse()
                .map_err(|_| RemoteError::InvalidRange(text.to_string()))?;
            return Ok(EraRange::OpenEnded(start));
        }
        if let Some((start, end)) = text.split_once('-') {
            let start: u64 = start
                .parse()
                .map_err(|_| RemoteError::InvalidRange(text.to_string()))?;
            let end: u64 = end
                .parse()
                .map_err(|_| RemoteError::InvalidRange(text.to_string()))?;
            if start > end {
                return Err(RemoteError::InvalidRange(text.to_string()));
            }
            return Ok(EraRange::Inclusive(start, end));
        }
        let era: u64 = text
            .parse()
            .map_err(|_| RemoteError::InvalidRange(text.to_string()))?;
        Ok(EraRange::Single(era))
    }

    pub fn start(&self) -> u64 {
        match self {
            EraRange::Single(n) => *n,
            EraRange::Inclusive(start, _) => *start,
            EraRange::OpenEnded(start) => *start,
        }
    }

    pub fn end(&self) -> Option<u64> {
        match self {
            EraRange::Single(n) => Some(*n),
            EraRange::Inclusive(_, end) => Some(*end),
            EraRange::OpenEnded(_) => None,
        }
    }

    pub fn contains(&self, era: u64) -> bool {
        match self.end() {
            Some(end) => era >= self.start() && era <= end,
            None => era >= self.start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single() {
        assert_eq!(EraRange::parse("1082").unwrap(), EraRange::Single(1082));
    }

    #[test]
    fn parses_inclusive() {
        assert_eq!(
            EraRange::parse("1082-1090").unwrap(),
            EraRange::Inclusive(1082, 1090)
        );
    }

    #[test]
    fn parses_open_ended() {
        assert_eq!(EraRange::parse("1082+").unwrap(), EraRange::OpenEnded(1082));
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(EraRange::parse("1090-1082").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(EraRange::parse("not-a-range").is_err());
    }
}
