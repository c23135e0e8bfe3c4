use thiserror::Error;

/// Number of callable DNA bases tracked in per-column counters (A, C, G, T).
pub const BASE_COUNT: usize = 4;
/// Sentinel marking the natural end of a stored read.
pub const TERMINATOR: u8 = b'$';
/// Filler for columns without data in an aligned read.
pub const NO_DATA: u8 = b'.';

/// Errors raised while validating or transforming sequence text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    /// Symbol outside `{A, C, G, T, N, $}`.
    #[error("'{symbol}' is not a valid symbol")]
    InvalidSymbol {
        /// Offending character.
        symbol: char,
    },

    /// Query pattern was empty after trimming.
    #[error("no search pattern specified")]
    EmptyPattern,
}

/// Callable DNA base. Discriminants double as counter indices and define the
/// tie-break order used by consensus voting (A < C < G < T).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseCode {
    /// Adenine.
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine.
    T = 3,
}

impl BaseCode {
    /// All bases in tie-break order.
    pub const ALL: [BaseCode; BASE_COUNT] = [BaseCode::A, BaseCode::C, BaseCode::G, BaseCode::T];

    /// Parse a called base, ignoring case. Returns `None` for `N`, `.`, `$`
    /// and anything else that is not a base call.
    pub fn from_ascii(base: u8) -> Option<Self> {
        match base {
            b'A' | b'a' => Some(BaseCode::A),
            b'C' | b'c' => Some(BaseCode::C),
            b'G' | b'g' => Some(BaseCode::G),
            b'T' | b't' => Some(BaseCode::T),
            _ => None,
        }
    }

    /// Convert the base code to an index into counter tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Uppercase ASCII letter for this base.
    pub fn to_upper(self) -> u8 {
        match self {
            BaseCode::A => b'A',
            BaseCode::C => b'C',
            BaseCode::G => b'G',
            BaseCode::T => b'T',
        }
    }

    /// Lowercase ASCII letter for this base.
    pub fn to_lower(self) -> u8 {
        self.to_upper().to_ascii_lowercase()
    }

    /// Watson-Crick partner.
    pub fn complement(self) -> Self {
        match self {
            BaseCode::A => BaseCode::T,
            BaseCode::C => BaseCode::G,
            BaseCode::G => BaseCode::C,
            BaseCode::T => BaseCode::A,
        }
    }
}

/// Whether `symbol` is a base call (`ACGTacgt`).
#[inline]
pub fn is_called(symbol: u8) -> bool {
    BaseCode::from_ascii(symbol).is_some()
}

fn complement(symbol: u8) -> Result<u8, AlphabetError> {
    match symbol {
        b'A' => Ok(b'T'),
        b'C' => Ok(b'G'),
        b'G' => Ok(b'C'),
        b'T' => Ok(b'A'),
        b'N' => Ok(b'N'),
        TERMINATOR => Ok(TERMINATOR),
        other => Err(AlphabetError::InvalidSymbol {
            symbol: other as char,
        }),
    }
}

/// Reverse complement of an uppercase sequence. The terminator maps to itself.
pub fn reverse_complement(sequence: &[u8]) -> Result<Vec<u8>, AlphabetError> {
    sequence.iter().rev().map(|&symbol| complement(symbol)).collect()
}

/// Uppercase a user-supplied pattern and check every symbol against the
/// index alphabet.
pub fn normalize_pattern(pattern: &str) -> Result<Vec<u8>, AlphabetError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(AlphabetError::EmptyPattern);
    }
    let upper = trimmed.to_ascii_uppercase().into_bytes();
    for &symbol in &upper {
        complement(symbol)?;
    }
    Ok(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b'A', Some(BaseCode::A))]
    #[test_case(b'c', Some(BaseCode::C))]
    #[test_case(b'G', Some(BaseCode::G))]
    #[test_case(b't', Some(BaseCode::T))]
    #[test_case(b'N', None)]
    #[test_case(b'.', None)]
    #[test_case(b'$', None)]
    fn parses_called_bases(symbol: u8, expected: Option<BaseCode>) {
        assert_eq!(BaseCode::from_ascii(symbol), expected);
        assert_eq!(is_called(symbol), expected.is_some());
    }

    #[test_case(b"ACGT", b"ACGT")]
    #[test_case(b"AAC$", b"$GTT")]
    #[test_case(b"NAG", b"CTN")]
    fn reverse_complements(input: &[u8], expected: &[u8]) {
        assert_eq!(reverse_complement(input).unwrap(), expected);
    }

    #[test]
    fn reverse_complement_rejects_lowercase() {
        assert_eq!(
            reverse_complement(b"ACgT"),
            Err(AlphabetError::InvalidSymbol { symbol: 'g' })
        );
    }

    #[test]
    fn normalize_uppercases_and_validates() {
        assert_eq!(normalize_pattern(" acgtn ").unwrap(), b"ACGTN");
        assert_eq!(
            normalize_pattern("ACXT"),
            Err(AlphabetError::InvalidSymbol { symbol: 'X' })
        );
        assert_eq!(normalize_pattern("   "), Err(AlphabetError::EmptyPattern));
    }
}
