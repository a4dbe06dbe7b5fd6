use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A quintile score in the closed range 1..=5, where 5 is best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(1);
    pub const MIDDLE: Score = Score(3);
    pub const MAX: Score = Score(5);

    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 5 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Score {
    type Error = CompositeParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(CompositeParseError::OutOfRange(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeParseError {
    #[error("composite score must have exactly 3 digits, got {0}")]
    Length(usize),
    #[error("composite score digit `{0}` is not one of 1-5")]
    Digit(char),
    #[error("score {0} is outside 1-5")]
    OutOfRange(u8),
    #[error("composite number {0} is not a 3-digit R-F-M code")]
    Number(u16),
}

/// R, F and M scores in that order. "543" and "435" are different composites.
///
/// Converts to and from the `"525"` string form, the `525` integer form and
/// the `(5, 2, 5)` tuple form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeScore {
    pub recency: Score,
    pub frequency: Score,
    pub monetary: Score,
}

impl CompositeScore {
    pub const fn new(recency: Score, frequency: Score, monetary: Score) -> Self {
        Self {
            recency,
            frequency,
            monetary,
        }
    }

    pub fn from_digits(recency: u8, frequency: u8, monetary: u8) -> Result<Self, CompositeParseError> {
        Ok(Self::new(
            Score::try_from(recency)?,
            Score::try_from(frequency)?,
            Score::try_from(monetary)?,
        ))
    }

    pub const fn digits(self) -> [u8; 3] {
        [self.recency.get(), self.frequency.get(), self.monetary.get()]
    }

    pub const fn as_number(self) -> u16 {
        (self.recency.get() as u16) * 100
            + (self.frequency.get() as u16) * 10
            + (self.monetary.get() as u16)
    }

    pub fn from_number(value: u16) -> Result<Self, CompositeParseError> {
        if !(100..=999).contains(&value) {
            return Err(CompositeParseError::Number(value));
        }
        let digit = |place: u16| ((value / place) % 10) as u8;
        Self::from_digits(digit(100), digit(10), digit(1))
            .map_err(|_| CompositeParseError::Number(value))
    }
}

impl fmt::Display for CompositeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.recency, self.frequency, self.monetary)
    }
}

impl FromStr for CompositeScore {
    type Err = CompositeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let characters = value.trim().chars().collect::<Vec<char>>();
        if characters.len() != 3 {
            return Err(CompositeParseError::Length(characters.len()));
        }

        let mut digits = [0u8; 3];
        for (slot, character) in digits.iter_mut().zip(&characters) {
            *slot = match character.to_digit(10) {
                Some(digit @ 1..=5) => digit as u8,
                _ => return Err(CompositeParseError::Digit(*character)),
            };
        }
        Self::from_digits(digits[0], digits[1], digits[2])
    }
}

impl TryFrom<(u8, u8, u8)> for CompositeScore {
    type Error = CompositeParseError;

    fn try_from((recency, frequency, monetary): (u8, u8, u8)) -> Result<Self, Self::Error> {
        Self::from_digits(recency, frequency, monetary)
    }
}

impl From<CompositeScore> for (u8, u8, u8) {
    fn from(composite: CompositeScore) -> Self {
        let [recency, frequency, monetary] = composite.digits();
        (recency, frequency, monetary)
    }
}

impl TryFrom<u16> for CompositeScore {
    type Error = CompositeParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<CompositeScore> for u16 {
    fn from(composite: CompositeScore) -> Self {
        composite.as_number()
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeParseError, CompositeScore, Score};

    fn composite(r: u8, f: u8, m: u8) -> Option<CompositeScore> {
        CompositeScore::from_digits(r, f, m).ok()
    }

    #[test]
    fn score_rejects_values_outside_one_to_five() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(6).is_none());
        assert_eq!(Score::new(1), Some(Score::MIN));
        assert_eq!(Score::new(5), Some(Score::MAX));
    }

    #[test]
    fn composite_is_ordered_concatenation_not_sum() {
        let a = composite(5, 2, 5);
        let b = composite(2, 5, 5);
        assert_eq!(a.map(|value| value.to_string()), Some("525".to_string()));
        assert_eq!(b.map(|value| value.to_string()), Some("255".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn reference_table_composites() {
        let cases = [
            ((5, 2, 5), "525"),
            ((2, 3, 5), "235"),
            ((4, 4, 3), "443"),
            ((3, 5, 2), "352"),
            ((5, 2, 1), "521"),
        ];
        for ((r, f, m), expected) in cases {
            let built = CompositeScore::try_from((r, f, m));
            assert!(built.is_ok());
            if let Ok(value) = built {
                assert_eq!(value.to_string(), expected);
            }
        }
    }

    #[test]
    fn string_number_and_tuple_forms_agree() {
        let parsed = "443".parse::<CompositeScore>();
        assert!(parsed.is_ok());
        if let Ok(value) = parsed {
            assert_eq!(value.as_number(), 443);
            assert_eq!(<(u8, u8, u8)>::from(value), (4, 4, 3));
            assert_eq!(CompositeScore::from_number(443), Ok(value));
            assert_eq!(CompositeScore::try_from((4, 4, 3)), Ok(value));
        }
    }

    #[test]
    fn malformed_composites_are_rejected() {
        assert_eq!(
            "52".parse::<CompositeScore>(),
            Err(CompositeParseError::Length(2))
        );
        assert_eq!(
            "506".parse::<CompositeScore>(),
            Err(CompositeParseError::Digit('0'))
        );
        assert_eq!(
            CompositeScore::from_number(160),
            Err(CompositeParseError::Number(160))
        );
        assert_eq!(
            CompositeScore::from_number(55),
            Err(CompositeParseError::Number(55))
        );
    }
}
