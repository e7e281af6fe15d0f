// Nibble layouts of the command word
//
// Each command kind packs its parameters into 4-bit digits at fixed bit
// positions. The orderings are not contiguous and are shared with the
// remote application, so they are declared as tables and never derived.

/// Digit counts the protocol uses
const SUPPORTED_DIGIT_COUNTS: [usize; 4] = [2, 3, 4, 8];

/// Error types for layout construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Unsupported digit count {0}")]
    DigitCountUnsupported(usize),

    #[error("Shift {shift} is not a nibble boundary inside a 32-bit word")]
    ShiftInvalid { shift: u8 },
}

/// Error types for digit extraction and encoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Digit position {position} out of range for {digit_count}-digit layout")]
    OutOfRange { position: usize, digit_count: usize },

    #[error("Digit value {value} does not fit in a nibble")]
    DigitTooLarge { value: u8 },
}

/// Positional map from logical digit position to bit shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    name: &'static str,
    shifts: &'static [u8],
}

/// simple slots and RunGroup: [selector, speed]
pub const TWO_DIGIT: Layout = Layout {
    name: "two_digit",
    shifts: &[4, 0],
};

/// RunSingleMotor: [unused, ordinal, speed]
pub const THREE_DIGIT: Layout = Layout {
    name: "three_digit",
    shifts: &[0, 12, 8],
};

/// executeCommand selectors
pub const FOUR_DIGIT: Layout = Layout {
    name: "four_digit",
    shifts: &[4, 0, 12, 8],
};

/// PreLoadValues, one digit per actuator
pub const EIGHT_DIGIT: Layout = Layout {
    name: "eight_digit",
    shifts: &[4, 0, 12, 8, 20, 16, 28, 24],
};

impl Layout {
    /// Build a layout, rejecting digit counts and shifts the protocol never uses
    pub fn new(name: &'static str, shifts: &'static [u8]) -> Result<Self, LayoutError> {
        if !SUPPORTED_DIGIT_COUNTS.contains(&shifts.len()) {
            return Err(LayoutError::DigitCountUnsupported(shifts.len()));
        }
        if let Some(&shift) = shifts.iter().find(|&&s| s % 4 != 0 || s > 28) {
            return Err(LayoutError::ShiftInvalid { shift });
        }
        Ok(Self { name, shifts })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn digit_count(&self) -> usize {
        self.shifts.len()
    }

    /// Read the digit at a logical position
    pub fn extract_digit(&self, position: usize, word: u32) -> Result<u8, DecodeError> {
        let shift = self
            .shifts
            .get(position)
            .ok_or(DecodeError::OutOfRange {
                position,
                digit_count: self.digit_count(),
            })?;
        Ok(((word >> shift) & 0xF) as u8)
    }

    /// Read every digit in logical order
    pub fn extract_all(&self, word: u32) -> Vec<u8> {
        self.shifts
            .iter()
            .map(|&shift| ((word >> shift) & 0xF) as u8)
            .collect()
    }

    /// Pack digits into a word; positions not covered stay zero
    pub fn encode(&self, digits: &[u8]) -> Result<u32, DecodeError> {
        if digits.len() > self.digit_count() {
            return Err(DecodeError::OutOfRange {
                position: digits.len() - 1,
                digit_count: self.digit_count(),
            });
        }
        let mut word = 0u32;
        for (&digit, &shift) in digits.iter().zip(self.shifts) {
            if digit > 0xF {
                return Err(DecodeError::DigitTooLarge { value: digit });
            }
            word |= (digit as u32) << shift;
        }
        Ok(word)
    }
}
