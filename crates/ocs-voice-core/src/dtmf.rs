/// DTMF tones understood by the vendor SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtmfTone {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Pound,
}

impl DtmfTone {
    /// Map a single dial-pad digit to its tone. Anything else is `None`.
    pub fn from_digit(digit: &str) -> Option<Self> {
        let tone = match digit {
            "0" => Self::Zero,
            "1" => Self::One,
            "2" => Self::Two,
            "3" => Self::Three,
            "4" => Self::Four,
            "5" => Self::Five,
            "6" => Self::Six,
            "7" => Self::Seven,
            "8" => Self::Eight,
            "9" => Self::Nine,
            "*" => Self::Star,
            "#" => Self::Pound,
            _ => return None,
        };
        Some(tone)
    }

    /// SDK constant name for the tone.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "ZERO",
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::Four => "FOUR",
            Self::Five => "FIVE",
            Self::Six => "SIX",
            Self::Seven => "SEVEN",
            Self::Eight => "EIGHT",
            Self::Nine => "NINE",
            Self::Star => "STAR",
            Self::Pound => "POUND",
        }
    }
}
