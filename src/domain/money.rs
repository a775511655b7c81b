use core::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::Error;

/// A non-negative amount typed in at the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money(pub Decimal);

impl Money {
    pub const DISPLAY_DECIMALS: u32 = 2;

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Digits, one optional sign and a decimal point only; no `_` or `,`
        // group separators.
        if !s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-')) {
            return Err(Error::InvalidInput(format!("{s:?} is not a plain number")));
        }

        let value = Decimal::from_str(s)
            .map_err(|e| Error::InvalidInput(format!("{s:?} is not a number: {e}")))?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidInput(format!("{s:?} is negative")));
        }

        Ok(Self(value))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut shown = self.0.round_dp(Self::DISPLAY_DECIMALS);
        shown.rescale(Self::DISPLAY_DECIMALS);
        write!(f, "${}", shown)
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn parses_plain_and_padded_amounts() {
        let m: Money = " 50.5 ".parse().unwrap();
        assert_eq!(m.to_string(), "$50.50");
        let m: Money = "0".parse().unwrap();
        assert_eq!(m.to_string(), "$0.00");
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
    }

    #[test]
    fn rejects_digit_separators_and_exponents() {
        assert!("1_000".parse::<Money>().is_err());
        assert!("1,000".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("$5".parse::<Money>().is_err());
    }

    #[test]
    fn decimal_range_is_the_limit() {
        let max: Money = "79228162514264337593543950335".parse().unwrap();
        assert_eq!(max.as_decimal(), rust_decimal::Decimal::MAX);
        assert!("79228162514264337593543950336".parse::<Money>().is_err());
    }

    #[test]
    fn display_rounds_half_even_to_cents() {
        let m: Money = "1.005".parse().unwrap();
        assert_eq!(m.to_string(), "$1.00");
        let m: Money = "1.015".parse().unwrap();
        assert_eq!(m.to_string(), "$1.02");
    }
}
