//! Token descriptions and the display-to-raw supply conversions.

use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use ethers::utils::{format_units, parse_units};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

lazy_static! {
    static ref SYMBOL: Regex = Regex::new(r"^[A-Z0-9]{1,11}$").expect("valid regex");
}

/// A token the factory has minted, as shown to the user. Supplies are kept in
/// display units, already scaled down by the token's decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: String,
    pub max_supply: String,
    pub creator: Address,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Global counters reported by the factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryStats {
    pub total_tokens: u64,
    pub total_creators: u64,
    pub is_paused: bool,
}

/// Converts a display amount (e.g. `"1.5"`) to raw token units using the
/// token's decimals. The conversion is exact; amounts that cannot be
/// represented are rejected.
pub fn parse_supply(display: &str, decimals: u8) -> Result<U256, Error> {
    let trimmed = display.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidField {
            field: "supply",
            reason: "amount is empty".to_owned(),
        });
    }

    if trimmed.starts_with('-') {
        return Err(Error::InvalidField {
            field: "supply",
            reason: "amount may not be negative".to_owned(),
        });
    }

    let parsed = parse_units(trimmed, decimals as u32).map_err(|err| Error::InvalidField {
        field: "supply",
        reason: err.to_string(),
    })?;

    Ok(U256::from(parsed))
}

/// Converts a raw amount back to its display form. Trailing fractional zeros
/// are trimmed, so that `parse_supply` and `format_supply` round-trip.
pub fn format_supply(raw: U256, decimals: u8) -> Result<String, Error> {
    let formatted = format_units(raw, decimals as u32).map_err(|err| Error::InvalidField {
        field: "supply",
        reason: err.to_string(),
    })?;

    Ok(trim_fraction(&formatted))
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_owned()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => formatted.to_owned(),
    }
}

/// The user-supplied description of a token to be created.
#[derive(Debug, Clone)]
pub struct CreateTokenForm {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: String,
    pub max_supply: String,
}

impl CreateTokenForm {
    /// Checks the form and converts the supplies to raw units. Symbols are
    /// uppercased before validation.
    pub fn validate(&self) -> Result<ValidatedForm, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidField {
                field: "name",
                reason: "token name is empty".to_owned(),
            });
        }

        let symbol = self.symbol.trim().to_uppercase();
        if !SYMBOL.is_match(&symbol) {
            return Err(Error::InvalidField {
                field: "symbol",
                reason: format!("{symbol:?} is not 1 to 11 uppercase letters and digits"),
            });
        }

        let initial_supply = parse_supply(&self.initial_supply, self.decimals)?;
        let max_supply = parse_supply(&self.max_supply, self.decimals)?;

        if initial_supply > max_supply {
            return Err(Error::SupplyExceedsMax {
                initial: self.initial_supply.trim().to_owned(),
                max: self.max_supply.trim().to_owned(),
            });
        }

        Ok(ValidatedForm {
            name: name.to_owned(),
            symbol,
            decimals: self.decimals,
            initial_supply,
            max_supply,
        })
    }
}

/// A checked form, with supplies in raw units, ready for submission.
#[derive(Debug, Clone)]
pub struct ValidatedForm {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: U256,
    pub max_supply: U256,
}

#[cfg(test)]
mod test {
    use super::*;

    fn form(initial: &str, max: &str) -> CreateTokenForm {
        CreateTokenForm {
            name: "My Token".to_owned(),
            symbol: "MTK".to_owned(),
            decimals: 18,
            initial_supply: initial.to_owned(),
            max_supply: max.to_owned(),
        }
    }

    #[test]
    fn supplies_round_trip_exactly() {
        for decimals in [6u8, 8, 18] {
            for display in ["1", "1000000", "10000000", "0.5", "123.456"] {
                let raw = parse_supply(display, decimals).unwrap();
                assert_eq!(
                    format_supply(raw, decimals).unwrap(),
                    display,
                    "round trip failed for {display} with {decimals} decimals"
                );
            }
        }
    }

    #[test]
    fn supplies_scale_by_the_token_decimals() {
        assert_eq!(
            parse_supply("1000000", 18).unwrap(),
            U256::exp10(18) * U256::from(1_000_000u64)
        );
        assert_eq!(parse_supply("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_supply("42", 0).unwrap(), U256::from(42u64));
    }

    #[test]
    fn fractional_zeros_are_trimmed() {
        assert_eq!(format_supply(U256::exp10(18), 18).unwrap(), "1");
        assert_eq!(format_supply(U256::from(1_500_000u64), 6).unwrap(), "1.5");
        assert_eq!(format_supply(U256::from(42u64), 0).unwrap(), "42");
    }

    #[test]
    fn bad_amounts_are_rejected() {
        for display in ["", "   ", "-5", "five", "1..2"] {
            assert!(
                parse_supply(display, 18).is_err(),
                "{display:?} should not parse"
            );
        }
    }

    #[test]
    fn initial_supply_may_not_exceed_max_supply() {
        assert!(form("1000", "1000").validate().is_ok());

        match form("1000.1", "1000").validate() {
            Err(Error::SupplyExceedsMax { initial, max }) => {
                assert_eq!(initial, "1000.1");
                assert_eq!(max, "1000");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn symbols_are_uppercased_and_checked() {
        let mut with_symbol = form("1", "10");
        with_symbol.symbol = "mtk".to_owned();
        assert_eq!(with_symbol.validate().unwrap().symbol, "MTK");

        for symbol in ["", "TOOLONGSYMBOL", "MY TOKEN", "Ξ"] {
            with_symbol.symbol = symbol.to_owned();
            assert!(
                with_symbol.validate().is_err(),
                "{symbol:?} should not validate"
            );
        }
    }

    #[test]
    fn names_may_not_be_blank() {
        let mut blank = form("1", "10");
        blank.name = "   ".to_owned();

        match blank.validate() {
            Err(Error::InvalidField { field: "name", .. }) => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
