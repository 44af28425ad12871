use {
    alloy::primitives::{
        U256,
        utils::{ParseUnits, Unit, format_units as format, parse_units as parse},
    },
    anyhow::{Context, Result, bail},
};

/// Number of decimals between one ether and one wei.
pub const ETHER_DECIMALS: u8 = 18;

/// Scales a human readable decimal amount (e.g. `"10"` or `"0.25"`) by
/// `10^decimals` into the smallest denomination of the ledger.
///
/// Negative amounts are rejected.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = parse(amount.trim(), decimals)
        .with_context(|| format!("could not parse {amount:?} with {decimals} decimals"))?;
    match parsed {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("amount {amount:?} must not be negative"),
    }
}

/// Reverse of [`parse_units`], used for human readable logs.
pub fn format_units(amount: U256, decimals: u8) -> Result<String> {
    format(amount, decimals).with_context(|| format!("invalid number of decimals {decimals}"))
}

pub trait EthUnit: std::marker::Sized {
    /// Returns the current wei amount.
    fn wei(self) -> U256;

    /// Returns the current Gwei amount as wei (i.e. 1e9 wei).
    fn gwei(self) -> U256 {
        self.wei() * Unit::GWEI.wei()
    }

    /// Returns the current Eth amount as wei (i.e. 1e18 wei).
    fn eth(self) -> U256 {
        self.wei() * Unit::ETHER.wei()
    }
}

impl EthUnit for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

impl EthUnit for u128 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_whole_ether() {
        assert_eq!(
            parse_units("10", ETHER_DECIMALS).unwrap(),
            U256::from(10_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_units("10", ETHER_DECIMALS).unwrap(), 10u64.eth());
    }

    #[test]
    fn scales_fractions() {
        assert_eq!(parse_units("0.5", ETHER_DECIMALS).unwrap(), 500_000_000u64.gwei());
        assert_eq!(parse_units("1.5", 6).unwrap(), 1_500_000u64.wei());
        assert_eq!(parse_units("0", ETHER_DECIMALS).unwrap(), U256::ZERO);
    }

    #[test]
    fn rejects_invalid_amounts() {
        assert!(parse_units("-1", ETHER_DECIMALS).is_err());
        assert!(parse_units("ten", ETHER_DECIMALS).is_err());
        assert!(parse_units("1.2.3", ETHER_DECIMALS).is_err());
    }

    #[test]
    fn formats_back() {
        assert_eq!(format_units(10u64.eth(), ETHER_DECIMALS).unwrap(), "10.000000000000000000");
    }
}
