//! Payout currencies and amount formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    COP,
    USD,
    EUR,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::COP => "COP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "€",
            Currency::COP | Currency::USD => "$",
        }
    }

    /// Decimal places shown; pesos are displayed as whole units
    pub fn decimals(&self) -> usize {
        match self {
            Currency::COP => 0,
            Currency::USD | Currency::EUR => 2,
        }
    }

    /// Format an amount as e.g. `$1,250,000 COP`, `$1,250.00 USD` or `€700.00 EUR`
    pub fn format(&self, amount: f64) -> String {
        let fixed = format!("{:.*}", self.decimals(), amount.abs());
        let (whole, fraction) = match fixed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (fixed.as_str(), None),
        };
        let sign = if amount < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
            "-"
        } else {
            ""
        };
        let mut out = format!("{}{}{}", sign, self.symbol(), group_thousands(whole));
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out.push(' ');
        out.push_str(self.code());
        out
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::COP),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            other => Err(format!("unknown currency `{}`", other)),
        }
    }
}
