//! Currency display formatting for rationales and metric strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySymbol {
    pub symbol: String,
    pub position: SymbolPosition,
}

const SYMBOLS: &[(&str, &str, SymbolPosition)] = &[
    ("USD", "$", SymbolPosition::Before),
    ("EUR", "€", SymbolPosition::Before),
    ("GBP", "£", SymbolPosition::Before),
    ("SEK", "kr", SymbolPosition::After),
    ("NOK", "kr", SymbolPosition::After),
    ("DKK", "kr", SymbolPosition::After),
    ("ISK", "kr", SymbolPosition::After),
    ("CZK", "Kč", SymbolPosition::After),
    ("HUF", "Ft", SymbolPosition::After),
    ("PLN", "zł", SymbolPosition::After),
    ("RON", "lei", SymbolPosition::After),
    ("JPY", "¥", SymbolPosition::Before),
    ("CNY", "¥", SymbolPosition::Before),
    ("KRW", "₩", SymbolPosition::Before),
    ("INR", "₹", SymbolPosition::Before),
    ("BRL", "R$", SymbolPosition::Before),
    ("MXN", "$", SymbolPosition::Before),
    ("AUD", "A$", SymbolPosition::Before),
    ("CAD", "C$", SymbolPosition::Before),
    ("CHF", "CHF", SymbolPosition::Before),
    ("NZD", "NZ$", SymbolPosition::Before),
    ("SGD", "S$", SymbolPosition::Before),
    ("HKD", "HK$", SymbolPosition::Before),
    ("TWD", "NT$", SymbolPosition::Before),
    ("THB", "฿", SymbolPosition::Before),
    ("TRY", "₺", SymbolPosition::Before),
    ("ZAR", "R", SymbolPosition::Before),
    ("RUB", "₽", SymbolPosition::After),
    ("ILS", "₪", SymbolPosition::Before),
    ("AED", "د.إ", SymbolPosition::Before),
    ("SAR", "﷼", SymbolPosition::Before),
    ("PHP", "₱", SymbolPosition::Before),
    ("MYR", "RM", SymbolPosition::Before),
    ("IDR", "Rp", SymbolPosition::Before),
    ("VND", "₫", SymbolPosition::After),
    ("ARS", "$", SymbolPosition::Before),
    ("CLP", "$", SymbolPosition::Before),
    ("COP", "$", SymbolPosition::Before),
    ("PEN", "S/", SymbolPosition::Before),
    ("UAH", "₴", SymbolPosition::Before),
    ("NGN", "₦", SymbolPosition::Before),
    ("EGP", "E£", SymbolPosition::Before),
    ("PKR", "₨", SymbolPosition::Before),
    ("BDT", "৳", SymbolPosition::Before),
    ("QAR", "﷼", SymbolPosition::Before),
    ("KWD", "د.ك", SymbolPosition::Before),
    ("BHD", ".د.ب", SymbolPosition::Before),
    ("OMR", "﷼", SymbolPosition::Before),
];

/// Look up the display symbol for an ISO currency code. Unknown codes are
/// shown verbatim in front of the amount.
pub fn currency_symbol(code: &str) -> CurrencySymbol {
    let code = code.trim().to_ascii_uppercase();
    SYMBOLS
        .iter()
        .find(|(iso, _, _)| *iso == code)
        .map(|(_, symbol, position)| CurrencySymbol {
            symbol: symbol.to_string(),
            position: *position,
        })
        .unwrap_or(CurrencySymbol {
            symbol: code,
            position: SymbolPosition::Before,
        })
}

/// Formats monetary amounts for one account currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    code: String,
    symbol: CurrencySymbol,
}

impl CurrencyFormatter {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
            symbol: currency_symbol(code),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn format(&self, amount: f64) -> String {
        self.format_with(amount, 2)
    }

    pub fn format_with(&self, amount: f64, decimals: usize) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let number = format!("{amount:.decimals$}");
        match self.symbol.position {
            SymbolPosition::After => format!("{number} {}", self.symbol.symbol),
            SymbolPosition::Before => format!("{}{number}", self.symbol.symbol),
        }
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::new("USD")
    }
}
