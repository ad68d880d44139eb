//! Locale-aware price parsing for pt-BR storefronts.
//!
//! Result cards render prices like `R$ 1.234,56` (dot as thousands separator,
//! comma as decimal separator), usually buried in the card's full text next
//! to installment offers and cashback banners. Parsing is strictly
//! best-effort: price is optional on a listing, so failure is informational,
//! never an error.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Amount preceded by the currency marker, e.g. "R$ 1.299,90".
    static ref PRICE_WITH_CURRENCY: Regex =
        Regex::new(r"R\$\s*(\d{1,3}(?:\.\d{3})*(?:,\d{2})|\d+(?:,\d{2}))")
            .expect("currency price pattern compiles");

    /// Bare amount fallback for cards that omit the marker.
    static ref PRICE_BARE: Regex =
        Regex::new(r"(\d{1,3}(?:\.\d{3})*(?:,\d{2})|\d+(?:,\d{2}))")
            .expect("bare price pattern compiles");
}

/// Extract the first price-shaped amount from free-form card text.
///
/// Prefers a match carrying the `R$` marker over a bare number so that
/// installment counts ("10x de 129,90") do not shadow the cash price when
/// both appear. Returns `None` when nothing matches or conversion fails.
pub fn parse(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let captures = PRICE_WITH_CURRENCY
        .captures(text)
        .or_else(|| PRICE_BARE.captures(text))?;
    let raw = captures.get(1)?.as_str().replace('.', "").replace(',', ".");
    raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn parses_thousands_and_decimals() {
        assert_eq!(parse("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse("de R$ 12.345.678,90 por hoje"), Some(12345678.90));
    }

    #[test]
    fn parses_small_amounts() {
        assert_eq!(parse("R$ 99,90"), Some(99.90));
        assert_eq!(parse("por apenas 449,00 no pix"), Some(449.00));
    }

    #[test]
    fn prefers_the_currency_marked_amount() {
        // The installment figure appears first but lacks the marker.
        assert_eq!(parse("12x de 108,25 ou R$ 1.299,00 no pix"), Some(1299.00));
    }

    #[test]
    fn absent_on_unparsable_text() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("sem preço"), None);
        assert_eq!(parse("Frete grátis"), None);
    }

    #[test]
    fn ignores_integers_without_decimal_part() {
        assert_eq!(parse("1234 unidades"), None);
    }
}
