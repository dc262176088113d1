//! Presentation lookups
//!
//! Display labels and currency text for the calling layer. Nothing in the
//! normalization or ranking code depends on this module.

use super::units::Unit;

/// Label for the price input of an item in the given unit
pub fn price_label(unit: Unit) -> &'static str {
    match unit {
        Unit::Gram | Unit::Kilogram => "Preço por Kg (R$)",
        Unit::Liter => "Preço por Litro (R$)",
        Unit::Count => "Preço por Unidade (R$)",
    }
}

/// Unit the stored price refers to. Gram items are priced per kilogram.
pub fn price_unit_label(unit: Unit) -> &'static str {
    match unit {
        Unit::Gram => Unit::Kilogram.as_tag(),
        other => other.as_tag(),
    }
}

/// Format an amount as Brazilian reais, e.g. `R$ 1.234,50`
pub fn format_brl(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_labels() {
        assert_eq!(price_label(Unit::Gram), "Preço por Kg (R$)");
        assert_eq!(price_label(Unit::Kilogram), "Preço por Kg (R$)");
        assert_eq!(price_label(Unit::Liter), "Preço por Litro (R$)");
        assert_eq!(price_label(Unit::Count), "Preço por Unidade (R$)");
    }

    #[test]
    fn test_price_unit_labels() {
        assert_eq!(price_unit_label(Unit::Gram), "Kg");
        assert_eq!(price_unit_label(Unit::Kilogram), "Kg");
        assert_eq!(price_unit_label(Unit::Liter), "L");
        assert_eq!(price_unit_label(Unit::Count), "un");
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(5.0), "R$ 5,00");
        assert_eq!(format_brl(7.5), "R$ 7,50");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(-12.3), "-R$ 12,30");
    }
}
