//! Validation utilities for the AudiCare Clinic Management Platform

use rust_decimal::Decimal;

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a serial number for storage
///
/// The composite stock key joins product id and serial with `|`, so a serial
/// containing the separator would forge a different unit's identity.
pub fn validate_serial_number(serial: &str) -> Result<(), &'static str> {
    if serial.trim().is_empty() {
        return Err("Serial number cannot be empty");
    }
    if serial.contains('|') {
        return Err("Serial number cannot contain '|'");
    }
    if serial.len() > 64 {
        return Err("Serial number too long");
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a price field (MRP or dealer price)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Dealer price should not exceed MRP
pub fn validate_price_pair(dealer_price: Decimal, mrp: Decimal) -> Result<(), &'static str> {
    validate_price(dealer_price)?;
    validate_price(mrp)?;
    if dealer_price > mrp {
        return Err("Dealer price cannot exceed MRP");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate an Indian mobile number (10 digits, optional +91 prefix)
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone
        .trim_start_matches("+91")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Invalid phone number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_numbers_reject_separator() {
        assert!(validate_serial_number("HA-2024-0042").is_ok());
        assert!(validate_serial_number("SN|123").is_err());
        assert!(validate_serial_number("   ").is_err());
    }

    #[test]
    fn price_pair_ordering() {
        use rust_decimal::Decimal;
        assert!(validate_price_pair(Decimal::new(800, 0), Decimal::new(1000, 0)).is_ok());
        assert!(validate_price_pair(Decimal::new(1200, 0), Decimal::new(1000, 0)).is_err());
    }

    #[test]
    fn phone_formats() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("12345").is_err());
    }
}
