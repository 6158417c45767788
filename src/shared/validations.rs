use rust_decimal::Decimal;
use validator::ValidationError;

pub fn validate_pagination(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// Indian mobile numbers as the society registers them: exactly ten digits.
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.len() == 10 && mobile.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("mobile");
        err.message = Some("must be 10 digits".into());
        Err(err)
    }
}

/// Largest money value accepted from operators: rates, balances, fines, payments.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("cannot be negative".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Non-negative and at most [`MAX_AMOUNT`].
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(value)?;
    if *value > MAX_AMOUNT {
        let mut err = ValidationError::new("max_amount");
        err.message = Some("amount is too large".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(validate_pagination(None, None), (1, 20));
        assert_eq!(validate_pagination(Some(0), Some(500)), (1, 100));
    }

    #[test]
    fn mobile_requires_ten_digits() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("98765").is_err());
        assert!(validate_mobile("98765abcde").is_err());
    }

    #[test]
    fn negative_amounts_rejected() {
        assert!(validate_non_negative(&dec!(0)).is_ok());
        assert!(validate_non_negative(&dec!(12.5)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
    }

    #[test]
    fn amounts_capped() {
        assert!(validate_amount(&dec!(999.99)).is_ok());
        assert!(validate_amount(&MAX_AMOUNT).is_ok());
        assert!(validate_amount(&dec!(1000000000.01)).is_err());
        assert!(validate_amount(&Decimal::MAX).is_err());
        assert!(validate_amount(&dec!(-5)).is_err());
    }
}
