//! # Local Validation Rules
//!
//! Every transfer precondition that can be checked without the network,
//! checked before any signing or I/O happens. These are independent gates
//! with distinct errors, not one catch-all — a caller told "invalid fee"
//! when the real problem is a malformed address will file a bug, and they
//! will be right to.

use std::str::FromStr;
use thiserror::Error;

use crate::config::{PASSWORD_MIN_LENGTH, PASSWORD_SPECIAL_CHARACTERS, TRANSFER_FEE};
use crate::crypto::address::Address;

/// Precondition failures for a transfer. All detected locally, none retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The address text is not `hx` + 40 lowercase hex characters.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// Source and destination are the same wallet.
    #[error("source and destination addresses must differ")]
    SameAddress,

    /// Amount must be strictly positive.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Fee must be strictly positive and exactly the protocol constant.
    #[error("invalid fee: must be exactly {TRANSFER_FEE} loop")]
    InvalidFee,

    /// Amount must cover at least the fee.
    #[error("fee exceeds amount")]
    FeeExceedsAmount,

    /// The wallet balance cannot cover amount + fee.
    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: u128, required: u128 },
}

/// Password strength rule for keystore encryption.
///
/// Accepts iff the password is at least 8 characters and contains at least
/// one ASCII digit, one ASCII letter, and one character from the fixed
/// punctuation set. All three classes are mandatory; length is only a
/// lower bound.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LENGTH
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password
            .chars()
            .any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c))
}

/// Validate the text form of an address, returning the parsed value.
pub fn validate_address_text(text: &str) -> Result<Address, ValidationError> {
    Address::from_str(text).map_err(|_| ValidationError::InvalidAddress(text.to_string()))
}

/// Reject a transfer whose source and destination are the same address.
pub fn validate_distinct_addresses(
    from: &Address,
    to: &Address,
) -> Result<(), ValidationError> {
    if from == to {
        return Err(ValidationError::SameAddress);
    }
    Ok(())
}

/// The amount/fee policy, as three independent checks in a fixed order:
/// amount strictly positive, fee exactly the protocol constant, amount at
/// least the fee.
pub fn validate_amount_and_fee(amount: u128, fee: u128) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::InvalidAmount);
    }
    if fee == 0 || fee != TRANSFER_FEE {
        return Err(ValidationError::InvalidFee);
    }
    if amount < fee {
        return Err(ValidationError::FeeExceedsAmount);
    }
    Ok(())
}

/// Reject a transfer the balance cannot cover, before wasting a round trip.
///
/// Uses checked addition: a sum that overflows `u128` is by definition not
/// coverable by any balance.
pub fn check_balance(balance: u128, amount: u128, fee: u128) -> Result<(), ValidationError> {
    match amount.checked_add(fee) {
        Some(required) if balance >= required => Ok(()),
        Some(required) => Err(ValidationError::InsufficientBalance { balance, required }),
        None => Err(ValidationError::InsufficientBalance {
            balance,
            required: u128::MAX,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(last_byte: u8) -> Address {
        let mut bytes = [0xabu8; 20];
        bytes[19] = last_byte;
        Address::from_bytes(bytes)
    }

    #[test]
    fn password_rule_accepts_all_three_classes() {
        assert!(validate_password("Adas21312**"));
        assert!(validate_password("p4ss{word}"));
    }

    #[test]
    fn password_reference_rejection_vector() {
        // "123 4": no letter, no special, too short. Three strikes.
        assert!(!validate_password("123 4"));
    }

    #[test]
    fn password_rule_requires_each_class() {
        assert!(!validate_password("abcdefg1")); // no special
        assert!(!validate_password("abcdefg!")); // no digit
        assert!(!validate_password("1234567!")); // no letter
        assert!(!validate_password("a1!")); // too short
        // A space is not in the punctuation set.
        assert!(!validate_password("abcd 1234"));
    }

    #[test]
    fn address_text_gate_maps_to_invalid_address() {
        assert_eq!(
            validate_address_text("hx-oops").unwrap_err(),
            ValidationError::InvalidAddress("hx-oops".to_string())
        );
        assert!(validate_address_text("hxcc7b1f5fb98ca1eeaf9586bc08048814cb0d4d3d").is_ok());
    }

    #[test]
    fn same_address_rejected() {
        let a = address(1);
        assert_eq!(
            validate_distinct_addresses(&a, &a).unwrap_err(),
            ValidationError::SameAddress
        );
        assert!(validate_distinct_addresses(&address(1), &address(2)).is_ok());
    }

    #[test]
    fn zero_amount_rejected_first() {
        assert_eq!(
            validate_amount_and_fee(0, TRANSFER_FEE).unwrap_err(),
            ValidationError::InvalidAmount
        );
    }

    #[test]
    fn fee_must_equal_protocol_constant() {
        assert_eq!(
            validate_amount_and_fee(TRANSFER_FEE * 2, TRANSFER_FEE + 1).unwrap_err(),
            ValidationError::InvalidFee
        );
        assert_eq!(
            validate_amount_and_fee(TRANSFER_FEE * 2, 0).unwrap_err(),
            ValidationError::InvalidFee
        );
    }

    #[test]
    fn amount_below_fee_rejected() {
        assert_eq!(
            validate_amount_and_fee(TRANSFER_FEE - 1, TRANSFER_FEE).unwrap_err(),
            ValidationError::FeeExceedsAmount
        );
        // Equal is allowed: amount >= fee.
        assert!(validate_amount_and_fee(TRANSFER_FEE, TRANSFER_FEE).is_ok());
    }

    #[test]
    fn balance_must_cover_amount_plus_fee() {
        assert!(check_balance(TRANSFER_FEE * 3, TRANSFER_FEE * 2, TRANSFER_FEE).is_ok());
        assert!(matches!(
            check_balance(TRANSFER_FEE * 3 - 1, TRANSFER_FEE * 2, TRANSFER_FEE),
            Err(ValidationError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn overflowing_required_sum_is_insufficient() {
        assert!(matches!(
            check_balance(u128::MAX, u128::MAX, TRANSFER_FEE),
            Err(ValidationError::InsufficientBalance { .. })
        ));
    }
}
