//! Customer contact rules.
//!
//! The first failing field short-circuits with a field-specific message.

use domain::{Address, CustomerInfo};

use crate::RuleError;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const FREEFORM_ADDRESS_MIN: usize = 10;

pub(crate) fn check_customer_info(info: &CustomerInfo) -> Result<(), RuleError> {
    check_name(&info.name)?;
    check_email(&info.email)?;
    check_phone(&info.phone)?;
    check_address(&info.address)
}

pub(crate) fn check_name(name: &str) -> Result<(), RuleError> {
    let len = name.trim().chars().count();
    if len < NAME_MIN || len > NAME_MAX {
        return Err(RuleError::InvalidName {
            min: NAME_MIN,
            max: NAME_MAX,
        });
    }
    Ok(())
}

pub(crate) fn check_email(email: &str) -> Result<(), RuleError> {
    let email = email.trim();
    let invalid = || RuleError::InvalidEmail {
        email: email.to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || email.contains(' ') || domain.contains('@') {
        return Err(invalid());
    }
    // The domain needs an interior dot.
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(invalid());
    };
    if host.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    Ok(())
}

/// Sri Lankan numbers: `0XXXXXXXXX` (ten digits) or `+94XXXXXXXXX`
/// (country code plus nine digits). Spaces and dashes are ignored.
pub(crate) fn check_phone(phone: &str) -> Result<(), RuleError> {
    let normalized: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let invalid = || RuleError::InvalidPhone {
        phone: phone.to_string(),
    };

    let digits = if let Some(rest) = normalized.strip_prefix("+94") {
        if rest.len() != 9 {
            return Err(invalid());
        }
        rest
    } else if let Some(rest) = normalized.strip_prefix('0') {
        if rest.len() != 9 {
            return Err(invalid());
        }
        rest
    } else {
        return Err(invalid());
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(())
}

pub(crate) fn check_address(address: &Address) -> Result<(), RuleError> {
    match address {
        Address::Structured { street, city, .. } => {
            if street.trim().is_empty() || city.trim().is_empty() {
                return Err(RuleError::IncompleteAddress);
            }
            Ok(())
        }
        Address::Freeform(text) => {
            if text.trim().chars().count() < FREEFORM_ADDRESS_MIN {
                return Err(RuleError::AddressTooShort {
                    minimum: FREEFORM_ADDRESS_MIN,
                });
            }
            Ok(())
        }
    }
}
