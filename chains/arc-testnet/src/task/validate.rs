use core_logic::ValidationError;
use ethers::types::{Address, U256};
use ethers::utils::{parse_ether, to_checksum};

/// 3-20 chars of `[a-z0-9-]`, no leading or trailing hyphen.
pub fn name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length < 3 {
        return Err(ValidationError::NameTooShort { length });
    }
    if length > 20 {
        return Err(ValidationError::NameTooLong { length });
    }

    let allowed = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !allowed {
        return Err(ValidationError::NameCharacters {
            name: name.to_string(),
        });
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(ValidationError::NameHyphenEdge {
            name: name.to_string(),
        });
    }

    Ok(())
}

pub fn token_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if !(2..=30).contains(&length) {
        return Err(ValidationError::TokenNameLength { length });
    }
    Ok(())
}

pub fn symbol(symbol: &str) -> Result<(), ValidationError> {
    let length = symbol.chars().count();
    if !(2..=10).contains(&length) {
        return Err(ValidationError::SymbolLength { length });
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::SymbolCharacters {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

/// Parses a 20-byte hex address. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lowercase or all-uppercase input is accepted as is.
pub fn address(raw: &str) -> Result<Address, ValidationError> {
    let raw = raw.trim();
    let well_formed = raw.len() == 42
        && raw.starts_with("0x")
        && raw[2..].chars().all(|c| c.is_ascii_hexdigit());
    if !well_formed {
        return Err(ValidationError::InvalidAddress {
            address: raw.to_string(),
        });
    }

    let parsed: Address = raw.parse().map_err(|_| ValidationError::InvalidAddress {
        address: raw.to_string(),
    })?;

    let body = &raw[2..];
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&parsed, None) != raw {
        return Err(ValidationError::ChecksumMismatch {
            address: raw.to_string(),
        });
    }

    Ok(parsed)
}

/// Whole native units to base units (18 decimals). Digits past the 18th
/// decimal are truncated.
pub fn to_base_units(field: &str, value: f64) -> Result<U256, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount {
            field: field.to_string(),
            reason: format!("{} is not a finite non-negative number", value),
        });
    }

    let text = value.to_string();
    let text = match text.split_once('.') {
        Some((whole, frac)) if frac.len() > 18 => format!("{}.{}", whole, &frac[..18]),
        _ => text,
    };

    parse_ether(&text).map_err(|e| ValidationError::InvalidAmount {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
