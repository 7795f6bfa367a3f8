//! String forms of the chain's scalar types: names, symbols, assets, timestamps
//!
//! Names pack up to 12 base-32 characters (plus a 4-bit 13th) into a u64.
//! Assets pair an i64 amount with a symbol (precision + up to 7 uppercase
//! letters). Timestamps travel as `YYYY-MM-DDTHH:MM:SS.sss` strings without a
//! timezone suffix and are always UTC.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::constants::{MAX_ASSET_PRECISION, MAX_NAME_LENGTH};
use crate::error::Error;

const NAME_CHARS: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

/// Pack an account/action/table name string into its u64 form.
pub fn name_to_u64(name: &str) -> Result<u64, Error> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::serialization(format!(
            "name \"{}\" is longer than {} characters",
            name, MAX_NAME_LENGTH
        )));
    }
    let bytes = name.as_bytes();
    let mut value: u64 = 0;
    for (i, &c) in bytes.iter().enumerate() {
        let sym = char_to_symbol(c).ok_or_else(|| {
            Error::serialization(format!("name \"{}\" contains invalid character '{}'", name, c as char))
        })?;
        if i < 12 {
            value |= (sym & 0x1f) << (64 - 5 * (i + 1));
        } else {
            // 13th character only has 4 bits of room.
            if sym > 0x0f {
                return Err(Error::serialization(format!(
                    "13th character of name \"{}\" is out of range",
                    name
                )));
            }
            value |= sym;
        }
    }
    Ok(value)
}

/// Unpack a u64 name into its string form, trimming trailing dots.
pub fn name_from_u64(value: u64) -> String {
    let mut chars = [b'.'; 13];
    let mut v = value;
    for i in (0..13).rev() {
        let sym = if i == 12 { v & 0x0f } else { v & 0x1f };
        chars[i] = NAME_CHARS[sym as usize];
        v >>= if i == 12 { 4 } else { 5 };
    }
    let s: String = chars.iter().map(|&c| c as char).collect();
    s.trim_end_matches('.').to_string()
}

/// Pack a symbol code ("SYS") into its u64 form.
pub fn symbol_code_to_u64(code: &str) -> Result<u64, Error> {
    if code.is_empty() || code.len() > 7 {
        return Err(Error::serialization(format!(
            "symbol code \"{}\" must be 1-7 characters",
            code
        )));
    }
    let mut value: u64 = 0;
    for (i, &c) in code.as_bytes().iter().enumerate() {
        if !c.is_ascii_uppercase() {
            return Err(Error::serialization(format!(
                "symbol code \"{}\" must be uppercase A-Z",
                code
            )));
        }
        value |= u64::from(c) << (8 * i);
    }
    Ok(value)
}

/// Unpack a u64 symbol code into its string form.
pub fn symbol_code_from_u64(value: u64) -> String {
    let mut code = String::new();
    let mut v = value;
    while v > 0 {
        let c = (v & 0xff) as u8;
        if c == 0 {
            break;
        }
        code.push(c as char);
        v >>= 8;
    }
    code
}

/// Pack a symbol string ("4,SYS") into precision + code u64 form.
pub fn symbol_to_u64(symbol: &str) -> Result<u64, Error> {
    let (precision, code) = symbol
        .split_once(',')
        .ok_or_else(|| Error::serialization(format!("symbol \"{}\" must be \"precision,CODE\"", symbol)))?;
    let precision: u8 = precision
        .parse()
        .map_err(|_| Error::serialization(format!("symbol \"{}\" has an invalid precision", symbol)))?;
    if precision > MAX_ASSET_PRECISION {
        return Err(Error::serialization(format!(
            "symbol precision {} exceeds the maximum of {}",
            precision, MAX_ASSET_PRECISION
        )));
    }
    Ok(u64::from(precision) | (symbol_code_to_u64(code)? << 8))
}

/// Unpack a u64 symbol into its "precision,CODE" string form.
pub fn symbol_from_u64(value: u64) -> String {
    format!("{},{}", value & 0xff, symbol_code_from_u64(value >> 8))
}

/// A parsed asset amount: integer amount, symbol precision, symbol code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub amount: i64,
    pub precision: u8,
    pub code: String,
}

/// Parse an asset string like `"1.1234 SYS"` into its integer form.
pub fn parse_asset(text: &str) -> Result<Asset, Error> {
    let (amount_str, code) = text
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::serialization(format!("asset \"{}\" is missing a symbol", text)))?;
    let code = code.trim();
    symbol_code_to_u64(code)?;

    let negative = amount_str.starts_with('-');
    let digits = amount_str.strip_prefix('-').unwrap_or(amount_str);
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::serialization(format!("asset \"{}\" has a malformed amount", text)));
    }
    let precision = frac.len() as u8;
    if precision > MAX_ASSET_PRECISION {
        return Err(Error::serialization(format!(
            "asset \"{}\" precision exceeds the maximum of {}",
            text, MAX_ASSET_PRECISION
        )));
    }
    let combined = format!("{}{}", whole, frac);
    let mut amount: i64 = combined
        .parse()
        .map_err(|_| Error::serialization(format!("asset \"{}\" amount overflows", text)))?;
    if negative {
        amount = -amount;
    }
    Ok(Asset {
        amount,
        precision,
        code: code.to_string(),
    })
}

/// Format an integer asset back into its string form.
pub fn format_asset(asset: &Asset) -> String {
    let negative = asset.amount < 0;
    let magnitude = asset.amount.unsigned_abs().to_string();
    let precision = asset.precision as usize;
    let padded = if magnitude.len() <= precision {
        format!("{}{}", "0".repeat(precision + 1 - magnitude.len()), magnitude)
    } else {
        magnitude
    };
    let (whole, frac) = padded.split_at(padded.len() - precision);
    let sign = if negative { "-" } else { "" };
    if precision == 0 {
        format!("{}{} {}", sign, whole, asset.code)
    } else {
        format!("{}{}.{} {}", sign, whole, frac, asset.code)
    }
}

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn parse_chain_time(text: &str) -> Result<NaiveDateTime, Error> {
    NaiveDateTime::parse_from_str(text.trim_end_matches('Z'), TIME_FORMAT)
        .map_err(|e| Error::serialization(format!("invalid timestamp \"{}\": {}", text, e)))
}

/// Format a chain timestamp with millisecond precision, the node's wire form.
pub fn format_chain_time(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT_MILLIS).to_string()
}

/// Add a whole-second offset to a chain timestamp string.
pub fn add_seconds(text: &str, seconds: u32) -> Result<String, Error> {
    let time = parse_chain_time(text)?;
    Ok(format_chain_time(time + Duration::seconds(i64::from(seconds))))
}

/// `time_point`: microseconds since the Unix epoch.
pub fn time_point_to_micros(text: &str) -> Result<i64, Error> {
    Ok(parse_chain_time(text)?.and_utc().timestamp_micros())
}

pub fn time_point_from_micros(micros: i64) -> Result<String, Error> {
    chrono::DateTime::from_timestamp_micros(micros)
        .map(|dt| format_chain_time(dt.naive_utc()))
        .ok_or_else(|| Error::serialization(format!("time_point {} is out of range", micros)))
}

/// `time_point_sec`: seconds since the Unix epoch.
pub fn time_point_sec_to_secs(text: &str) -> Result<u32, Error> {
    let secs = parse_chain_time(text)?.and_utc().timestamp();
    u32::try_from(secs)
        .map_err(|_| Error::serialization(format!("timestamp \"{}\" is outside the u32 range", text)))
}

pub fn time_point_sec_from_secs(secs: u32) -> Result<String, Error> {
    chrono::DateTime::from_timestamp(i64::from(secs), 0)
        .map(|dt| format_chain_time(dt.naive_utc()))
        .ok_or_else(|| Error::serialization(format!("time_point_sec {} is out of range", secs)))
}

fn block_timestamp_epoch() -> NaiveDateTime {
    // Block timestamps count 500 ms slots since 2000-01-01T00:00:00.000 UTC.
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// `block_timestamp_type`: 500 ms slots since the block timestamp epoch.
pub fn block_timestamp_to_slot(text: &str) -> Result<u32, Error> {
    let time = parse_chain_time(text)?;
    let millis = (time - block_timestamp_epoch()).num_milliseconds();
    if millis < 0 {
        return Err(Error::serialization(format!(
            "timestamp \"{}\" predates the block timestamp epoch",
            text
        )));
    }
    u32::try_from(millis / 500)
        .map_err(|_| Error::serialization(format!("timestamp \"{}\" is outside the slot range", text)))
}

pub fn block_timestamp_from_slot(slot: u32) -> String {
    format_chain_time(block_timestamp_epoch() + Duration::milliseconds(i64::from(slot) * 500))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_known_values() {
        // Values cross-checked against serialized table rows from a live node.
        assert_eq!(name_to_u64("jane").unwrap(), 0x79a6_a000_0000_0000);
        assert_eq!(name_to_u64("john").unwrap(), 0x7d1b_3000_0000_0000);
        assert_eq!(name_to_u64("bob").unwrap(), 0x3d0e_0000_0000_0000);
        assert_eq!(name_to_u64("alice").unwrap(), 0x345c_8500_0000_0000);
        assert_eq!(name_to_u64("").unwrap(), 0);
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["eosio", "eosio.token", "transfer", "kvaddrbook", "a", "zzzzzzzzzzzzj"] {
            let packed = name_to_u64(name).unwrap();
            assert_eq!(name_from_u64(packed), name, "round trip of {}", name);
        }
    }

    #[test]
    fn test_name_rejects_invalid() {
        assert!(name_to_u64("Bob").is_err());
        assert!(name_to_u64("has space").is_err());
        assert!(name_to_u64("0zero").is_err());
        assert!(name_to_u64("waytoolongname").is_err());
        // 13th character must fit in 4 bits ('a'..'j' and '1'..'5').
        assert!(name_to_u64("zzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_symbol_round_trip() {
        let packed = symbol_to_u64("4,SYS").unwrap();
        assert_eq!(packed & 0xff, 4);
        assert_eq!(symbol_from_u64(packed), "4,SYS");
        assert_eq!(symbol_code_from_u64(symbol_code_to_u64("EOS").unwrap()), "EOS");
    }

    #[test]
    fn test_symbol_rejects_invalid() {
        assert!(symbol_to_u64("SYS").is_err());
        assert!(symbol_to_u64("4,sys").is_err());
        assert!(symbol_to_u64("19,SYS").is_err());
        assert!(symbol_code_to_u64("TOOLONGXX").is_err());
    }

    #[test]
    fn test_parse_asset() {
        let asset = parse_asset("1.1234 SYS").unwrap();
        assert_eq!(asset.amount, 11234);
        assert_eq!(asset.precision, 4);
        assert_eq!(asset.code, "SYS");

        let whole = parse_asset("42 BOID").unwrap();
        assert_eq!(whole.amount, 42);
        assert_eq!(whole.precision, 0);

        let negative = parse_asset("-0.5000 EOS").unwrap();
        assert_eq!(negative.amount, -5000);
    }

    #[test]
    fn test_asset_round_trip() {
        for text in ["1.1234 SYS", "0.0001 EOS", "-3.14 PI", "1000 RAW"] {
            let asset = parse_asset(text).unwrap();
            assert_eq!(format_asset(&asset), text);
        }
    }

    #[test]
    fn test_parse_asset_rejects_malformed() {
        assert!(parse_asset("1.1234").is_err());
        assert!(parse_asset("abc SYS").is_err());
        assert!(parse_asset(". SYS").is_err());
        assert!(parse_asset("1.0 sys").is_err());
    }

    #[test]
    fn test_time_point_sec_round_trip() {
        let secs = time_point_sec_to_secs("2021-06-01T12:00:00.000").unwrap();
        assert_eq!(time_point_sec_from_secs(secs).unwrap(), "2021-06-01T12:00:00.000");
        // Fraction-less and Z-suffixed forms also parse.
        assert_eq!(time_point_sec_to_secs("2021-06-01T12:00:00").unwrap(), secs);
        assert_eq!(time_point_sec_to_secs("2021-06-01T12:00:00Z").unwrap(), secs);
    }

    #[test]
    fn test_add_seconds() {
        let expiration = add_seconds("2021-06-01T12:00:00.000", 300).unwrap();
        assert_eq!(expiration, "2021-06-01T12:05:00.000");
    }

    #[test]
    fn test_block_timestamp_slots() {
        assert_eq!(block_timestamp_to_slot("2000-01-01T00:00:00.000").unwrap(), 0);
        assert_eq!(block_timestamp_to_slot("2000-01-01T00:00:01.000").unwrap(), 2);
        assert_eq!(block_timestamp_from_slot(2), "2000-01-01T00:00:01.000");
    }
}
