//! Field payload decoding.
//!
//! Payloads are big-endian with a flipped sign convention: a set high bit on
//! the first byte marks a non-negative value, a clear high bit a negative one.
//! An all-zero payload is the format's "no value" and always decodes to
//! [`Value::Null`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::format::bytes::{decode_ascii, is_all_zero};
use crate::format::header::FieldType;
use crate::format::value::Value;

const MS_PER_DAY: i64 = 86_400_000;
const MAX_YEAR: i32 = 9999;

/// Decode one field's raw bytes according to its declared type.
pub fn decode(raw: &[u8], field_type: FieldType) -> Value {
    let decoded = match field_type {
        FieldType::ShortInt | FieldType::LongInt | FieldType::AutoIncrement => {
            decode_signed(raw).map(Value::Integer)
        }
        FieldType::Date => decode_date(raw).map(Value::Date),
        FieldType::Number => decode_number(raw).map(Value::Double),
        FieldType::Currency => decode_number(raw).map(|v| Value::Currency(round_currency(v))),
        FieldType::Logical => decode_logical(raw).map(Value::Bool),
        FieldType::Time => decode_time(raw).map(Value::Time),
        FieldType::Timestamp => decode_timestamp(raw).map(Value::Timestamp),
        FieldType::Memo | FieldType::Blob => {
            (!is_all_zero(raw)).then(|| Value::Bytes(raw.to_vec()))
        }
        FieldType::String | FieldType::Unknown(_) => decode_text(raw).map(Value::Text),
    };
    decoded.unwrap_or(Value::Null)
}

/// Decode a 1..=8 byte sign-flipped integer.
pub fn decode_signed(raw: &[u8]) -> Option<i64> {
    if raw.is_empty() || raw.len() > 8 || is_all_zero(raw) {
        return None;
    }

    let bits = raw.len() as u32 * 8;
    let value = raw.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
    let sign_bit = 1u64 << (bits - 1);
    let magnitude_mask = sign_bit - 1;

    if value & sign_bit != 0 {
        Some((value & magnitude_mask) as i64)
    } else {
        let inverted = !value & magnitude_mask;
        Some(-(inverted as i64) - 1)
    }
}

/// Legacy integer ID stored in a record's leading four bytes.
pub fn decode_legacy_id(record: &[u8]) -> Option<i64> {
    record.get(..4).and_then(decode_signed)
}

/// Days counted from 0001-01-01 as day 1.
pub fn decode_date(raw: &[u8]) -> Option<NaiveDate> {
    let days = decode_signed(raw)?;
    date_from_day_number(days)
}

fn date_from_day_number(days: i64) -> Option<NaiveDate> {
    if days <= 0 {
        return None;
    }
    let days = i32::try_from(days).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days).filter(|d| d.year() <= MAX_YEAR)
}

/// Sign-flipped IEEE-754 double.
pub fn decode_number(raw: &[u8]) -> Option<f64> {
    let bytes: [u8; 8] = raw.try_into().ok()?;
    if is_all_zero(&bytes) {
        return None;
    }

    let mut bytes = bytes;
    if bytes[0] & 0x80 != 0 {
        bytes[0] ^= 0x80;
    } else {
        for b in bytes.iter_mut() {
            *b ^= 0xFF;
        }
    }

    let value = f64::from_be_bytes(bytes);
    value.is_finite().then_some(value)
}

fn round_currency(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn decode_logical(raw: &[u8]) -> Option<bool> {
    match raw.first()? {
        0x00 => None,
        0x80 => Some(false),
        0x81 => Some(true),
        _ => Some(true),
    }
}

/// Milliseconds since midnight.
pub fn decode_time(raw: &[u8]) -> Option<NaiveTime> {
    time_from_ms(decode_signed(raw)?)
}

fn time_from_ms(ms: i64) -> Option<NaiveTime> {
    if !(0..MS_PER_DAY).contains(&ms) {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        (ms / 1000) as u32,
        ((ms % 1000) * 1_000_000) as u32,
    )
}

/// Milliseconds counted on the same day numbering as [`decode_date`].
pub fn decode_timestamp(raw: &[u8]) -> Option<NaiveDateTime> {
    let ms = decode_number(raw)?;
    if ms < 0.0 || ms > (i64::MAX / 2) as f64 {
        return None;
    }
    let ms = ms.round() as i64;
    let date = date_from_day_number(ms / MS_PER_DAY)?;
    let time = time_from_ms(ms % MS_PER_DAY)?;
    Some(date.and_time(time))
}

/// Bytes up to the first null, trimmed; empty is null.
pub fn decode_text(raw: &[u8]) -> Option<String> {
    let text = decode_ascii(raw);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::mock::{encode_date, encode_number, encode_signed};

    #[test]
    fn test_signed_known_bytes() {
        assert_eq!(decode_signed(&[0x80, 0x00, 0x00, 0x05]), Some(5));
        assert_eq!(decode_signed(&[0x80, 0x00, 0x00, 0x00]), Some(0));
        assert_eq!(decode_signed(&[0x7F, 0xFF, 0xFF, 0xFF]), Some(-1));
        assert_eq!(decode_signed(&[0x7F, 0xFF, 0xFF, 0xFB]), Some(-5));
        assert_eq!(decode_signed(&[0x80, 0x07]), Some(7));
        assert_eq!(decode_signed(&[0x7F, 0xFE]), Some(-2));
    }

    #[test]
    fn test_signed_all_zero_is_null() {
        assert_eq!(decode_signed(&[0, 0, 0, 0]), None);
        assert_eq!(decode_signed(&[0, 0]), None);
        assert_eq!(decode_signed(&[]), None);
        assert_eq!(decode(&[0, 0, 0, 0], FieldType::LongInt), Value::Null);
    }

    #[test]
    fn test_signed_round_trip() {
        for value in [0i64, 1, -1, 42, -42, 32_767, -32_767, 2_147_483_646, 2_147_483_647, -2_147_483_647] {
            let raw = encode_signed(value, 4);
            assert_eq!(decode_signed(&raw), Some(value), "value {value}");
        }
        for value in [0i64, 1, -1, 255, -300, 32_767, -32_767] {
            let raw = encode_signed(value, 2);
            assert_eq!(decode_signed(&raw), Some(value), "short {value}");
        }
    }

    #[test]
    fn test_zero_is_not_null() {
        assert_eq!(decode(&encode_signed(0, 4), FieldType::LongInt), Value::Integer(0));
        assert_eq!(decode(&encode_number(0.0), FieldType::Number), Value::Double(0.0));
    }

    #[test]
    fn test_number() {
        for value in [1.5f64, -1.5, 147.25, -0.125, 1e10] {
            assert_eq!(decode_number(&encode_number(value)), Some(value));
        }
        assert_eq!(decode_number(&[0u8; 8]), None);
        assert_eq!(decode_number(&[0x80, 0, 0]), None);
        assert_eq!(decode(&[0u8; 8], FieldType::Number), Value::Null);
    }

    #[test]
    fn test_currency_rounds() {
        let raw = encode_number(12.345_678);
        assert_eq!(decode(&raw, FieldType::Currency), Value::Currency(12.3457));
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(2009, 9, 14).unwrap();
        assert_eq!(decode_date(&encode_date(date)), Some(date));

        let day_one = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        assert_eq!(decode_date(&encode_signed(1, 4)), Some(day_one));

        assert_eq!(decode_date(&[0, 0, 0, 0]), None);
        assert_eq!(decode(&[0, 0, 0, 0], FieldType::Date), Value::Null);
        // Implausible values are absent, not errors.
        assert_eq!(decode_date(&encode_signed(0, 4)), None);
        assert_eq!(decode_date(&encode_signed(-5, 4)), None);
        assert_eq!(decode_date(&encode_signed(2_147_483_647, 4)), None);
    }

    #[test]
    fn test_logical() {
        assert_eq!(decode(&[0x81], FieldType::Logical), Value::Bool(true));
        assert_eq!(decode(&[0x80], FieldType::Logical), Value::Bool(false));
        assert_eq!(decode(&[0x00], FieldType::Logical), Value::Null);
        assert_eq!(decode(&[0x05], FieldType::Logical), Value::Bool(true));
        assert_eq!(decode(&[], FieldType::Logical), Value::Null);
    }

    #[test]
    fn test_time() {
        let raw = encode_signed(19 * 3_600_000 + 30 * 60_000, 4);
        assert_eq!(
            decode(&raw, FieldType::Time),
            Value::Time(NaiveTime::from_hms_opt(19, 30, 0).unwrap())
        );
        assert_eq!(decode_time(&encode_signed(MS_PER_DAY, 4)), None);
    }

    #[test]
    fn test_timestamp() {
        let date = NaiveDate::from_ymd_opt(2010, 3, 2).unwrap();
        let days = date.num_days_from_ce() as f64;
        let ms = days * MS_PER_DAY as f64 + 20.0 * 3_600_000.0;
        let expected = date.and_hms_opt(20, 0, 0).unwrap();
        assert_eq!(decode_timestamp(&encode_number(ms)), Some(expected));
        assert_eq!(decode_timestamp(&[0u8; 8]), None);
    }

    #[test]
    fn test_text() {
        let mut raw = b"Red Lion".to_vec();
        raw.resize(16, 0);
        assert_eq!(decode(&raw, FieldType::String), Value::Text("Red Lion".into()));
        assert_eq!(decode(b"  \0\0", FieldType::String), Value::Null);
        assert_eq!(decode(b"Cue Club  ", FieldType::Unknown(0x20)), Value::Text("Cue Club".into()));
    }

    #[test]
    fn test_blob_kept_raw() {
        assert_eq!(decode(&[0, 0, 0], FieldType::Memo), Value::Null);
        assert_eq!(decode(&[1, 2, 3], FieldType::Blob), Value::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_legacy_id() {
        let mut record = encode_signed(12, 4);
        record.extend_from_slice(b"Reds\0");
        assert_eq!(decode_legacy_id(&record), Some(12));
        assert_eq!(decode_legacy_id(&[0x80, 0x00]), None);
    }
}
