//! Tests for reading single table files through the public API.

use chrono::NaiveDate;
use pxleague_core::format::mock::{encode_date, encode_number, encode_signed};
use pxleague_core::format::{Cell, FieldType, RecordLayout, TableFileBuilder, TextScanner};
use pxleague_core::{Error, LayoutConfig, ReadMode, TableReader, Value, decode, read_header};

fn team_table() -> TableFileBuilder {
    TableFileBuilder::new("Team")
        .field("ID", FieldType::LongInt, 4)
        .field("Name", FieldType::String, 16)
        .row([Cell::Int(1), "Reds".into()])
        .row([Cell::Int(2), "Blues".into()])
        .row([Cell::Int(3), "Greens".into()])
}

mod header {
    use super::*;

    #[test]
    fn test_team_header_fields() {
        let bytes = team_table().build();
        let header = read_header(&bytes, &LayoutConfig::default()).unwrap();

        assert_eq!(header.record_size, 20);
        assert_eq!(header.record_count, 3);
        assert_eq!(header.field_count, 2);
        assert_eq!(header.block_size, 2048);
        assert_eq!(header.header_size_in_blocks, 1);
        assert_eq!(header.table_name.as_deref(), Some("Team"));
        assert_eq!(header.fields[0].field_type, FieldType::LongInt);
        assert_eq!(header.fields[1].name, "Name");
        assert_eq!(header.fields[1].size, 16);
    }

    #[test]
    fn test_short_file_is_truncated_header() {
        let result = read_header(&[0u8; 87], &LayoutConfig::default());
        assert!(matches!(
            result,
            Err(Error::TruncatedHeader {
                len: 87,
                required: 88
            })
        ));
    }

    #[test]
    fn test_unrecovered_names_are_synthetic() {
        let bytes = team_table().without_names().build();
        let header = read_header(&bytes, &LayoutConfig::default()).unwrap();
        let names: Vec<&str> = header.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Field1", "Field2"]);
        assert_eq!(header.recovered_name_count(), 0);
    }

    #[test]
    fn test_larger_block_factor() {
        let bytes = team_table().block_size_factor(4).build();
        let reader = TableReader::from_bytes(bytes, &LayoutConfig::default()).unwrap();
        assert_eq!(reader.header().block_size, 4096);
        assert_eq!(reader.rows(ReadMode::Structured).count(), 3);
    }
}

mod rows {
    use super::*;

    #[test]
    fn test_team_scenario_decodes_three_rows() {
        let reader = TableReader::from_bytes(team_table().build(), &LayoutConfig::default()).unwrap();
        let rows: Vec<_> = reader
            .rows(ReadMode::Structured)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r.get("Name").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(names, ["Reds", "Blues", "Greens"]);
        assert_eq!(rows[2].get("id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_rows_restart_from_first_record() {
        let reader = TableReader::from_bytes(team_table().build(), &LayoutConfig::default()).unwrap();
        let first: Vec<_> = reader.rows(ReadMode::Structured).map(|r| r.unwrap()).collect();
        let second: Vec<_> = reader.rows(ReadMode::Structured).map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_fields_stay_null() {
        let bytes = TableFileBuilder::new("Player")
            .field("ID", FieldType::LongInt, 4)
            .field("TeamID", FieldType::LongInt, 4)
            .field("Joined", FieldType::Date, 4)
            .row([Cell::Int(1), Cell::Null, Cell::Null])
            .build();
        let reader = TableReader::from_bytes(bytes, &LayoutConfig::default()).unwrap();
        let row = reader.rows(ReadMode::Structured).next().unwrap().unwrap();
        assert_eq!(row.get("TeamID"), Some(&Value::Null));
        assert_eq!(row.get("Joined"), Some(&Value::Null));
    }

    #[test]
    fn test_name_only_mode() {
        let reader = TableReader::from_bytes(team_table().build(), &LayoutConfig::default()).unwrap();
        let row = reader.rows(ReadMode::NameOnly).nth(1).unwrap().unwrap();
        assert_eq!(row.get("ID"), Some(&Value::Integer(2)));
        assert_eq!(row.get("Name"), Some(&Value::Text("Blues".to_string())));
    }

    #[test]
    fn test_number_and_logical_columns() {
        let bytes = TableFileBuilder::new("Fee")
            .field("ID", FieldType::LongInt, 4)
            .field("Amount", FieldType::Number, 8)
            .field("Paid", FieldType::Logical, 1)
            .row([Cell::Int(1), Cell::Number(12.5), true.into()])
            .row([Cell::Int(2), Cell::Number(-3.25), false.into()])
            .build();
        let reader = TableReader::from_bytes(bytes, &LayoutConfig::default()).unwrap();
        let rows: Vec<_> = reader.rows(ReadMode::Structured).map(|r| r.unwrap()).collect();

        assert_eq!(rows[0].get("Amount"), Some(&Value::Double(12.5)));
        assert_eq!(rows[0].get("Paid"), Some(&Value::Bool(true)));
        assert_eq!(rows[1].get("Amount"), Some(&Value::Double(-3.25)));
        assert_eq!(rows[1].get("Paid"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_rows_span_blocks() {
        // 1 KiB blocks hold 50 records of 20 bytes.
        let mut table = TableFileBuilder::new("Team")
            .field("ID", FieldType::LongInt, 4)
            .field("Name", FieldType::String, 16)
            .block_size_factor(1);
        for i in 1..=120 {
            table = table.row([Cell::Int(i), Cell::Text(format!("Team {}", i))]);
        }
        let reader = TableReader::from_bytes(table.build(), &LayoutConfig::default()).unwrap();
        let ids: Vec<i64> = reader
            .rows(ReadMode::Structured)
            .map(|r| r.unwrap().get("ID").and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(ids, (1..=120).collect::<Vec<_>>());
    }
}

mod locator {
    use super::*;

    #[test]
    fn test_offsets_increase_without_overlap() {
        for record_size in [1usize, 7, 20, 341, 2042] {
            let layout = RecordLayout::new(record_size, 2048, 1, 6);
            let count = 200;
            let file_len = layout.data_start() + 2048 * (count / layout.records_per_block() + 1);
            let offsets: Vec<usize> = (0..count)
                .map(|i| layout.locate(i, file_len).unwrap())
                .collect();
            for pair in offsets.windows(2) {
                assert!(pair[0] + record_size <= pair[1], "record size {}", record_size);
            }
            assert!(offsets.iter().all(|&o| o + record_size <= file_len));
        }
    }

    #[test]
    fn test_past_end_is_out_of_range() {
        let layout = RecordLayout::new(20, 2048, 1, 6);
        assert_eq!(layout.locate(0, 4096).unwrap(), 2054);
        assert!(matches!(
            layout.locate(0, 2060),
            Err(Error::OutOfRange { index: 0, .. })
        ));
    }
}

mod values {
    use super::*;

    #[test]
    fn test_integer_sign_convention() {
        for value in [0i64, 1, -1, 42, -42, i32::MAX as i64, i32::MIN as i64 + 1] {
            let raw = encode_signed(value, 4);
            assert_eq!(decode(&raw, FieldType::LongInt), Value::Integer(value));
        }
        assert_eq!(decode(&[0x80, 0x00, 0x00, 0x07], FieldType::LongInt), Value::Integer(7));
        assert_eq!(decode(&[0x7F, 0xFF, 0xFF, 0xFF], FieldType::LongInt), Value::Integer(-1));
        assert_eq!(decode(&[0, 0, 0, 0], FieldType::LongInt), Value::Null);
        assert_eq!(decode(&[0, 0], FieldType::ShortInt), Value::Null);
    }

    #[test]
    fn test_all_zero_is_never_zero_or_epoch() {
        assert_eq!(decode(&[0; 8], FieldType::Number), Value::Null);
        assert_eq!(decode(&[0; 8], FieldType::Currency), Value::Null);
        assert_eq!(decode(&[0; 4], FieldType::Date), Value::Null);
        assert_eq!(decode(&[0; 8], FieldType::Timestamp), Value::Null);
        assert_eq!(decode(&[0], FieldType::Logical), Value::Null);
    }

    #[test]
    fn test_numbers_and_dates() {
        assert_eq!(decode(&encode_number(-2.5), FieldType::Number), Value::Double(-2.5));
        assert_eq!(decode(&encode_number(0.0), FieldType::Number), Value::Double(0.0));

        let day = NaiveDate::from_ymd_opt(2010, 4, 26).unwrap();
        assert_eq!(decode(&encode_date(day), FieldType::Date), Value::Date(day));
    }

    #[test]
    fn test_logical_and_text() {
        assert_eq!(decode(&[0x81], FieldType::Logical), Value::Bool(true));
        assert_eq!(decode(&[0x80], FieldType::Logical), Value::Bool(false));
        assert_eq!(decode(&[0x05], FieldType::Logical), Value::Bool(true));
        assert_eq!(decode(b"  Crown\0\0\0", FieldType::String), Value::Text("Crown".to_string()));
        assert_eq!(decode(b"\0\0\0", FieldType::String), Value::Null);
        assert_eq!(decode(b"Crown", FieldType::Unknown(0x1F)), Value::Text("Crown".to_string()));
    }
}

mod scanner {
    use super::*;

    fn record(label: &[u8]) -> Vec<u8> {
        let mut bytes = encode_signed(9, 4);
        bytes.extend_from_slice(label);
        bytes.resize(4 + 24, 0);
        bytes
    }

    #[test]
    fn test_accepts_padded_label() {
        let scanner = TextScanner::default();
        assert_eq!(scanner.scan(&record(b"MARY'S BAR")).as_deref(), Some("MARY'S BAR"));
    }

    #[test]
    fn test_rejects_short_and_numeric_runs() {
        let scanner = TextScanner::default();
        assert_eq!(scanner.scan(&record(b"X")), None);
        assert_eq!(scanner.scan(&record(b"12345")), None);
        assert_eq!(scanner.scan(&record(b"\x01ABC")), None);
    }
}
