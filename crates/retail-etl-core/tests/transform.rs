use chrono::{NaiveDate, NaiveTime};

use retail_etl_core::error::TransformError;
use retail_etl_core::record::{CleanRecord, RawRecord};
use retail_etl_core::transform::transform;

fn raw(
    id: Option<&str>,
    date: Option<&str>,
    quantity: Option<&str>,
    price: Option<&str>,
) -> RawRecord {
    RawRecord {
        transaction_id: id.map(String::from),
        date: date.map(String::from),
        customer_id: None,
        product_id: None,
        quantity: quantity.map(String::from),
        price: price.map(String::from),
    }
}

fn to_raw(clean: &CleanRecord) -> RawRecord {
    RawRecord {
        transaction_id: Some(clean.transaction_id.clone()),
        date: Some(clean.date.format("%Y-%m-%d %H:%M:%S").to_string()),
        customer_id: clean.customer_id.clone(),
        product_id: clean.product_id.clone(),
        quantity: Some(clean.quantity.to_string()),
        price: Some(clean.price.to_string()),
    }
}

#[test]
fn scenario_only_fully_valid_row_survives() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-01"), Some("2"), Some("5.0")),
        raw(Some("1"), Some("2024-01-01"), Some("2"), Some("5.0")),
        raw(Some("2"), None, Some("3"), Some("4.0")),
        raw(Some("3"), Some("2024-01-02"), Some("-1"), Some("4.0")),
    ];

    let cleaned = transform(rows).expect("transform failed");

    assert_eq!(cleaned.len(), 1);
    let survivor = &cleaned[0];
    assert_eq!(survivor.transaction_id, "1");
    assert_eq!(survivor.quantity, 2.0);
    assert_eq!(survivor.price, 5.0);
    assert_eq!(survivor.total_amount, 10.0);
    assert_eq!(
        survivor.date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_time(NaiveTime::MIN)
    );
}

#[test]
fn dedup_keeps_first_occurrence_and_input_order() {
    let rows = vec![
        raw(Some("a"), Some("2024-01-01"), Some("1"), Some("1.0")),
        raw(Some("b"), Some("2024-01-01"), Some("1"), Some("1.0")),
        raw(Some("a"), Some("2024-01-01"), Some("1"), Some("1.0")),
        raw(Some("c"), Some("2024-01-01"), Some("1"), Some("1.0")),
        raw(Some("b"), Some("2024-01-01"), Some("1"), Some("1.0")),
    ];

    let cleaned = transform(rows).expect("transform failed");
    let ids: Vec<&str> = cleaned.iter().map(|r| r.transaction_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn near_duplicates_differing_in_any_column_are_kept() {
    let mut second = raw(Some("a"), Some("2024-01-01"), Some("1"), Some("1.0"));
    second.customer_id = Some("C001".to_string());

    let rows = vec![
        raw(Some("a"), Some("2024-01-01"), Some("1"), Some("1.0")),
        second,
    ];

    let cleaned = transform(rows).expect("transform failed");
    assert_eq!(cleaned.len(), 2);
}

#[test]
fn transform_is_idempotent_on_already_clean_input() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-01 13:45:00"), Some("2"), Some("5.0")),
        raw(Some("2"), Some("2024-01-02"), Some("7"), Some("0.5")),
        raw(Some("3"), Some("2024-01-03"), Some("1.5"), Some("3.25")),
    ];

    let first = transform(rows).expect("first transform failed");
    let round_tripped: Vec<RawRecord> = first.iter().map(to_raw).collect();
    let second = transform(round_tripped).expect("second transform failed");

    assert_eq!(first, second);
}

#[test]
fn total_amount_is_the_product_of_quantity_and_price() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-01"), Some("2"), Some("5.0")),
        raw(Some("2"), Some("2024-01-01"), Some("0.5"), Some("8.0")),
        raw(Some("3"), Some("2024-01-01"), Some("3"), Some("3.33")),
    ];

    let cleaned = transform(rows).expect("transform failed");
    assert_eq!(cleaned.len(), 3);
    for record in &cleaned {
        assert_eq!(record.total_amount, record.quantity * record.price);
    }
}

#[test]
fn nonpositive_or_uncoercible_numerics_are_filtered() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-01"), Some("0"), Some("5.0")),
        raw(Some("2"), Some("2024-01-01"), Some("-3"), Some("5.0")),
        raw(Some("3"), Some("2024-01-01"), Some("2"), Some("-0.01")),
        raw(Some("4"), Some("2024-01-01"), Some("two"), Some("5.0")),
        raw(Some("5"), Some("2024-01-01"), Some("2"), None),
        raw(Some("6"), Some("2024-01-01"), Some("2"), Some("5.0")),
    ];

    let cleaned = transform(rows).expect("transform failed");
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].transaction_id, "6");
    for record in &cleaned {
        assert!(record.quantity > 0.0);
        assert!(record.price > 0.0);
    }
}

#[test]
fn rows_missing_identifier_or_date_are_dropped() {
    let rows = vec![
        raw(None, Some("2024-01-01"), Some("2"), Some("5.0")),
        raw(Some("2"), None, Some("2"), Some("5.0")),
        raw(Some("3"), Some("2024-01-01"), Some("2"), Some("5.0")),
    ];

    let cleaned = transform(rows).expect("transform failed");
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].transaction_id, "3");
}

#[test]
fn unparseable_date_fails_the_stage() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-01"), Some("2"), Some("5.0")),
        raw(Some("2"), Some("yesterday"), Some("2"), Some("5.0")),
    ];

    let err = transform(rows).expect_err("expected a transform error");
    assert!(matches!(
        err,
        TransformError::InvalidDate { ref value, .. } if value == "yesterday"
    ));
}

#[test]
fn malformed_date_surfaces_even_when_numerics_would_drop_the_row() {
    // The date column is parsed before the positivity filter runs, so a bad
    // date in a row with a negative quantity is still fatal.
    let rows = vec![raw(Some("1"), Some("bogus"), Some("-1"), Some("5.0"))];
    assert!(transform(rows).is_err());
}

#[test]
fn accepted_date_formats_parse_to_canonical_timestamps() {
    let rows = vec![
        raw(Some("1"), Some("2024-01-02"), Some("1"), Some("1.0")),
        raw(Some("2"), Some("2024-01-02 13:45:00"), Some("1"), Some("1.0")),
        raw(Some("3"), Some("01/15/2024"), Some("1"), Some("1.0")),
    ];

    let cleaned = transform(rows).expect("transform failed");
    assert_eq!(cleaned.len(), 3);
    assert_eq!(
        cleaned[1].date,
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap()
    );
    assert_eq!(
        cleaned[2].date,
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_time(NaiveTime::MIN)
    );
}

#[test]
fn empty_table_transforms_to_empty_table() {
    let cleaned = transform(Vec::new()).expect("transform failed");
    assert!(cleaned.is_empty());
}
