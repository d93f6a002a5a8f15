use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

use sales_dashboard::data::{
    aggregate, filter, load, load_with, ColumnNames, DataLoadError, DateRange, FilterCriteria,
    Quarter, Selection,
};

const CSV: &str = "\
Date,Pais,IdCliente,Descripcion,Cantidad,Total,Factura
2024-01-05 09:15:00,USA,17850,Mug,6,100.00,536365
2024-02-10 14:00:00,USA,13047,Lamp,1,50.00,536366
2024-01-20 11:30:00,,17850,Mug,2,12.50,536367
2024-03-02 10:00:00,France,12583,Candle,10,24.90,536368
2024-04-15 16:45:00,France,12583,Mug,3,7.50,536369
2024-04-16 08:00:00,Spain,,Mug,1,2.50,536370
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn csv_load_drops_incomplete_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ventas.csv", CSV);

    let ds = load(&path).unwrap();
    // Missing country and missing customer rows are gone.
    assert_eq!(ds.len(), 4);
    assert!(ds.records().iter().all(|r| !r.country.is_empty() && !r.customer_id.is_empty()));
    assert_eq!(ds.countries(), vec!["USA", "France"]);
}

#[test]
fn one_missing_country_removes_exactly_one_row() {
    let dir = TempDir::new().unwrap();
    let complete = "\
Date,Pais,IdCliente,Descripcion,Cantidad,Total
2024-01-05,USA,1,Mug,1,10
2024-01-06,USA,2,Mug,1,10
2024-01-07,UK,3,Mug,1,10
";
    let with_gap = complete.replace("2024-01-07,UK", "2024-01-07,");
    let full = load(&write_file(&dir, "full.csv", complete)).unwrap();
    let gapped = load(&write_file(&dir, "gap.csv", &with_gap)).unwrap();
    assert_eq!(gapped.len(), full.len() - 1);
}

#[test]
fn filter_then_aggregate_matches_a_manual_sum() {
    let dir = TempDir::new().unwrap();
    let ds = load(&write_file(&dir, "ventas.csv", CSV)).unwrap();

    let criteria = FilterCriteria {
        date_range: DateRange::new(day(2024, 1, 1), day(2024, 3, 31)),
        product: Selection::Only("Mug".into()),
        ..FilterCriteria::default()
    };
    let summary = aggregate(&filter(&ds, &criteria));

    let manual = ds
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .fold(0.0, |acc, r| acc + r.total);
    assert_eq!(summary.total, manual);
    assert_eq!(summary.total, 100.0);
    assert_eq!(summary.customers, 1);
}

#[test]
fn full_criteria_roundtrip_and_partition() {
    let dir = TempDir::new().unwrap();
    let ds = load(&write_file(&dir, "ventas.csv", CSV)).unwrap();

    let everything = filter(&ds, &FilterCriteria::full(&ds));
    assert_eq!(everything, ds);

    let summary = aggregate(&everything);
    let by_country = summary.by_country.iter().fold(0.0, |acc, (_, v)| acc + v);
    assert!((by_country - summary.total).abs() < 1e-9);
    assert_eq!(summary.quantity, 20.0);
    assert_eq!(summary.by_quarter.len(), 2);
}

#[test]
fn empty_selection_aggregates_to_zero() {
    let dir = TempDir::new().unwrap();
    let ds = load(&write_file(&dir, "ventas.csv", CSV)).unwrap();
    let criteria = FilterCriteria {
        country: Selection::Only("Japan".into()),
        ..FilterCriteria::full(&ds)
    };
    let summary = aggregate(&filter(&ds, &criteria));
    assert_eq!(summary.total, 0.0);
    assert_eq!(summary.quantity, 0.0);
    assert_eq!(summary.customers, 0);
    assert!(summary.by_month.is_empty() && summary.by_product_country.is_empty());
}

#[test]
fn missing_column_fails_with_data_load_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "no_total.csv",
        "Date,Pais,IdCliente,Descripcion,Cantidad\n2024-01-05,USA,1,Mug,1\n",
    );
    match load(&path) {
        Err(DataLoadError::MissingColumns(cols)) => assert_eq!(cols, vec!["Total"]),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn missing_file_and_bad_extension_fail() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load(&dir.path().join("absent.xlsx")),
        Err(DataLoadError::Io { .. })
    ));
    let txt = write_file(&dir, "ventas.txt", CSV);
    assert!(matches!(load(&txt), Err(DataLoadError::UnsupportedFormat(_))));
}

#[test]
fn json_records_with_epoch_dates() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "ventas.json",
        r#"[
            {"Date": 1704448800000, "Pais": "USA", "IdCliente": 17850.0,
             "Descripcion": "Mug", "Cantidad": 6, "Total": 100.0},
            {"Date": "2024-02-10T14:00:00", "Pais": "USA", "IdCliente": "13047",
             "Descripcion": "Lamp", "Cantidad": 1, "Total": 50},
            {"Date": "2024-02-11", "Pais": null, "IdCliente": "1",
             "Descripcion": "Lamp", "Cantidad": 1, "Total": 5}
        ]"#,
    );

    let ds = load(&path).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.records()[0].customer_id, "17850");
    assert_eq!(ds.records()[0].date(), day(2024, 1, 5));
    assert_eq!(aggregate(&ds).total, 150.0);
}

#[test]
fn json_that_is_not_an_array_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ventas.json", r#"{"Date": "2024-01-05"}"#);
    assert!(matches!(load(&path), Err(DataLoadError::JsonShape(_))));
}

#[test]
fn parquet_with_date32_and_nulls() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ventas.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, true),
        Field::new("Pais", DataType::Utf8, true),
        Field::new("IdCliente", DataType::Utf8, true),
        Field::new("Descripcion", DataType::Utf8, true),
        Field::new("Cantidad", DataType::Int32, true),
        Field::new("Total", DataType::Float64, true),
    ]));
    // 19727 = 2024-01-05 in days since the epoch.
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(vec![Some(19727), Some(19763), None])),
            Arc::new(StringArray::from(vec![Some("USA"), None, Some("USA")])),
            Arc::new(StringArray::from(vec!["17850", "13047", "1"])),
            Arc::new(StringArray::from(vec!["Mug", "Lamp", "Lamp"])),
            Arc::new(Int32Array::from(vec![6, 1, 1])),
            Arc::new(Float64Array::from(vec![100.0, 50.0, 5.0])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load(&path).unwrap();
    assert_eq!(ds.len(), 1);
    let r = &ds.records()[0];
    assert_eq!(r.date(), day(2024, 1, 5));
    assert_eq!((r.quantity, r.total), (6.0, 100.0));
}

#[test]
fn renamed_columns_via_load_with() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "retail.csv",
        "InvoiceDate,Country,CustomerID,Description,Quantity,Amount\n\
         12/1/2010 8:26,United Kingdom,17850,WHITE METAL LANTERN,6,20.34\n",
    );
    let columns = ColumnNames {
        date: "InvoiceDate".into(),
        country: "Country".into(),
        customer_id: "CustomerID".into(),
        product: "Description".into(),
        quantity: "Quantity".into(),
        total: "Amount".into(),
    };
    let ds = load_with(&path, &columns).unwrap();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.records()[0].year_month.to_string(), "2010-12");
    assert!(load(&path).is_err());
}

/// Excel serial number (days since 1899-12-30) for a calendar date.
fn excel_serial(date: NaiveDate) -> f64 {
    (date - day(1899, 12, 30)).num_days() as f64
}

#[test]
fn xlsx_workbook_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ventas.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let sheet = workbook.add_worksheet();
    for (col, name) in ["Date", "Pais", "IdCliente", "Descripcion", "Cantidad", "Total"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    // (date, country, customer, product, quantity, total); the second row has
    // an empty country cell.
    let rows = [
        (day(2024, 1, 5), Some("USA"), 17850.0, "Mug", 6.0, 100.0),
        (day(2024, 2, 10), None, 13047.0, "Lamp", 1.0, 50.0),
        (day(2024, 4, 15), Some("France"), 12583.0, "Mug", 3.0, 7.5),
    ];
    for (i, (date, country, customer, product, qty, total)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet
            .write_number_with_format(r, 0, excel_serial(*date) + 0.25, &date_format)
            .unwrap();
        if let Some(country) = country {
            sheet.write_string(r, 1, *country).unwrap();
        }
        sheet.write_number(r, 2, *customer).unwrap();
        sheet.write_string(r, 3, *product).unwrap();
        sheet.write_number(r, 4, *qty).unwrap();
        sheet.write_number(r, 5, *total).unwrap();
    }
    workbook.save(&path).unwrap();

    let ds = load(&path).unwrap();
    assert_eq!(ds.len(), 2);
    let first = &ds.records()[0];
    assert_eq!(first.date(), day(2024, 1, 5));
    assert_eq!(first.country, "USA");
    assert_eq!(first.customer_id, "17850");
    assert_eq!(first.product, "Mug");
    assert_eq!(ds.records()[1].customer_id, "12583");

    let summary = aggregate(&ds);
    assert_eq!(summary.total, 107.5);
    assert_eq!(summary.quantity, 9.0);
    assert_eq!(
        summary.by_quarter,
        vec![
            (Quarter { year: 2024, quarter: 1 }, 100.0),
            (Quarter { year: 2024, quarter: 2 }, 7.5),
        ]
    );
}
