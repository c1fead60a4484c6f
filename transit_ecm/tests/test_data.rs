use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;
use transit_ecm::data::{read_transit_records, Route, RouteSources, RouteTable};
use transit_ecm::EcmError;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn test_records_csv_split_by_route() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,From,To,Cycle,Gas Days,Gas Hours,Distillates Days,Distillates Hours").unwrap();
    writeln!(file, "2023-01-02,HTN,GBJ,1,10,12,11,0").unwrap();
    writeln!(file, "2023-01-02,HTN,LNJ,1,14,0,15,6").unwrap();
    writeln!(file, "2023-01-02,GBJ,HTN,1,8,6,,").unwrap();
    writeln!(file, "2023-01-02,HTN,ATJ,1,5,0,5,0").unwrap();
    writeln!(file, "2023-01-09,htn,gbj,2,11,0,12,0").unwrap();
    writeln!(file, "2023-01-09,HTN,LNJ,2,,,15,0").unwrap();

    let records = read_transit_records(file.path()).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].route(), Some(Route::Line1));
    assert_eq!(records[3].route(), None);
    assert_eq!(records[0].gas_transit_days(), Some(10.5));
    assert_eq!(records[5].gas_transit_days(), None);

    let sources = RouteSources::from_records_csv(file.path()).unwrap();
    assert_eq!(
        sources.line1.observations().unwrap(),
        vec![(date("2023-01-02"), 10.5), (date("2023-01-09"), 11.0)]
    );
    assert_eq!(sources.line3.observations().unwrap(), vec![(date("2023-01-02"), 8.25)]);
    assert_eq!(sources.line13.len(), 1);
}

#[test]
fn test_route_table_from_csv_drops_missing_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Gas Transit Days").unwrap();
    writeln!(file, "2023-01-02,10.5").unwrap();
    writeln!(file, "2023-01-09,").unwrap();
    writeln!(file, "2023-01-16,11.25").unwrap();

    let table = RouteTable::from_csv(Route::Line1, file.path()).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.observations().unwrap(),
        vec![(date("2023-01-02"), 10.5), (date("2023-01-16"), 11.25)]
    );
}

#[test]
fn test_route_table_missing_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Transit").unwrap();
    writeln!(file, "2023-01-02,10.5").unwrap();

    let table = RouteTable::from_csv(Route::Line13, file.path()).unwrap();
    let err = table.observations().unwrap_err();
    assert!(matches!(err, EcmError::ValidationError(_)));
    assert!(err.to_string().contains("Gas Transit Days"));
}

#[test]
fn test_data_error_handling() {
    assert!(RouteTable::from_csv(Route::Line1, "nonexistent_file.csv").is_err());
    assert!(read_transit_records("nonexistent_file.csv").is_err());
}
