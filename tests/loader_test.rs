mod common;

use common::{monthly_csv, write_csv, TempTestDir};
use macropanel::{load_series, DatasetDescriptor, Error, MonthPeriod, SeriesLoader};

fn p(y: i32, m: u32) -> MonthPeriod {
    MonthPeriod::new(y, m).unwrap()
}

#[test]
fn test_index_is_gap_free_and_increasing() {
    let dir = TempTestDir::new("loader_gap_free").unwrap();
    // rows out of order with a missing month in between
    let path = write_csv(
        dir.path(),
        "rates.csv",
        "Fecha;Valor\n01/03/2020;3,5\n01/01/2020;1,5\n01/05/2020;5,5\n",
    );

    let series = load_series(&path, "Fecha", "Valor", ';', Some("%d/%m/%Y")).unwrap();
    let periods = series.periods();

    assert_eq!(series.start(), Some(p(2020, 1)));
    assert_eq!(series.end(), Some(p(2020, 5)));
    assert_eq!(periods.len(), 5);
    for pair in periods.windows(2) {
        assert_eq!(pair[0].succ(), pair[1]);
    }
    // April is covered by carrying March forward
    assert_eq!(series.get(&p(2020, 4)), Some(3.5));
}

#[test]
fn test_reload_is_identical() {
    let dir = TempTestDir::new("loader_idempotent").unwrap();
    let path = write_csv(dir.path(), "m2.csv", &monthly_csv(2019, 18, |i| 10.0 + i as f64 * 0.25));

    let first = load_series(&path, "Fecha", "Valor", ';', None).unwrap();
    let second = load_series(&path, "Fecha", "Valor", ';', None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 18);
}

#[test]
fn test_duplicate_date_keeps_first_occurrence() {
    let dir = TempTestDir::new("loader_duplicates").unwrap();
    let path = write_csv(
        dir.path(),
        "dup.csv",
        "Fecha;Valor\n01/01/2020;1\n01/02/2020;2\n01/02/2020;99\n01/03/2020;3\n",
    );

    let loader = SeriesLoader::with_default_locales().unwrap();
    let loaded = loader
        .load(&DatasetDescriptor::new(&path, "Fecha", "Valor").with_date_format("%d/%m/%Y"))
        .unwrap();

    assert_eq!(loaded.report.rows_read, 4);
    assert_eq!(loaded.report.duplicate_dates, 1);
    assert_eq!(loaded.report.rows_kept, loaded.report.rows_read - 1);
    assert_eq!(loaded.series.get(&p(2020, 2)), Some(2.0));
}

#[test]
fn test_decimal_comma_and_point_agree() {
    let dir = TempTestDir::new("loader_decimals").unwrap();
    let comma = write_csv(dir.path(), "comma.csv", "Fecha;Valor\n2021-01-01;1234,5\n");
    let point = write_csv(dir.path(), "point.csv", "Fecha;Valor\n2021-01-01;1234.5\n");

    let a = load_series(&comma, "Fecha", "Valor", ';', None).unwrap();
    let b = load_series(&point, "Fecha", "Valor", ';', None).unwrap();
    assert_eq!(a.values(), &[1234.5]);
    assert_eq!(a.values(), b.values());
}

#[test]
fn test_header_with_line_break() {
    let dir = TempTestDir::new("loader_headers").unwrap();
    let path = write_csv(
        dir.path(),
        "exchange_rate.csv",
        "Mes;\"Tipo de cambio\nnominal\"\nene-21;3,75\nfeb-21;3,80\n",
    );

    let series = load_series(&path, "Mes", "Tipo de cambio nominal", ';', Some("%b-%y")).unwrap();
    assert_eq!(series.start(), Some(p(2021, 1)));
    assert_eq!(series.values(), &[3.75, 3.8]);
}

#[test]
fn test_custom_locale() {
    let dir = TempTestDir::new("loader_locale").unwrap();
    let path = write_csv(dir.path(), "pt.csv", "Mes,Valor\nfev-22,2.0\nmar-22,3.0\n");

    let locale = macropanel::MonthLocale::new("pt", [("fev", "Feb"), ("mar", "Mar")]).unwrap();
    let loader = SeriesLoader::new(vec![locale]);
    let loaded = loader
        .load(&DatasetDescriptor::new(&path, "Mes", "Valor").with_separator(','))
        .unwrap();

    assert_eq!(loaded.report.locale.as_deref(), Some("pt"));
    assert_eq!(loaded.series.start(), Some(p(2022, 2)));
}

#[test]
fn test_missing_column_names_file_and_column() {
    let dir = TempTestDir::new("loader_missing_column").unwrap();
    let path = write_csv(dir.path(), "x.csv", "Fecha;Valor\n01/01/2020;1\n");

    match load_series(&path, "Fecha", "Venta", ';', None) {
        Err(Error::ColumnNotFound { path: p, column }) => {
            assert_eq!(column, "Venta");
            assert!(p.ends_with("x.csv"));
        }
        other => panic!("expected ColumnNotFound, got {:?}", other),
    }
}

#[test]
fn test_wrong_separator_is_parse_error() {
    let dir = TempTestDir::new("loader_separator").unwrap();
    let path = write_csv(dir.path(), "comma.csv", "Fecha,Valor\n01/01/2020,1\n");

    assert!(matches!(
        load_series(&path, "Fecha", "Valor", ';', None),
        Err(Error::ColumnNotFound { .. }) | Err(Error::Parse { .. })
    ));
}

#[test]
fn test_missing_file_names_the_file() {
    let dir = TempTestDir::new("loader_missing_file").unwrap();
    let path = dir.join("exchange_rate.csv");

    let err = load_series(&path, "Mes", "Valor", ';', None).unwrap_err();
    match &err {
        Error::File { path: p, .. } => assert_eq!(p, &path),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("exchange_rate.csv"));
}
