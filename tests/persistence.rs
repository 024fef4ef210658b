use std::fs;

use dt::config::Configuration;
use dt::execution::Transformer;
use dt::persistence::{CsvExport, SledStore, TransactionStore};
use dt::record::TransactionList;

fn checking_records() -> TransactionList {
    let profile = Configuration::from_path("tests/fixtures/checking.json").unwrap();
    Transformer::from_configuration(&profile)
        .unwrap()
        .transform_files(&["tests/fixtures/checking.csv"], profile.headers)
        .unwrap()
}

#[test]
fn reimporting_a_statement_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let records = checking_records();

    {
        let mut store = SledStore::open(dir.path().join("db")).unwrap();
        let first = records.commit(&mut store).unwrap();
        assert_eq!((first.added, first.skipped), (4, 0));
        store.flush().unwrap();
    }

    let mut store = SledStore::open(dir.path().join("db")).unwrap();
    assert_eq!(store.count().unwrap(), 4);
    let second = records.commit(&mut store).unwrap();
    assert_eq!((second.added, second.skipped), (0, 4));
    assert_eq!(store.count().unwrap(), 4);

    let mut stored = store.list().unwrap();
    stored.sort_by_key(|t| t.identity());
    let mut expected = records.as_slice().to_vec();
    expected.sort_by_key(|t| t.identity());
    assert_eq!(stored, expected);
}

#[test]
fn saved_profile_drives_a_run() {
    let store = SledStore::temporary().unwrap();
    let document = fs::read_to_string("tests/fixtures/checking.json").unwrap();
    store.add_profile("checking", &document).unwrap();

    let profile = Configuration::load("checking", &store).unwrap();
    assert_eq!(profile.transforms().unwrap().len(), 10);
}

#[test]
fn export_writes_flat_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ledger.csv");
    let records = checking_records();

    let export = CsvExport::new(&out);
    assert_eq!(export.write(&records, false).unwrap(), 4);
    assert_eq!(export.write(&records, true).unwrap(), 4);

    let text = fs::read_to_string(&out).unwrap();
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "id,date,description,institution,type,amount");
    assert!(lines[1].ends_with(",2024-01-05,COFFEE SHOP #12,First Bank,debit,4.50"));
    assert!(lines[3].ends_with(",2024-01-09,ATM WITHDRAWAL 0042,First Bank,withdrawal,60.00"));
    assert_eq!(lines[1], lines[5]);
}
