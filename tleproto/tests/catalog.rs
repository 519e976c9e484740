//! Parse a catalog response the way the tracker receives it

use tleproto::*;

const CATALOG: &str = include_str!("../test_fixtures/visual.txt");

#[test]
fn catalog_response() {
    let (rest, records) = parse_tle_set(CATALOG).unwrap();
    assert_eq!(rest, "");

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["ISS (ZARYA)", "VANGUARD 1", "MOLNIYA 2-14", "GEO1", "CORRUPTED"]
    );

    let (good, bad): (Vec<_>, Vec<_>) = records
        .iter()
        .map(|r| (r, parse_record(r)))
        .partition(|(_, res)| res.is_ok());
    assert_eq!(good.len(), 4);
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].0.name, "CORRUPTED");
    assert_eq!(
        bad[0].1,
        Err(ElementsError::Checksum {
            line: 2,
            expected: 3,
            computed: 2
        })
    );

    let iss = parse_record(&records[0]).unwrap();
    assert_eq!(iss.catalog_number, 25544);
    assert_eq!(iss.epoch_year, 2022);
    assert!((iss.bstar - 0.17572e-3).abs() < 1e-12);
}

#[test]
fn reformatted_records_keep_their_checksums() {
    let (_, records) = parse_tle_set(CATALOG).unwrap();
    for r in records.iter().filter(|r| r.name != "CORRUPTED") {
        let elements = parse_record(r).unwrap();
        let (line1, line2) = format_elements(&elements).unwrap();

        assert_eq!(line2, r.line2, "{}", r.name);
        // Zero drag terms are published both as "00000+0" and "00000-0",
        // the latter adds one to the checksum
        let published = r.line1[..68].replace("00000+0", "00000-0");
        assert_eq!(&line1[..68], published, "{}", r.name);
        assert_eq!(line1, with_checksum(&published), "{}", r.name);

        let digit = line1.as_bytes()[68] - b'0';
        assert_eq!(checksum(&line1), digit, "{}", r.name);
        assert_eq!(parse_elements(&line1, &line2).unwrap(), elements, "{}", r.name);
    }
}

#[test]
fn record_at_a_time() {
    let mut buf = String::new();
    let mut complete = 0;
    for l in CATALOG.split_inclusive('\n') {
        buf.push_str(l);
        match parse_tle_set(&buf) {
            Ok((rest, records)) => {
                if rest.is_empty() && !records.is_empty() {
                    complete = records.len();
                }
            }
            // Name line seen, element lines still to come
            Err(e) => assert!(!e.is_failure(), "{e}"),
        }
    }
    assert_eq!(complete, 5);
}
