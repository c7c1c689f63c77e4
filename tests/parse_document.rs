use sie::{
    options::ParseOptions, parse::parse_files, utils::is_valid, AccountType, Date, Decimal,
    Document, ErrorLevel, ErrorType, Location,
};
use std::path::PathBuf;

const KAFFE: &str = include_str!("fixtures/kaffe.se");

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/kaffe.se")
}

fn parse(text: &str) -> Document {
    Document::parse_str(text, "test.se").unwrap().0
}

fn date(y: i32, m: u32, d: u32) -> Option<Date> {
    Date::from_ymd_opt(y, m, d)
}

#[test]
fn header_fields() {
    let (doc, _) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    assert_eq!(doc.flag().as_deref(), Some("0"));
    assert_eq!(doc.format().as_deref(), Some("PC8"));
    assert_eq!(doc.version().as_deref(), Some("4"));
    assert_eq!(doc.program_name().as_deref(), Some("Bokföring Plus"));
    assert_eq!(doc.program_version().as_deref(), Some("3.2"));
    assert_eq!(doc.generated(), date(2021, 3, 11));
    assert_eq!(doc.company_name().as_deref(), Some("Kalles Kaffe AB"));
    assert_eq!(doc.company_id().as_deref(), Some("KAFFE01"));
    assert_eq!(doc.company_number().as_deref(), Some("556677-8899"));
    assert_eq!(doc.address().contact().as_deref(), Some("Kalle Kaffe"));
    assert_eq!(doc.address().street().as_deref(), Some("Bönvägen 1"));
    assert_eq!(doc.address().postal().as_deref(), Some("123 45 Kaffeby"));
    assert_eq!(doc.address().phone().as_deref(), Some("08-123456"));
    assert_eq!(doc.currency().as_deref(), Some("SEK"));
    assert_eq!(doc.tax_year().as_deref(), Some("2022"));
    assert_eq!(doc.chart_type().as_deref(), Some("BAS2014"));

    let years = doc.financial_years();
    assert_eq!(years.len(), 2);
    assert_eq!(years[1].year_index(), -1);
    assert_eq!(Some(years[1].start()), date(2020, 1, 1));
    assert_eq!(Some(years[1].end()), date(2020, 12, 31));
}

#[test]
fn chart_of_accounts() {
    let (doc, _) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    let numbers = doc
        .accounts()
        .iter()
        .map(|a| a.number().as_str())
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec!["1910", "1930", "2640", "3041", "7010"]);

    let bank = doc.account("1930").unwrap();
    assert_eq!(bank.name(), "Företagskonto / checkkonto");
    assert_eq!(bank.kind(), Some(AccountType::Asset));
    assert_eq!(bank.sru().as_deref(), Some("7281"));
    assert_eq!(doc.account("2640").unwrap().kind(), Some(AccountType::Liability));
    assert_eq!(doc.account("7010").unwrap().kind(), Some(AccountType::Cost));
    assert_eq!(doc.account("7010").unwrap().sru(), &None);
    assert!(doc.account("8999").is_none());

    assert_eq!(doc.dimensions().len(), 2);
    assert_eq!(doc.dimensions()[1].name(), "Projekt");
    let object = &doc.objects()[0];
    assert_eq!(
        (object.dimension().as_str(), object.number().as_str(), object.name().as_str()),
        ("1", "Nord", "Kontor Nord")
    );
}

#[test]
fn balances_and_results() {
    let (doc, _) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    let opening = doc.opening_balances();
    assert_eq!(opening.len(), 3);
    assert_eq!(opening[1].account(), "1930");
    assert_eq!(opening[1].amount(), Decimal::new(42145753, 2));
    assert_eq!(opening[2].year_index(), -1);
    assert_eq!(opening[2].quantity(), None);
    assert_eq!(doc.closing_balances().len(), 2);

    let results = doc.results();
    let indices = results.iter().map(|r| r.year_index()).collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 0, 3]);
    assert_eq!(results[0].amount(), Decimal::new(-169038020, 2));
    assert_eq!(results[1].quantity(), Some(Decimal::new(216, 0)));
}

#[test]
fn verifications_and_transactions() {
    let (doc, _) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    let vers = doc.verifications();
    assert_eq!(vers.len(), 4);
    let counts = vers
        .iter()
        .map(|v| v.transactions().len())
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![3, 2, 2, 0]);

    let first = &vers[0];
    assert_eq!(first.series(), "A");
    assert_eq!(first.number(), "1");
    assert_eq!(first.date(), date(2021, 1, 5));
    assert_eq!(first.description(), "Kaffebröd");
    assert_eq!(first.registered(), date(2021, 3, 10));
    assert_eq!(first.registered_by(), &None);
    let accounts = first
        .transactions()
        .iter()
        .map(|t| t.account().as_str())
        .collect::<Vec<_>>();
    assert_eq!(accounts, vec!["1910", "2640", "7010"]);
    let fika = &first.transactions()[2];
    assert_eq!(fika.description().as_deref(), Some("Fikabröd {Nord}"));
    assert_eq!(fika.dimensions()[0].object(), "Nord");

    let salary = &vers[2];
    assert_eq!(salary.registered_by().as_deref(), Some("Kalle"));
    let wage = &salary.transactions()[0];
    assert_eq!(wage.amount(), Decimal::new(3096280, 2));
    assert_eq!(wage.date(), date(2021, 1, 23));
    assert_eq!(wage.description().as_deref(), Some(""));
    assert_eq!(wage.quantity(), Some(Decimal::new(216, 0)));
    assert!(salary.transactions()[1].dimensions().is_empty());
}

#[test]
fn fixture_diagnostics() {
    let (_, errors) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    let kinds = errors
        .iter()
        .map(|e| (e.r#type, e.level))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (ErrorType::NoMatch, ErrorLevel::Error),
            (ErrorType::Unsupported, ErrorLevel::Info),
            (ErrorType::Arity, ErrorLevel::Warning),
            (ErrorType::Unsupported, ErrorLevel::Info),
        ]
    );
    assert_eq!(errors[0].src.start, Location { line: 26, col: 1 });
    assert_eq!(errors[3].src.start.col, 4);
}

#[test]
fn transactions_keep_file_order() {
    let mut text = String::from("#VER A 1 20210105 \"Många rader\"\n{\n");
    for i in 0..50 {
        text.push_str(&format!("#TRANS {} {{}} {}.25\n", 1000 + i, i));
    }
    text.push_str("}\n");
    let doc = parse(&text);
    let txns = doc.verifications()[0].transactions();
    assert_eq!(txns.len(), 50);
    for (i, txn) in txns.iter().enumerate() {
        assert_eq!(txn.account(), &(1000 + i).to_string());
        assert_eq!(txn.amount(), Decimal::new(i as i64 * 100 + 25, 2));
    }
}

#[test]
fn account_type_for_unknown_account_is_dropped() {
    let doc = parse("#KONTO 1060 Hyresrätt\n#KTYP 1060 T\n#KTYP 1070 S\n#SRU 1070 7201\n");
    assert_eq!(doc.accounts().len(), 1);
    assert_eq!(doc.accounts()[0].kind(), Some(AccountType::Asset));
    assert!(doc.account("1070").is_none());
}

#[test]
fn attribute_before_definition_is_dropped() {
    let doc = parse("#KTYP 1060 T\n#KONTO 1060 Hyresrätt\n");
    assert_eq!(doc.accounts()[0].kind(), None);
}

#[test]
fn unknown_account_type_code() {
    let (doc, errors) = Document::parse_str("#KONTO 1060 Hyresrätt\n#KTYP 1060 X\n", "t.se").unwrap();
    assert_eq!(doc.accounts()[0].kind(), None);
    assert_eq!(errors[0].r#type, ErrorType::Syntax);
}

#[test]
fn duplicate_account_is_renamed_in_place() {
    let (doc, errors) =
        Document::parse_str("#KONTO 1910 Kassa\n#KTYP 1910 T\n#KONTO 1930 Bank\n#KONTO 1910 Kontanter\n", "t.se")
            .unwrap();
    assert_eq!(doc.accounts().len(), 2);
    assert_eq!(doc.accounts()[0].name(), "Kontanter");
    assert_eq!(doc.accounts()[0].kind(), Some(AccountType::Asset));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].r#type, ErrorType::Duplicate);
}

#[test]
fn malformed_records_do_not_abort() {
    let (doc, errors) = Document::parse_str(
        "#RAR 0 2021-01-01 20211231\n#IB x 1910 5\n#UB 0 1910\n#RES 0 3041 1,5\n#KONTO\n#GEN 2021\n#KONTO 1910 Kassa\n",
        "t.se",
    )
    .unwrap();
    assert!(doc.financial_years().is_empty());
    assert!(doc.opening_balances().is_empty());
    assert!(doc.closing_balances().is_empty());
    assert!(doc.results().is_empty());
    assert_eq!(doc.generated(), None);
    assert_eq!(doc.accounts().len(), 1);
    assert_eq!(errors.len(), 6);
    assert!(errors.iter().all(|e| e.level == ErrorLevel::Error));
}

#[test]
fn optional_description_absent_or_empty() {
    let doc = parse("#VER A 1 20210105 x\n{\n#TRANS 1910 {} 1 20210105\n#TRANS 1910 {} 1 20210105 \"\"\n}\n");
    let txns = doc.verifications()[0].transactions();
    assert_eq!(txns[0].description(), &None);
    assert_eq!(txns[1].description(), &Some(String::new()));
}

#[test]
fn fatal_inputs() {
    assert_eq!(
        Document::parse_str("", "t.se").unwrap_err().r#type,
        ErrorType::Empty
    );
    assert_eq!(
        Document::parse_str("\r\n  \n", "t.se").unwrap_err().r#type,
        ErrorType::Empty
    );
    let err = Document::from_file("tests/fixtures/missing.se").unwrap_err();
    assert_eq!(err.r#type, ErrorType::Io);
}

#[test]
fn validator() {
    assert!(!is_valid(""));
    assert!(is_valid("#KONTO 1060 Foo"));
    assert!(!is_valid("random unrelated text"));
    assert!(is_valid(KAFFE));
}

#[test]
fn reads_pc8_file() {
    let path = std::env::temp_dir().join(format!("sie-pc8-{}.se", std::process::id()));
    std::fs::write(&path, b"#FLAGGA 0\n#FNAMN \"Kalles Kaff\x82 \x86\x84\x94\"\n").unwrap();
    let (doc, errors) = Document::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(errors.is_empty());
    assert_eq!(doc.company_name().as_deref(), Some("Kalles Kaffé åäö"));
}

#[test]
fn batch_keeps_input_order() {
    let paths = vec![
        fixture_path(),
        PathBuf::from("tests/fixtures/missing.se"),
        fixture_path(),
    ];
    let options = ParseOptions {
        threads: 2,
        ..ParseOptions::default()
    };
    let results = parse_files(&paths, &options);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().0.verifications().len(), 4);
    assert_eq!(results[1].as_ref().unwrap_err().r#type, ErrorType::Io);
    assert_eq!(results[0].as_ref().unwrap().0, results[2].as_ref().unwrap().0);
}

#[test]
fn reads_from_byte_stream() {
    let (from_stream, _) = Document::from_reader(KAFFE.as_bytes(), "kaffe.se").unwrap();
    let (from_text, _) = Document::parse_str(KAFFE, "kaffe.se").unwrap();
    assert_eq!(from_stream, from_text);
    let err = Document::from_reader(&b""[..], "empty.se").unwrap_err();
    assert_eq!(err.r#type, ErrorType::Empty);
}
