use clap::{clap_app, ArgMatches};
use log::error;
use sie::{
    options::ParseOptions,
    parse::{parse_files, Parser},
    utils, Document, Error,
};
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

fn print_errors(errors: &[Error], verbose: bool) {
    if verbose {
        for error in errors {
            println!("{}\n", error);
        }
    }
}

fn load(matches: &ArgMatches, verbose: bool) -> Document {
    let path = matches.value_of("INPUT").unwrap_or_default();
    match Document::from_file(path) {
        Ok((doc, errors)) => {
            print_errors(&errors, verbose);
            doc
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn check(matches: &ArgMatches, verbose: bool) {
    let paths = matches
        .values_of("INPUT")
        .map(|values| values.map(PathBuf::from).collect::<Vec<_>>())
        .unwrap_or_default();
    let options = ParseOptions::from_env();
    let mut failed = false;
    let mut candidates = vec![];
    for path in paths {
        match Parser::read_file(&path, &options) {
            Ok(text) if utils::is_valid(&text) => candidates.push(path),
            Ok(_) => {
                failed = true;
                println!("{}: not a SIE file", path.display());
            }
            Err(e) => {
                failed = true;
                println!("{}: {}", path.display(), e.msg);
            }
        }
    }
    let results = parse_files(&candidates, &options);
    for (path, result) in candidates.iter().zip(results) {
        match result {
            Ok((doc, errors)) => {
                println!(
                    "{}: {} (SIE {}), {} accounts, {} verifications",
                    path.display(),
                    doc.company_name().as_deref().unwrap_or("-"),
                    doc.version().as_deref().unwrap_or("?"),
                    doc.accounts().len(),
                    doc.verifications().len()
                );
                print_errors(&errors, verbose);
            }
            Err(e) => {
                failed = true;
                println!("{}: {}", path.display(), e.msg);
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

fn accounts(doc: &Document) {
    for account in doc.accounts() {
        println!(
            "{:8} {:1} {:6} {}",
            account.number(),
            account.kind().map_or("", |kind| kind.code()),
            account.sru().as_deref().unwrap_or(""),
            account.name()
        );
    }
}

fn verifications(doc: &Document) {
    for verification in doc.verifications() {
        println!("{}\n", verification);
    }
}

fn balances(doc: &Document) {
    let sections = [
        ("IB", doc.opening_balances()),
        ("UB", doc.closing_balances()),
        ("RES", doc.results()),
    ];
    for (label, lines) in sections.iter() {
        for line in lines.iter() {
            println!("{:3} {}", label, line);
        }
    }
}

fn main() {
    pretty_env_logger::init();
    let matches = clap_app!(sie =>
        (version: VERSION)
        (author: AUTHOR)
        (about: "Reads SIE 4 accounting exports.")
        (@arg verbose: -v --verbose +global "Prints diagnostics")
        (@subcommand check =>
            (about: "Checks whether files look like SIE exports")
            (@arg INPUT: +required +multiple "Input files")
        )
        (@subcommand accounts =>
            (about: "Lists the chart of accounts")
            (@arg INPUT: +required "Input file")
        )
        (@subcommand verifications =>
            (about: "Lists verifications and their transactions")
            (@arg INPUT: +required "Input file")
        )
        (@subcommand balances =>
            (about: "Lists opening balances, closing balances and results")
            (@arg INPUT: +required "Input file")
        )
    )
    .get_matches();
    let verbose = |sub: &ArgMatches| matches.is_present("verbose") || sub.is_present("verbose");
    match matches.subcommand() {
        ("check", Some(sub)) => check(sub, verbose(sub)),
        ("accounts", Some(sub)) => accounts(&load(sub, verbose(sub))),
        ("verifications", Some(sub)) => verifications(&load(sub, verbose(sub))),
        ("balances", Some(sub)) => balances(&load(sub, verbose(sub))),
        _ => {
            eprintln!("{}", matches.usage());
            process::exit(2);
        }
    }
}
