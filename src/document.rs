use crate::options::ParseOptions;
use crate::parse::Parser;
pub use chrono::NaiveDate as Date;
use getset::{CopyGetters, Getters};
pub use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::From;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Representing a location, line number and column number, in a source file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn advance(&self, width: usize) -> Self {
        Location {
            col: self.col + width,
            line: self.line,
        }
    }
}

impl From<(usize, usize)> for Location {
    fn from(tuple: (usize, usize)) -> Self {
        Location {
            line: tuple.0,
            col: tuple.1,
        }
    }
}

/// A string wrapped in [`Arc`](std::sync::Arc)
/// representing the source file path.
pub type SrcFile = Arc<String>;

/// Represents a range in a source file. Every diagnostic produced while parsing
/// carries one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub file: SrcFile,
    pub start: Location,
    pub end: Location,
}

impl Source {
    /// A source pointing at the beginning of `file`, used for errors about the
    /// input as a whole.
    pub fn whole(file: SrcFile) -> Self {
        Source {
            file,
            start: (1, 1).into(),
            end: (1, 1).into(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start.line, self.start.col)
    }
}

/// Kinds of errors that `sie` encountered while reading an export.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// IO error, e.g., the content of an input file cannot be read.
    Io,
    /// The input exceeds the configured size ceiling.
    Oversized,
    /// The input is empty or contains only whitespace.
    Empty,
    /// A number, date or code in a record does not have the expected form.
    Syntax,
    /// A record has fewer fields than its keyword requires.
    Arity,
    /// An attribute record refers to an account that has not been defined.
    NoMatch,
    /// An account number is defined more than once.
    Duplicate,
    /// A transaction or brace appears where no verification block is open.
    Block,
    /// A keyword that `sie` does not handle.
    Unsupported,
}

/// The level of an error. Only [`ErrorLevel::Error`] diagnostics mean that
/// information from the input was dropped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

/// Contains the full information of an error.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    pub msg: String,
    pub src: Source,
    pub r#type: ErrorType,
    pub level: ErrorLevel,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {}\n  {}:{}:{}",
            self.level, self.msg, self.src.file, self.src.start.line, self.src.start.col
        )
    }
}

impl std::error::Error for Error {}

/// The account classes allowed by `#KTYP`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    /// `T`, tillgång.
    Asset,
    /// `S`, skuld.
    Liability,
    /// `I`, intäkt.
    Income,
    /// `K`, kostnad.
    Cost,
}

impl AccountType {
    pub fn code(&self) -> &'static str {
        match self {
            AccountType::Asset => "T",
            AccountType::Liability => "S",
            AccountType::Income => "I",
            AccountType::Cost => "K",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T" => Ok(AccountType::Asset),
            "S" => Ok(AccountType::Liability),
            "I" => Ok(AccountType::Income),
            "K" => Ok(AccountType::Cost),
            _ => Err(format!("Unknown account type {}.", s)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A `#RAR` record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct FinancialYear {
    pub(crate) year_index: i32,
    pub(crate) start: Date,
    pub(crate) end: Date,
}

/// An account from the chart of accounts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct Account {
    /// Returns the account number. It is a key, not necessarily numeric.
    #[getset(get = "pub")]
    pub(crate) number: String,

    /// Returns the account name, empty if `#KONTO` had none.
    #[getset(get = "pub")]
    pub(crate) name: String,

    /// Returns the type set by `#KTYP`.
    #[getset(get_copy = "pub")]
    pub(crate) kind: Option<AccountType>,

    /// Returns the tax-reporting code set by `#SRU`.
    #[getset(get = "pub")]
    pub(crate) sru: Option<String>,
}

/// A `#DIM` record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct Dimension {
    pub(crate) number: String,
    pub(crate) name: String,
}

/// An `#OBJEKT` record, a value within a [`Dimension`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct Object {
    pub(crate) dimension: String,
    pub(crate) number: String,
    pub(crate) name: String,
}

/// A `(dimension, object)` pair attached to a [`Transaction`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct DimensionRef {
    pub(crate) dimension: String,
    pub(crate) object: String,
}

impl fmt::Display for DimensionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dimension, self.object)
    }
}

/// A `#TRANS` line inside a verification block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct Transaction {
    /// Returns the account number.
    #[getset(get = "pub")]
    pub(crate) account: String,

    /// Returns the dimension references, in file order.
    #[getset(get = "pub")]
    pub(crate) dimensions: Vec<DimensionRef>,

    /// Returns the amount.
    #[getset(get_copy = "pub")]
    pub(crate) amount: Decimal,

    /// Returns the transaction date, if the line had a valid one.
    #[getset(get_copy = "pub")]
    pub(crate) date: Option<Date>,

    /// Returns the description. `Some("")` if the line had `""`, `None` if it
    /// had nothing at that position.
    #[getset(get = "pub")]
    pub(crate) description: Option<String>,

    /// Returns the quantity.
    #[getset(get_copy = "pub")]
    pub(crate) quantity: Option<Decimal>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = self
            .dimensions
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let width = f.width().unwrap_or(40);
        write!(
            f,
            "{:8} {{{}}} {:>width$}",
            self.account,
            dims,
            self.amount,
            width = width.saturating_sub(dims.len() + 11)
        )?;
        if let Some(date) = self.date {
            write!(f, " {}", date)?;
        }
        if let Some(desc) = &self.description {
            write!(f, " \"{}\"", desc)?;
        }
        if let Some(quantity) = self.quantity {
            write!(f, " {}", quantity)?;
        }
        Ok(())
    }
}

/// A `#VER` record and the transactions of its block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct Verification {
    /// Returns the series label.
    #[getset(get = "pub")]
    pub(crate) series: String,

    /// Returns the verification number.
    #[getset(get = "pub")]
    pub(crate) number: String,

    /// Returns the verification date.
    #[getset(get_copy = "pub")]
    pub(crate) date: Option<Date>,

    /// Returns the description.
    #[getset(get = "pub")]
    pub(crate) description: String,

    /// Returns the registration date.
    #[getset(get_copy = "pub")]
    pub(crate) registered: Option<Date>,

    /// Returns who registered the verification.
    #[getset(get = "pub")]
    pub(crate) registered_by: Option<String>,

    /// Returns the transactions, in file order.
    #[getset(get = "pub")]
    pub(crate) transactions: Vec<Transaction>,
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.series, self.number)?;
        if let Some(date) = self.date {
            write!(f, " {}", date)?;
        }
        write!(f, " \"{}\"", self.description)?;
        let width = f.width().unwrap_or(40);
        for txn in self.transactions.iter() {
            write!(f, "\n    {:width$}", txn, width = width)?;
        }
        Ok(())
    }
}

/// An `#IB`, `#UB` or `#RES` line.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct Balance {
    /// Returns the year index, 0 for the current year and negative for prior
    /// years.
    #[getset(get_copy = "pub")]
    pub(crate) year_index: i32,

    /// Returns the account number.
    #[getset(get = "pub")]
    pub(crate) account: String,

    /// Returns the amount.
    #[getset(get_copy = "pub")]
    pub(crate) amount: Decimal,

    /// Returns the quantity.
    #[getset(get_copy = "pub")]
    pub(crate) quantity: Option<Decimal>,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3} {:8} {}", self.year_index, self.account, self.amount)?;
        if let Some(quantity) = self.quantity {
            write!(f, " {}", quantity)?;
        }
        Ok(())
    }
}

/// Result lines have the same shape as balances.
pub type ResultLine = Balance;

/// The `#ADRESS` record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Getters)]
#[getset(get = "pub")]
pub struct Address {
    pub(crate) contact: Option<String>,
    pub(crate) street: Option<String>,
    pub(crate) postal: Option<String>,
    pub(crate) phone: Option<String>,
}

/// Represents a parsed SIE export. Every collection keeps the order in which
/// its records appeared in the input.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, CopyGetters)]
pub struct Document {
    /// Returns the `#SIETYP` value.
    #[getset(get = "pub")]
    pub(crate) version: Option<String>,
    /// Returns the `#FORMAT` value, usually `PC8`.
    #[getset(get = "pub")]
    pub(crate) format: Option<String>,
    /// Returns the `#FLAGGA` value.
    #[getset(get = "pub")]
    pub(crate) flag: Option<String>,
    #[getset(get = "pub")]
    pub(crate) program_name: Option<String>,
    #[getset(get = "pub")]
    pub(crate) program_version: Option<String>,
    /// Returns the `#GEN` date.
    #[getset(get_copy = "pub")]
    pub(crate) generated: Option<Date>,
    #[getset(get = "pub")]
    pub(crate) company_name: Option<String>,
    /// Returns the `#FNR` value, the producer's id of the company.
    #[getset(get = "pub")]
    pub(crate) company_id: Option<String>,
    /// Returns the `#ORGNR` value.
    #[getset(get = "pub")]
    pub(crate) company_number: Option<String>,
    #[getset(get = "pub")]
    pub(crate) address: Address,
    #[getset(get = "pub")]
    pub(crate) currency: Option<String>,
    #[getset(get = "pub")]
    pub(crate) tax_year: Option<String>,
    /// Returns the `#KPTYP` value, e.g. `BAS2014`.
    #[getset(get = "pub")]
    pub(crate) chart_type: Option<String>,
    #[getset(get = "pub")]
    pub(crate) financial_years: Vec<FinancialYear>,
    /// Returns the accounts in the order they were defined.
    #[getset(get = "pub")]
    pub(crate) accounts: Vec<Account>,
    pub(crate) account_index: HashMap<String, usize>,
    #[getset(get = "pub")]
    pub(crate) dimensions: Vec<Dimension>,
    #[getset(get = "pub")]
    pub(crate) objects: Vec<Object>,
    #[getset(get = "pub")]
    pub(crate) verifications: Vec<Verification>,
    #[getset(get = "pub")]
    pub(crate) opening_balances: Vec<Balance>,
    #[getset(get = "pub")]
    pub(crate) closing_balances: Vec<Balance>,
    #[getset(get = "pub")]
    pub(crate) results: Vec<ResultLine>,
}

impl Document {
    /// Looks up an account by its number.
    pub fn account(&self, number: &str) -> Option<&Account> {
        self.account_index
            .get(number)
            .map(|&index| &self.accounts[index])
    }

    pub(crate) fn account_mut(&mut self, number: &str) -> Option<&mut Account> {
        match self.account_index.get(number) {
            Some(&index) => self.accounts.get_mut(index),
            None => None,
        }
    }

    /// Defines an account. A number that is already known keeps its position
    /// and attributes and only takes the new name.
    pub(crate) fn add_account(
        &mut self,
        number: String,
        name: String,
        src: Source,
    ) -> Result<(), Error> {
        if let Some(account) = self.account_mut(&number) {
            account.name = name;
            Err(Error {
                level: ErrorLevel::Warning,
                r#type: ErrorType::Duplicate,
                msg: format!("Account {} has been defined before, renamed.", &number),
                src,
            })
        } else {
            self.account_index.insert(number.clone(), self.accounts.len());
            self.accounts.push(Account {
                number,
                name,
                kind: None,
                sru: None,
            });
            Ok(())
        }
    }

    /// Parses `text` with the default options. `file` names the input in
    /// diagnostics.
    pub fn parse_str(text: &str, file: &str) -> Result<(Self, Vec<Error>), Error> {
        Parser::parse_str(text, Arc::new(file.to_string()), &ParseOptions::default())
    }

    /// Reads, decodes and parses the file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<Error>), Error> {
        Parser::parse_file(path.as_ref(), &ParseOptions::from_env())
    }

    /// Reads, decodes and parses a byte stream such as stdin. `file` names the
    /// input in diagnostics.
    pub fn from_reader<R: Read>(reader: R, file: &str) -> Result<(Self, Vec<Error>), Error> {
        Parser::parse_reader(reader, Arc::new(file.to_string()), &ParseOptions::from_env())
    }
}
