use super::lexer;
use super::transaction::parse_transaction;
use crate::codepage;
use crate::options::ParseOptions;
use crate::utils::{parse_date, parse_decimal, parse_year_index, present, unquote};
use crate::{
    AccountType, Balance, Dimension, Document, Error, ErrorLevel, ErrorType, FinancialYear,
    Location, Object, Source, SrcFile, Verification,
};
use log::{debug, trace, warn};
use std::{
    fs::File,
    io::Read,
    path::Path,
    sync::Arc,
};

/// Where the parser is relative to a `#VER` block. The index points into
/// [`Document::verifications`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Outside,
    HeaderSeen(usize),
    InsideBlock(usize),
}

macro_rules! set_header {
    ($self:ident, $field:ident, $fields:ident, $src:ident) => {
        if $self.check_arity($fields, 2, &$src) {
            $self.doc.$field = Some(unquote($fields[1]).to_string());
        }
    };
}

/// Which of the three balance-like collections a record goes to.
#[derive(Debug, Clone, Copy)]
enum BalanceKind {
    Opening,
    Closing,
    Result,
}

pub struct Parser {
    file: SrcFile,
    doc: Document,
    state: BlockState,
    errors: Vec<Error>,
}

impl Parser {
    fn new(file: SrcFile) -> Self {
        Parser {
            file,
            doc: Document::default(),
            state: BlockState::Outside,
            errors: Vec::new(),
        }
    }

    fn src_at(&self, start: Location, line: &str) -> Source {
        Source {
            file: self.file.clone(),
            start,
            end: start.advance(line.chars().count()),
        }
    }

    fn fatal(&self, r#type: ErrorType, msg: String) -> Error {
        warn!("{}: {}", self.file, msg);
        Error {
            msg,
            src: Source::whole(self.file.clone()),
            r#type,
            level: ErrorLevel::Error,
        }
    }

    fn block_error(&mut self, msg: &str, src: Source) {
        self.errors.push(Error {
            msg: msg.to_string(),
            src,
            r#type: ErrorType::Block,
            level: ErrorLevel::Warning,
        });
    }

    fn check_arity(&mut self, fields: &[&str], min: usize, src: &Source) -> bool {
        if fields.len() >= min {
            true
        } else {
            self.errors.push(Error {
                msg: format!(
                    "{} expects at least {} fields, found {}.",
                    fields[0],
                    min - 1,
                    fields.len() - 1
                ),
                src: src.clone(),
                r#type: ErrorType::Arity,
                level: ErrorLevel::Error,
            });
            false
        }
    }

    fn parse_lines(&mut self, text: &str) {
        for (index, raw_line) in text.split('\n').enumerate() {
            for piece in raw_line.split('\r') {
                let line = piece.trim();
                if line.is_empty() {
                    continue;
                }
                let indent = &piece[..piece.len() - piece.trim_start().len()];
                let start = Location {
                    line: index + 1,
                    col: indent.chars().count() + 1,
                };
                self.parse_line(line, start);
            }
        }
    }

    fn parse_line(&mut self, line: &str, start: Location) {
        trace!("{}:{}: {}", self.file, start.line, line);
        if line.starts_with(';') {
            return;
        }
        let src = self.src_at(start, line);
        match line {
            "{" => return self.open_block(src),
            "}" => return self.close_block(src),
            _ => {}
        }
        if !line.starts_with('#') {
            self.errors.push(Error {
                msg: "Line without a keyword ignored.".to_string(),
                src,
                r#type: ErrorType::Syntax,
                level: ErrorLevel::Info,
            });
            return;
        }
        let fields = lexer::fields(line);
        match fields[0] {
            "#VER" => self.parse_verification(&fields, src),
            "#TRANS" => self.parse_trans(line, src),
            _ => self.parse_record(&fields, src),
        }
    }

    fn open_block(&mut self, src: Source) {
        match self.state {
            BlockState::HeaderSeen(index) => {
                debug!("{}: block of verification {} opened", src, index);
                self.state = BlockState::InsideBlock(index);
            }
            BlockState::InsideBlock(_) => self.block_error("Nested block ignored.", src),
            BlockState::Outside => self.block_error("Block without a verification.", src),
        }
    }

    fn close_block(&mut self, src: Source) {
        match self.state {
            BlockState::Outside => self.block_error("Unmatched closing brace.", src),
            _ => {
                debug!("{}: block closed", src);
                self.state = BlockState::Outside;
            }
        }
    }

    fn parse_verification(&mut self, fields: &[&str], src: Source) {
        if fields.len() < 3 {
            self.errors.push(Error {
                msg: "Verification without series or number.".to_string(),
                src: src.clone(),
                r#type: ErrorType::Arity,
                level: ErrorLevel::Warning,
            });
        }
        let field = |i: usize| fields.get(i).map(|f| unquote(f).to_string());
        let date = present(fields.get(3)).and_then(|d| parse_date(d, &src, &mut self.errors));
        let registered =
            present(fields.get(5)).and_then(|d| parse_date(d, &src, &mut self.errors));
        let verification = Verification {
            series: field(1).unwrap_or_default(),
            number: field(2).unwrap_or_default(),
            date,
            description: field(4).unwrap_or_default(),
            registered,
            registered_by: field(6),
            transactions: Vec::new(),
        };
        let index = self.doc.verifications.len();
        self.doc.verifications.push(verification);
        let state = self.state;
        self.state = match state {
            BlockState::InsideBlock(_) => {
                self.block_error("Verification started inside an open block.", src);
                BlockState::InsideBlock(index)
            }
            _ => BlockState::HeaderSeen(index),
        };
    }

    fn parse_trans(&mut self, line: &str, src: Source) {
        let index = match self.state {
            BlockState::InsideBlock(index) => index,
            _ => return self.block_error("Transaction outside a verification block.", src),
        };
        if let Some(txn) = parse_transaction(line, &src, &mut self.errors) {
            self.doc.verifications[index].transactions.push(txn);
        }
    }

    fn parse_record(&mut self, fields: &[&str], src: Source) {
        match fields[0] {
            "#FLAGGA" => set_header!(self, flag, fields, src),
            "#FORMAT" => set_header!(self, format, fields, src),
            "#SIETYP" => set_header!(self, version, fields, src),
            "#FNAMN" => set_header!(self, company_name, fields, src),
            "#FNR" => set_header!(self, company_id, fields, src),
            "#ORGNR" => set_header!(self, company_number, fields, src),
            "#TAXAR" => set_header!(self, tax_year, fields, src),
            "#VALUTA" => set_header!(self, currency, fields, src),
            "#KPTYP" => set_header!(self, chart_type, fields, src),
            "#PROGRAM" => self.parse_program(fields, src),
            "#GEN" => self.parse_gen(fields, src),
            "#ADRESS" => self.parse_address(fields, src),
            "#RAR" => self.parse_financial_year(fields, src),
            "#KONTO" => self.parse_account(fields, src),
            "#KTYP" => self.parse_account_type(fields, src),
            "#SRU" => self.parse_sru(fields, src),
            "#DIM" => self.parse_dimension(fields, src),
            "#OBJEKT" => self.parse_object(fields, src),
            "#IB" => self.parse_balance(fields, src, BalanceKind::Opening),
            "#UB" => self.parse_balance(fields, src, BalanceKind::Closing),
            "#RES" => self.parse_balance(fields, src, BalanceKind::Result),
            keyword => self.errors.push(Error {
                msg: format!("Unsupported keyword {} ignored.", keyword),
                src,
                r#type: ErrorType::Unsupported,
                level: ErrorLevel::Info,
            }),
        }
    }

    fn parse_program(&mut self, fields: &[&str], src: Source) {
        if self.check_arity(fields, 2, &src) {
            self.doc.program_name = Some(unquote(fields[1]).to_string());
            if let Some(version) = fields.get(2) {
                self.doc.program_version = Some(unquote(version).to_string());
            }
        }
    }

    fn parse_gen(&mut self, fields: &[&str], src: Source) {
        if self.check_arity(fields, 2, &src) {
            if let Some(date) = parse_date(fields[1], &src, &mut self.errors) {
                self.doc.generated = Some(date);
            }
        }
    }

    fn parse_address(&mut self, fields: &[&str], src: Source) {
        if self.check_arity(fields, 2, &src) {
            let field = |i: usize| fields.get(i).map(|f| unquote(f).to_string());
            let address = &mut self.doc.address;
            address.contact = field(1);
            address.street = field(2);
            address.postal = field(3);
            address.phone = field(4);
        }
    }

    fn parse_financial_year(&mut self, fields: &[&str], src: Source) {
        if !self.check_arity(fields, 4, &src) {
            return;
        }
        let year_index = parse_year_index(fields[1], &src, &mut self.errors);
        let start = parse_date(fields[2], &src, &mut self.errors);
        let end = parse_date(fields[3], &src, &mut self.errors);
        if let (Some(year_index), Some(start), Some(end)) = (year_index, start, end) {
            self.doc.financial_years.push(FinancialYear {
                year_index,
                start,
                end,
            });
        }
    }

    fn parse_account(&mut self, fields: &[&str], src: Source) {
        if !self.check_arity(fields, 2, &src) {
            return;
        }
        let number = unquote(fields[1]).to_string();
        let name = fields.get(2).map_or(String::new(), |f| unquote(f).to_string());
        if let Err(e) = self.doc.add_account(number, name, src) {
            self.errors.push(e);
        }
    }

    fn no_such_account(&mut self, keyword: &str, number: &str, src: Source) {
        self.errors.push(Error {
            msg: format!("{} refers to undefined account {}.", keyword, number),
            src,
            r#type: ErrorType::NoMatch,
            level: ErrorLevel::Error,
        });
    }

    fn parse_account_type(&mut self, fields: &[&str], src: Source) {
        if !self.check_arity(fields, 3, &src) {
            return;
        }
        let number = unquote(fields[1]);
        if self.doc.account(number).is_none() {
            return self.no_such_account(fields[0], number, src);
        }
        match unquote(fields[2]).parse::<AccountType>() {
            Ok(kind) => {
                if let Some(account) = self.doc.account_mut(number) {
                    account.kind = Some(kind);
                }
            }
            Err(msg) => self.errors.push(Error {
                msg,
                src,
                r#type: ErrorType::Syntax,
                level: ErrorLevel::Error,
            }),
        }
    }

    fn parse_sru(&mut self, fields: &[&str], src: Source) {
        if !self.check_arity(fields, 3, &src) {
            return;
        }
        let number = unquote(fields[1]);
        match self.doc.account_mut(number) {
            Some(account) => account.sru = Some(unquote(fields[2]).to_string()),
            None => self.no_such_account(fields[0], number, src),
        }
    }

    fn parse_dimension(&mut self, fields: &[&str], src: Source) {
        if self.check_arity(fields, 2, &src) {
            self.doc.dimensions.push(Dimension {
                number: unquote(fields[1]).to_string(),
                name: fields.get(2).map_or(String::new(), |f| unquote(f).to_string()),
            });
        }
    }

    fn parse_object(&mut self, fields: &[&str], src: Source) {
        if self.check_arity(fields, 3, &src) {
            self.doc.objects.push(Object {
                dimension: unquote(fields[1]).to_string(),
                number: unquote(fields[2]).to_string(),
                name: fields.get(3).map_or(String::new(), |f| unquote(f).to_string()),
            });
        }
    }

    fn parse_balance(&mut self, fields: &[&str], src: Source, kind: BalanceKind) {
        if !self.check_arity(fields, 4, &src) {
            return;
        }
        let year_index = parse_year_index(fields[1], &src, &mut self.errors);
        let amount = parse_decimal(fields[3], &src, &mut self.errors);
        let (year_index, amount) = match (year_index, amount) {
            (Some(year_index), Some(amount)) => (year_index, amount),
            _ => return,
        };
        let quantity =
            present(fields.get(4)).and_then(|qty| parse_decimal(qty, &src, &mut self.errors));
        let balance = Balance {
            year_index,
            account: unquote(fields[2]).to_string(),
            amount,
            quantity,
        };
        match kind {
            BalanceKind::Opening => self.doc.opening_balances.push(balance),
            BalanceKind::Closing => self.doc.closing_balances.push(balance),
            BalanceKind::Result => self.doc.results.push(balance),
        }
    }

    fn too_large(&self, len: u64, limit: usize) -> Error {
        self.fatal(
            ErrorType::Oversized,
            format!("Input of {} bytes exceeds the limit of {} bytes.", len, limit),
        )
    }

    /// Parses decoded SIE text. Oversized or blank input is rejected before any
    /// line is read; every other problem ends up in the returned diagnostics.
    pub fn parse_str(
        text: &str,
        file: SrcFile,
        options: &ParseOptions,
    ) -> Result<(Document, Vec<Error>), Error> {
        let parser = Parser::new(file);
        if text.len() > options.max_input_size {
            return Err(parser.too_large(text.len() as u64, options.max_input_size));
        }
        parser.finish(text)
    }

    fn finish(self, text: &str) -> Result<(Document, Vec<Error>), Error> {
        if text.trim().is_empty() {
            return Err(self.fatal(ErrorType::Empty, "Input is empty.".to_string()));
        }
        Ok(self.run(text))
    }

    fn run(mut self, text: &str) -> (Document, Vec<Error>) {
        self.parse_lines(text);
        if let BlockState::InsideBlock(index) = self.state {
            debug!("{}: verification {} left open at end of input", self.file, index);
        }
        debug!(
            "{}: {} accounts, {} verifications, {} diagnostics",
            self.file,
            self.doc.accounts.len(),
            self.doc.verifications.len(),
            self.errors.len()
        );
        (self.doc, self.errors)
    }

    /// Reads at most `max_input_size + 1` bytes from `reader` and decodes them
    /// with [`codepage::decode`].
    fn read_bounded<R: Read>(&self, reader: R, options: &ParseOptions) -> Result<String, Error> {
        let mut data = Vec::new();
        reader
            .take((options.max_input_size as u64).saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|io_error| {
                self.fatal(
                    ErrorType::Io,
                    format!("Couldn't read {}: {}", self.file, io_error),
                )
            })?;
        if data.len() > options.max_input_size {
            return Err(self.too_large(data.len() as u64, options.max_input_size));
        }
        Ok(codepage::decode(&data).into_owned())
    }

    fn open(&self, path: &Path, options: &ParseOptions) -> Result<String, Error> {
        let io_error = |e: std::io::Error| {
            self.fatal(
                ErrorType::Io,
                format!("Couldn't read {}: {}", path.display(), e),
            )
        };
        let file = File::open(path).map_err(io_error)?;
        let metadata = file.metadata().map_err(io_error)?;
        if metadata.is_file() && metadata.len() > options.max_input_size as u64 {
            return Err(self.too_large(metadata.len(), options.max_input_size));
        }
        self.read_bounded(file, options)
    }

    /// Reads and decodes the file at `path` without parsing it. The size limit
    /// is checked before the content is read.
    pub fn read_file(path: &Path, options: &ParseOptions) -> Result<String, Error> {
        Parser::new(Arc::new(path.display().to_string())).open(path, options)
    }

    /// Reads the file at `path`, decodes it with [`codepage::decode`] and
    /// parses it.
    pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<(Document, Vec<Error>), Error> {
        let parser = Parser::new(Arc::new(path.display().to_string()));
        let text = parser.open(path, options)?;
        parser.finish(&text)
    }

    /// Like [`parse_file`](Parser::parse_file) for any byte stream. `file`
    /// names the input in diagnostics.
    pub fn parse_reader<R: Read>(
        reader: R,
        file: SrcFile,
        options: &ParseOptions,
    ) -> Result<(Document, Vec<Error>), Error> {
        let parser = Parser::new(file);
        let text = parser.read_bounded(reader, options)?;
        parser.finish(&text)
    }
}
