use super::lexer::{glue, Lexer};
use super::token::Token;
use crate::utils::{parse_date, parse_decimal, present, unquote};
use crate::{Decimal, DimensionRef, Error, ErrorLevel, ErrorType, Source, Transaction};

/// Reads a `#TRANS` line:
///
/// ```text
/// #TRANS account {dimension object ...} amount [date] [description] [quantity]
/// ```
///
/// Returns `None` only if the line has no account number. Problems with the
/// other fields are reported into `errors` and leave those fields unset.
pub fn parse_transaction(line: &str, src: &Source, errors: &mut Vec<Error>) -> Option<Transaction> {
    let mut lexer = Lexer::new(line);
    lexer.take_if(Token::Field)?;
    let account = match lexer.take_if(Token::Field) {
        Some(account) => unquote(account).to_string(),
        None => {
            errors.push(Error {
                msg: "Transaction without an account number.".to_string(),
                src: src.clone(),
                r#type: ErrorType::Arity,
                level: ErrorLevel::Error,
            });
            return None;
        }
    };

    let dimensions = if lexer.take_if(Token::LBrace).is_some() {
        parse_dimensions(&mut lexer, src, errors)
    } else {
        vec![]
    };

    let rest = glue(line, lexer);
    let amount = match rest.get(0) {
        Some(amount_str) => parse_decimal(amount_str, src, errors),
        None => {
            errors.push(Error {
                msg: format!("Transaction on {} without an amount.", &account),
                src: src.clone(),
                r#type: ErrorType::Arity,
                level: ErrorLevel::Error,
            });
            None
        }
    };
    let date = present(rest.get(1)).and_then(|date_str| parse_date(date_str, src, errors));
    let description = rest.get(2).map(|desc| unquote(desc).to_string());
    let quantity = present(rest.get(3)).and_then(|qty| parse_decimal(qty, src, errors));

    Some(Transaction {
        account,
        dimensions,
        amount: amount.unwrap_or(Decimal::ZERO),
        date,
        description,
        quantity,
    })
}

/// Reads dimension/object pairs up to the closing brace, or to the end of the
/// line if there is none.
fn parse_dimensions(
    lexer: &mut Lexer<'_>,
    src: &Source,
    errors: &mut Vec<Error>,
) -> Vec<DimensionRef> {
    let mut items = vec![];
    while let Some(lexeme) = lexer.next() {
        match lexeme.token {
            Token::RBrace => break,
            Token::LBrace => {}
            _ => items.push(unquote(lexeme.text)),
        }
    }
    if items.len() % 2 == 1 {
        errors.push(Error {
            msg: format!(
                "Dimension {} has no object, dropped.",
                items[items.len() - 1]
            ),
            src: src.clone(),
            r#type: ErrorType::Arity,
            level: ErrorLevel::Warning,
        });
    }
    items
        .chunks_exact(2)
        .map(|pair| DimensionRef {
            dimension: pair[0].to_string(),
            object: pair[1].to_string(),
        })
        .collect()
}
