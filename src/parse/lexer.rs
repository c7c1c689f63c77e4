use super::Token;
use logos::{Lexer as LogosLexer, Logos};

/// A token together with its text and byte offset in the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme<'source> {
    pub token: Token,
    pub text: &'source str,
    pub start: usize,
}

impl<'source> Lexeme<'source> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Walks the non-whitespace tokens of one line with one token of lookahead.
pub struct Lexer<'source> {
    llex: LogosLexer<'source, Token>,
    peeked_token: Option<Lexeme<'source>>,
}

impl<'source> Lexer<'source> {
    pub fn new(line: &'source str) -> Self {
        let mut lexer = Lexer {
            llex: Token::lexer(line),
            peeked_token: None,
        };
        lexer.skip_space();
        lexer
    }

    fn skip_space(&mut self) {
        self.peeked_token = None;
        while let Some(token) = self.llex.next() {
            let token = match token {
                Token::WhiteSpace => continue,
                Token::Error => Token::Field,
                token => token,
            };
            self.peeked_token = Some(Lexeme {
                token,
                text: self.llex.slice(),
                start: self.llex.span().start,
            });
            return;
        }
    }

    pub fn peek(&self) -> Option<Lexeme<'source>> {
        self.peeked_token
    }

    #[inline]
    pub fn consume(&mut self) {
        self.skip_space();
    }

    /// Takes the next lexeme if it is an `expected` token.
    pub fn take_if(&mut self, expected: Token) -> Option<&'source str> {
        match self.peeked_token {
            Some(lexeme) if lexeme.token == expected => {
                self.consume();
                Some(lexeme.text)
            }
            _ => None,
        }
    }

    /// Byte offset of the next lexeme, or the line length at the end.
    pub fn offset(&self) -> usize {
        self.peeked_token
            .map_or(self.llex.source().len(), |lexeme| lexeme.start)
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Lexeme<'source>;

    fn next(&mut self) -> Option<Self::Item> {
        let lexeme = self.peeked_token?;
        self.consume();
        Some(lexeme)
    }
}

/// Joins lexemes that touch each other into whitespace-separated fields of
/// `line`.
pub fn glue<'source, I>(line: &'source str, lexemes: I) -> Vec<&'source str>
where
    I: IntoIterator<Item = Lexeme<'source>>,
{
    let mut spans: Vec<(usize, usize)> = vec![];
    for lexeme in lexemes {
        match spans.last_mut() {
            Some((_, end)) if *end == lexeme.start => *end = lexeme.end(),
            _ => spans.push((lexeme.start, lexeme.end())),
        }
    }
    spans
        .into_iter()
        .map(|(start, end)| &line[start..end])
        .collect()
}

/// Splits a line on whitespace outside double quotes. Quotes are kept in the
/// returned fields.
pub fn fields(line: &str) -> Vec<&str> {
    glue(line, Lexer::new(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_outside_quotes() {
        assert_eq!(
            fields(r#"#KONTO 1930  "Företagskonto / checkkonto""#),
            vec!["#KONTO", "1930", r#""Företagskonto / checkkonto""#]
        );
    }

    #[test]
    fn blank_line_has_no_fields() {
        assert!(fields("").is_empty());
        assert!(fields(" \t ").is_empty());
    }

    #[test]
    fn braces_glue_back_into_fields() {
        assert_eq!(fields("a{b} {c"), vec!["a{b}", "{c"]);
    }

    #[test]
    fn unterminated_quote_is_one_field() {
        assert_eq!(
            fields(r#"#FNAMN "Kalles Kaffe AB"#),
            vec!["#FNAMN", r#""Kalles Kaffe AB"#]
        );
    }

    #[test]
    fn quote_inside_field() {
        assert_eq!(fields(r#"ab"c d"e f"#), vec![r#"ab"c d"e"#, "f"]);
    }

    #[test]
    fn take_and_offset() {
        let mut lexer = Lexer::new("#TRANS 1910 {}");
        assert_eq!(lexer.take_if(Token::Field), Some("#TRANS"));
        assert_eq!(lexer.take_if(Token::LBrace), None);
        assert_eq!(lexer.offset(), 7);
        assert_eq!(lexer.take_if(Token::Field), Some("1910"));
        assert_eq!(lexer.take_if(Token::LBrace), Some("{"));
        assert_eq!(lexer.take_if(Token::RBrace), Some("}"));
        assert_eq!(lexer.peek(), None);
        assert_eq!(lexer.offset(), 14);
    }
}
