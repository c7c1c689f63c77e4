use logos::Logos;

/// Tokens of a single SIE line. Outside quotes, braces are tokens of their
/// own; everything else that is not whitespace belongs to a [`Token::Field`].
#[derive(Debug, PartialEq, Logos, Clone, Copy)]
pub enum Token {
    #[regex(r"\s+")]
    WhiteSpace,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    /// A run of non-whitespace characters. A quoted span may contain
    /// whitespace and braces; an unterminated one runs to the end of the line.
    #[regex(r#"([^\s"{}]|"[^"]*"?)+"#)]
    Field,

    #[error]
    Error,
}
