use mal_core::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    Quasiquote,
    Unquote,
    SpliceUnquote,
    Deref,
    Caret,
    /// Body of a string literal with escapes left in place.
    Str(String),
    /// A string literal that ran to end of input.
    UnterminatedStr,
    /// Any other run of symbol characters: numbers, keywords, symbols.
    Atom(String),
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

fn is_atom_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, ',' | '[' | ']' | '{' | '}' | '(' | ')' | '\'' | '`' | ';' | '"')
}

pub fn tokenize(input: &str) -> Vec<SpannedToken> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    while i < chars.len() {
        let ch = chars[i];
        let span = Span::new(line, col);

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '\'' => Some(Token::Quote),
            '`' => Some(Token::Quasiquote),
            '^' => Some(Token::Caret),
            '@' => Some(Token::Deref),
            '~' if chars.get(i + 1) != Some(&'@') => Some(Token::Unquote),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(SpannedToken { token, span });
            i += 1;
            col += 1;
            continue;
        }

        match ch {
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }
            c if c.is_whitespace() || c == ',' => {
                col += 1;
                i += 1;
            }
            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '~' => {
                tokens.push(SpannedToken {
                    token: Token::SpliceUnquote,
                    span,
                });
                i += 2;
                col += 2;
            }
            '"' => {
                i += 1;
                col += 1;
                let start = i;
                let mut terminated = false;
                while i < chars.len() {
                    match chars[i] {
                        '"' => {
                            terminated = true;
                            break;
                        }
                        '\\' if i + 1 < chars.len() => {
                            if chars[i + 1] == '\n' {
                                line += 1;
                                col = 0;
                            } else {
                                col += 1;
                            }
                            i += 2;
                            col += 1;
                        }
                        '\n' => {
                            line += 1;
                            col = 1;
                            i += 1;
                        }
                        _ => {
                            i += 1;
                            col += 1;
                        }
                    }
                }
                let token = if terminated {
                    let body: String = chars[start..i].iter().collect();
                    i += 1;
                    col += 1;
                    Token::Str(body)
                } else {
                    Token::UnterminatedStr
                };
                tokens.push(SpannedToken { token, span });
            }
            _ => {
                let start = i;
                while i < chars.len() && is_atom_char(chars[i]) {
                    i += 1;
                }
                col += i - start;
                tokens.push(SpannedToken {
                    token: Token::Atom(chars[start..i].iter().collect()),
                    span,
                });
            }
        }
    }

    tokens
}
