use core::{iter::Peekable, str::CharIndices};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind<'a> {
    Tab,
    Newline,
    Quote,
    Text(&'a str),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token<'a> {
    pub pos: usize,
    pub kind: TokenKind<'a>,
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

pub fn lex(input: &str) -> Lexer<'_> {
    Lexer {
        input,
        chars: input.char_indices().peekable(),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (pos, c) = self.chars.next()?;
        let kind = match c {
            '\t' => TokenKind::Tab,
            '"' => TokenKind::Quote,
            '\n' => TokenKind::Newline,
            '\r' => {
                // \r\n is a single line ending
                self.chars.next_if(|&(_, c)| c == '\n');
                TokenKind::Newline
            }
            c => {
                let mut end = pos + c.len_utf8();
                while let Some((i, c)) = self.chars.next_if(|&(_, c)| !is_special(c)) {
                    end = i + c.len_utf8();
                }
                TokenKind::Text(&self.input[pos..end])
            }
        };
        Some(Token { pos, kind })
    }
}

#[inline(always)]
fn is_special(c: char) -> bool {
    matches!(c, '\t' | '"' | '\n' | '\r')
}
