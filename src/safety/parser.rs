//! Statement completeness and splitting.
//!
//! Uses the sqlparser-rs tokenizer with the SQLite dialect, so semicolons
//! inside string literals, quoted identifiers and comments do not count.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, Tokenizer};

/// Returns true when `sql` is one or more complete statements: it tokenizes
/// cleanly and its last significant token is a semicolon.
///
/// A `CREATE TRIGGER` body contains semicolons of its own, so a trigger is
/// only complete once it ends with `END;`.
pub fn is_complete_statement(sql: &str) -> bool {
    let dialect = SQLiteDialect {};
    let Ok(tokens) = Tokenizer::new(&dialect, sql).tokenize() else {
        // Unterminated string, identifier or block comment
        return false;
    };

    let significant: Vec<&Token> = tokens
        .iter()
        .filter(|token| !matches!(token, Token::Whitespace(_)))
        .collect();

    match significant.as_slice() {
        [.., Token::SemiColon] if defines_trigger(&significant) => {
            matches!(
                significant.iter().rev().nth(1),
                Some(Token::Word(word)) if word.keyword == Keyword::END
            )
        }
        [.., Token::SemiColon] => true,
        _ => false,
    }
}

/// Splits `sql` into its statements, each keeping its terminating `;`.
///
/// Semicolons inside literals, comments and trigger bodies do not split.
/// Empty statements are dropped. Input the tokenizer rejects comes back as
/// a single statement so the store can report the error.
pub fn split_statements(sql: &str) -> Vec<String> {
    let dialect = SQLiteDialect {};
    let Ok(tokens) = Tokenizer::new(&dialect, sql).tokenize_with_location() else {
        return non_empty(sql).into_iter().collect();
    };

    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    let mut statements = Vec::new();
    let mut start = 0;
    let mut current: Vec<&Token> = Vec::new();

    for located in &tokens {
        match &located.token {
            Token::Whitespace(_) => {}
            Token::SemiColon if statement_ends(&current) => {
                let end = byte_offset(sql, &line_starts, located.location)
                    .map_or(sql.len(), |offset| offset + 1);
                if !current.is_empty() {
                    statements.extend(non_empty(&sql[start..end]));
                }
                start = end;
                current.clear();
            }
            token => current.push(token),
        }
    }

    if !current.is_empty() {
        statements.extend(non_empty(&sql[start..]));
    }
    statements
}

fn non_empty(sql: &str) -> Option<String> {
    let trimmed = sql.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A `;` closes the statement unless it sits inside a trigger body.
fn statement_ends(tokens: &[&Token]) -> bool {
    !defines_trigger(tokens)
        || matches!(tokens.last(), Some(Token::Word(word)) if word.keyword == Keyword::END)
}

/// Byte offset of a 1-based line/column (in chars) location.
fn byte_offset(sql: &str, line_starts: &[usize], location: Location) -> Option<usize> {
    let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
    let line_start = *line_starts.get(line)?;
    sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)
}

/// True for `CREATE [TEMP|TEMPORARY] TRIGGER ...`.
fn defines_trigger(tokens: &[&Token]) -> bool {
    let keywords: Vec<Keyword> = tokens
        .iter()
        .take(3)
        .filter_map(|token| match token {
            Token::Word(word) => Some(word.keyword),
            _ => None,
        })
        .collect();

    matches!(
        keywords.as_slice(),
        [Keyword::CREATE, Keyword::TRIGGER, ..]
            | [Keyword::CREATE, Keyword::TEMP | Keyword::TEMPORARY, Keyword::TRIGGER]
    )
}
