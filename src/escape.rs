//! Quoting of identifiers and literals for SQL that has to be built by hand.

mod reserved;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DataApiError;
use crate::types::ParamValue;

pub(crate) use reserved::is_reserved;

lazy_static! {
    static ref PLAIN_IDENT: Regex = Regex::new(r"(?i)^[a-z_][a-z0-9_$]*$")
        .unwrap_or_else(|e| unreachable!("static identifier pattern: {e}"));
}

/// Quote an identifier when it needs quoting.
///
/// Names that are plain (`[A-Za-z_][A-Za-z0-9_$]*`) and not reserved words are
/// returned untouched; anything else is wrapped in double quotes with inner
/// double quotes doubled.
///
/// ```rust
/// use data_api_client::escape::ident;
///
/// assert_eq!(ident("users").unwrap(), "users");
/// assert_eq!(ident("select").unwrap(), "\"select\"");
/// assert_eq!(ident("table\"name").unwrap(), "\"table\"\"name\"");
/// ```
///
/// # Errors
/// Returns `DataApiError::IdentifierError` when no name is given.
pub fn ident<'a>(name: impl Into<Option<&'a str>>) -> Result<String, DataApiError> {
    let Some(name) = name.into() else {
        return Err(DataApiError::IdentifierError(
            "identifier required".to_string(),
        ));
    };

    if PLAIN_IDENT.is_match(name) && !is_reserved(name) {
        return Ok(name.to_string());
    }

    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a value as a SQL literal.
///
/// `Null` becomes `NULL`, lists become a parenthesised, comma-separated group
/// and every other value is stringified and single-quoted. Text containing a
/// backslash gets its backslashes doubled and an `E` prefix.
///
/// ```rust
/// use data_api_client::escape::literal;
///
/// assert_eq!(literal("it's"), "'it''s'");
/// assert_eq!(literal(None::<&str>), "NULL");
/// assert_eq!(literal("a\\b"), "E'a\\\\b'");
/// ```
pub fn literal(value: impl Into<ParamValue>) -> String {
    escape_literal(&value.into())
}

fn escape_literal(value: &ParamValue) -> String {
    match value {
        ParamValue::Null => "NULL".to_string(),
        ParamValue::List(items) => {
            let escaped: Vec<String> = items.iter().map(escape_literal).collect();
            format!("({})", escaped.join(", "))
        }
        ParamValue::Blob(bytes) => quote(&String::from_utf8_lossy(bytes)),
        other => quote(&other.to_string()),
    }
}

fn quote(raw: &str) -> String {
    let prefix = if raw.contains('\\') { "E" } else { "" };
    let escaped = raw.replace('\'', "''").replace('\\', "\\\\");
    format!("{prefix}'{escaped}'")
}

/// Interpolate arguments into a format string.
///
/// `%I` takes an identifier, `%L` a literal, `%s` the raw string form and `%%`
/// a literal percent sign.
///
/// # Errors
/// Returns `DataApiError::QueryError` when the format string asks for more
/// arguments than were supplied or uses an unknown directive, and
/// `DataApiError::IdentifierError` when `%I` receives `Null`.
pub fn format_sql(fmt: &str, args: &[ParamValue]) -> Result<String, DataApiError> {
    let mut out = String::with_capacity(fmt.len());
    let mut args = args.iter();
    let mut chars = fmt.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let directive = chars.next().ok_or_else(|| {
            DataApiError::QueryError("format string ends with a bare '%'".to_string())
        })?;
        if directive == '%' {
            out.push('%');
            continue;
        }
        let arg = args.next().ok_or_else(|| {
            DataApiError::QueryError(format!("too few arguments for '%{directive}'"))
        })?;
        match directive {
            'I' => {
                let name = match arg {
                    ParamValue::Null => None,
                    other => Some(other.to_string()),
                };
                out.push_str(&ident(name.as_deref())?);
            }
            'L' => out.push_str(&escape_literal(arg)),
            's' => match arg {
                ParamValue::Null => {}
                other => out.push_str(&other.to_string()),
            },
            other => {
                return Err(DataApiError::QueryError(format!(
                    "unknown format directive '%{other}'"
                )));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass_through() {
        assert_eq!(ident("users").unwrap(), "users");
        assert_eq!(ident("_tmp$1").unwrap(), "_tmp$1");
        assert_eq!(ident("MixedCase").unwrap(), "MixedCase");
    }

    #[test]
    fn reserved_words_are_quoted_regardless_of_case() {
        assert_eq!(ident("select").unwrap(), "\"select\"");
        assert_eq!(ident("SELECT").unwrap(), "\"SELECT\"");
        assert_eq!(ident("Order").unwrap(), "\"Order\"");
        assert_eq!(ident("wallet").unwrap(), "\"wallet\"");
    }

    #[test]
    fn irregular_identifiers_are_quoted() {
        assert_eq!(ident("1abc").unwrap(), "\"1abc\"");
        assert_eq!(ident("has space").unwrap(), "\"has space\"");
        assert_eq!(ident("table\"name").unwrap(), "\"table\"\"name\"");
        assert_eq!(ident("").unwrap(), "\"\"");
    }

    #[test]
    fn quoting_an_already_quoted_identifier_doubles_its_quotes() {
        assert_eq!(ident("\"already\"").unwrap(), "\"\"\"already\"\"\"");
    }

    #[test]
    fn missing_identifier_fails() {
        let err = ident(None::<&str>).unwrap_err();
        assert!(matches!(err, DataApiError::IdentifierError(msg) if msg == "identifier required"));
    }

    #[test]
    fn literals() {
        assert_eq!(literal(ParamValue::Null), "NULL");
        assert_eq!(literal("it's"), "'it''s'");
        assert_eq!(literal("a\\b"), "E'a\\\\b'");
        assert_eq!(literal("a\\'b"), "E'a\\\\''b'");
        assert_eq!(literal(42), "'42'");
        assert_eq!(literal(1.5), "'1.5'");
        assert_eq!(literal(true), "'true'");
    }

    #[test]
    fn list_literals() {
        assert_eq!(
            literal(vec![ParamValue::from("a"), ParamValue::Null]),
            "('a', NULL)"
        );
        assert_eq!(literal(Vec::<ParamValue>::new()), "()");
        assert_eq!(
            literal(vec![
                ParamValue::from(1),
                ParamValue::List(vec![ParamValue::from("x"), ParamValue::from("y'z")]),
            ]),
            "('1', ('x', 'y''z'))"
        );
    }

    #[test]
    fn format_directives() {
        let sql = format_sql(
            "SELECT * FROM %I WHERE name = %L AND n > %s -- 100%%",
            &[
                ParamValue::from("user"),
                ParamValue::from("o'hara"),
                ParamValue::from(3),
            ],
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"user\" WHERE name = 'o''hara' AND n > 3 -- 100%"
        );
    }

    #[test]
    fn format_rejects_missing_arguments() {
        assert!(matches!(
            format_sql("%I.%I", &[ParamValue::from("a")]),
            Err(DataApiError::QueryError(_))
        ));
        assert!(matches!(
            format_sql("%I", &[ParamValue::Null]),
            Err(DataApiError::IdentifierError(_))
        ));
    }
}
