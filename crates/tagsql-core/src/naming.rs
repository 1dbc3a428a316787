//! Default naming and placeholder conventions.

use convert_case::{Case, Casing};

/// Tag key that overrides the derived column name.
pub const NAME_KEY: &str = "name";

/// Column name for an attribute: an explicit `name=` token in the raw tag
/// wins, otherwise the attribute name in snake case.
#[must_use]
pub fn snake_case_column(attribute: &str, tag: &str) -> String {
    tag.split(',')
        .map(str::trim)
        .find_map(|token| {
            token
                .split_once('=')
                .filter(|(key, _)| key.trim() == NAME_KEY)
                .map(|(_, value)| value.trim().to_string())
        })
        .unwrap_or_else(|| attribute.to_case(Case::Snake))
}

/// `$1`, `$2`, ...
#[must_use]
pub fn numbered_arg(position: usize) -> String {
    format!("${position}")
}

/// `?` regardless of position.
#[must_use]
pub fn question_mark_arg(_position: usize) -> String {
    "?".to_string()
}

/// Conventional sequence name for a table.
#[must_use]
pub fn table_sequence(table: &str) -> String {
    format!("{table}_seq")
}

/// Snake case plural of a type name, e.g. `OrderBatch` → `order_batches`.
#[must_use]
pub fn plural_table_name(type_name: &str) -> String {
    // strip any module path, e.g. from std::any::type_name
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    let snake = short.to_case(Case::Snake);

    if snake.ends_with('z') {
        format!("{snake}zes")
    } else if snake.ends_with('s')
        || snake.ends_with('x')
        || snake.ends_with("ch")
        || snake.ends_with("sh")
    {
        format!("{snake}es")
    } else {
        format!("{snake}s")
    }
}

/// Renumber `<prefix>n` placeholders so that `<prefix>1` becomes `<prefix>from`.
///
/// Lets a caller-written clause follow the bound record arguments:
/// `shift_placeholders("a=$1 OR b<$2", "$", 10)` → `"a=$10 OR b<$11"`.
/// Text inside single-quoted literals is copied as is, as is any number
/// whose shifted value would not fit in `usize`.
#[must_use]
pub fn shift_placeholders(sql: &str, prefix: &str, from: usize) -> String {
    if prefix.is_empty() {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut rest = sql;
    let mut quoted = false;

    while let Some(c) = rest.chars().next() {
        if !quoted && rest.starts_with(prefix) {
            let after = &rest[prefix.len()..];
            let digits =
                after.len() - after.trim_start_matches(|d: char| d.is_ascii_digit()).len();
            let shifted = after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_add(from))
                .map(|n| n.saturating_sub(1));

            out.push_str(prefix);
            match shifted {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push_str(&after[..digits]),
            }
            rest = &after[digits..];
            continue;
        }

        if c == '\'' {
            quoted = !quoted;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Prefix of a numbered placeholder formatter, e.g. `$` for `$n` or `@p`
/// for `@pN`. `None` for positional formatters such as `?`.
#[must_use]
pub fn numbered_prefix(format_arg: fn(usize) -> String) -> Option<String> {
    let first = format_arg(1);
    let prefix = first.strip_suffix('1')?;

    let numbered = !prefix.is_empty()
        && [2, 12].into_iter().all(|n| format_arg(n) == format!("{prefix}{n}"));

    numbered.then(|| prefix.to_string())
}
