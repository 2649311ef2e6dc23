//! SQL identifier quoting
//!
//! Safe quoting for identifiers used in dynamically constructed SQL
//! (count probes, batched inserts). MySQL-style backtick quoting.

/// Quote a SQL identifier, escaping embedded backticks by doubling them.
///
/// # Examples
/// ```
/// use st_db::ident::quote_ident;
/// assert_eq!(quote_ident("raw_dental"), "`raw_dental`");
/// assert_eq!(quote_ident("odd`name"), "`odd``name`");
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}
