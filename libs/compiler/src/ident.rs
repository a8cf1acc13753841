use crate::error::CompileError;

/// Postgres truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Accept only unquoted identifiers: `[A-Za-z_][A-Za-z0-9_$]*`.
///
/// Names are interpolated without quoting so that Postgres still folds
/// them to lower case; this check is what keeps them inert.
pub fn validate_identifier(role: &'static str, name: &str) -> Result<(), CompileError> {
    let invalid = |reason| CompileError::InvalidIdentifier {
        role,
        name: name.to_owned(),
        reason,
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("empty")),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Err(invalid("must start with a letter or underscore")),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(invalid("only letters, digits, '_' and '$' are allowed"));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid("longer than 63 bytes"));
    }
    Ok(())
}
