use std::borrow::Cow;

const DOUBLE: char = '"';
const DOUBLE_ESC: &str = r#""""#;

/// Quotes a string as a BQL string literal:
/// - cat -> "cat"
/// - a "toy" -> "a ""toy"""
///
/// A literal double quote is written as two double quotes.
#[inline]
pub fn quote_str(s: &str) -> String {
	// Rough approximation of capacity, which may be exceeded
	// if quotes must be escaped.
	let mut ret = String::with_capacity(2 + s.len());
	ret.push(DOUBLE);
	let mut last_end = 0;
	for (start, part) in s.match_indices(DOUBLE) {
		ret.push_str(&s[last_end..start]);
		ret.push_str(DOUBLE_ESC);
		last_end = start + part.len();
	}
	ret.push_str(&s[last_end..s.len()]);
	ret.push(DOUBLE);
	ret
}

/// Quotes a map key if it is not a plain identifier
#[inline]
pub fn escape_key(s: &str) -> Cow<'_, str> {
	if is_plain_ident(s) {
		return Cow::Borrowed(s);
	}
	Cow::Owned(quote_str(s))
}

/// Checks whether a name matches the BQL identifier grammar
#[inline]
pub fn is_plain_ident(s: &str) -> bool {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quoting() {
		assert_eq!(quote_str("cat"), r#""cat""#);
		assert_eq!(quote_str(r#"a "toy""#), r#""a ""toy""""#);
		assert_eq!(escape_key("plain"), "plain");
		assert_eq!(escape_key("with space"), r#""with space""#);
	}

	#[test]
	fn ident_grammar() {
		assert!(is_plain_ident("abc_123"));
		assert!(!is_plain_ident("1abc"));
		assert!(!is_plain_ident("_abc"));
		assert!(!is_plain_ident(""));
	}
}
