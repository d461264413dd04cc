use nom::error::ErrorKind;
use nom::error::FromExternalError;
use nom::error::ParseError as NomParseError;
use std::num::ParseFloatError;
use std::num::ParseIntError;

pub(crate) type IResult<I, O, E = ParseError<I>> = Result<(I, O), nom::Err<E>>;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ParseError<I> {
	Base(I),
	Expected {
		tried: I,
		expected: &'static str,
	},
	Explained {
		tried: I,
		explained: &'static str,
	},
	MissingDelimiter {
		opened: I,
		tried: I,
	},
	ParseInt {
		tried: I,
		error: ParseIntError,
	},
	ParseFloat {
		tried: I,
		error: ParseFloatError,
	},
}

impl<I: Clone> ParseError<I> {
	/// Returns the input value where the parser failed
	pub fn tried(&self) -> I {
		let (Self::Base(ref tried)
		| Self::Expected {
			ref tried,
			..
		}
		| Self::Explained {
			ref tried,
			..
		}
		| Self::MissingDelimiter {
			ref tried,
			..
		}
		| Self::ParseInt {
			ref tried,
			..
		}
		| Self::ParseFloat {
			ref tried,
			..
		}) = self;
		tried.clone()
	}

	/// A human readable description of what went wrong
	pub fn explain(&self) -> String {
		match self {
			Self::Base(_) => String::from("unexpected input"),
			Self::Expected {
				expected,
				..
			} => format!("expected {expected}"),
			Self::Explained {
				explained,
				..
			} => String::from(*explained),
			Self::MissingDelimiter {
				..
			} => String::from("missing a closing delimiter"),
			Self::ParseInt {
				error,
				..
			} => format!("failed to parse integer: {error}"),
			Self::ParseFloat {
				error,
				..
			} => format!("failed to parse float: {error}"),
		}
	}
}

impl<I> NomParseError<I> for ParseError<I> {
	fn from_error_kind(input: I, _: ErrorKind) -> Self {
		Self::Base(input)
	}

	fn append(_: I, _: ErrorKind, other: Self) -> Self {
		other
	}
}

impl<I> FromExternalError<I, ParseIntError> for ParseError<I> {
	fn from_external_error(input: I, _: ErrorKind, e: ParseIntError) -> Self {
		Self::ParseInt {
			tried: input,
			error: e,
		}
	}
}

impl<I> FromExternalError<I, ParseFloatError> for ParseError<I> {
	fn from_external_error(input: I, _: ErrorKind, e: ParseFloatError) -> Self {
		Self::ParseFloat {
			tried: input,
			error: e,
		}
	}
}

/// The line and column, both 1-based, at which the remaining input starts
pub(crate) fn locate(input: &str, tried: &str) -> (usize, usize) {
	let offset = input.len().saturating_sub(tried.len());
	let consumed = &input[..offset.min(input.len())];
	let line = consumed.matches('\n').count() + 1;
	let col = match consumed.rfind('\n') {
		Some(v) => consumed.len() - v,
		None => consumed.len() + 1,
	};
	(line, col)
}
