use crate::sql::part::Part;
use crate::sql::value::Value;
use crate::sql::Array;

impl Value {
	/// Reads the value at a path. A step which does not apply to the
	/// value at hand yields Null, so that missing fields flow through
	/// three-valued logic rather than failing the whole evaluation.
	pub fn get(&self, path: &[Part]) -> Value {
		let Some(p) = path.first() else {
			return self.clone();
		};
		match p {
			Part::Field(k) => match self {
				Value::Object(v) => match v.0.get(k.as_str()) {
					Some(v) => v.get(&path[1..]),
					None => Value::Null,
				},
				_ => Value::Null,
			},
			Part::Key(k) => match self {
				Value::Object(v) => match v.0.get(k.as_str()) {
					Some(v) => v.get(&path[1..]),
					None => Value::Null,
				},
				_ => Value::Null,
			},
			Part::Index(i) => match self {
				Value::Array(v) => match usize::try_from(*i).ok().and_then(|i| v.0.get(i)) {
					Some(v) => v.get(&path[1..]),
					None => Value::Null,
				},
				_ => Value::Null,
			},
			Part::Slice(from, to) => match self {
				Value::Array(v) => {
					let len = v.len();
					let lo = clamp(from.unwrap_or(0), len);
					let hi = clamp(to.unwrap_or(len as i64), len);
					let out: Array = match lo <= hi {
						true => v.0[lo..hi].iter().map(|v| v.get(&path[1..])).collect(),
						false => Array::new(),
					};
					Value::Array(out)
				}
				_ => Value::Null,
			},
			Part::Descend(k) => {
				let mut out = Array::new();
				self.descend(k.as_str(), &mut out);
				Value::Array(out.into_iter().map(|v| v.get(&path[1..])).collect())
			}
		}
	}

	/// Collects every value stored under the given key, at any depth,
	/// in document order
	fn descend(&self, key: &str, out: &mut Array) {
		match self {
			Value::Object(v) => {
				for (k, v) in v.iter() {
					if k == key {
						out.push(v.clone());
					}
					v.descend(key, out);
				}
			}
			Value::Array(v) => {
				for v in v.iter() {
					v.descend(key, out);
				}
			}
			_ => {}
		}
	}
}

fn clamp(i: i64, len: usize) -> usize {
	match i {
		i if i < 0 => 0,
		i => (i as usize).min(len),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::{Ident, Object, Strand};

	fn sample() -> Value {
		Value::Object(Object(map! {
			String::from("a") => Value::Object(Object(map!{
				String::from("b") => Value::Array(vec![
					Value::from(1i64),
					Value::from(2i64),
					Value::from(3i64),
				].into()),
				String::from("quoted key") => Value::from("q"),
			})),
		}))
	}

	#[test]
	fn field_and_index() {
		let v = sample();
		let path = vec![Part::Field(Ident::from("a")), Part::Field(Ident::from("b")), Part::Index(1)];
		assert_eq!(v.get(&path), Value::from(2i64));
	}

	#[test]
	fn quoted_key() {
		let v = sample();
		let path =
			vec![Part::Field(Ident::from("a")), Part::Key(Strand::from("quoted key"))];
		assert_eq!(v.get(&path), Value::from("q"));
	}

	#[test]
	fn slices() {
		let v = sample();
		let base = vec![Part::Field(Ident::from("a")), Part::Field(Ident::from("b"))];
		let mut path = base.clone();
		path.push(Part::Slice(Some(1), None));
		assert_eq!(
			v.get(&path),
			Value::Array(vec![Value::from(2i64), Value::from(3i64)].into())
		);
		let mut path = base.clone();
		path.push(Part::Slice(None, Some(2)));
		assert_eq!(
			v.get(&path),
			Value::Array(vec![Value::from(1i64), Value::from(2i64)].into())
		);
		let mut path = base;
		path.push(Part::Slice(None, None));
		assert_eq!(
			v.get(&path),
			Value::Array(vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)].into())
		);
	}

	#[test]
	fn descend_collects_all() {
		let v = Value::Object(Object(map! {
			String::from("x") => Value::from(1i64),
			String::from("n") => Value::Object(Object(map!{
				String::from("x") => Value::from(2i64),
			})),
		}));
		let path = vec![Part::Descend(Ident::from("x"))];
		assert_eq!(
			v.get(&path),
			Value::Array(vec![Value::from(2i64), Value::from(1i64)].into())
		);
	}

	#[test]
	fn missing_is_null() {
		let v = sample();
		let path = vec![Part::Field(Ident::from("nope"))];
		assert_eq!(v.get(&path), Value::Null);
	}
}
