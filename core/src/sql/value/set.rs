use crate::err::Error;
use crate::sql::part::Part;
use crate::sql::value::Value;
use crate::sql::Object;

impl Value {
	/// Writes a value at a path, creating intermediate maps for missing
	/// fields. Slices and the descendant accessor are read-only and
	/// reject writes.
	pub fn put(&mut self, path: &[Part], val: Value) -> Result<(), Error> {
		let Some(p) = path.first() else {
			*self = val;
			return Ok(());
		};
		match p {
			Part::Field(k) => self.put_key(k.as_str(), &path[1..], val),
			Part::Key(k) => self.put_key(k.as_str(), &path[1..], val),
			Part::Index(i) => match self {
				Value::Array(v) => {
					match usize::try_from(*i).ok().and_then(|i| v.0.get_mut(i)) {
						Some(v) => v.put(&path[1..], val),
						None => Err(Error::TypeMismatch {
							message: format!("array index {i} is out of range for writing"),
						}),
					}
				}
				v => Err(Error::TypeMismatch {
					message: format!("cannot index into a {} value", v.kind_name()),
				}),
			},
			p => Err(Error::TypeMismatch {
				message: format!("the path step '{p}' is read-only"),
			}),
		}
	}

	fn put_key(&mut self, key: &str, rest: &[Part], val: Value) -> Result<(), Error> {
		match self {
			Value::Object(o) => match o.0.get_mut(key) {
				Some(v) => v.put(rest, val),
				None if rest.is_empty() => {
					o.0.insert(key.to_owned(), val);
					Ok(())
				}
				None => {
					let mut child = Value::Object(Object::new());
					child.put(rest, val)?;
					o.0.insert(key.to_owned(), child);
					Ok(())
				}
			},
			v => Err(Error::TypeMismatch {
				message: format!("cannot write field '{key}' into a {} value", v.kind_name()),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::Ident;

	#[test]
	fn put_creates_missing_maps() {
		let mut v = Value::Object(Object::new());
		let path = vec![Part::Field(Ident::from("a")), Part::Field(Ident::from("b"))];
		v.put(&path, Value::from(1i64)).unwrap();
		assert_eq!(v.get(&path), Value::from(1i64));
	}

	#[test]
	fn put_rejects_readonly_steps() {
		let mut v = Value::Object(Object::new());
		let path = vec![Part::Slice(None, None)];
		assert!(v.put(&path, Value::Null).is_err());
	}
}
