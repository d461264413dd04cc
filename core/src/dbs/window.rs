use crate::sql::{Datetime, Object, Window};
use std::collections::VecDeque;
use std::time::Instant;

/// One buffered tuple of a window
pub(crate) struct WindowEntry {
	pub(crate) data: Object,
	pub(crate) time: Datetime,
	arrived: Instant,
}

/// The per-alias sliding buffer of a select plan. Between two arrivals
/// the buffer holds exactly the most recent tuples satisfying the
/// retention rule.
pub(crate) struct WindowBuffer {
	window: Window,
	buf: VecDeque<WindowEntry>,
}

impl WindowBuffer {
	pub(crate) fn new(window: Window) -> Self {
		Self {
			window,
			buf: VecDeque::new(),
		}
	}

	/// Appends an arrival and applies the retention rule
	pub(crate) fn push(&mut self, data: Object, time: Datetime) {
		self.buf.push_back(WindowEntry {
			data,
			time,
			arrived: Instant::now(),
		});
		if let Window::Tuples(n) = self.window {
			let keep = n.max(0) as usize;
			while self.buf.len() > keep {
				self.buf.pop_front();
			}
		}
		self.evict();
	}

	/// Drops entries which are strictly older than the retention
	/// interval allows. Count-based windows evict on push only.
	pub(crate) fn evict(&mut self) {
		if let Some(interval) = self.window.interval() {
			let now = Instant::now();
			while let Some(front) = self.buf.front() {
				match now.duration_since(front.arrived) > interval {
					true => self.buf.pop_front(),
					false => break,
				};
			}
		}
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub(crate) fn len(&self) -> usize {
		self.buf.len()
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = &WindowEntry> {
		self.buf.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::Value;

	fn obj(n: i64) -> Object {
		Object(map! { String::from("n") => Value::from(n) })
	}

	#[test]
	fn count_window_keeps_most_recent() {
		let mut w = WindowBuffer::new(Window::Tuples(2));
		for n in 1..=4 {
			w.push(obj(n), Datetime::from_nanos(n));
		}
		let kept: Vec<_> = w.iter().map(|e| e.data.clone()).collect();
		assert_eq!(kept, vec![obj(3), obj(4)]);
	}

	#[tokio::test]
	async fn time_window_evicts_old_entries() {
		let mut w = WindowBuffer::new(Window::Milliseconds(30));
		w.push(obj(1), Datetime::from_nanos(1));
		tokio::time::sleep(std::time::Duration::from_millis(60)).await;
		w.push(obj(2), Datetime::from_nanos(2));
		let kept: Vec<_> = w.iter().map(|e| e.data.clone()).collect();
		assert_eq!(kept, vec![obj(2)]);
	}
}
