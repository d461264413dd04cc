use crate::err::Error;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// The default snapshot tag when SAVE STATE or LOAD STATE carries no
/// TAG clause
pub const DEFAULT_TAG: &str = "default";

/// A snapshot being written. Nothing is visible to readers until
/// `commit`; `abort` discards the attempt and is idempotent, and a
/// no-op after a commit.
#[async_trait]
pub trait SnapshotWriter: Send {
	async fn write_all(&mut self, data: &[u8]) -> Result<(), Error>;
	async fn commit(&mut self) -> Result<(), Error>;
	async fn abort(&mut self) -> Result<(), Error>;
}

/// A snapshot being read
#[async_trait]
pub trait SnapshotReader: Send {
	async fn read_all(&mut self) -> Result<Vec<u8>, Error>;
}

/// The storage layer behind SAVE STATE and LOAD STATE. A missing
/// snapshot is reported with the distinguished `SnapshotNotFound`
/// error, which drives the `OR CREATE` fallback.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
	async fn save(
		&self,
		topology: &str,
		state: &str,
		tag: &str,
	) -> Result<Box<dyn SnapshotWriter>, Error>;

	async fn load(
		&self,
		topology: &str,
		state: &str,
		tag: &str,
	) -> Result<Box<dyn SnapshotReader>, Error>;
}

/// An in-memory snapshot store
#[derive(Clone, Default)]
pub struct MemoryStore {
	snapshots: Arc<DashMap<(String, String, String), Vec<u8>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SnapshotStore for MemoryStore {
	async fn save(
		&self,
		topology: &str,
		state: &str,
		tag: &str,
	) -> Result<Box<dyn SnapshotWriter>, Error> {
		Ok(Box::new(MemoryWriter {
			snapshots: self.snapshots.clone(),
			key: (topology.to_owned(), state.to_owned(), tag.to_owned()),
			buffer: Vec::new(),
			committed: false,
			aborted: false,
		}))
	}

	async fn load(
		&self,
		topology: &str,
		state: &str,
		tag: &str,
	) -> Result<Box<dyn SnapshotReader>, Error> {
		let key = (topology.to_owned(), state.to_owned(), tag.to_owned());
		match self.snapshots.get(&key) {
			Some(data) => Ok(Box::new(MemoryReader {
				data: Some(data.clone()),
			})),
			None => Err(Error::SnapshotNotFound {
				topology: key.0,
				state: key.1,
				tag: key.2,
			}),
		}
	}
}

struct MemoryWriter {
	snapshots: Arc<DashMap<(String, String, String), Vec<u8>>>,
	key: (String, String, String),
	buffer: Vec<u8>,
	committed: bool,
	aborted: bool,
}

#[async_trait]
impl SnapshotWriter for MemoryWriter {
	async fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
		if self.committed || self.aborted {
			return Err(Error::SnapshotIo(String::from("the snapshot writer is finished")));
		}
		self.buffer.extend_from_slice(data);
		Ok(())
	}

	async fn commit(&mut self) -> Result<(), Error> {
		if self.aborted {
			return Err(Error::SnapshotIo(String::from("the snapshot writer was aborted")));
		}
		if !self.committed {
			self.committed = true;
			self.snapshots.insert(self.key.clone(), std::mem::take(&mut self.buffer));
		}
		Ok(())
	}

	async fn abort(&mut self) -> Result<(), Error> {
		// Aborting after a commit is a no-op, and aborts are idempotent
		if !self.committed {
			self.aborted = true;
			self.buffer.clear();
		}
		Ok(())
	}
}

struct MemoryReader {
	data: Option<Vec<u8>>,
}

#[async_trait]
impl SnapshotReader for MemoryReader {
	async fn read_all(&mut self) -> Result<Vec<u8>, Error> {
		self.data
			.take()
			.ok_or_else(|| Error::SnapshotIo(String::from("the snapshot was already read")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn save_load_round_trip() {
		let store = MemoryStore::new();
		let mut w = store.save("t", "s", DEFAULT_TAG).await.unwrap();
		w.write_all(b"payload").await.unwrap();
		w.commit().await.unwrap();
		// Abort after commit changes nothing
		w.abort().await.unwrap();
		let mut r = store.load("t", "s", DEFAULT_TAG).await.unwrap();
		assert_eq!(r.read_all().await.unwrap(), b"payload");
	}

	#[tokio::test]
	async fn abort_discards_everything() {
		let store = MemoryStore::new();
		let mut w = store.save("t", "s", "v1").await.unwrap();
		w.write_all(b"junk").await.unwrap();
		w.abort().await.unwrap();
		w.abort().await.unwrap();
		assert!(matches!(
			store.load("t", "s", "v1").await.err(),
			Some(Error::SnapshotNotFound { .. })
		));
	}
}
