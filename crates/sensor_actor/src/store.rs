//! Latest-value store.
//!
//! Holds the most recent [`StreamReading`] per stream. Writes replace the
//! previous entry unconditionally (last write wins, even if the reading is
//! older than the one it replaces). Each replace is atomic per key, so the
//! store can be shared between a delivery task and the tick loop.

use std::collections::BTreeMap;

use dashmap::DashMap;
use sensor_net::StreamReading;

/// A required stream has not reported yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no reading yet for stream {stream_id:?}")]
pub struct MissingStream {
    /// The first absent stream.
    pub stream_id: String,
}

/// A complete view over a set of required streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    readings: BTreeMap<String, StreamReading>,
}

impl Snapshot {
    /// The reading for a stream, if it is part of this snapshot.
    #[must_use]
    pub fn reading(&self, stream_id: &str) -> Option<&StreamReading> {
        self.readings.get(stream_id)
    }

    /// The value for a stream, if it is part of this snapshot.
    #[must_use]
    pub fn value(&self, stream_id: &str) -> Option<f64> {
        self.readings.get(stream_id).map(|r| r.value)
    }

    /// Number of streams in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Returns `true` if the snapshot holds no streams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Iterate readings ordered by stream id.
    pub fn iter(&self) -> impl Iterator<Item = &StreamReading> {
        self.readings.values()
    }
}

/// Most recent reading per stream.
#[derive(Debug, Default)]
pub struct LatestValueStore {
    entries: DashMap<String, StreamReading>,
}

impl LatestValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for the reading's stream.
    pub fn update(&self, reading: StreamReading) {
        self.entries.insert(reading.stream_id.clone(), reading);
    }

    /// The latest reading for one stream.
    #[must_use]
    pub fn get(&self, stream_id: &str) -> Option<StreamReading> {
        self.entries.get(stream_id).map(|entry| entry.value().clone())
    }

    /// Collect the latest readings for every required stream.
    ///
    /// # Errors
    ///
    /// Returns [`MissingStream`] naming the first required stream with no
    /// reading yet.
    pub fn snapshot<S: AsRef<str>>(&self, required: &[S]) -> Result<Snapshot, MissingStream> {
        let mut readings = BTreeMap::new();
        for stream_id in required {
            let stream_id = stream_id.as_ref();
            let reading = self.get(stream_id).ok_or_else(|| MissingStream {
                stream_id: stream_id.to_string(),
            })?;
            readings.insert(stream_id.to_string(), reading);
        }
        Ok(Snapshot { readings })
    }

    /// Number of streams that have reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no stream has reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every reading.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_snapshot_names_missing_stream() {
        let store = LatestValueStore::new();
        let err = store.snapshot(&["temperature", "humidity"]).unwrap_err();
        assert_eq!(err.stream_id, "temperature");
    }

    #[test]
    fn test_partial_snapshot_is_missing() {
        let store = LatestValueStore::new();
        store.update(StreamReading::now("temperature", 20.0));
        let err = store.snapshot(&["temperature", "humidity"]).unwrap_err();
        assert_eq!(err.stream_id, "humidity");
    }

    #[test]
    fn test_complete_snapshot() {
        let store = LatestValueStore::new();
        store.update(StreamReading::now("temperature", 20.0));
        store.update(StreamReading::now("humidity", 60.0));
        let snapshot = store.snapshot(&["temperature", "humidity"]).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.value("temperature"), Some(20.0));
        assert_eq!(snapshot.value("humidity"), Some(60.0));
    }

    #[test]
    fn test_snapshot_only_contains_required_streams() {
        let store = LatestValueStore::new();
        store.update(StreamReading::now("temperature", 20.0));
        store.update(StreamReading::now("pressure", 1013.0));
        let snapshot = store.snapshot(&["temperature"]).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.value("pressure"), None);
    }

    #[tokio::test]
    async fn test_older_reading_still_overwrites() {
        let store = LatestValueStore::new();
        let older = StreamReading::now("temperature", 18.0);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let newer = StreamReading::now("temperature", 21.0);

        store.update(newer);
        store.update(older);
        assert_eq!(store.get("temperature").unwrap().value, 18.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(LatestValueStore::new());
        let handles: Vec<_> = (0..4)
            .map(|writer| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        store.update(StreamReading::now(format!("s{writer}"), f64::from(i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 4);
        for writer in 0..4 {
            assert_eq!(store.get(&format!("s{writer}")).unwrap().value, 499.0);
        }
    }

    proptest! {
        #[test]
        fn prop_snapshot_reflects_last_write_per_stream(
            writes in prop::collection::vec((0usize..4, -100.0f64..100.0), 1..64)
        ) {
            let streams = ["a", "b", "c", "d"];
            let store = LatestValueStore::new();
            let mut expected = HashMap::new();
            for (idx, value) in &writes {
                store.update(StreamReading::now(streams[*idx], *value));
                expected.insert(streams[*idx], *value);
            }

            let required: Vec<&str> = expected.keys().copied().collect();
            let snapshot = store.snapshot(&required).unwrap();
            prop_assert_eq!(snapshot.len(), expected.len());
            for (stream, value) in expected {
                prop_assert_eq!(snapshot.value(stream), Some(value));
            }
        }
    }
}
