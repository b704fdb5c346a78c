//! Live topic list service.
//!
//! Subscribes to the topics collection, folds incoming change batches into a
//! [`TopicFeed`], and persists new topics.  Dropping the service aborts the
//! feed task, so a closed list stops consuming events.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parley_feed::TopicFeed;
use parley_shared::Topic;

use crate::backend::RealtimeStore;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub struct TopicList<S> {
    store: Arc<S>,
    collection: String,
    feed: Arc<Mutex<TopicFeed>>,
    feed_task: JoinHandle<()>,
}

impl<S: RealtimeStore> TopicList<S> {
    /// Subscribe to the topics collection and start folding its change feed.
    pub async fn open(store: Arc<S>, config: &ClientConfig) -> Result<Self> {
        let collection = config.topics_collection.clone();
        let mut rx = store.subscribe(&collection).await?;

        let feed = Arc::new(Mutex::new(TopicFeed::new()));
        let feed_task = tokio::spawn({
            let feed = feed.clone();
            let collection = collection.clone();
            async move {
                while let Some(batch) = rx.recv().await {
                    match feed.lock() {
                        Ok(mut feed) => feed.apply(&batch),
                        Err(e) => warn!(error = %e, "Topic feed lock poisoned, dropping batch"),
                    }
                }
                debug!(collection = %collection, "Topic subscription closed");
            }
        });

        Ok(Self {
            store,
            collection,
            feed,
            feed_task,
        })
    }

    /// Current topic list in display order.
    pub fn topics(&self) -> Vec<Topic> {
        match self.feed.lock() {
            Ok(feed) => feed.topics().to_vec(),
            Err(e) => {
                warn!(error = %e, "Topic feed lock poisoned");
                Vec::new()
            }
        }
    }

    /// Persist a new topic.  It appears in the list once the store's change
    /// feed confirms it.
    pub async fn create_topic(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::EmptyTopicName);
        }

        let topic = Topic::new(name);
        let id = self
            .store
            .add_document(&self.collection, topic.to_fields())
            .await?;

        info!(topic = %id, name = %name, "Topic created");
        Ok(())
    }

    /// Stop consuming the change feed.
    pub fn close(self) {}
}

impl<S> Drop for TopicList<S> {
    fn drop(&mut self) {
        self.feed_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parley_shared::{ChangeKind, DocumentChange, DocumentSnapshot};
    use serde_json::json;

    use crate::memory::MemoryBackend;

    async fn wait_for<F: Fn() -> bool>(ready: F) {
        for _ in 0..100 {
            if ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn created_topics_show_up_via_the_change_feed() {
        let backend = Arc::new(MemoryBackend::new());
        let list = TopicList::open(backend.clone(), &ClientConfig::default())
            .await
            .unwrap();
        assert!(list.topics().is_empty());

        list.create_topic("general").await.unwrap();
        wait_for(|| list.topics().len() == 1).await;

        let topics = list.topics();
        assert_eq!(topics[0].name, "general");
        assert!(topics[0].id.is_some());
    }

    #[tokio::test]
    async fn renames_and_removals_are_folded_in_place() {
        let backend = Arc::new(MemoryBackend::new());
        let list = TopicList::open(backend.clone(), &ClientConfig::default())
            .await
            .unwrap();

        list.create_topic("first").await.unwrap();
        list.create_topic("second").await.unwrap();
        wait_for(|| list.topics().len() == 2).await;

        let first_id = list.topics()[0].id.clone().unwrap();
        backend
            .emit(
                "topics",
                vec![DocumentChange::new(
                    ChangeKind::Modified,
                    DocumentSnapshot::new(first_id.as_str(), json!({ "name": "renamed" })),
                )],
            )
            .await;
        wait_for(|| list.topics()[0].name == "renamed").await;
        // Rename keeps the slot.
        assert_eq!(list.topics()[1].name, "second");

        let second_id = list.topics()[1].id.clone().unwrap();
        backend
            .emit(
                "topics",
                vec![DocumentChange::new(
                    ChangeKind::Removed,
                    DocumentSnapshot::new(second_id.as_str(), json!({ "name": "second" })),
                )],
            )
            .await;
        wait_for(|| list.topics().len() == 1).await;
    }

    #[tokio::test]
    async fn blank_topic_name_is_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let list = TopicList::open(backend.clone(), &ClientConfig::default())
            .await
            .unwrap();

        let err = list.create_topic("  ").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyTopicName));
        assert!(backend.documents("topics").is_empty());
    }

    #[tokio::test]
    async fn opening_replays_topics_persisted_earlier() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .add_document("topics", json!({ "name": "history" }))
            .await
            .unwrap();

        let list = TopicList::open(backend, &ClientConfig::default())
            .await
            .unwrap();
        wait_for(|| list.topics().len() == 1).await;
        assert_eq!(list.topics()[0].name, "history");
    }
}
