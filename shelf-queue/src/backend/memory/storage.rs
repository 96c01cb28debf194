use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    backend::QueueBackend, Delivery, LeaseToken, MessageId, QueueError, QueueMessage,
    QueueOptions, QueueResult,
};

#[derive(Debug, Default)]
struct QueueState {
    durable: bool,
    ready: VecDeque<QueueMessage>,
    leased: HashMap<LeaseToken, QueueMessage>,
}

/// In-memory backend for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    queues: Arc<RwLock<HashMap<String, QueueState>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_durable(&self, queue: &str) -> Option<bool> {
        self.queues.read().get(queue).map(|q| q.durable)
    }

    /// Messages handed out and not yet acked
    pub fn in_flight(&self, queue: &str) -> usize {
        self.queues.read().get(queue).map(|q| q.leased.len()).unwrap_or(0)
    }
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    async fn declare(&self, queue: &str, options: QueueOptions) -> QueueResult<()> {
        self.queues
            .write()
            .entry(queue.to_string())
            .or_insert_with(|| QueueState {
                durable: options.durable,
                ..QueueState::default()
            });
        Ok(())
    }

    async fn send(&self, message: QueueMessage) -> QueueResult<MessageId> {
        let mut queues = self.queues.write();
        let state = queues
            .get_mut(&message.queue)
            .ok_or_else(|| QueueError::QueueNotDeclared(message.queue.clone()))?;
        let id = message.message_id.clone();
        state.ready.push_back(message);
        Ok(id)
    }

    async fn receive(&self, queue: &str) -> QueueResult<Option<Delivery>> {
        let mut queues = self.queues.write();
        let state = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::QueueNotDeclared(queue.to_string()))?;

        let Some(mut message) = state.ready.pop_front() else {
            return Ok(None);
        };
        message.delivery_count += 1;
        let lease_token = LeaseToken::new();
        state.leased.insert(lease_token.clone(), message.clone());

        Ok(Some(Delivery {
            message,
            lease_token,
        }))
    }

    async fn ack(&self, queue: &str, lease_token: &LeaseToken) -> QueueResult<()> {
        let mut queues = self.queues.write();
        let state = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::QueueNotDeclared(queue.to_string()))?;
        state
            .leased
            .remove(lease_token)
            .map(|_| ())
            .ok_or(QueueError::InvalidLeaseToken)
    }

    async fn requeue(&self, queue: &str, lease_token: &LeaseToken) -> QueueResult<()> {
        let mut queues = self.queues.write();
        let state = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::QueueNotDeclared(queue.to_string()))?;
        let message = state
            .leased
            .remove(lease_token)
            .ok_or(QueueError::InvalidLeaseToken)?;
        state.ready.push_front(message);
        Ok(())
    }

    async fn depth(&self, queue: &str) -> QueueResult<usize> {
        self.queues
            .read()
            .get(queue)
            .map(|q| q.ready.len())
            .ok_or_else(|| QueueError::QueueNotDeclared(queue.to_string()))
    }
}
