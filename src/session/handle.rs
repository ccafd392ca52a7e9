//! session/handle.rs
//!
//! A task-owned session: every command goes through one channel, so edits are
//! applied strictly in order, and each new snapshot is published on a watch.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use crate::engine::{FieldState, FormOutcome, FormState};
use crate::error::FormError;
use crate::path::FieldPath;

use super::FormSession;

/// A unit of work run against the owned session and its snapshot channel.
type Job<E> = Box<dyn FnOnce(&mut FormSession<E>, &watch::Sender<FormSession<E>>) + Send>;

const COMMAND_BUFFER: usize = 32;

/// Cloneable handle to a session owned by a background task
pub struct SessionHandle<E = String> {
    id: Uuid,
    commands: mpsc::Sender<Job<E>>,
    snapshots: watch::Receiver<FormSession<E>>,
}

impl<E> Clone for SessionHandle<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            commands: self.commands.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<E> SessionHandle<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Move `session` into a new task. Must be called within a tokio runtime.
    pub fn spawn(session: FormSession<E>) -> Self {
        let id = session.id();
        let (commands, mut rx) = mpsc::channel::<Job<E>>(COMMAND_BUFFER);
        let (publish, snapshots) = watch::channel(session.clone());

        tokio::spawn(async move {
            let mut session = session;
            while let Some(job) = rx.recv().await {
                job(&mut session, &publish);
            }
            log::debug!("session {} task stopped", id);
        });

        Self {
            id,
            commands,
            snapshots,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the latest published session
    pub fn snapshot(&self) -> FormSession<E> {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to session snapshots
    pub fn subscribe(&self) -> watch::Receiver<FormSession<E>> {
        self.snapshots.clone()
    }

    /// Run `step` on the owned session and keep its new session on success.
    ///
    /// The new snapshot is published before the caller is answered.
    async fn transact<R>(
        &self,
        step: impl FnOnce(&FormSession<E>) -> Result<(FormSession<E>, R), FormError>
            + Send
            + 'static,
    ) -> Result<R, FormError>
    where
        R: Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job: Job<E> = Box::new(
            move |session: &mut FormSession<E>, publish: &watch::Sender<FormSession<E>>| {
                let outcome = match step(&*session) {
                    Ok((next, value)) => {
                        *session = next;
                        publish.send_replace(session.clone());
                        Ok(value)
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(outcome);
            },
        );

        self.commands
            .send(job)
            .await
            .map_err(|_| FormError::SessionClosed)?;
        response.await.map_err(|_| FormError::SessionClosed)?
    }

    pub async fn apply_delta(
        &self,
        key: impl Into<String>,
        delta: FieldState<E>,
    ) -> Result<(), FormError> {
        let key = key.into();
        self.transact(move |s| Ok((s.apply_delta(&key, delta)?, ()))).await
    }

    pub async fn set_state(&self, state: FormState<E>) -> Result<(), FormError> {
        self.transact(move |s| Ok((s.set_state(state)?, ()))).await
    }

    pub async fn edit(&self, path: FieldPath, raw: Value) -> Result<(), FormError> {
        self.transact(move |s| Ok((s.edit(&path, raw)?, ()))).await
    }

    pub async fn focus(&self, path: FieldPath) -> Result<(), FormError> {
        self.transact(move |s| Ok((s.focus(&path)?, ()))).await
    }

    pub async fn blur(&self, path: FieldPath) -> Result<(), FormError> {
        self.transact(move |s| Ok((s.blur(&path)?, ()))).await
    }

    pub async fn select(&self, path: FieldPath, value: Value) -> Result<(), FormError> {
        self.transact(move |s| Ok((s.select(&path, &value)?, ()))).await
    }

    pub async fn push_item(&self, key: impl Into<String>) -> Result<(), FormError> {
        let key = key.into();
        self.transact(move |s| Ok((s.push_item(&key)?, ()))).await
    }

    pub async fn remove_item(&self, key: impl Into<String>, index: usize) -> Result<(), FormError> {
        let key = key.into();
        self.transact(move |s| Ok((s.remove_item(&key, index)?, ()))).await
    }

    pub async fn reset_to_initial(&self) -> Result<(), FormError> {
        self.transact(|s| Ok((s.reset_to_initial()?, ()))).await
    }

    /// Submit the owned session; host events are handled by the caller
    pub async fn submit(&self) -> Result<FormOutcome<E>, FormError> {
        self.transact(|s| s.submit(None)).await
    }
}
