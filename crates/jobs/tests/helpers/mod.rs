#![allow(dead_code)]

pub mod network;

use async_trait::async_trait;
use ferrous_relay_application::ports::{InstanceFactory, LivenessProbe, RunError, ServerInstance};
use ferrous_relay_domain::DomainError;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Ordered record of lifecycle calls shared by every mock.
#[derive(Default, Clone)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn contains(&self, event: &str) -> bool {
        self.position(event).is_some()
    }
}

pub fn instance_addr(id: usize) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5300 + id as u16))
}

pub fn instance_probe_addr(id: usize) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6300 + id as u16))
}

pub struct MockInstance {
    id: usize,
    log: EventLog,
    crash_tx: Arc<Mutex<Vec<Option<oneshot::Sender<DomainError>>>>>,
}

#[async_trait]
impl ServerInstance for MockInstance {
    async fn start(&self) -> Result<RunError, DomainError> {
        self.log.push(format!("start#{}", self.id));
        let (tx, rx) = oneshot::channel();
        let mut senders = self.crash_tx.lock().unwrap();
        if senders.len() <= self.id {
            senders.resize_with(self.id + 1, || None);
        }
        senders[self.id] = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), DomainError> {
        self.log.push(format!("stop#{}", self.id));
        if let Some(slot) = self.crash_tx.lock().unwrap().get_mut(self.id) {
            slot.take();
        }
        Ok(())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        Some(instance_addr(self.id))
    }

    fn probe_addr(&self) -> Option<SocketAddr> {
        Some(instance_probe_addr(self.id))
    }
}

/// Builds numbered mock instances; build outcomes can be scripted per call.
pub struct MockFactory {
    log: EventLog,
    failures: Mutex<VecDeque<Option<DomainError>>>,
    builds: Mutex<usize>,
    crash_tx: Arc<Mutex<Vec<Option<oneshot::Sender<DomainError>>>>>,
}

impl MockFactory {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failures: Mutex::new(VecDeque::new()),
            builds: Mutex::new(0),
            crash_tx: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Outcome of the next builds, in order; `None` means success. Builds
    /// past the script succeed.
    pub fn with_script(self, outcomes: Vec<Option<DomainError>>) -> Self {
        *self.failures.lock().unwrap() = outcomes.into();
        self
    }

    pub fn builds(&self) -> usize {
        *self.builds.lock().unwrap()
    }

    /// Reports an unsolicited failure from instance `id`.
    pub fn crash(&self, id: usize, error: DomainError) {
        let sender = self
            .crash_tx
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(Option::take)
            .expect("instance is not running");
        sender.send(error).unwrap();
    }
}

#[async_trait]
impl InstanceFactory for MockFactory {
    async fn build(&self, fetch_remote: bool) -> Result<Box<dyn ServerInstance>, DomainError> {
        let id = {
            let mut builds = self.builds.lock().unwrap();
            *builds += 1;
            *builds
        };
        self.log.push(format!("build#{} fetch_remote={}", id, fetch_remote));

        if let Some(Some(error)) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        Ok(Box::new(MockInstance {
            id,
            log: self.log.clone(),
            crash_tx: self.crash_tx.clone(),
        }))
    }
}

/// Liveness probe replaying scripted outcomes; passes once the script runs out.
pub struct MockProbe {
    log: EventLog,
    outcomes: Mutex<VecDeque<Result<(), DomainError>>>,
}

impl MockProbe {
    pub fn new(log: EventLog, outcomes: Vec<Result<(), DomainError>>) -> Self {
        Self {
            log,
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl LivenessProbe for MockProbe {
    async fn check(&self, addr: SocketAddr, cancel: &CancellationToken) -> Result<(), DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        self.log.push(format!("probe {}", addr.port()));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
