//! In-memory stand-ins for the key store, publisher and distribution
//! inventory.
//!
//! Failures are scripted per call: queue an error and the next matching call
//! returns it, after which the mock behaves normally again.

use async_trait::async_trait;
use pipeseal::core::domain::{Environment, EnvironmentKey, SealedSecret};
use pipeseal::core::locator::{Distribution, DistributionSource};
use pipeseal::core::store::{KeyResolver, Publisher};
use pipeseal::error::{Error, KeyResolutionError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Builds a fresh error each time it is scripted.
pub type ErrorFn = fn() -> Error;

/// Key store serving fixed keys per environment.
#[derive(Default)]
pub struct MockKeys {
    keys: Mutex<HashMap<String, VecDeque<EnvironmentKey>>>,
    /// `None` entries let one fetch through before the next scripted error.
    failures: Mutex<HashMap<String, VecDeque<Option<ErrorFn>>>>,
    calls: Mutex<Vec<String>>,
}

impl MockKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `key` for `environment`. Adding a second key makes the first
    /// fetch return the first key and every later fetch the second.
    pub fn with_key(self, environment: &str, key: EnvironmentKey) -> Self {
        self.keys
            .lock()
            .unwrap()
            .entry(environment.to_string())
            .or_default()
            .push_back(key);
        self
    }

    /// Fail the next fetch for `environment`.
    pub fn fail_next(self, environment: &str, error: ErrorFn) -> Self {
        self.script(environment, Some(error))
    }

    /// Let the next fetch for `environment` succeed, so a following
    /// `fail_next` applies to the fetch after it.
    pub fn succeed_next(self, environment: &str) -> Self {
        self.script(environment, None)
    }

    fn script(self, environment: &str, step: Option<ErrorFn>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(environment.to_string())
            .or_default()
            .push_back(step);
        self
    }

    /// Environments fetched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyResolver for MockKeys {
    async fn fetch_key(&self, environment: &Environment) -> Result<EnvironmentKey> {
        let name = environment.name().to_string();
        self.calls.lock().unwrap().push(name.clone());

        if let Some(Some(error)) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(VecDeque::pop_front)
        {
            return Err(error());
        }

        let mut keys = self.keys.lock().unwrap();
        match keys.get_mut(&name) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) if !queue.is_empty() => Ok(queue[0].clone()),
            _ => Err(KeyResolutionError::NotFound { environment: name }.into()),
        }
    }
}

/// One publish the mock accepted.
#[derive(Debug, Clone)]
pub struct Published {
    pub environment: String,
    pub name: String,
    pub sealed: SealedSecret,
}

/// Publisher recording every accepted secret.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    failures: Mutex<HashMap<(String, String), VecDeque<ErrorFn>>>,
    attempts: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next publish of `name` to `environment`.
    pub fn fail_next(self, environment: &str, name: &str, error: ErrorFn) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry((environment.to_string(), name.to_string()))
            .or_default()
            .push_back(error);
        self
    }

    /// Every accepted publish, in call order.
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    /// The accepted publish of `name` to `environment`.
    pub fn find(&self, environment: &str, name: &str) -> Option<Published> {
        self.published()
            .into_iter()
            .find(|p| p.environment == environment && p.name == name)
    }

    /// Publish calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        environment: &Environment,
        name: &str,
        sealed: &SealedSecret,
    ) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let slot = (environment.name().to_string(), name.to_string());
        if let Some(error) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&slot)
            .and_then(VecDeque::pop_front)
        {
            return Err(error());
        }

        self.published.lock().unwrap().push(Published {
            environment: slot.0,
            name: slot.1,
            sealed: sealed.clone(),
        });
        Ok(())
    }
}

/// Distribution inventory held in memory.
pub struct MockInventory {
    distributions: Vec<Distribution>,
    failures: Mutex<VecDeque<ErrorFn>>,
    calls: Arc<AtomicUsize>,
}

impl MockInventory {
    pub fn new(distributions: Vec<Distribution>) -> Self {
        Self {
            distributions,
            failures: Mutex::new(VecDeque::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next listing.
    pub fn fail_next(self, error: ErrorFn) -> Self {
        self.failures.lock().unwrap().push_back(error);
        self
    }

    /// Listing counter that stays readable after the inventory is moved
    /// into a locator.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl DistributionSource for MockInventory {
    async fn list_distributions(&self) -> Result<Vec<Distribution>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error());
        }
        Ok(self.distributions.clone())
    }
}

/// The usual inventory: one distribution per environment.
pub fn inventory() -> Vec<Distribution> {
    vec![
        Distribution::new("EPROD111", &["pizza.example.net"]),
        Distribution::new("ESTAGE222", &["stage-pizza.example.net"]),
        Distribution::new("EOTHER333", &["blog.example.net"]),
    ]
}
