use compact_str::CompactString;
use ferrous_lookup_application::ports::{EngineOutcome, ExternalHandle, ResolverEngine};
use ferrous_lookup_domain::{
    AnswerRecord, ConfigError, DnsAnswer, DomainError, LocalRecord, RecordClass, RecordType,
};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Answer delivered by an engine, correlated by the dispatch handle.
#[derive(Debug)]
pub struct EngineEvent {
    pub handle: ExternalHandle,
    pub outcome: EngineOutcome,
}

type HostTable = FxHashMap<CompactString, SmallVec<[(IpAddr, u32); 2]>>;

/// Resolver engine answering from statically configured records.
///
/// Answers are never produced inside `dispatch`: they are queued on the event
/// channel, optionally after a fixed latency, and picked up by the event loop.
pub struct LocalRecordsEngine {
    hosts: Arc<HostTable>,
    latency: Option<Duration>,
    next_handle: AtomicU64,
    pending: Arc<Mutex<FxHashSet<ExternalHandle>>>,
    sender: mpsc::UnboundedSender<EngineEvent>,
}

impl LocalRecordsEngine {
    /// Builds the engine and the receiver the event loop drains.
    pub fn new(
        records: &[LocalRecord],
        default_domain: Option<&str>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<EngineEvent>), ConfigError> {
        let mut hosts = HostTable::default();
        for record in records {
            let fqdn = normalize(&record.fqdn(default_domain));
            hosts
                .entry(fqdn)
                .or_default()
                .push((record.address()?, record.ttl_or_default()));
        }
        debug!(names = hosts.len(), "Local records loaded");

        let (sender, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            hosts: Arc::new(hosts),
            latency: None,
            next_handle: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(FxHashSet::default())),
            sender,
        };
        Ok((engine, receiver))
    }

    /// Delays every answer by `latency`; canceled sub-queries are then
    /// dropped instead of answered.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    pub fn names(&self) -> usize {
        self.hosts.len()
    }

    /// Delayed answers not yet delivered nor canceled.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|set| set.len()).unwrap_or(0)
    }

    fn lookup(&self, name: &str, record_type: RecordType) -> DnsAnswer {
        let key = normalize(name);
        let Some(entries) = self.hosts.get(&key) else {
            return DnsAnswer::nx_domain();
        };

        let records = entries
            .iter()
            .filter(|(ip, _)| match record_type {
                RecordType::A => ip.is_ipv4(),
                RecordType::AAAA => ip.is_ipv6(),
                _ => false,
            })
            .map(|(ip, ttl)| AnswerRecord::address(key.as_str(), *ip, *ttl))
            .collect();
        DnsAnswer::no_error(records)
    }
}

impl ResolverEngine for LocalRecordsEngine {
    fn dispatch(
        &self,
        name: &str,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Result<ExternalHandle, DomainError> {
        if record_class != RecordClass::IN {
            return Err(DomainError::DispatchFailure(format!(
                "class {} not served by local records",
                record_class
            )));
        }
        if self.sender.is_closed() {
            return Err(DomainError::DispatchFailure(
                "answer channel closed".to_string(),
            ));
        }

        let handle = ExternalHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let event = EngineEvent {
            handle,
            outcome: Ok(self.lookup(name, record_type)),
        };
        trace!(handle = handle.0, name, record_type = %record_type, "Local lookup dispatched");

        match self.latency {
            None => {
                let _ = self.sender.send(event);
            }
            Some(latency) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.insert(handle);
                }
                let sender = self.sender.clone();
                let pending = Arc::clone(&self.pending);
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    let still_pending = pending
                        .lock()
                        .map(|mut set| set.remove(&event.handle))
                        .unwrap_or(false);
                    if still_pending {
                        let _ = sender.send(event);
                    }
                });
            }
        }
        Ok(handle)
    }

    fn cancel(&self, handle: ExternalHandle) {
        // delivered answers are no longer tracked
        let removed = self
            .pending
            .lock()
            .map(|mut set| set.remove(&handle))
            .unwrap_or(false);
        if removed {
            trace!(handle = handle.0, "Local lookup canceled");
        }
    }
}

fn normalize(name: &str) -> CompactString {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    CompactString::from(trimmed.to_ascii_lowercase())
}
