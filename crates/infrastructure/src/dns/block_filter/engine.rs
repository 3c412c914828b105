use ferrous_relay_application::ports::{BlockFilterPort, MetricsPort};
use ferrous_relay_domain::{to_fqdn, FilterSnapshot};
use hickory_proto::op::Message;
use hickory_proto::rr::RData;
use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Answers block decisions against the current `FilterSnapshot`.
///
/// Readers hold the read lock for the whole decision so they always see
/// one snapshot in full; `update` swaps the snapshot under the write lock.
pub struct BlockFilterEngine {
    snapshot: RwLock<FilterSnapshot>,
    metrics: Arc<dyn MetricsPort>,
}

impl BlockFilterEngine {
    pub fn new(metrics: Arc<dyn MetricsPort>) -> Self {
        Self {
            snapshot: RwLock::new(FilterSnapshot::default()),
            metrics,
        }
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        (
            snapshot.hostname_count(),
            snapshot.ip_count(),
            snapshot.prefix_count(),
        )
    }
}

impl BlockFilterPort for BlockFilterEngine {
    fn update(&self, snapshot: FilterSnapshot) {
        let mut current = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot;
        self.metrics.filter_sizes(
            current.hostname_count(),
            current.ip_count(),
            current.prefix_count(),
        );
        info!(
            hostnames = current.hostname_count(),
            ips = current.ip_count(),
            prefixes = current.prefix_count(),
            "Filter snapshot updated"
        );
    }

    fn filter_request(&self, request: &Message) -> bool {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);

        for query in request.queries() {
            let fqdn = to_fqdn(&query.name().to_string());
            if snapshot.is_hostname_blocked(&fqdn) {
                self.metrics
                    .request_filtered(query.query_class(), query.query_type());
                debug!(domain = %fqdn, record_type = %query.query_type(), "Request filtered");
                return true;
            }
        }
        false
    }

    fn filter_response(&self, response: &Message) -> bool {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);

        for record in response.answers() {
            let ip = match record.data() {
                RData::A(a) => IpAddr::V4(a.0),
                RData::AAAA(aaaa) => IpAddr::V6(aaaa.0),
                _ => continue,
            };
            if snapshot.is_address_blocked(ip) {
                self.metrics
                    .response_filtered(record.dns_class(), record.record_type());
                debug!(name = %record.name(), ip = %ip, "Response filtered");
                return true;
            }
        }
        false
    }
}
