mod counters;
mod noop;

pub use counters::{CounterMetrics, FilterSizes};
pub use noop::NoopMetrics;

use ferrous_relay_application::ports::MetricsPort;
use ferrous_relay_domain::MetricsType;
use std::sync::Arc;

/// Selects the metrics strategy once at startup. The counters are also
/// returned concretely so their values can be read back.
pub fn build_metrics(
    metrics_type: MetricsType,
) -> (Arc<dyn MetricsPort>, Option<Arc<CounterMetrics>>) {
    match metrics_type {
        MetricsType::Noop => (Arc::new(NoopMetrics), None),
        MetricsType::Counters => {
            let counters = Arc::new(CounterMetrics::new());
            (counters.clone(), Some(counters))
        }
    }
}
