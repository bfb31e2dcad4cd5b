use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// A snapshot of where-clause compilation metrics.
///
/// Captures time spent and number of invocations per operation builder.
/// Profiling is enabled via the `SOMBRA_PROFILE` environment variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereProfileSnapshot {
    /// Total nanoseconds spent compiling scalar comparisons.
    pub scalar_ns: u64,
    /// Number of scalar comparisons compiled.
    pub scalar_count: u64,
    /// Total nanoseconds spent in the relation builder.
    pub relation_ns: u64,
    /// Number of relation filters compiled.
    pub relation_count: u64,
    /// Total nanoseconds spent in the aggregate builder.
    pub aggregate_ns: u64,
    /// Number of aggregate filters compiled.
    pub aggregate_count: u64,
    /// Total nanoseconds spent in the connection builder.
    pub connection_ns: u64,
    /// Number of connection filters compiled.
    pub connection_count: u64,
    /// Total nanoseconds spent decoding global identifiers.
    pub global_id_ns: u64,
    /// Number of global identifier filters compiled.
    pub global_id_count: u64,
}

#[derive(Default)]
struct WhereProfileCounters {
    scalar_ns: AtomicU64,
    scalar_count: AtomicU64,
    relation_ns: AtomicU64,
    relation_count: AtomicU64,
    aggregate_ns: AtomicU64,
    aggregate_count: AtomicU64,
    connection_ns: AtomicU64,
    connection_count: AtomicU64,
    global_id_ns: AtomicU64,
    global_id_count: AtomicU64,
}

static PROFILE_ENABLED: OnceLock<bool> = OnceLock::new();
static PROFILE_COUNTERS: OnceLock<WhereProfileCounters> = OnceLock::new();

fn profiling_enabled() -> bool {
    *PROFILE_ENABLED.get_or_init(|| std::env::var_os("SOMBRA_PROFILE").is_some())
}

fn counters() -> Option<&'static WhereProfileCounters> {
    profiling_enabled().then(|| PROFILE_COUNTERS.get_or_init(WhereProfileCounters::default))
}

pub(crate) fn profile_timer() -> Option<Instant> {
    profiling_enabled().then(Instant::now)
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum WhereProfileKind {
    Scalar,
    Relation,
    Aggregate,
    Connection,
    GlobalId,
}

pub(crate) fn record_profile_timer(kind: WhereProfileKind, start: Option<Instant>) {
    let Some(start) = start else {
        return;
    };
    let Some(counters) = counters() else {
        return;
    };
    let nanos = start.elapsed().as_nanos().min(u64::MAX as u128) as u64;
    let (ns, count) = match kind {
        WhereProfileKind::Scalar => (&counters.scalar_ns, &counters.scalar_count),
        WhereProfileKind::Relation => (&counters.relation_ns, &counters.relation_count),
        WhereProfileKind::Aggregate => (&counters.aggregate_ns, &counters.aggregate_count),
        WhereProfileKind::Connection => (&counters.connection_ns, &counters.connection_count),
        WhereProfileKind::GlobalId => (&counters.global_id_ns, &counters.global_id_count),
    };
    ns.fetch_add(nanos, Ordering::Relaxed);
    count.fetch_add(1, Ordering::Relaxed);
}

/// Retrieves a snapshot of the compilation counters.
///
/// Returns `None` unless `SOMBRA_PROFILE` is set. With `reset`, counters are
/// zeroed after being read.
///
/// ```no_run
/// use sombra_where::where_clause::profile_snapshot;
///
/// if let Some(snapshot) = profile_snapshot(true) {
///     println!("relation filters: {}", snapshot.relation_count);
/// }
/// ```
pub fn profile_snapshot(reset: bool) -> Option<WhereProfileSnapshot> {
    let counters = counters()?;
    let load = |counter: &AtomicU64| {
        if reset {
            counter.swap(0, Ordering::Relaxed)
        } else {
            counter.load(Ordering::Relaxed)
        }
    };
    Some(WhereProfileSnapshot {
        scalar_ns: load(&counters.scalar_ns),
        scalar_count: load(&counters.scalar_count),
        relation_ns: load(&counters.relation_ns),
        relation_count: load(&counters.relation_count),
        aggregate_ns: load(&counters.aggregate_ns),
        aggregate_count: load(&counters.aggregate_count),
        connection_ns: load(&counters.connection_ns),
        connection_count: load(&counters.connection_count),
        global_id_ns: load(&counters.global_id_ns),
        global_id_count: load(&counters.global_id_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_env_flag() {
        if std::env::var_os("SOMBRA_PROFILE").is_some() {
            return;
        }
        assert!(profile_timer().is_none());
        record_profile_timer(WhereProfileKind::Scalar, None);
        assert!(profile_snapshot(true).is_none());
    }
}
