//! Distributed-training usage records.
//!
//! # Design
//! - [`DdpLoggingData`] is a flat snapshot: static configuration captured
//!   when the training wrapper is built, the iteration that produced the
//!   sample, and runtime aggregates refreshed on sampled iterations.
//! - Every field starts at an "unset" sentinel (`-1`, empty string, empty
//!   list, `false`) so partially populated records are recognisable.
//! - The sink borrows the snapshot; the training loop keeps ownership.

use std::fmt::{self, Debug, Formatter};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tenet_telemetry::HandlerSlot;

/// Runtime stats are sampled every this many iterations after warm-up.
pub const DDP_RUNTIME_LOGGING_SAMPLE_RATE: i64 = 100;

const WARM_UP_ITERATIONS: i64 = 10;
const UNSET: i64 = -1;

static DDP_USAGE_SINK: Lazy<HandlerSlot<DdpUsageSink>> = Lazy::new(HandlerSlot::empty);

/// Snapshot describing a distributed data-parallel training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdpLoggingData {
    /// Number of participating processes.
    pub world_size: i32,
    /// Rank of this process.
    pub rank: i32,
    /// Name of the wrapped module.
    pub module_name: String,
    /// Devices the module replicates onto.
    pub device_ids: Vec<i32>,
    /// Device receiving the module output.
    pub output_device: i32,
    /// Collective communication backend.
    pub backend_name: String,
    /// Parameter data type.
    pub dtype: String,
    /// Total parameter size in bytes.
    pub total_parameter_size_bytes: i64,
    /// Number of parameter tensors.
    pub num_parameter_tensors: i32,
    /// Gradient bucket sizes in bytes computed at construction.
    pub bucket_sizes: Vec<i32>,

    /// `MASTER_PORT`.
    pub master_port: String,
    /// `MASTER_ADDR`.
    pub master_addr: String,
    /// `CUDA_VISIBLE_DEVICES`.
    pub cuda_visible_devices: String,
    /// `GLOO_SOCKET_IFNAME`.
    pub gloo_socket_ifname: String,
    /// `GLOO_DEVICE_TRANSPORT`.
    pub gloo_device_transport: String,
    /// `NCCL_SOCKET_IFNAME`.
    pub nccl_socket_ifname: String,
    /// `NCCL_BLOCKING_WAIT`.
    pub nccl_blocking_wait: String,
    /// `NCCL_DEBUG`.
    pub nccl_debug: String,
    /// `NCCL_NTHREADS`.
    pub nccl_nthreads: String,
    /// `NCCL_IB_TIMEOUT`.
    pub nccl_ib_timeout: String,

    /// Buffers are broadcast from rank 0 before each forward pass.
    pub broadcast_buffers: bool,
    /// Bucket size cap in megabytes.
    pub bucket_cap_mb: f32,
    /// Unused parameters are searched for after each forward pass.
    pub find_unused_parameters: bool,
    /// Gradients are views into the communication buckets.
    pub gradient_as_bucket_view: bool,

    /// Training iteration that produced this snapshot; `-1` until the first
    /// sample is recorded.
    pub iteration: i64,

    /// Total size in bytes of parameters unused in the sampled iteration.
    pub unused_parameter_size: i64,
    /// Buckets were rebuilt after the first iteration.
    pub has_rebuilt_buckets: bool,
    /// Bucket sizes in bytes after the rebuild.
    pub rebuilt_bucket_sizes: Vec<i32>,
    /// Average forward compute time (ns) over sampled iterations.
    pub avg_forward_compute_time: i64,
    /// Average backward compute time (ns) over sampled iterations.
    pub avg_backward_compute_time: i64,
    /// Average backward communication time (ns) over sampled iterations.
    pub avg_backward_comm_time: i64,
    /// Average overlap of backward compute and communication (ns).
    pub avg_backward_compute_comm_overlap_time: i64,
    /// Number of sampled iterations folded into the averages.
    pub num_runtime_samples: i64,
}

impl Default for DdpLoggingData {
    fn default() -> Self {
        Self {
            world_size: -1,
            rank: -1,
            module_name: String::new(),
            device_ids: Vec::new(),
            output_device: -1,
            backend_name: String::new(),
            dtype: String::new(),
            total_parameter_size_bytes: UNSET,
            num_parameter_tensors: -1,
            bucket_sizes: Vec::new(),
            master_port: String::new(),
            master_addr: String::new(),
            cuda_visible_devices: String::new(),
            gloo_socket_ifname: String::new(),
            gloo_device_transport: String::new(),
            nccl_socket_ifname: String::new(),
            nccl_blocking_wait: String::new(),
            nccl_debug: String::new(),
            nccl_nthreads: String::new(),
            nccl_ib_timeout: String::new(),
            broadcast_buffers: false,
            bucket_cap_mb: -1.0,
            find_unused_parameters: false,
            gradient_as_bucket_view: false,
            iteration: UNSET,
            unused_parameter_size: UNSET,
            has_rebuilt_buckets: false,
            rebuilt_bucket_sizes: Vec::new(),
            avg_forward_compute_time: UNSET,
            avg_backward_compute_time: UNSET,
            avg_backward_comm_time: UNSET,
            avg_backward_compute_comm_overlap_time: UNSET,
            num_runtime_samples: UNSET,
        }
    }
}

/// Timings (ns) measured for one sampled iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeSample {
    /// Forward pass compute time.
    pub forward_compute_time: i64,
    /// Backward pass compute time.
    pub backward_compute_time: i64,
    /// Backward pass communication time.
    pub backward_comm_time: i64,
    /// Time backward compute and communication overlapped.
    pub backward_compute_comm_overlap_time: i64,
}

impl DdpLoggingData {
    /// Fill the environment-derived fields from the process environment.
    pub fn capture_env(&mut self) {
        self.capture_env_with(|name| std::env::var(name).ok());
    }

    /// Fill the environment-derived fields from `lookup`; missing variables
    /// leave the field empty.
    pub fn capture_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).unwrap_or_default();
        self.master_port = read("MASTER_PORT");
        self.master_addr = read("MASTER_ADDR");
        self.cuda_visible_devices = read("CUDA_VISIBLE_DEVICES");
        self.gloo_socket_ifname = read("GLOO_SOCKET_IFNAME");
        self.gloo_device_transport = read("GLOO_DEVICE_TRANSPORT");
        self.nccl_socket_ifname = read("NCCL_SOCKET_IFNAME");
        self.nccl_blocking_wait = read("NCCL_BLOCKING_WAIT");
        self.nccl_debug = read("NCCL_DEBUG");
        self.nccl_nthreads = read("NCCL_NTHREADS");
        self.nccl_ib_timeout = read("NCCL_IB_TIMEOUT");
    }

    /// Whether runtime stats should be recorded at `iteration`: every one of
    /// the first ten iterations, then every
    /// [`DDP_RUNTIME_LOGGING_SAMPLE_RATE`] iterations.
    #[must_use]
    pub const fn should_sample(iteration: i64) -> bool {
        iteration >= 0
            && (iteration < WARM_UP_ITERATIONS
                || iteration % DDP_RUNTIME_LOGGING_SAMPLE_RATE == 0)
    }

    /// Record `iteration` and fold `sample` into the running averages.
    pub fn record_runtime_sample(&mut self, iteration: i64, sample: RuntimeSample) {
        let previous = self.num_runtime_samples.max(0);
        self.iteration = iteration;
        self.avg_forward_compute_time = running_average(
            self.avg_forward_compute_time,
            sample.forward_compute_time,
            previous,
        );
        self.avg_backward_compute_time = running_average(
            self.avg_backward_compute_time,
            sample.backward_compute_time,
            previous,
        );
        self.avg_backward_comm_time =
            running_average(self.avg_backward_comm_time, sample.backward_comm_time, previous);
        self.avg_backward_compute_comm_overlap_time = running_average(
            self.avg_backward_compute_comm_overlap_time,
            sample.backward_compute_comm_overlap_time,
            previous,
        );
        self.num_runtime_samples = previous.saturating_add(1);
    }
}

fn running_average(average: i64, value: i64, previous_samples: i64) -> i64 {
    if previous_samples == 0 || average == UNSET {
        return value;
    }
    average
        .saturating_mul(previous_samples)
        .saturating_add(value)
        / (previous_samples + 1)
}

/// Callback receiving distributed-training snapshots.
pub struct DdpUsageSink {
    report: Box<dyn Fn(&DdpLoggingData) + Send + Sync>,
}

impl DdpUsageSink {
    /// Wrap `report` as a sink.
    pub fn new<F>(report: F) -> Self
    where
        F: Fn(&DdpLoggingData) + Send + Sync + 'static,
    {
        Self {
            report: Box::new(report),
        }
    }

    /// Deliver one snapshot.
    pub fn report(&self, data: &DdpLoggingData) {
        (self.report)(data);
    }
}

impl Debug for DdpUsageSink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("DdpUsageSink")
    }
}

/// Register the process-wide distributed-training sink, replacing any
/// previous one.
pub fn set_ddp_usage_logger<F>(report: F)
where
    F: Fn(&DdpLoggingData) + Send + Sync + 'static,
{
    DDP_USAGE_SINK.replace(DdpUsageSink::new(report));
    tracing::debug!("ddp usage sink replaced");
}

/// Report `data` to the registered sink; a no-op when none is registered.
pub fn log_ddp_usage(data: &DdpLoggingData) {
    if let Some(sink) = DDP_USAGE_SINK.current() {
        sink.report(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_record_is_entirely_unset() {
        let data = DdpLoggingData::default();
        assert_eq!(data.world_size, -1);
        assert_eq!(data.rank, -1);
        assert!(data.module_name.is_empty());
        assert!(data.device_ids.is_empty());
        assert_eq!(data.output_device, -1);
        assert!(data.backend_name.is_empty());
        assert!(data.dtype.is_empty());
        assert_eq!(data.total_parameter_size_bytes, -1);
        assert_eq!(data.num_parameter_tensors, -1);
        assert!(data.bucket_sizes.is_empty());
        for value in [
            &data.master_port,
            &data.master_addr,
            &data.cuda_visible_devices,
            &data.gloo_socket_ifname,
            &data.gloo_device_transport,
            &data.nccl_socket_ifname,
            &data.nccl_blocking_wait,
            &data.nccl_debug,
            &data.nccl_nthreads,
            &data.nccl_ib_timeout,
        ] {
            assert!(value.is_empty());
        }
        assert!(!data.broadcast_buffers);
        assert!((data.bucket_cap_mb + 1.0).abs() < f32::EPSILON);
        assert!(!data.find_unused_parameters);
        assert!(!data.gradient_as_bucket_view);
        assert_eq!(data.iteration, -1);
        assert_eq!(data.unused_parameter_size, -1);
        assert!(!data.has_rebuilt_buckets);
        assert!(data.rebuilt_bucket_sizes.is_empty());
        assert_eq!(data.avg_forward_compute_time, -1);
        assert_eq!(data.avg_backward_compute_time, -1);
        assert_eq!(data.avg_backward_comm_time, -1);
        assert_eq!(data.avg_backward_compute_comm_overlap_time, -1);
        assert_eq!(data.num_runtime_samples, -1);
    }

    #[test]
    fn capture_env_reads_known_variables_only() {
        let env: HashMap<&str, &str> = [
            ("MASTER_ADDR", "10.0.0.1"),
            ("MASTER_PORT", "29500"),
            ("NCCL_DEBUG", "INFO"),
            ("UNRELATED", "ignored"),
        ]
        .into_iter()
        .collect();
        let mut data = DdpLoggingData::default();
        data.capture_env_with(|name| env.get(name).map(|value| (*value).to_string()));

        assert_eq!(data.master_addr, "10.0.0.1");
        assert_eq!(data.master_port, "29500");
        assert_eq!(data.nccl_debug, "INFO");
        assert!(data.gloo_socket_ifname.is_empty());
        assert!(data.nccl_ib_timeout.is_empty());
    }

    #[test]
    fn sampling_covers_warm_up_then_every_hundredth_iteration() {
        let sampled: Vec<i64> = (0..=300)
            .filter(|iteration| DdpLoggingData::should_sample(*iteration))
            .collect();
        assert_eq!(
            sampled,
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 100, 200, 300]
        );
        assert!(!DdpLoggingData::should_sample(-1));
    }

    #[test]
    fn runtime_samples_are_averaged() {
        let mut data = DdpLoggingData::default();
        for (iteration, forward) in [(1, 100), (2, 200), (3, 300)] {
            data.record_runtime_sample(
                iteration,
                RuntimeSample {
                    forward_compute_time: forward,
                    backward_compute_time: forward * 2,
                    backward_comm_time: 50,
                    backward_compute_comm_overlap_time: 0,
                },
            );
        }

        assert_eq!(data.iteration, 3);
        assert_eq!(data.num_runtime_samples, 3);
        assert_eq!(data.avg_forward_compute_time, 200);
        assert_eq!(data.avg_backward_compute_time, 400);
        assert_eq!(data.avg_backward_comm_time, 50);
        assert_eq!(data.avg_backward_compute_comm_overlap_time, 0);
    }

    #[test]
    fn sampled_record_keeps_averaging_after_a_json_round_trip() {
        let sample = |forward| RuntimeSample {
            forward_compute_time: forward,
            ..RuntimeSample::default()
        };
        let mut original = DdpLoggingData::default();
        original.record_runtime_sample(1, sample(100));
        original.record_runtime_sample(2, sample(300));

        let json = serde_json::to_string(&original).expect("serialize");
        let mut restored: DdpLoggingData = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, original);
        assert_eq!(restored.num_runtime_samples, 2);

        original.record_runtime_sample(3, sample(500));
        restored.record_runtime_sample(3, sample(500));
        assert_eq!(restored, original);
        assert_eq!(restored.avg_forward_compute_time, 300);
    }

    #[test]
    fn serialized_record_round_trips_through_json() {
        let mut data = DdpLoggingData {
            world_size: 8,
            rank: 3,
            module_name: "ResNet".to_string(),
            device_ids: vec![3],
            backend_name: "nccl".to_string(),
            bucket_sizes: vec![25 * 1024 * 1024, 1024],
            ..DdpLoggingData::default()
        };
        data.find_unused_parameters = true;

        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["backend_name"], "nccl");
        assert_eq!(json["iteration"], -1);

        let decoded: DdpLoggingData = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, data);
    }
}
