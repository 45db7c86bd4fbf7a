//! Per-flow aggregates for flow-granularity policies

use crate::models::PacketRecord;
use std::collections::BTreeMap;

/// Packet count and summed sizes for one flow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowAggregate {
    pub packets: u64,
    pub total_packet_size: u64,
    pub total_job_size: f64,
}

impl FlowAggregate {
    pub fn add_packet(&mut self, packet_size: u64, job_size: f64) {
        self.packets += 1;
        self.total_packet_size += packet_size;
        self.total_job_size += job_size;
    }

    pub fn average_job_size(&self) -> f64 {
        self.total_job_size / self.packets as f64
    }

    /// Flow-level job size per bit
    pub fn average_cost_ratio(&self) -> f64 {
        self.total_job_size / self.total_packet_size as f64
    }
}

/// Flow id -> aggregate, in flow-id order
///
/// Ordered so that ties in a later stable sort always resolve the same way.
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    flows: BTreeMap<String, FlowAggregate>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &PacketRecord) {
        self.flows
            .entry(record.flow_id.clone())
            .or_default()
            .add_packet(record.packet_size, record.job_size);
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn get(&self, flow_id: &str) -> Option<&FlowAggregate> {
        self.flows.get(flow_id)
    }

    /// Freeze the table into a list sorted ascending by `key`
    pub fn into_sorted_by<F>(self, key: F) -> Vec<FlowAggregate>
    where
        F: Fn(&FlowAggregate) -> f64,
    {
        let mut flows: Vec<FlowAggregate> = self.flows.into_values().collect();
        flows.sort_by(|a, b| key(a).total_cmp(&key(b)));
        flows
    }
}
