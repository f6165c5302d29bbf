// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sizing a tenant against the nodes of the cluster.

use crate::error::{
    Error, NotEnoughNodesSnafu, Result, TooFewAvailableNodesSnafu, TooManyNodesSnafu,
};
use crate::models::cluster::{AllocatableResources, NodeLabels, NodeMaxAllocatable};
use crate::utils::quantity;
use k8s_openapi::api::core::v1 as corev1;
use kube::ResourceExt;
use snafu::ensure;
use std::collections::{BTreeMap, BTreeSet};

pub const MIN_TENANT_NODES: usize = 4;

const CONTROL_PLANE_TAINT: &str = "node-role.kubernetes.io/master";
const NO_SCHEDULE: &str = "NoSchedule";
const NO_EXECUTE: &str = "NoExecute";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeResources {
    cpu: i64,
    memory: i64,
}

fn taints(node: &corev1::Node) -> impl Iterator<Item = &corev1::Taint> {
    node.spec
        .iter()
        .flat_map(|spec| spec.taints.iter().flatten())
}

fn schedulable(node: &corev1::Node) -> bool {
    !taints(node).any(|taint| taint.effect == NO_SCHEDULE || taint.effect == NO_EXECUTE)
}

fn control_plane(node: &corev1::Node) -> bool {
    taints(node).any(|taint| taint.key == CONTROL_PLANE_TAINT)
}

fn allocatable(node: &corev1::Node, resource: &str) -> Option<i64> {
    node.status
        .as_ref()
        .and_then(|status| status.allocatable.as_ref())
        .and_then(|allocatable| allocatable.get(resource))
        .map(|value| quantity::parse_or_zero(Some(value)))
}

/// Largest memory every one of `num_nodes` schedulable nodes can offer.
pub fn max_allocatable_memory(num_nodes: usize, nodes: &[corev1::Node]) -> Result<i64> {
    ensure!(
        num_nodes >= MIN_TENANT_NODES,
        NotEnoughNodesSnafu {
            requested: num_nodes
        }
    );

    let schedulable_nodes = nodes.iter().filter(|node| schedulable(node)).count();
    let worker_nodes = nodes.iter().filter(|node| !control_plane(node)).count();

    ensure!(
        !(num_nodes > schedulable_nodes && num_nodes < worker_nodes),
        TooManyNodesSnafu {
            requested: num_nodes,
            available: schedulable_nodes
        }
    );
    ensure!(
        worker_nodes >= num_nodes && schedulable_nodes >= num_nodes,
        TooFewAvailableNodesSnafu {
            requested: num_nodes,
            available: schedulable_nodes.min(worker_nodes)
        }
    );

    let sizes: Vec<i64> = nodes
        .iter()
        .filter(|node| schedulable(node))
        .filter_map(|node| allocatable(node, "memory"))
        .collect();

    Ok(max_cluster_memory(num_nodes, sizes))
}

/// `sizes[len - num_nodes]` once sorted, or 0 when there are too few sizes.
fn max_cluster_memory(num_nodes: usize, mut sizes: Vec<i64>) -> i64 {
    if num_nodes == 0 || sizes.len() < num_nodes {
        return 0;
    }

    sizes.sort_unstable();
    sizes[sizes.len() - num_nodes]
}

/// Best CPU and memory shapes for `num_nodes` schedulable nodes.
///
/// `cpu_priority` maximizes the CPU guaranteed on every chosen node, then the
/// memory among nodes meeting that CPU. `mem_priority` does the reverse. The
/// minimums cover the whole schedulable set.
pub fn allocatable_resources(num_nodes: usize, nodes: &[corev1::Node]) -> Result<AllocatableResources> {
    if num_nodes == 0 {
        return Err(Error::invalid_request("the number of nodes must be greater than 0"));
    }

    let mut resources: Vec<NodeResources> = nodes
        .iter()
        .filter(|node| schedulable(node))
        .map(|node| NodeResources {
            cpu: allocatable(node, "cpu").unwrap_or(0),
            memory: allocatable(node, "memory").unwrap_or(0),
        })
        .filter(|node| node.cpu > 0)
        .collect();

    ensure!(
        resources.len() >= num_nodes,
        TooFewAvailableNodesSnafu {
            requested: num_nodes,
            available: resources.len()
        }
    );

    resources.sort_by_key(|node| node.cpu);
    let cpu_priority = best_fit(&resources, num_nodes, |node| node.cpu, |node| node.memory);

    resources.sort_by_key(|node| node.memory);
    let mem_priority = best_fit(&resources, num_nodes, |node| node.memory, |node| node.cpu);

    Ok(AllocatableResources {
        min_allocatable_cpu: resources.iter().map(|node| node.cpu).min().unwrap_or(0),
        min_allocatable_mem: resources.iter().map(|node| node.memory).min().unwrap_or(0),
        cpu_priority: NodeMaxAllocatable {
            max_allocatable_cpu: cpu_priority.0,
            max_allocatable_mem: cpu_priority.1,
        },
        mem_priority: NodeMaxAllocatable {
            max_allocatable_cpu: mem_priority.1,
            max_allocatable_mem: mem_priority.0,
        },
    })
}

// `sorted` is ordered by `primary`; the floor is the best primary value
// num_nodes nodes share, and ties below the pivot still qualify.
fn best_fit(
    sorted: &[NodeResources],
    num_nodes: usize,
    primary: impl Fn(&NodeResources) -> i64,
    secondary: impl Fn(&NodeResources) -> i64,
) -> (i64, i64) {
    let Some(floor) = sorted
        .len()
        .checked_sub(num_nodes)
        .and_then(|pivot| sorted.get(pivot))
        .map(&primary)
    else {
        return (0, 0);
    };

    let secondaries: Vec<i64> = sorted
        .iter()
        .filter(|node| primary(*node) >= floor)
        .map(secondary)
        .collect();

    (floor, max_cluster_memory(num_nodes, secondaries))
}

/// Label key to the sorted unique values across all nodes.
pub fn node_labels(nodes: &[corev1::Node]) -> NodeLabels {
    let mut labels: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for node in nodes {
        for (key, value) in node.labels() {
            labels.entry(key.clone()).or_default().insert(value.clone());
        }
    }

    labels
        .into_iter()
        .map(|(key, values)| (key, values.into_iter().collect()))
        .collect()
}
