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

//! Pool model <-> Pool resource.
//!
//! `from_pool(to_pool(p)) == p` holds for any pool that passes validation and
//! does not repeat a key/operator pair inside one node selector term.

use super::security_context::{from_security_context, to_security_context};
use super::{non_empty, non_empty_map, non_empty_vec};
use crate::error::{Error, Result};
use crate::models::pool as model;
use crate::types::v2::pool::Pool;
use crate::utils::quantity;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use std::collections::BTreeMap;

const VOLUME_CLAIM_NAME: &str = "data";
const READ_WRITE_ONCE: &str = "ReadWriteOnce";

type PodTerms = (
    Option<Vec<corev1::PodAffinityTerm>>,
    Option<Vec<corev1::WeightedPodAffinityTerm>>,
);

pub fn to_pool(pool: &model::Pool) -> Result<Pool> {
    let volume = pool
        .volume_configuration
        .as_ref()
        .filter(|volume| volume.size > 0)
        .ok_or_else(|| {
            Error::invalid_request(format!(
                "pool '{}' needs a volume size greater than 0",
                pool.name
            ))
        })?;

    let servers = i32::try_from(pool.servers)
        .ok()
        .filter(|servers| *servers > 0)
        .ok_or_else(|| {
            Error::invalid_request(format!(
                "pool '{}' needs a number of servers greater than 0",
                pool.name
            ))
        })?;

    if pool.volumes_per_server <= 0 {
        return Err(Error::invalid_request(format!(
            "pool '{}' needs a number of volumes per server greater than 0",
            pool.name
        )));
    }

    Ok(Pool {
        name: pool.name.clone(),
        servers,
        volumes_per_server: pool.volumes_per_server,
        volume_claim_template: Some(volume_claim_template(volume)),
        resources: pool.resources.as_ref().and_then(to_resources),
        node_selector: non_empty_map(&pool.node_selector),
        affinity: pool.affinity.as_ref().and_then(to_affinity),
        tolerations: pool.tolerations.iter().map(to_toleration).collect(),
        security_context: pool
            .security_context
            .as_ref()
            .map(to_security_context)
            .transpose()?,
        runtime_class_name: non_empty(&pool.runtime_class_name),
    })
}

pub fn from_pool(pool: &Pool) -> model::Pool {
    let metadata = pool.volume_claim_template.as_ref().map(|pvc| &pvc.metadata);

    model::Pool {
        name: pool.name.clone(),
        servers: i64::from(pool.servers),
        volumes_per_server: pool.volumes_per_server,
        volume_configuration: Some(model::VolumeConfiguration {
            size: pool.volume_size().unwrap_or(0),
            storage_class_name: pool.storage_class_name().unwrap_or_default().to_string(),
            labels: metadata
                .and_then(|meta| meta.labels.clone())
                .unwrap_or_default(),
            annotations: metadata
                .and_then(|meta| meta.annotations.clone())
                .unwrap_or_default(),
        }),
        resources: pool.resources.as_ref().and_then(from_resources),
        node_selector: pool.node_selector.clone().unwrap_or_default(),
        affinity: pool.affinity.as_ref().and_then(from_affinity),
        tolerations: pool.tolerations.iter().map(from_toleration).collect(),
        security_context: pool.security_context.as_ref().map(from_security_context),
        runtime_class_name: pool.runtime_class_name.clone().unwrap_or_default(),
    }
}

fn volume_claim_template(volume: &model::VolumeConfiguration) -> corev1::PersistentVolumeClaim {
    corev1::PersistentVolumeClaim {
        metadata: metav1::ObjectMeta {
            name: Some(VOLUME_CLAIM_NAME.to_string()),
            labels: non_empty_map(&volume.labels),
            annotations: non_empty_map(&volume.annotations),
            ..Default::default()
        },
        spec: Some(corev1::PersistentVolumeClaimSpec {
            access_modes: Some(vec![READ_WRITE_ONCE.to_string()]),
            resources: Some(corev1::VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    quantity::from_bytes(volume.size),
                )])),
                ..Default::default()
            }),
            storage_class_name: non_empty(&volume.storage_class_name),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn to_quantities(values: &BTreeMap<String, i64>) -> Option<BTreeMap<String, Quantity>> {
    let quantities: BTreeMap<_, _> = values
        .iter()
        .map(|(name, value)| (name.clone(), quantity::from_bytes(*value)))
        .collect();
    (!quantities.is_empty()).then_some(quantities)
}

fn from_quantities(quantities: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, i64> {
    quantities
        .into_iter()
        .flatten()
        .map(|(name, value)| (name.clone(), quantity::parse_or_zero(Some(value))))
        .collect()
}

fn to_resources(resources: &model::PoolResources) -> Option<corev1::ResourceRequirements> {
    let requests = to_quantities(&resources.requests);
    let limits = to_quantities(&resources.limits);
    if requests.is_none() && limits.is_none() {
        return None;
    }

    Some(corev1::ResourceRequirements {
        requests,
        limits,
        ..Default::default()
    })
}

fn from_resources(resources: &corev1::ResourceRequirements) -> Option<model::PoolResources> {
    let requests = from_quantities(resources.requests.as_ref());
    let limits = from_quantities(resources.limits.as_ref());
    if requests.is_empty() && limits.is_empty() {
        return None;
    }

    Some(model::PoolResources { requests, limits })
}

fn to_affinity(affinity: &model::PoolAffinity) -> Option<corev1::Affinity> {
    let node_affinity = affinity.node_affinity.as_ref().and_then(to_node_affinity);
    let pod_affinity = affinity.pod_affinity.as_ref().and_then(to_pod_terms).map(
        |(required, preferred)| corev1::PodAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        },
    );
    let pod_anti_affinity = affinity
        .pod_anti_affinity
        .as_ref()
        .and_then(to_pod_terms)
        .map(|(required, preferred)| corev1::PodAntiAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        });

    if node_affinity.is_none() && pod_affinity.is_none() && pod_anti_affinity.is_none() {
        return None;
    }

    Some(corev1::Affinity {
        node_affinity,
        pod_affinity,
        pod_anti_affinity,
    })
}

fn from_affinity(affinity: &corev1::Affinity) -> Option<model::PoolAffinity> {
    let node_affinity = affinity.node_affinity.as_ref().map(from_node_affinity);
    let pod_affinity = affinity.pod_affinity.as_ref().map(|terms| {
        from_pod_terms(
            terms.required_during_scheduling_ignored_during_execution.as_deref(),
            terms.preferred_during_scheduling_ignored_during_execution.as_deref(),
        )
    });
    let pod_anti_affinity = affinity.pod_anti_affinity.as_ref().map(|terms| {
        from_pod_terms(
            terms.required_during_scheduling_ignored_during_execution.as_deref(),
            terms.preferred_during_scheduling_ignored_during_execution.as_deref(),
        )
    });

    if node_affinity.is_none() && pod_affinity.is_none() && pod_anti_affinity.is_none() {
        return None;
    }

    Some(model::PoolAffinity {
        node_affinity,
        pod_affinity,
        pod_anti_affinity,
    })
}

fn to_node_affinity(affinity: &model::NodeAffinity) -> Option<corev1::NodeAffinity> {
    let required = affinity
        .required_during_scheduling
        .as_ref()
        .filter(|selector| !selector.node_selector_terms.is_empty())
        .map(|selector| corev1::NodeSelector {
            node_selector_terms: selector
                .node_selector_terms
                .iter()
                .map(to_node_selector_term)
                .collect(),
        });
    let preferred = non_empty_vec(
        affinity
            .preferred_during_scheduling
            .iter()
            .map(|term| corev1::PreferredSchedulingTerm {
                weight: term.weight,
                preference: to_node_selector_term(&term.preference),
            })
            .collect(),
    );

    if required.is_none() && preferred.is_none() {
        return None;
    }

    Some(corev1::NodeAffinity {
        required_during_scheduling_ignored_during_execution: required,
        preferred_during_scheduling_ignored_during_execution: preferred,
    })
}

fn from_node_affinity(affinity: &corev1::NodeAffinity) -> model::NodeAffinity {
    model::NodeAffinity {
        required_during_scheduling: affinity
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .map(|selector| model::NodeSelector {
                node_selector_terms: selector
                    .node_selector_terms
                    .iter()
                    .map(from_node_selector_term)
                    .collect(),
            }),
        preferred_during_scheduling: affinity
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .flatten()
            .map(|term| model::PreferredSchedulingTerm {
                weight: term.weight,
                preference: from_node_selector_term(&term.preference),
            })
            .collect(),
    }
}

fn to_node_selector_term(term: &model::NodeSelectorTerm) -> corev1::NodeSelectorTerm {
    corev1::NodeSelectorTerm {
        match_expressions: non_empty_vec(merge_requirements(&term.match_expressions)),
        match_fields: non_empty_vec(merge_requirements(&term.match_fields)),
    }
}

fn from_node_selector_term(term: &corev1::NodeSelectorTerm) -> model::NodeSelectorTerm {
    let requirements = |list: Option<&Vec<corev1::NodeSelectorRequirement>>| {
        list.into_iter()
            .flatten()
            .map(|requirement| model::SelectorRequirement {
                key: requirement.key.clone(),
                operator: requirement.operator.clone(),
                values: requirement.values.clone().unwrap_or_default(),
            })
            .collect::<Vec<_>>()
    };

    model::NodeSelectorTerm {
        match_expressions: requirements(term.match_expressions.as_ref()),
        match_fields: requirements(term.match_fields.as_ref()),
    }
}

/// Requirements sharing key and operator collapse into one, values in first-seen order.
fn merge_requirements(
    requirements: &[model::SelectorRequirement],
) -> Vec<corev1::NodeSelectorRequirement> {
    let mut merged: Vec<corev1::NodeSelectorRequirement> = Vec::new();
    for requirement in requirements {
        let existing = merged.iter_mut().find(|candidate| {
            candidate.key == requirement.key && candidate.operator == requirement.operator
        });
        match existing {
            Some(existing) => existing
                .values
                .get_or_insert_with(Vec::new)
                .extend(requirement.values.iter().cloned()),
            None => merged.push(corev1::NodeSelectorRequirement {
                key: requirement.key.clone(),
                operator: requirement.operator.clone(),
                values: non_empty_vec(requirement.values.clone()),
            }),
        }
    }
    merged
}

fn to_pod_terms(affinity: &model::PodAffinity) -> Option<PodTerms> {
    let required = non_empty_vec(
        affinity
            .required_during_scheduling
            .iter()
            .map(to_pod_affinity_term)
            .collect(),
    );
    let preferred = non_empty_vec(
        affinity
            .preferred_during_scheduling
            .iter()
            .map(|term| corev1::WeightedPodAffinityTerm {
                weight: term.weight,
                pod_affinity_term: to_pod_affinity_term(&term.pod_affinity_term),
            })
            .collect(),
    );

    if required.is_none() && preferred.is_none() {
        return None;
    }
    Some((required, preferred))
}

fn from_pod_terms(
    required: Option<&[corev1::PodAffinityTerm]>,
    preferred: Option<&[corev1::WeightedPodAffinityTerm]>,
) -> model::PodAffinity {
    model::PodAffinity {
        required_during_scheduling: required
            .unwrap_or_default()
            .iter()
            .map(from_pod_affinity_term)
            .collect(),
        preferred_during_scheduling: preferred
            .unwrap_or_default()
            .iter()
            .map(|term| model::WeightedPodAffinityTerm {
                weight: term.weight,
                pod_affinity_term: from_pod_affinity_term(&term.pod_affinity_term),
            })
            .collect(),
    }
}

fn to_pod_affinity_term(term: &model::PodAffinityTerm) -> corev1::PodAffinityTerm {
    corev1::PodAffinityTerm {
        label_selector: term.label_selector.as_ref().map(|selector| metav1::LabelSelector {
            match_expressions: non_empty_vec(
                selector
                    .match_expressions
                    .iter()
                    .map(|requirement| metav1::LabelSelectorRequirement {
                        key: requirement.key.clone(),
                        operator: requirement.operator.clone(),
                        values: non_empty_vec(requirement.values.clone()),
                    })
                    .collect(),
            ),
            match_labels: non_empty_map(&selector.match_labels),
        }),
        namespaces: non_empty_vec(term.namespaces.clone()),
        topology_key: term.topology_key.clone(),
        ..Default::default()
    }
}

fn from_pod_affinity_term(term: &corev1::PodAffinityTerm) -> model::PodAffinityTerm {
    model::PodAffinityTerm {
        label_selector: term.label_selector.as_ref().map(|selector| model::LabelSelector {
            match_expressions: selector
                .match_expressions
                .iter()
                .flatten()
                .map(|requirement| model::SelectorRequirement {
                    key: requirement.key.clone(),
                    operator: requirement.operator.clone(),
                    values: requirement.values.clone().unwrap_or_default(),
                })
                .collect(),
            match_labels: selector.match_labels.clone().unwrap_or_default(),
        }),
        namespaces: term.namespaces.clone().unwrap_or_default(),
        topology_key: term.topology_key.clone(),
    }
}

fn to_toleration(toleration: &model::PoolToleration) -> corev1::Toleration {
    corev1::Toleration {
        key: non_empty(&toleration.key),
        operator: non_empty(&toleration.operator),
        value: non_empty(&toleration.value),
        effect: non_empty(&toleration.effect),
        toleration_seconds: toleration.toleration_seconds,
    }
}

fn from_toleration(toleration: &corev1::Toleration) -> model::PoolToleration {
    model::PoolToleration {
        key: toleration.key.clone().unwrap_or_default(),
        operator: toleration.operator.clone().unwrap_or_default(),
        value: toleration.value.clone().unwrap_or_default(),
        effect: toleration.effect.clone().unwrap_or_default(),
        toleration_seconds: toleration.toleration_seconds,
    }
}
