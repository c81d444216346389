//! Contract grouping and resolution planning.
//!
//! The planner turns a flat set of discovered [`ServiceDescriptor`]s into a
//! conflict-free, per-contract [`ResolutionPlan`]: which provider satisfies
//! single-value consumption, which providers make up a collection, and which
//! named providers are reachable by id. The plan is built once per
//! generation run and read-only afterwards: the emission collaborator
//! renders it, and the runtime engine consults it on every `resolve*` call.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::descriptor::{ServiceDescriptor, TypeDescriptor};
use crate::error::{ConfigError, ConfigErrors};

type AMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// How a contract's unnamed providers satisfy consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// At most one unnamed provider; it satisfies both single-value and
    /// collection consumption. A contract with only named providers is also
    /// Single, but unqualified resolution yields nothing.
    Single,
    /// Multiple unnamed providers; collection consumption returns all of
    /// them in deterministic order, single-value consumption yields nothing
    /// (ambiguity is never auto-resolved).
    Collection,
}

/// All providers discovered for one contract, in final deterministic order.
///
/// The unit of classification: built once per generation run, immutable
/// afterwards. Ordering within a group is by (module name, declaration
/// order), so collection sequencing does not depend on incidental upstream
/// enumeration order.
#[derive(Debug, Clone)]
pub struct ContractGroup {
    contract: TypeDescriptor,
    providers: Vec<ServiceDescriptor>,
}

impl ContractGroup {
    /// Groups descriptors by contract.
    ///
    /// Duplicate discoveries of one `(contract, implementation, service_id)`
    /// triple collapse to the first occurrence. Groups come out in
    /// first-seen contract order; providers within a group are sorted by
    /// (module, declaration order).
    pub fn collect(descriptors: Vec<ServiceDescriptor>) -> Vec<ContractGroup> {
        let mut seen: HashSet<ServiceDescriptor, ahash::RandomState> = HashSet::default();
        let mut order: Vec<TypeDescriptor> = Vec::new();
        let mut grouped: AMap<TypeDescriptor, Vec<ServiceDescriptor>> = AMap::default();

        for descriptor in descriptors {
            if !seen.insert(descriptor.clone()) {
                continue;
            }
            match grouped.entry(descriptor.contract.clone()) {
                Entry::Occupied(mut entry) => entry.get_mut().push(descriptor),
                Entry::Vacant(entry) => {
                    order.push(descriptor.contract.clone());
                    entry.insert(vec![descriptor]);
                }
            }
        }

        order
            .into_iter()
            .map(|contract| {
                let mut providers = grouped.remove(&contract).unwrap_or_default();
                // Stable sort: declaration order is preserved within a module.
                providers.sort_by(|a, b| a.module.cmp(&b.module));
                ContractGroup { contract, providers }
            })
            .collect()
    }

    /// The contract shared by every provider in the group.
    pub fn contract(&self) -> &TypeDescriptor {
        &self.contract
    }

    /// The providers, in final deterministic order.
    pub fn providers(&self) -> &[ServiceDescriptor] {
        &self.providers
    }
}

/// The per-contract slice of a [`ResolutionPlan`].
#[derive(Debug, Clone)]
pub struct ContractPlan {
    contract: TypeDescriptor,
    mode: ProviderMode,
    unnamed: Vec<ServiceDescriptor>,
    named: AMap<Arc<str>, ServiceDescriptor>,
}

impl ContractPlan {
    /// The contract this plan answers for.
    pub fn contract(&self) -> &TypeDescriptor {
        &self.contract
    }

    /// How unnamed providers satisfy consumption.
    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    /// Unnamed providers in collection order.
    pub fn unnamed_providers(&self) -> &[ServiceDescriptor] {
        &self.unnamed
    }

    /// The provider satisfying unqualified single-value resolution, if any.
    pub fn single(&self) -> Option<&ServiceDescriptor> {
        match self.mode {
            ProviderMode::Single => self.unnamed.first(),
            ProviderMode::Collection => None,
        }
    }

    /// The named provider registered under `id`, if any.
    pub fn named(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.named.get(id)
    }

    /// All named providers, in unspecified order.
    pub fn named_providers(&self) -> impl Iterator<Item = (&str, &ServiceDescriptor)> {
        self.named.iter().map(|(id, descriptor)| (&**id, descriptor))
    }

    /// Every provider of the contract: unnamed first, then named.
    pub(crate) fn all_providers(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.unnamed.iter().chain(self.named.values())
    }
}

/// The precomputed, per-contract decision of how `resolve*` calls are
/// satisfied.
///
/// Built once by [`ResolutionPlan::build`], immutable afterwards. Building
/// fails fast with every configuration defect aggregated: duplicate named
/// ids within one contract group, and dependencies with no possible
/// provider.
///
/// # Examples
///
/// ```rust
/// use forge_di::{Lifetime, ProviderMode, ResolutionPlan, ServiceDescriptor, TypeDescriptor};
///
/// let sink = TypeDescriptor::new("app.ISink");
///
/// let plan = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(sink.clone(), "app.FileSink", Lifetime::Singleton)
///         .with_module("storage"),
///     ServiceDescriptor::new(sink.clone(), "app.NetSink", Lifetime::Singleton)
///         .with_module("net"),
/// ]).unwrap();
///
/// let contract_plan = plan.contract_plan(&sink).unwrap();
/// assert_eq!(contract_plan.mode(), ProviderMode::Collection);
/// // Deterministic order: module name, then declaration order.
/// let order: Vec<_> = contract_plan
///     .unnamed_providers()
///     .iter()
///     .map(|p| p.implementation.name().to_string())
///     .collect();
/// assert_eq!(order, ["app.NetSink", "app.FileSink"]);
/// ```
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    contracts: AMap<TypeDescriptor, ContractPlan>,
}

impl ResolutionPlan {
    /// Groups, classifies, and validates a descriptor set.
    pub fn build(descriptors: Vec<ServiceDescriptor>) -> Result<Self, ConfigErrors> {
        Self::from_groups(ContractGroup::collect(descriptors))
    }

    /// Classifies pre-collected contract groups and validates the result.
    pub fn from_groups(groups: Vec<ContractGroup>) -> Result<Self, ConfigErrors> {
        let mut errors = Vec::new();
        let mut contracts: AMap<TypeDescriptor, ContractPlan> = AMap::default();

        for group in groups {
            let ContractGroup { contract, providers } = group;
            let mut unnamed = Vec::new();
            let mut named: AMap<Arc<str>, ServiceDescriptor> = AMap::default();

            for provider in providers {
                match provider.service_id.clone() {
                    None => unnamed.push(provider),
                    Some(id) => match named.entry(id) {
                        Entry::Vacant(entry) => {
                            entry.insert(provider);
                        }
                        Entry::Occupied(entry) => {
                            errors.push(ConfigError::DuplicateServiceId {
                                contract: contract.name().to_string(),
                                service_id: entry.key().to_string(),
                            });
                        }
                    },
                }
            }

            let mode = if unnamed.len() > 1 {
                ProviderMode::Collection
            } else {
                ProviderMode::Single
            };

            contracts.insert(
                contract.clone(),
                ContractPlan {
                    contract,
                    mode,
                    unnamed,
                    named,
                },
            );
        }

        // Every dependency of every provider must have at least one possible
        // provider, respecting the dependency's own service id. Deferred
        // dependencies are validated the same way: deferral delays
        // construction, not the fail-fast guarantee.
        for plan in contracts.values() {
            for provider in plan.all_providers() {
                for dependency in &provider.dependencies {
                    let satisfied = match contracts.get(&dependency.contract) {
                        None => false,
                        Some(target) => match dependency.service_id() {
                            Some(id) => target.named.contains_key(id),
                            None => !target.unnamed.is_empty(),
                        },
                    };
                    if !satisfied {
                        errors.push(ConfigError::MissingProvider {
                            dependent: provider.implementation.name().to_string(),
                            contract: dependency.contract.name().to_string(),
                            service_id: dependency.service_id().map(str::to_string),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(Self { contracts })
        } else {
            Err(ConfigErrors::new(errors))
        }
    }

    /// The plan for one contract, if any provider was discovered for it.
    pub fn contract_plan(&self, contract: &TypeDescriptor) -> Option<&ContractPlan> {
        self.contracts.get(contract)
    }

    /// All per-contract plans, in unspecified order.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractPlan> {
        self.contracts.values()
    }

    /// Number of contracts in the plan.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True when no contracts were discovered.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Every provider descriptor across all contracts.
    pub(crate) fn all_providers(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.contracts.values().flat_map(|plan| plan.all_providers())
    }
}
