//! Spec-to-resource matching and upgrade.
//!
//! Turns an ordered list of desired specs and an ordered list of observed
//! resources into the minimal create/update/delete set, addressing both
//! sides purely by position in their sequences.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Operations an upgrade works through.
///
/// Specs and resources are addressed by index into their caller-defined
/// ordered sequences; the toolkit never inspects either record directly.
///
/// `spec_belongs_to_resource` is assumed to describe a one-to-one
/// relation. The scan takes the first matching resource per spec and does
/// not verify injectivity: with a non-injective predicate a single
/// resource can end up recorded as the match of several specs, and only
/// the last of those specs keeps the reverse mapping.
#[async_trait]
pub trait UpgradeStrategy: Send {
    /// Number of observed resources.
    fn resource_len(&self) -> usize;

    /// Number of desired specs.
    fn spec_len(&self) -> usize;

    /// Whether `spec` describes the desired state of `resource`.
    fn spec_belongs_to_resource(&self, spec: usize, resource: usize) -> bool;

    /// Whether `resource` has drifted from `spec`.
    fn resource_needs_update(&self, resource: usize, spec: usize) -> bool;

    /// Create the resource described by `spec`.
    async fn create_resource(&mut self, spec: usize) -> Result<()>;

    /// Bring `resource` up to date with `spec`.
    async fn update_resource(&mut self, resource: usize, spec: usize) -> Result<()>;

    /// Remove `resource`.
    async fn delete_resource(&mut self, resource: usize) -> Result<()>;
}

/// Upgrade resources according to the provided specifications and prune
/// resources no longer found among them.
///
/// Updates and creates are issued in ascending spec order, then deletes in
/// ascending resource order. The first callback error aborts the whole
/// operation and is returned unmodified; actions already applied are not
/// rolled back, so strategies must tolerate re-running from scratch.
pub async fn upgrade<S: UpgradeStrategy + ?Sized>(strategy: &mut S) -> Result<()> {
    let mut spec_to_resource: Vec<Option<usize>> = vec![None; strategy.spec_len()];
    let mut resource_to_spec: Vec<Option<usize>> = vec![None; strategy.resource_len()];

    for spec in 0..strategy.spec_len() {
        for resource in 0..strategy.resource_len() {
            if strategy.spec_belongs_to_resource(spec, resource) {
                spec_to_resource[spec] = Some(resource);
                resource_to_spec[resource] = Some(spec);
                break;
            }
        }
    }

    for spec in 0..strategy.spec_len() {
        match spec_to_resource[spec] {
            Some(resource) => {
                if strategy.resource_needs_update(resource, spec) {
                    debug!(resource, spec, "Updating resource");
                    strategy.update_resource(resource, spec).await?;
                }
            }
            None => {
                debug!(spec, "Creating resource");
                strategy.create_resource(spec).await?;
            }
        }
    }

    for resource in 0..strategy.resource_len() {
        if resource_to_spec[resource].is_none() {
            debug!(resource, "Deleting resource");
            strategy.delete_resource(resource).await?;
        }
    }

    Ok(())
}
