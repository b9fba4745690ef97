//! Subscription manager.
//!
//! A follower's subscriptions are replace-only: the caller declares the
//! full descriptor list it wants, the manager computes the diff against
//! the stored rows by `(type_base, view)` and applies it as one
//! transactional unit. Applying the same list twice is a no-op.

use std::collections::HashSet;

use lattice_types::type_uri::{TypeDescriptor, TypeUri};

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct SubscriptionDiff {
	pub added: Vec<TypeDescriptor>,
	pub removed: Vec<TypeDescriptor>,
}

impl SubscriptionDiff {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

/// Replace a follower's subscription set with `descriptors`.
///
/// Rows matching a requested descriptor are left untouched, rows present
/// only in storage are destroyed, descriptors present only in the request
/// are created. The whole diff is applied atomically; on failure nothing
/// changes and the error is reported.
pub async fn set_subscriptions(
	app: &App,
	follower_id: i64,
	descriptors: &[TypeDescriptor],
) -> LtResult<SubscriptionDiff> {
	let current = app.meta_adapter.list_subscriptions(follower_id).await?;

	// Dedup the request by (base, view); the first occurrence wins
	let mut seen: HashSet<(&str, View)> = HashSet::new();
	let requested: Vec<&TypeDescriptor> = descriptors
		.iter()
		.filter(|d| seen.insert((d.uri.base.as_ref(), d.view)))
		.collect();

	let mut remove_ids = Vec::new();
	let mut removed = Vec::new();
	for sub in &current {
		let keep = requested
			.iter()
			.any(|d| d.uri.base.as_ref() == sub.type_base.as_ref() && d.view == sub.view);
		if !keep {
			remove_ids.push(sub.subscription_id);
			removed.push(TypeDescriptor {
				uri: TypeUri { base: sub.type_base.clone(), version: sub.type_version.clone() },
				view: sub.view,
			});
		}
	}

	let added: Vec<TypeDescriptor> = requested
		.iter()
		.filter(|d| {
			!current
				.iter()
				.any(|s| s.type_base.as_ref() == d.uri.base.as_ref() && s.view == d.view)
		})
		.map(|d| (*d).clone())
		.collect();

	if !remove_ids.is_empty() || !added.is_empty() {
		app.meta_adapter.replace_subscriptions(follower_id, &remove_ids, &added).await?;
		debug!(
			"Subscriptions for follower {} updated: +{} -{}",
			follower_id,
			added.len(),
			removed.len()
		);
	}

	Ok(SubscriptionDiff { added, removed })
}

// vim: ts=4
