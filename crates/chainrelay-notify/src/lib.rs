//! # chainrelay-notify
//!
//! Pure, synchronous batching and sorting of per-user notifications into
//! display groups. No I/O, no suspension points; always safe to run in
//! parallel over independent inputs.
//!
//! The algorithm is group-then-selectively-explode:
//!
//! 1. group by `(subscription_id, object_id)`, preserving insertion order
//!    within a group;
//! 2. explode a group back into singletons when any member is high salience
//!    (`new-comment` / `new-mention`) or carries a chain-event reference;
//! 3. sort the resulting groups ascending by the first member's `created_at`.
//!
//! Digestible categories collapse (ten reactions on one thread become one
//! line) while a reply naming you is never hidden inside a batch. The
//! explosion applies to the whole group even when only one member is high
//! salience; that observed behavior is kept as-is pending product
//! confirmation.

use std::hash::Hash;

use chainrelay_core::{Notification, Subscription};
use indexmap::IndexMap;

fn explodes(notification: &Notification) -> bool {
    notification.subscription.category.is_high_salience() || notification.chain_event_id.is_some()
}

/// Batch a flat notification list into ordered display groups.
pub fn batch(notifications: Vec<Notification>) -> Vec<Vec<Notification>> {
    let mut grouped: IndexMap<(i64, String), Vec<Notification>> = IndexMap::new();
    for notification in notifications {
        let key = (
            notification.subscription.id,
            notification.subscription.object_id.clone(),
        );
        grouped.entry(key).or_default().push(notification);
    }

    let mut groups: Vec<Vec<Notification>> = Vec::with_capacity(grouped.len());
    for (_, members) in grouped {
        if members.iter().any(explodes) {
            groups.extend(members.into_iter().map(|n| vec![n]));
        } else {
            groups.push(members);
        }
    }

    groups.sort_by_key(|group| group[0].created_at);
    groups
}

/// Group subscriptions by an arbitrary property for list rendering. No
/// sorting beyond the implicit grouping order.
pub fn sort_subscriptions<K, F>(subscriptions: Vec<Subscription>, key_fn: F) -> Vec<Vec<Subscription>>
where
    K: Eq + Hash,
    F: Fn(&Subscription) -> K,
{
    let mut grouped: IndexMap<K, Vec<Subscription>> = IndexMap::new();
    for sub in subscriptions {
        let key = key_fn(&sub);
        grouped.entry(key).or_default().push(sub);
    }
    grouped.into_values().collect()
}
