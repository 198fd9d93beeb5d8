//! Filtering and ordering of offers for display.

use tracing::debug;

use super::{Offer, RankCriteria, SortKey};

/// Filter and sort offers according to `criteria`.
///
/// Filters intersect: `direct_only` keeps direct offers, `max_stops` keeps
/// offers with at most that many stops. The sort is stable and ascending;
/// ties keep their incoming order and `sort: None` keeps the input order.
/// The input slice is left untouched.
pub fn rank(offers: &[Offer], criteria: &RankCriteria) -> Vec<Offer> {
    let mut ranked: Vec<Offer> = offers
        .iter()
        .filter(|offer| !criteria.direct_only || offer.is_direct())
        .filter(|offer| criteria.max_stops.is_none_or(|max| offer.stops <= max))
        .cloned()
        .collect();

    match criteria.sort {
        Some(SortKey::Price) => ranked.sort_by_key(|offer| offer.price),
        Some(SortKey::Duration) => ranked.sort_by_key(|offer| offer.duration_minutes),
        Some(SortKey::Departure) => ranked.sort_by_key(|offer| offer.departure),
        None => {}
    }

    debug!(
        input = offers.len(),
        output = ranked.len(),
        sort = criteria.sort.map(|k| k.as_str()).unwrap_or("none"),
        direct_only = criteria.direct_only,
        max_stops = ?criteria.max_stops,
        "Ranked offers"
    );

    ranked
}

/// Offers of one provider, in ranked order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGroup {
    pub provider_id: String,
    pub offers: Vec<Offer>,
}

/// Group ranked offers by provider.
///
/// Groups appear in the order their provider first shows up in `offers`;
/// within a group the ranked order is preserved.
pub fn group_by_provider(offers: &[Offer]) -> Vec<ProviderGroup> {
    let mut groups: Vec<ProviderGroup> = Vec::new();

    for offer in offers {
        match groups
            .iter_mut()
            .find(|group| group.provider_id == offer.provider_id)
        {
            Some(group) => group.offers.push(offer.clone()),
            None => groups.push(ProviderGroup {
                provider_id: offer.provider_id.clone(),
                offers: vec![offer.clone()],
            }),
        }
    }

    groups
}
