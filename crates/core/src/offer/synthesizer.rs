//! Mock offer synthesis.
//!
//! Offers are drawn from a caller-supplied random source. The server passes
//! an OS-seeded generator; tests pass a seeded `StdRng`.

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Mode, Offer, RouteKind};

const FLIGHT_CARRIERS: &[&str] = &[
    "Air India",
    "IndiGo",
    "SpiceJet",
    "Vistara",
    "AirAsia India",
    "United Airlines",
    "Delta",
    "American Airlines",
    "British Airways",
    "Lufthansa",
    "Air France",
    "Emirates",
    "Qatar Airways",
    "Singapore Airlines",
];

const TRAIN_CARRIERS: &[&str] = &[
    "Eurostar",
    "SNCF",
    "Deutsche Bahn",
    "Trenitalia",
    "Renfe",
    "Amtrak",
];

const BOOKING_REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const BOOKING_REFERENCE_LEN: usize = 6;
const LAST_HOUR_OF_DAY: u32 = 23;

/// Mode-specific generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    /// Price every offer starts from.
    pub base_price: u32,
    /// Shortest duration in minutes (inclusive).
    pub min_duration_minutes: u32,
    /// Longest duration in minutes (exclusive).
    pub max_duration_minutes: u32,
    /// Carriers offers are attributed to.
    pub carriers: &'static [&'static str],
}

impl ModeProfile {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Flight => Self {
                base_price: 3500,
                min_duration_minutes: 300,
                max_duration_minutes: 660,
                carriers: FLIGHT_CARRIERS,
            },
            Mode::Train => Self {
                base_price: 800,
                min_duration_minutes: 180,
                max_duration_minutes: 480,
                carriers: TRAIN_CARRIERS,
            },
        }
    }
}

/// Tunable constants of the mock generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisPolicy {
    /// Fewest offers generated per provider.
    pub min_offers_per_provider: u32,
    /// Most offers generated per provider.
    pub max_offers_per_provider: u32,
    /// Hour of the first departure of each provider.
    pub first_departure_hour: u32,
    /// Hours between consecutive departures of one provider.
    pub departure_spacing_hours: u32,
    /// Largest random delay added to a departure hour (inclusive).
    pub max_departure_jitter_hours: u32,
    /// Probability that an offer is direct.
    pub direct_probability: f64,
    /// Stop count of a connecting offer.
    pub connecting_stops: u8,
    /// Random markup added to the base price (exclusive upper bound).
    pub max_markup: u32,
    /// Surcharge per intermediate stop.
    pub stop_surcharge: u32,
    /// Added per position of the provider in the request.
    pub provider_position_increment: u32,
    /// Currency code stamped on every offer.
    pub currency: String,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            min_offers_per_provider: 2,
            max_offers_per_provider: 4,
            first_departure_hour: 6,
            departure_spacing_hours: 4,
            max_departure_jitter_hours: 2,
            direct_probability: 0.6,
            connecting_stops: 1,
            max_markup: 8000,
            stop_surcharge: 500,
            provider_position_increment: 150,
            currency: "INR".to_string(),
        }
    }
}

impl SynthesisPolicy {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Latest hour of day an offer can depart at.
    pub fn latest_departure_hour(&self) -> u64 {
        u64::from(self.first_departure_hour)
            + u64::from(self.max_offers_per_provider.saturating_sub(1))
                * u64::from(self.departure_spacing_hours)
            + u64::from(self.max_departure_jitter_hours)
    }

    /// Highest price an offer of `mode` can get when `providers` take part.
    pub fn max_price(&self, mode: Mode, providers: usize) -> u64 {
        let stops = if self.direct_probability < 1.0 {
            u64::from(self.connecting_stops.max(1))
        } else {
            0
        };
        u64::from(ModeProfile::for_mode(mode).base_price)
            + u64::from(self.max_markup.saturating_sub(1))
            + u64::from(self.stop_surcharge) * stops
            + u64::from(self.provider_position_increment)
                * providers.saturating_sub(1) as u64
    }
}

/// Synthesize offers for a search using the default policy.
///
/// Each provider gets between two and four offers. The result is sorted by
/// ascending price. An empty provider list yields an empty result.
pub fn synthesize<R: Rng + ?Sized>(
    search_id: &str,
    provider_ids: &[String],
    mode: Mode,
    departure_date: NaiveDate,
    rng: &mut R,
) -> Vec<Offer> {
    synthesize_with_policy(
        search_id,
        provider_ids,
        mode,
        departure_date,
        &SynthesisPolicy::default(),
        rng,
    )
}

/// Synthesize offers with explicit generation constants.
pub fn synthesize_with_policy<R: Rng + ?Sized>(
    search_id: &str,
    provider_ids: &[String],
    mode: Mode,
    departure_date: NaiveDate,
    policy: &SynthesisPolicy,
    rng: &mut R,
) -> Vec<Offer> {
    let profile = ModeProfile::for_mode(mode);
    let midnight = departure_date.and_time(NaiveTime::MIN).and_utc();
    let mut offers = Vec::new();

    for (position, provider_id) in provider_ids.iter().enumerate() {
        let count = uniform_inclusive(
            rng,
            policy.min_offers_per_provider,
            policy.max_offers_per_provider,
        );

        for index in 0..count {
            // Never past the last hour of the departure date.
            let hour = policy
                .first_departure_hour
                .saturating_add(index.saturating_mul(policy.departure_spacing_hours))
                .saturating_add(uniform_inclusive(rng, 0, policy.max_departure_jitter_hours))
                .min(LAST_HOUR_OF_DAY);
            let minute = rng.random_range(0..60u32);
            let departure = midnight
                + Duration::hours(i64::from(hour))
                + Duration::minutes(i64::from(minute));

            let duration_minutes = uniform_exclusive(
                rng,
                profile.min_duration_minutes,
                profile.max_duration_minutes,
            );
            let arrival = departure + Duration::minutes(i64::from(duration_minutes));

            let stops = if rng.random_bool(policy.direct_probability.clamp(0.0, 1.0)) {
                0
            } else {
                policy.connecting_stops.max(1)
            };

            let position = u32::try_from(position).unwrap_or(u32::MAX);
            let price = profile
                .base_price
                .saturating_add(uniform_exclusive(rng, 0, policy.max_markup))
                .saturating_add(policy.stop_surcharge.saturating_mul(u32::from(stops)))
                .saturating_add(policy.provider_position_increment.saturating_mul(position));

            let carrier = profile
                .carriers
                .choose(rng)
                .copied()
                .unwrap_or_default()
                .to_string();

            offers.push(Offer {
                id: format!("{}-{}-{}", search_id, provider_id, index),
                search_id: search_id.to_string(),
                provider_id: provider_id.clone(),
                route_kind: RouteKind::from_stops(stops),
                departure,
                arrival,
                duration_minutes,
                price,
                currency: policy.currency.clone(),
                stops,
                carrier,
                booking_reference: booking_reference(rng),
            });
        }
    }

    // Stable: equal prices keep provider/generation order.
    offers.sort_by_key(|offer| offer.price);

    debug!(
        search_id,
        mode = %mode,
        providers = provider_ids.len(),
        offers = offers.len(),
        "Synthesized offers"
    );

    offers
}

fn uniform_inclusive<R: Rng + ?Sized>(rng: &mut R, low: u32, high: u32) -> u32 {
    if high <= low {
        low
    } else {
        rng.random_range(low..=high)
    }
}

fn uniform_exclusive<R: Rng + ?Sized>(rng: &mut R, low: u32, high: u32) -> u32 {
    if high <= low {
        low
    } else {
        rng.random_range(low..high)
    }
}

fn booking_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..BOOKING_REFERENCE_LEN)
        .map(|_| {
            let i = rng.random_range(0..BOOKING_REFERENCE_ALPHABET.len());
            BOOKING_REFERENCE_ALPHABET[i] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_providers_yield_no_offers() {
        let mut rng = StdRng::seed_from_u64(1);
        let offers = synthesize("s1", &[], Mode::Flight, date(), &mut rng);
        assert!(offers.is_empty());
    }

    #[test]
    fn test_single_flight_provider() {
        let mut rng = StdRng::seed_from_u64(7);
        let offers = synthesize("s1", &ids(&["p1"]), Mode::Flight, date(), &mut rng);

        assert!((2..=4).contains(&offers.len()));
        for offer in &offers {
            assert_eq!(offer.provider_id, "p1");
            assert_eq!(offer.search_id, "s1");
            assert_eq!(offer.currency, "INR");
            assert!((300..660).contains(&offer.duration_minutes));
            assert_eq!(offer.departure.date_naive(), date());
            assert!(FLIGHT_CARRIERS.contains(&offer.carrier.as_str()));
        }
    }

    #[test]
    fn test_offer_count_bounds_per_provider() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let providers = ids(&["a", "b", "c"]);
            let offers = synthesize("s", &providers, Mode::Train, date(), &mut rng);
            assert!(offers.len() >= 6 && offers.len() <= 12, "seed {}", seed);
            for provider in &providers {
                let n = offers.iter().filter(|o| &o.provider_id == provider).count();
                assert!((2..=4).contains(&n), "seed {} provider {}", seed, provider);
            }
        }
    }

    #[test]
    fn test_offers_are_consistent() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let offers = synthesize("s", &ids(&["a", "b"]), Mode::Flight, date(), &mut rng);
            for offer in &offers {
                assert!(offer.is_consistent(), "seed {}: {:?}", seed, offer);
                assert!(offer.stops <= 1);
                assert!(offer.price > 0);
            }
        }
    }

    #[test]
    fn test_sorted_by_price() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let providers = ids(&["a", "b", "c", "d"]);
            let offers = synthesize("s", &providers, Mode::Flight, date(), &mut rng);
            assert!(offers.windows(2).all(|w| w[0].price <= w[1].price));
        }
    }

    #[test]
    fn test_train_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let offers = synthesize("s", &ids(&["rail"]), Mode::Train, date(), &mut rng);
        for offer in &offers {
            assert!((180..480).contains(&offer.duration_minutes));
            assert!(offer.price >= 800);
            assert!(TRAIN_CARRIERS.contains(&offer.carrier.as_str()));
        }
    }

    #[test]
    fn test_departure_hours_follow_spacing() {
        let mut rng = StdRng::seed_from_u64(11);
        let offers = synthesize("s", &ids(&["p"]), Mode::Flight, date(), &mut rng);
        for offer in &offers {
            let index: u32 = offer.id.rsplit('-').next().unwrap().parse().unwrap();
            let hour = offer.departure.format("%H").to_string().parse::<u32>().unwrap();
            let earliest = 6 + index * 4;
            assert!(hour >= earliest && hour <= earliest + 2, "{:?}", offer);
        }
    }

    #[test]
    fn test_same_seed_same_offers() {
        let providers = ids(&["a", "b"]);
        let mut rng = StdRng::seed_from_u64(42);
        let first = synthesize("s", &providers, Mode::Flight, date(), &mut rng);
        let mut rng = StdRng::seed_from_u64(42);
        let second = synthesize("s", &providers, Mode::Flight, date(), &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_unique_within_search() {
        let mut rng = StdRng::seed_from_u64(5);
        let offers = synthesize("s", &ids(&["a", "b", "c"]), Mode::Train, date(), &mut rng);
        let mut seen: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), offers.len());
    }

    #[test]
    fn test_booking_reference_shape() {
        let mut rng = StdRng::seed_from_u64(9);
        let offers = synthesize("s", &ids(&["a"]), Mode::Flight, date(), &mut rng);
        for offer in &offers {
            assert_eq!(offer.booking_reference.len(), 6);
            assert!(offer
                .booking_reference
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_policy_fixed_price_components() {
        // No markup and fixed counts make prices predictable.
        let policy = SynthesisPolicy {
            min_offers_per_provider: 2,
            max_offers_per_provider: 2,
            max_markup: 0,
            direct_probability: 1.0,
            ..SynthesisPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let offers = synthesize_with_policy(
            "s",
            &ids(&["first", "second"]),
            Mode::Flight,
            date(),
            &policy,
            &mut rng,
        );

        assert_eq!(offers.len(), 4);
        let first: Vec<u32> = offers
            .iter()
            .filter(|o| o.provider_id == "first")
            .map(|o| o.price)
            .collect();
        let second: Vec<u32> = offers
            .iter()
            .filter(|o| o.provider_id == "second")
            .map(|o| o.price)
            .collect();
        assert_eq!(first, vec![3500, 3500]);
        assert_eq!(second, vec![3650, 3650]);
        assert!(offers.iter().all(|o| o.is_direct()));
    }

    #[test]
    fn test_connecting_offers_pay_surcharge() {
        let policy = SynthesisPolicy {
            max_markup: 0,
            direct_probability: 0.0,
            ..SynthesisPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let offers =
            synthesize_with_policy("s", &ids(&["p"]), Mode::Train, date(), &policy, &mut rng);

        assert!(!offers.is_empty());
        for offer in &offers {
            assert_eq!(offer.stops, 1);
            assert_eq!(offer.route_kind, RouteKind::Connecting);
            assert_eq!(offer.price, 800 + 500);
        }
    }

    #[test]
    fn test_departures_stay_on_departure_date() {
        let policy = SynthesisPolicy {
            min_offers_per_provider: 6,
            max_offers_per_provider: 6,
            ..SynthesisPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let offers =
            synthesize_with_policy("s", &ids(&["p"]), Mode::Flight, date(), &policy, &mut rng);

        assert_eq!(offers.len(), 6);
        for offer in &offers {
            assert_eq!(offer.departure.date_naive(), date(), "{:?}", offer);
        }
    }

    #[test]
    fn test_extreme_price_terms_saturate() {
        let policy = SynthesisPolicy {
            provider_position_increment: u32::MAX,
            stop_surcharge: u32::MAX,
            connecting_stops: u8::MAX,
            ..SynthesisPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let offers = synthesize_with_policy(
            "s",
            &ids(&["first", "second"]),
            Mode::Flight,
            date(),
            &policy,
            &mut rng,
        );

        assert!(offers
            .iter()
            .filter(|o| o.provider_id == "second")
            .all(|o| o.price == u32::MAX));
    }

    #[test]
    fn test_policy_bounds() {
        let policy = SynthesisPolicy::default();
        assert_eq!(policy.latest_departure_hour(), 6 + 3 * 4 + 2);
        assert_eq!(policy.max_price(Mode::Flight, 3), 3500 + 7999 + 500 + 300);
        assert_eq!(policy.max_price(Mode::Train, 1), 800 + 7999 + 500);

        let always_direct = SynthesisPolicy {
            direct_probability: 1.0,
            ..SynthesisPolicy::default()
        };
        assert_eq!(always_direct.max_price(Mode::Train, 1), 800 + 7999);
    }

    #[test]
    fn test_custom_currency() {
        let policy = SynthesisPolicy::default().with_currency("EUR");
        let mut rng = StdRng::seed_from_u64(2);
        let offers =
            synthesize_with_policy("s", &ids(&["p"]), Mode::Train, date(), &policy, &mut rng);
        assert!(offers.iter().all(|o| o.currency == "EUR"));
    }
}
