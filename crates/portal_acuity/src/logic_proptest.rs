#[cfg(test)]
mod tests {
    use crate::logic::{normalize_dates, normalize_times};
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn date_strategy() -> impl Strategy<Value = String> {
        (2020u32..2030, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
    }

    fn slot_strategy() -> impl Strategy<Value = String> {
        (0u32..24, prop_oneof![Just(0u32), Just(30u32)])
            .prop_map(|(h, m)| format!("2024-03-05T{:02}:{:02}:00-0600", h, m))
    }

    proptest! {
        // All provider shapes carry the same information
        #[test]
        fn date_shapes_agree(dates in prop::collection::vec(date_strategy(), 0..40)) {
            let bare = json!(dates);
            let objects = Value::Array(dates.iter().map(|d| json!({"date": d})).collect());
            let wrapped = json!({"dates": bare.clone()});
            let wrapped_objects = json!({"data": objects.clone()});

            let canonical = normalize_dates(bare).unwrap();
            prop_assert_eq!(&normalize_dates(objects).unwrap(), &canonical);
            prop_assert_eq!(&normalize_dates(wrapped).unwrap(), &canonical);
            prop_assert_eq!(&normalize_dates(wrapped_objects).unwrap(), &canonical);
        }

        // Only available entries, never a repeated date
        #[test]
        fn dates_are_available_and_unique(dates in prop::collection::vec(date_strategy(), 0..60)) {
            let normalized = normalize_dates(json!(dates)).unwrap();
            let mut seen = HashSet::new();
            for entry in &normalized {
                prop_assert!(entry.available);
                prop_assert!(seen.insert(entry.date.clone()));
            }
            let distinct: HashSet<_> = dates.iter().cloned().collect();
            prop_assert_eq!(normalized.len(), distinct.len());
        }

        #[test]
        fn time_shapes_agree(slots in prop::collection::vec(slot_strategy(), 0..30)) {
            let bare = json!(slots);
            let objects = Value::Array(slots.iter().map(|s| json!({"datetime": s})).collect());
            let acuity = Value::Array(
                slots.iter().map(|s| json!({"time": s, "slotsAvailable": 1})).collect(),
            );
            let wrapped = json!({"times": objects.clone()});

            let canonical = normalize_times(bare).unwrap();
            prop_assert_eq!(&normalize_times(objects).unwrap(), &canonical);
            prop_assert_eq!(&normalize_times(acuity).unwrap(), &canonical);
            prop_assert_eq!(&normalize_times(wrapped).unwrap(), &canonical);
        }
    }
}
