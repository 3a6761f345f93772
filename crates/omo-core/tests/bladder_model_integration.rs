//! Integration tests for the bladder model.

use omo_core::{BladderModel, HistoryEvent, Intake, Voiding};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

const H: f64 = 45.0;

fn voiding(time: f64, amount: f64, by_permission: bool) -> HistoryEvent {
    HistoryEvent::from(Voiding {
        time,
        amount,
        by_permission,
    })
}

#[test]
fn test_single_drink_converges() {
    let mut model = BladderModel::new();
    model.add_intake(12.0, 600.0);

    assert_eq!(model.absorbed(12.0), 0.0);
    assert_eq!(model.bladder_content(12.0), 0.0);
    assert!((model.absorbed(12.0 + 10.0 * H) - 600.0).abs() < 1.0);
    assert!((model.bladder_content(12.0 + 30.0 * H) - 600.0).abs() < 1e-6);
}

#[test]
fn test_permitted_voiding_records_absorbed_amount() {
    let mut model = BladderModel::new();
    model.add_intake(0.0, 300.0);
    let before = model.bladder_content(10.0);
    let voiding = model.add_voiding(10.0, true);

    assert_eq!(voiding.amount, before);
    assert!((voiding.amount - (300.0 - 2f64.powf(-10.0 / H) * 300.0)).abs() < 1e-9);
    assert_eq!(model.releases().count(), 1);
    assert_eq!(model.accidents().count(), 0);
    assert_eq!(model.capacity(), 500.0);
}

#[test]
fn test_two_accidents_average_capacity() {
    let mut model = BladderModel::new();
    model.set_history(vec![
        voiding(200.0, 600.0, false),
        HistoryEvent::from(Intake::new(0.0, 1500.0)),
        voiding(100.0, 400.0, false),
    ]);

    assert_eq!(model.capacity(), 500.0);
    let times: Vec<f64> = model.history().iter().map(HistoryEvent::time).collect();
    assert_eq!(times, vec![0.0, 100.0, 200.0]);
    assert_eq!(model.accident_amounts(), vec![400.0, 600.0]);
}

#[test]
fn test_full_hold_day() {
    let mut model = BladderModel::new();
    let mut rng = Pcg64::seed_from_u64(2024);

    model.add_intake(0.0, 500.0);
    model.add_intake(30.0, 500.0);
    assert!(model.permission_allowed(30.0));

    let eta = model.estimated_time_to_emergency(30.0).expect("over capacity");
    assert!(eta > 30.0);
    assert!((model.bladder_content(eta) - 500.0).abs() < 1e-6);

    model.roll_for_permission(40.0, &mut rng);
    assert!(!model.permission_allowed(40.0));

    // Accident when the bladder is exactly at the predicted emergency.
    let accident = model.add_voiding(eta, false);
    assert!((accident.amount - 500.0).abs() < 1e-6);
    assert!((model.capacity() - 500.0).abs() < 1e-6);
    assert!(model.bladder_content(eta).abs() < 1e-6);
    assert_eq!(model.accidents().count(), 1);
}

#[test]
fn test_new_drink_supersedes_eta() {
    let mut model = BladderModel::new();
    model.add_intake(0.0, 800.0);
    let first = model.estimated_time_to_emergency(0.0).unwrap();
    model.add_intake(10.0, 400.0);
    let second = model.estimated_time_to_emergency(10.0).unwrap();
    assert!(second < first);
    assert!((model.bladder_content(second) - 500.0).abs() < 1e-6);
}

#[test]
fn test_prior_accidents_reset() {
    let mut model = BladderModel::new();
    model.set_prior_accidents(vec![250.0, 350.0]);
    assert_eq!(model.capacity(), 300.0);
    model.clear_prior_accidents();
    assert_eq!(model.capacity(), 500.0);
}

fn drinks_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    proptest::collection::vec((0.0f64..600.0, 1.0f64..1500.0), 1..8)
}

proptest! {
    #[test]
    fn capacity_is_always_positive(
        session in proptest::collection::vec(0.0f64..2000.0, 0..6),
        prior in proptest::collection::vec(0.0f64..2000.0, 0..6),
    ) {
        let mut model = BladderModel::new();
        model.set_history(
            session
                .iter()
                .enumerate()
                .map(|(i, &amount)| voiding(i as f64, amount, false))
                .collect(),
        );
        model.set_prior_accidents(prior);
        prop_assert!(model.capacity() > 0.0);
    }

    #[test]
    fn absorbed_never_decreases(
        drinks in drinks_strategy(),
        t in 0.0f64..900.0,
        dt in 0.0f64..300.0,
    ) {
        let mut model = BladderModel::new();
        for (time, amount) in &drinks {
            model.add_intake(*time, *amount);
        }
        prop_assert!(model.absorbed(t + dt) >= model.absorbed(t) - 1e-7);
    }

    #[test]
    fn fullness_never_exceeds_one(drinks in drinks_strategy(), t in 0.0f64..2000.0) {
        let mut model = BladderModel::new();
        for (time, amount) in &drinks {
            model.add_intake(*time, *amount);
        }
        let fullness = model.fullness_fraction(t);
        prop_assert!(fullness <= 1.0);
        if model.bladder_content(t) >= model.capacity() {
            prop_assert_eq!(fullness, 1.0);
        }
    }

    #[test]
    fn eta_reaches_capacity(drinks in drinks_strategy()) {
        let mut model = BladderModel::new();
        for (time, amount) in &drinks {
            model.add_intake(*time, *amount);
        }
        let total: f64 = drinks.iter().map(|(_, a)| a).sum();
        let last = drinks.iter().map(|(t, _)| *t).fold(f64::MIN, f64::max);
        let eta = model.estimated_time_to_emergency(last);

        if total <= model.capacity() {
            prop_assert!(eta.is_none());
        } else {
            let eta = eta.unwrap();
            if model.bladder_content(last) < model.capacity() {
                prop_assert!(eta > last);
            }
            if eta >= last {
                let content = model.bladder_content(eta);
                prop_assert!((content - model.capacity()).abs() < 1e-6 * total.max(1.0));
            }
        }
    }

    #[test]
    fn permission_closes_after_roll(drinks in drinks_strategy(), seed in any::<u64>()) {
        let mut model = BladderModel::new();
        for (time, amount) in &drinks {
            model.add_intake(*time, *amount);
        }
        let mut rng = Pcg64::seed_from_u64(seed);
        prop_assert!(model.permission_allowed(0.0));
        model.roll_for_permission(100.0, &mut rng);
        prop_assert!(!model.permission_allowed(100.0));
    }
}
