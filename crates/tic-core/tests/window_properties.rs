//! # Validity Window Properties
//!
//! Property tests over `ValidityWindow`'s half-open semantics and
//! remaining-days arithmetic across arbitrary instants.

use proptest::prelude::*;
use tic_core::{Timestamp, ValidityWindow};

/// Epoch seconds between 2000-01-01 and 2100-01-01.
fn epoch_secs() -> impl Strategy<Value = i64> {
    946_684_800i64..4_102_444_800i64
}

fn window() -> impl Strategy<Value = ValidityWindow> {
    (epoch_secs(), 1i64..(20 * 365 * 86_400)).prop_map(|(from, len)| {
        let from_ts = Timestamp::from_epoch_secs(from).unwrap();
        let to_ts = Timestamp::from_epoch_secs(from + len).unwrap();
        ValidityWindow::new(from_ts, to_ts).unwrap()
    })
}

proptest! {
    /// The start instant is inside, the end instant is not.
    #[test]
    fn window_bounds_are_half_open(w in window()) {
        prop_assert!(w.contains(w.valid_from()));
        prop_assert!(!w.contains(w.valid_to()));
    }

    /// Remaining days never increase as time moves forward.
    #[test]
    fn remaining_days_non_increasing(w in window(), a in epoch_secs(), b in epoch_secs()) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let early = Timestamp::from_epoch_secs(early).unwrap();
        let late = Timestamp::from_epoch_secs(late).unwrap();
        prop_assert!(w.remaining_days(early) >= w.remaining_days(late));
    }

    /// Remaining days are zero once the window has ended, never negative.
    #[test]
    fn remaining_days_zero_after_end(w in window(), extra in 0i64..(10 * 365 * 86_400)) {
        let after = Timestamp::from_epoch_secs(w.valid_to().epoch_secs() + extra).unwrap();
        prop_assert_eq!(w.remaining_days(after), 0);
    }

    #[test]
    fn remaining_days_never_negative(w in window(), now in epoch_secs()) {
        let now = Timestamp::from_epoch_secs(now).unwrap();
        prop_assert!(w.remaining_days(now) >= 0);
    }

    /// Inverted or empty windows are always rejected.
    #[test]
    fn inverted_windows_rejected(a in epoch_secs(), b in epoch_secs()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = Timestamp::from_epoch_secs(lo).unwrap();
        let hi = Timestamp::from_epoch_secs(hi).unwrap();
        prop_assert!(ValidityWindow::new(hi, lo).is_err());
        prop_assert!(ValidityWindow::new(lo, lo).is_err());
    }
}
