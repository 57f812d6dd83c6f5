//! Predefined navigation sequences for the arena screens

use super::types::{Sequence, SequenceStep};

pub const ARENA_NAVIGATION: &str = "arena-navigation";
pub const ARENA_FIGHT: &str = "arena-fight";
pub const TOKEN_REFILL: &str = "token-refill";
pub const FREE_REFRESH: &str = "free-refresh";
pub const PAY_REFRESH: &str = "pay-refresh";

/// Names accepted by [`predefined`]
pub const PREDEFINED_SEQUENCES: &[&str] = &[
    ARENA_NAVIGATION,
    ARENA_FIGHT,
    TOKEN_REFILL,
    FREE_REFRESH,
    PAY_REFRESH,
];

/// Gap in pixels between the token counter and its "+" button
const TOKEN_PLUS_GAP: i32 = 20;

/// Home screen -> Battle -> Arena -> Classic Arena
pub fn arena_navigation() -> Sequence {
    Sequence::new(
        ARENA_NAVIGATION,
        vec![
            SequenceStep::click("Battle").with_max_wait_secs(5.0),
            SequenceStep::click("Arena").with_max_wait_secs(5.0),
            SequenceStep::click("Classic Arena").with_max_wait_secs(5.0),
        ],
    )
}

/// Start a prepared fight, wait for it to finish and return to the opponent list
pub fn arena_fight() -> Sequence {
    Sequence::new(
        ARENA_FIGHT,
        vec![
            SequenceStep::click("Start Fight").with_post_click_delay_secs(1.0),
            SequenceStep::click("Battle Complete")
                .with_max_wait_secs(120.0)
                .with_poll_interval_secs(3.0)
                .with_post_click_delay_secs(1.0),
            // Five looks, one second apart
            SequenceStep::click("Return Arena")
                .with_max_wait_secs(4.0)
                .with_poll_interval_secs(1.0)
                .with_post_click_delay_secs(1.5),
        ],
    )
}

/// Open the token popup from an empty counter and take the free tokens
///
/// "Empty Atokens" needs a near-exact match: 0/10 and 9/10 differ by a single
/// glyph. The "+" button sits left of the counter. Fails at the second step
/// when no free tokens are offered; closing the popup is left to the caller.
pub fn token_refill() -> Sequence {
    Sequence::new(
        TOKEN_REFILL,
        vec![
            SequenceStep::click_left_of("Empty Atokens", TOKEN_PLUS_GAP)
                .with_threshold(0.98)
                .with_max_wait_secs(0.0)
                .with_post_click_delay_secs(1.5),
            SequenceStep::click("Free Atokens")
                .with_max_wait_secs(1.0)
                .with_post_click_delay_secs(2.0),
        ],
    )
}

/// Refresh the opponent list with the free button
pub fn free_refresh() -> Sequence {
    Sequence::new(
        FREE_REFRESH,
        vec![
            SequenceStep::click("Free Refresh")
                .with_max_wait_secs(0.0)
                .with_post_click_delay_secs(2.0),
        ],
    )
}

/// Refresh the opponent list with the paid button
pub fn pay_refresh() -> Sequence {
    Sequence::new(
        PAY_REFRESH,
        vec![
            SequenceStep::click("Pay Refresh")
                .with_max_wait_secs(0.0)
                .with_post_click_delay_secs(2.0),
        ],
    )
}

/// Look up a predefined sequence by name
pub fn predefined(name: &str) -> Option<Sequence> {
    match name {
        ARENA_NAVIGATION => Some(arena_navigation()),
        ARENA_FIGHT => Some(arena_fight()),
        TOKEN_REFILL => Some(token_refill()),
        FREE_REFRESH => Some(free_refresh()),
        PAY_REFRESH => Some(pay_refresh()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_automation::types::StepAction;
    use std::time::Duration;

    #[test]
    fn test_every_listed_name_resolves() {
        for name in PREDEFINED_SEQUENCES {
            let sequence = predefined(name).unwrap();
            assert_eq!(sequence.name, *name);
            assert!(!sequence.steps.is_empty());
        }
        assert!(predefined("Arena Navigation").is_none());
    }

    #[test]
    fn test_arena_navigation_order() {
        let sequence = arena_navigation();
        assert_eq!(
            sequence.template_names(),
            vec!["Battle", "Arena", "Classic Arena"]
        );
    }

    #[test]
    fn test_battle_complete_waits_long() {
        let sequence = arena_fight();
        let step = &sequence.steps[1];
        assert_eq!(step.template_name, "Battle Complete");
        assert_eq!(step.max_wait, Duration::from_secs(120));
        assert_eq!(step.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_return_arena_gets_five_looks() {
        let step = &arena_fight().steps[2];
        assert_eq!(step.template_name, "Return Arena");
        let looks = step.max_wait.as_millis() / step.poll_interval.as_millis() + 1;
        assert_eq!(looks, 5);
    }

    #[test]
    fn test_token_refill_clicks_plus_left_of_counter() {
        let sequence = token_refill();
        assert_eq!(sequence.template_names(), vec!["Empty Atokens", "Free Atokens"]);
        let counter = &sequence.steps[0];
        assert_eq!(counter.action, StepAction::ClickLeftOf { gap: 20 });
        assert_eq!(counter.threshold, Some(0.98));
        assert_eq!(counter.max_wait, Duration::ZERO);
    }

    #[test]
    fn test_refresh_sequences_are_single_look() {
        for (sequence, template) in [(free_refresh(), "Free Refresh"), (pay_refresh(), "Pay Refresh")] {
            assert_eq!(sequence.template_names(), vec![template]);
            assert_eq!(sequence.steps[0].max_wait, Duration::ZERO);
            assert_eq!(sequence.steps[0].post_click_delay, Some(Duration::from_secs(2)));
        }
    }
}
