//! End-to-end behaviour of one carousel: synchronization, exclusivity,
//! loop mapping, degradation, and spacer sizing.

mod support;

use slidesync_core::config::Effect;
use slidesync_core::{DeviceProfile, LifecycleState, Nav, PerformanceTier};
use slidesync_protocol::{ElementRole, LifecycleClass, Pagination, StyleCommand, TrackKind};
use support::{Harness, layout, root};

/// Reveal duration plus the unlock buffer, with room to spare.
const SETTLE_MS: u64 = 1_000;

fn assert_synced(h: &Harness, id: &str) {
    let instance = h.registry.get(id).unwrap();
    let scene = h.scene(id);
    assert_eq!(scene.image_slide(), instance.active_index());
    assert_eq!(scene.content_slide(), instance.active_index());
    assert_eq!(scene.visible_content_slides().len(), 1);
}

/// With the reveal enabled, only the active slide's container is shown.
fn assert_exclusive(h: &Harness, id: &str) {
    let active = h.registry.get(id).unwrap().active_index();
    assert_eq!(
        h.scene(id).visible_containers(),
        active.into_iter().collect::<Vec<_>>()
    );
}

#[test]
fn three_slide_loop_manual_navigation() {
    let mut h = Harness::new();
    h.mount_ready(root("hero", 3, None));

    let instance = h.registry.get("hero").unwrap();
    assert_eq!(instance.state(), LifecycleState::Ready);
    assert!(instance.looped());
    assert_eq!(instance.active_index(), Some(0));
    assert_synced(&h, "hero");
    assert_exclusive(&h, "hero");

    for expected in [1, 2, 0] {
        h.nav("hero", Nav::Next);
        assert_eq!(
            h.registry.get("hero").unwrap().state(),
            LifecycleState::Transitioning
        );
        // Content is already on the incoming slide while the image moves.
        assert_eq!(h.scene("hero").content_slide(), Some(expected));
        assert!(h.scene("hero").visible_content_slides().len() <= 1);
        assert!(h.scene("hero").visible_containers().len() <= 2);

        h.advance(500);
        h.end("hero");
        h.advance(SETTLE_MS);

        assert_eq!(h.registry.get("hero").unwrap().active_index(), Some(expected));
        assert_synced(&h, "hero");
        assert_exclusive(&h, "hero");
    }
}

#[test]
fn rapid_fire_input_never_desynchronizes() {
    let mut h = Harness::new();
    h.mount_ready(root("hero", 4, None));

    let script = [
        Nav::Next,
        Nav::Next,
        Nav::Prev,
        Nav::To(3),
        Nav::Prev,
        Nav::Prev,
        Nav::Prev,
        Nav::To(1),
        Nav::Next,
    ];
    for (i, nav) in script.into_iter().enumerate() {
        h.nav("hero", nav);
        // A second click mid-transition is dropped outright.
        let pending = h.registry.get("hero").unwrap().controller().pending_index();
        assert!(h.nav("hero", Nav::Next).is_empty());
        assert_eq!(
            h.registry.get("hero").unwrap().controller().pending_index(),
            pending
        );
        assert_eq!(h.scene("hero").content_slide(), pending.or(h.scene("hero").image_slide()));

        // Alternate between the engine reporting the end and the watchdog.
        if i % 2 == 0 {
            h.advance(100);
            h.end("hero");
            h.advance(50);
        } else {
            h.advance(900);
        }
        assert_eq!(
            h.registry.get("hero").unwrap().state(),
            LifecycleState::Ready
        );
        assert_synced(&h, "hero");
        assert_exclusive(&h, "hero");
    }
}

#[test]
fn loop_round_trip() {
    let mut h = Harness::new();
    h.mount_ready(root("loop", 5, None));

    for _ in 0..5 {
        h.nav("loop", Nav::Next);
        h.end("loop");
        h.advance(SETTLE_MS);
    }
    assert_eq!(h.registry.get("loop").unwrap().active_index(), Some(0));

    h.nav("loop", Nav::Prev);
    h.end("loop");
    assert_eq!(h.registry.get("loop").unwrap().active_index(), Some(4));
    assert_synced(&h, "loop");
    // Both tracks rest on the real slides, not on a loop duplicate.
    assert_eq!(h.scene("loop").image_internal(), 9);
}

#[test]
fn engine_swipes_follow_the_same_path() {
    let mut h = Harness::new();
    h.mount_ready(root("swipe", 3, None));

    // Dragging back from internal 3 (logical 0) lands on a left duplicate.
    let commands = h.swipe("swipe", 2);
    assert!(commands.contains(&StyleCommand::SlideTo {
        track: TrackKind::Content,
        index: 2,
        speed_ms: 0,
    }));
    h.end("swipe");
    assert_eq!(h.registry.get("swipe").unwrap().active_index(), Some(2));
    assert_synced(&h, "swipe");
}

#[test]
fn single_slide_is_inert() {
    let mut h = Harness::new();
    h.mount_ready(root("solo", 1, Some(r#"{"infinite":true,"autoplay":true}"#)));

    let instance = h.registry.get("solo").unwrap();
    assert!(!instance.looped());
    assert!(!instance.is_autoplaying());

    assert!(h.nav("solo", Nav::Next).is_empty());
    assert!(h.nav("solo", Nav::Prev).is_empty());
    h.advance(10_000);
    let transitioning = StyleCommand::SetLifecycle {
        class: LifecycleClass::Transitioning,
    };
    assert!(!h.all_commands("solo").any(|c| *c == transitioning));
    assert_eq!(h.registry.get("solo").unwrap().active_index(), Some(0));
}

#[test]
fn empty_carousel_never_transitions() {
    let mut h = Harness::new();
    h.mount_ready(root("empty", 0, None));
    let instance = h.registry.get("empty").unwrap();
    assert_eq!(instance.state(), LifecycleState::Ready);
    assert_eq!(instance.active_index(), None);
    assert!(h.nav("empty", Nav::Next).is_empty());
    assert!(h.nav("empty", Nav::To(0)).is_empty());
}

#[test]
fn malformed_options_fall_back_to_defaults() {
    let mut h = Harness::new();
    h.mount_ready(root("broken", 3, Some("{not valid json")));

    let instance = h.registry.get("broken").unwrap();
    assert_eq!(instance.state(), LifecycleState::Ready);
    assert!(instance.options_error().is_some());
    let config = instance.config();
    assert_eq!(config.effect, Effect::Fade);
    assert_eq!(config.speed_ms, 500);
    assert!(config.infinite);
    assert!(config.autoplay.is_none());
    assert!(instance.looped());
}

#[test]
fn overflow_spacer_tracks_overlay() {
    let mut h = Harness::new();
    h.host.layouts.insert("tilted".into(), layout(1280.0, 40.0));
    h.mount_ready(root("tilted", 3, None));

    assert_eq!(h.scene("tilted").spacers(), 1);
    assert_eq!(h.scene("tilted").spacer_height(), Some(40.0));

    // Narrower viewport: the overlay now sits inside the box.
    h.host.layouts.insert("tilted".into(), layout(700.0, -10.0));
    h.registry.resize(700.0, h.now);
    h.advance(100);
    assert_eq!(h.scene("tilted").spacer_height(), Some(40.0), "debounced");
    h.advance(200);
    assert_eq!(h.scene("tilted").spacer_height(), Some(1.0));
}

#[test]
fn height_only_resize_is_ignored() {
    let mut h = Harness::new();
    h.host.layouts.insert("tilted".into(), layout(1280.0, 40.0));
    h.mount_ready(root("tilted", 3, None));

    h.host.layouts.insert("tilted".into(), layout(1280.0, 0.0));
    h.registry.resize(1280.0, h.now);
    assert_eq!(h.registry.next_deadline(), None);
    h.advance(500);
    assert_eq!(h.scene("tilted").spacer_height(), Some(40.0));
}

#[test]
fn spacer_follows_slide_changes_after_settling() {
    let mut h = Harness::new();
    h.host.layouts.insert("deco".into(), layout(1280.0, 0.0));
    h.mount_ready(root("deco", 3, None));
    assert_eq!(h.scene("deco").spacer_height(), Some(1.0));

    h.host.layouts.insert("deco".into(), layout(1280.0, 25.0));
    h.nav("deco", Nav::Next);
    h.end("deco");
    assert_eq!(h.scene("deco").spacer_height(), Some(1.0));
    h.advance(200);
    assert_eq!(h.scene("deco").spacer_height(), Some(25.0));
}

#[test]
fn disabled_animations_show_final_state_immediately() {
    let mut h = Harness::new();
    h.mount_ready(root("plain", 3, Some(r#"{"enableGsapAnimations":false}"#)));

    for _ in 0..4 {
        h.nav("plain", Nav::Next);
        for role in ElementRole::ALL {
            let content = h.scene("plain").content_slide().unwrap();
            assert!(h.scene("plain").element(content, role, h.now).is_shown());
        }
        h.end("plain");
        h.advance(SETTLE_MS);
        assert_synced(&h, "plain");
    }
    assert_eq!(h.scene("plain").tweens_started(), 0);
    assert!(!h.all_commands("plain").any(StyleCommand::is_tween));
}

#[test]
fn constrained_device_degrades_before_construction() {
    let device = DeviceProfile {
        viewport_width: 390.0,
        ..DeviceProfile::default()
    };
    let mut h = Harness::with_device(&device);
    assert_eq!(h.registry.tier(), PerformanceTier::Constrained);

    h.mount(root("mobile", 3, Some(r#"{"effect":"cube","speed":150}"#)))
        .unwrap();
    h.advance(200);
    assert_eq!(
        h.registry.get("mobile").unwrap().state(),
        LifecycleState::Initializing,
        "constrained devices defer initialization longer"
    );
    h.advance(200);
    assert_eq!(
        h.registry.get("mobile").unwrap().state(),
        LifecycleState::Ready
    );

    let (_, image_spec) = h
        .host
        .constructed
        .iter()
        .find(|(_, spec)| spec.kind == TrackKind::Image)
        .unwrap();
    assert_eq!(image_spec.effect, Effect::Slide);
    assert_eq!(image_spec.speed_ms, 300);
    assert_eq!(h.scene("mobile").tweens_started(), 0);
    assert_eq!(h.scene("mobile").observe_mutations(), Some(false));
    assert!(!h.registry.get("mobile").unwrap().observes_mutations());
}

#[test]
fn reveal_plays_on_every_activation() {
    let mut h = Harness::new();
    h.mount_ready(root("hero", 2, None));
    let initial = h.scene("hero").tweens_started();
    assert_eq!(initial, 8);

    h.nav("hero", Nav::Next);
    // Incoming slide is pre-revealed with its children still hidden.
    assert!(h.scene("hero").container_visible(1));
    assert_eq!(h.scene("hero").element(1, ElementRole::Heading, h.now).opacity, 0.0);
    h.end("hero");
    assert!(h.scene("hero").animating(1, h.now + 1));
    h.advance(3_000);
    assert!(h.scene("hero").element(1, ElementRole::Heading, h.now).is_shown());
    // The outgoing slide was reset for its next reveal.
    assert_eq!(h.scene("hero").element(0, ElementRole::Heading, h.now).opacity, 0.0);

    h.nav("hero", Nav::Next);
    h.end("hero");
    assert_eq!(h.scene("hero").tweens_started(), initial + 16);
}

#[test]
fn interaction_is_locked_until_reveal_settles() {
    let mut h = Harness::new();
    h.mount_ready(root("hero", 3, None));
    assert!(h.scene("hero").interactive(TrackKind::Image));

    h.nav("hero", Nav::Next);
    assert!(!h.scene("hero").interactive(TrackKind::Image));
    assert!(!h.scene("hero").clickable(TrackKind::Content));
    h.end("hero");
    h.advance(500);
    assert!(!h.scene("hero").interactive(TrackKind::Image));
    assert!(!h.scene("hero").clickable(TrackKind::Content));
    h.advance(400);
    assert!(h.scene("hero").interactive(TrackKind::Image));
    assert!(h.scene("hero").clickable(TrackKind::Content));
    // Clicks come back; dragging the content track never does.
    assert!(!h.scene("hero").interactive(TrackKind::Content));
}

#[test]
fn content_track_stays_at_zero_speed() {
    let mut h = Harness::new();
    h.mount_ready(root("hero", 3, Some(r#"{"speed":900}"#)));
    assert_eq!(h.scene("hero").speed(TrackKind::Content), 0);

    let content_speed_bumps = h
        .all_commands("hero")
        .filter(|c| {
            matches!(
                c,
                StyleCommand::SetSpeed {
                    track: TrackKind::Content,
                    speed_ms: 900
                }
            )
        })
        .count();
    assert_eq!(content_speed_bumps, 1);

    h.nav("hero", Nav::Next);
    assert!(h.all_commands("hero").all(|c| !matches!(
        c,
        StyleCommand::SlideTo {
            track: TrackKind::Content,
            speed_ms,
            ..
        } if *speed_ms != 0
    )));
}

#[test]
fn fraction_pagination_follows_the_incoming_slide() {
    let mut h = Harness::new();
    h.mount_ready(root("paged", 4, Some(r#"{"paginationType":"fraction"}"#)));
    assert_eq!(
        h.scene("paged").pagination(),
        Some(&Pagination::Fraction {
            label: "1 / 4".into()
        })
    );
    h.nav("paged", Nav::To(2));
    assert_eq!(
        h.scene("paged").pagination(),
        Some(&Pagination::Fraction {
            label: "3 / 4".into()
        })
    );
}

#[test]
fn keyboard_keys_navigate() {
    let mut h = Harness::new();
    h.mount_ready(root("keys", 3, None));
    assert!(h.key("keys", "Enter").is_empty());
    assert!(!h.key("keys", "ArrowLeft").is_empty());
    h.end("keys");
    assert_eq!(h.registry.get("keys").unwrap().active_index(), Some(2));
}

#[test]
fn keys_are_ignored_without_navigation_controls() {
    let mut h = Harness::new();
    let mut markup = root("bare", 3, None);
    markup.has_navigation = false;
    h.mount_ready(markup);

    assert!(h.key("bare", "ArrowRight").is_empty());
    assert_eq!(h.registry.get("bare").unwrap().state(), LifecycleState::Ready);

    // Programmatic navigation is unaffected.
    assert!(!h.nav("bare", Nav::Next).is_empty());
    h.end("bare");
    assert_eq!(h.registry.get("bare").unwrap().active_index(), Some(1));
}
