mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{capture_logs, creak, engine, source, with_parent, FakeHost, HostEvent};
use soundswap::{
    AudioClip, Condition, ConditionContext, ObjectId, OneShotDecision, PlayDecision, Replacement,
    ReplacementCatalog, ResolveRequest, SoundInstance, SoundReplacementCollection,
    SoundReplacementGroup,
};

fn door_pack(sounds: Vec<SoundInstance>) -> SoundReplacementCollection {
    SoundReplacementCollection::new(
        "doors",
        vec![SoundReplacementGroup::new(["*:Door:Creak"], sounds)],
    )
}

fn request(object: ObjectId, clip: Option<&AudioClip>) -> ResolveRequest<'_> {
    ResolveRequest {
        object,
        clip,
        one_shot: false,
        caller: None,
    }
}

#[test]
fn single_sound_always_wins_under_requested_name() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        5,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door (1)", Some(creak())));

    for _ in 0..20 {
        let replacement = engine.resolve(&host, request(door, Some(&creak())));
        assert_eq!(replacement, Some(Replacement::Clip(AudioClip::new(100, "Creak"))));
    }

    assert_eq!(engine.on_play(&mut host, door, Some("Door.Open")), PlayDecision::Proceed);
    assert_eq!(
        host.take_events(),
        vec![HostEvent::SetClip(door, AudioClip::new(100, "Creak"))]
    );
    // the caller-assigned clip is remembered, not the substitute
    assert_eq!(engine.state(door).unwrap().original_clip, Some(creak()));
}

#[test]
fn replaying_resolves_against_the_original_clip() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    engine.on_play(&mut host, door, None);
    assert_eq!(host.clip_of(door).unwrap().handle.0, 100);

    // the host now holds the substitute; a second play still matches "Creak"
    engine.on_play(&mut host, door, None);
    assert_eq!(host.take_events().len(), 2);
}

#[test]
fn replacing_disabled_skips_resolution() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    engine.set_replacing_disabled(door, true);
    assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);
    assert_eq!(engine.on_play(&mut host, door, None), PlayDecision::Proceed);
    assert!(host.events.is_empty());

    engine.set_replacing_disabled(door, false);
    assert!(engine.resolve(&host, request(door, Some(&creak()))).is_some());
}

#[test]
fn missing_object_or_clip_means_no_replacement() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", None));

    assert_eq!(engine.resolve(&host, request(ObjectId(99), Some(&creak()))), None);
    assert_eq!(engine.resolve(&host, request(door, None)), None);
    assert_eq!(engine.resolve(&host, request(door, Some(&AudioClip::new(1, "")))), None);
    assert_eq!(engine.on_play(&mut host, door, None), PlayDecision::Proceed);
    assert!(host.events.is_empty());
}

#[test]
fn unmatched_clip_or_owner_means_no_replacement() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let window = host.insert(1, source("Window", Some(creak())));
    let door = host.insert(2, source("Door", Some(AudioClip::new(2, "Slam"))));

    assert_eq!(engine.resolve(&host, request(window, Some(&creak()))), None);
    assert_eq!(engine.resolve(&host, request(door, Some(&AudioClip::new(2, "Slam")))), None);
}

#[test]
fn ancestor_segment_uses_normalized_parent_name() {
    let mut engine = engine(vec![SoundReplacementCollection::new(
        "ships",
        vec![SoundReplacementGroup::new(
            ["Ship:Door:Creak"],
            vec![SoundInstance::new(AudioClip::new(100, "hiss"), 1)],
        )],
    )]);
    let mut host = FakeHost::new();
    let ship_door = host.insert(1, with_parent(source("Door", Some(creak())), 50, "Ship(Clone)"));
    let house_door = host.insert(2, with_parent(source("Door", Some(creak())), 51, "House"));
    let loose_door = host.insert(3, source("Door", Some(creak())));

    assert!(engine.resolve(&host, request(ship_door, Some(&creak()))).is_some());
    assert_eq!(engine.resolve(&host, request(house_door, Some(&creak()))), None);
    assert_eq!(engine.resolve(&host, request(loose_door, Some(&creak()))), None);
}

#[test]
fn chosen_group_without_eligible_sounds_does_not_fall_back() {
    let mut engine = engine(vec![
        door_pack(vec![
            SoundInstance::new(AudioClip::new(100, "gated"), 1).with_condition(Condition::flag("night"))
        ]),
        door_pack(vec![SoundInstance::new(AudioClip::new(200, "open"), 1)]),
    ]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    let mut misses = 0;
    let mut hits = 0;
    for _ in 0..200 {
        match engine.resolve(&host, request(door, Some(&creak()))) {
            None => misses += 1,
            Some(Replacement::Clip(clip)) => {
                assert_eq!(clip.handle.0, 200);
                hits += 1;
            }
            Some(Replacement::Mute) => panic!("no mute sounds configured"),
        }
    }
    assert!(misses > 0, "the gated group should sometimes be chosen");
    assert!(hits > 0, "the open group should sometimes be chosen");
}

#[test]
fn lone_group_with_only_gated_sounds_never_replaces() {
    let mut engine = engine(vec![door_pack(vec![
        SoundInstance::new(AudioClip::new(100, "a"), 1).with_condition(Condition::flag("night")),
        SoundInstance::new(AudioClip::new(101, "b"), 3).with_condition(Condition::flag("night")),
    ])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    for _ in 0..50 {
        assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);
    }
}

#[test]
fn weights_split_draws_proportionally() {
    let mut engine = engine(vec![door_pack(vec![
        SoundInstance::new(AudioClip::new(100, "light"), 1),
        SoundInstance::new(AudioClip::new(101, "heavy"), 3),
    ])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    let trials = 4000;
    let light = (0..trials)
        .filter(|_| {
            matches!(
                engine.resolve(&host, request(door, Some(&creak()))),
                Some(Replacement::Clip(ref clip)) if clip.handle.0 == 100
            )
        })
        .count();
    let share = light as f64 / trials as f64;
    assert!((0.22..0.28).contains(&share), "light share was {share}");
}

#[test]
fn context_override_and_default_context() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "night_creak"),
        1,
    )])
    .with_condition(Condition::flag("night"))]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));
    let other = host.insert(2, source("Door", Some(creak())));

    assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);

    engine.set_context_override(door, Some(ConditionContext::new().with("night", true)));
    assert!(engine.resolve(&host, request(door, Some(&creak()))).is_some());
    assert_eq!(engine.resolve(&host, request(other, Some(&creak()))), None);

    engine.default_context_mut().set("night", true);
    assert!(engine.resolve(&host, request(other, Some(&creak()))).is_some());

    // an override wins over the default in both directions
    engine.set_context_override(door, Some(ConditionContext::new()));
    assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);
}

#[test]
fn mute_skips_playback() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::mute(1)])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    assert_eq!(engine.on_play(&mut host, door, None), PlayDecision::Skip);
    assert_eq!(
        engine.on_play_one_shot(&host, door, Some(&creak()), None),
        OneShotDecision::Skip
    );
    assert!(host.events.is_empty());
}

#[test]
fn one_shot_replaces_without_touching_the_host() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", None));

    let (decision, logs) = capture_logs(|| {
        engine.on_play_one_shot(&host, door, Some(&creak()), Some("Door.Knock"))
    });
    assert_eq!(decision, OneShotDecision::Replace(AudioClip::new(100, "Creak")));
    // only frame-updated collections make a one-shot hazardous
    assert!(!logs.contains("WARN"), "{logs}");
    assert_eq!(
        engine.on_play_one_shot(&host, door, Some(&AudioClip::new(5, "Knock")), None),
        OneShotDecision::Unchanged
    );
    assert!(host.events.is_empty());
}

#[test]
fn update_every_frame_owns_the_object_after_selection() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "hum"),
        1,
    )])
    .with_update_every_frame(true)
    .with_file_path("/packs/doors/replacers/hum.json")]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    // a one-shot against such a collection still succeeds, with a warning
    let (decision, logs) =
        capture_logs(|| engine.on_play_one_shot(&host, door, Some(&creak()), None));
    assert_eq!(decision, OneShotDecision::Replace(AudioClip::new(100, "Creak")));
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("updates every frame"), "{logs}");
    assert!(logs.contains("replacers/hum.json"), "{logs}");
    assert!(logs.contains("*:Door:Creak"), "{logs}");
    let active = engine.state(door).unwrap().active_replacement.clone().unwrap();
    assert!(active.update_every_frame);

    // from here on the frame-update path owns this object
    assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);
    assert_eq!(engine.on_play(&mut host, door, None), PlayDecision::Proceed);
    assert!(host.events.is_empty());
}

#[test]
fn forget_drops_object_state() {
    let mut engine = engine(vec![]);
    let door = ObjectId(1);

    engine.set_replacing_disabled(door, true);
    assert!(engine.state(door).is_some());
    engine.forget(door);
    assert!(engine.state(door).is_none());
}

#[test]
fn swapping_the_catalog_changes_future_resolutions() {
    let mut engine = engine(vec![door_pack(vec![SoundInstance::new(
        AudioClip::new(100, "creak_alt"),
        1,
    )])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));
    assert!(engine.resolve(&host, request(door, Some(&creak()))).is_some());

    engine.replace_catalog(Arc::new(ReplacementCatalog::empty()));
    assert_eq!(engine.resolve(&host, request(door, Some(&creak()))), None);
    assert!(engine.catalog().collections().is_empty());
}

#[test]
fn reports_record_each_distinct_play_once() {
    let mut engine = engine(vec![door_pack(vec![
        SoundInstance::new(AudioClip::new(100, "creak_alt"), 1),
        SoundInstance::mute(1),
    ])]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door (2)", Some(creak())));
    let radio = host.insert(2, source("Radio", Some(AudioClip::new(9, "Static"))));

    engine.start_report();
    {
        let report = engine.report().unwrap();
        assert_eq!(report.sound_pack_names, vec!["doors".to_string()]);
        assert_eq!(report.audio_clips_loaded, 1);
    }

    engine.on_play(&mut host, door, None);
    engine.on_play(&mut host, door, None);
    engine.on_play_one_shot(&host, door, Some(&creak()), Some("Door.Knock"));
    // recorded even though nothing matches it
    engine.on_play(&mut host, radio, None);

    let report = engine.take_report().unwrap();
    assert!(engine.report().is_none());

    let lines: Vec<String> = report
        .played_sounds
        .iter()
        .map(|s| format!("{} {} {}", s.match_string, s.caller, s.is_one_shot))
        .collect();
    assert_eq!(
        lines,
        vec![
            "*:Door:Creak unknown caller false".to_string(),
            "*:Door:Creak Door.Knock true".to_string(),
            "*:Radio:Static unknown caller false".to_string(),
        ]
    );
}

#[test]
fn nothing_is_recorded_without_an_active_report() {
    let mut engine = engine(vec![]);
    let mut host = FakeHost::new();
    let door = host.insert(1, source("Door", Some(creak())));

    engine.on_play(&mut host, door, None);
    assert!(engine.report().is_none());
    assert!(engine.take_report().is_none());
}
