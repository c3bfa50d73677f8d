use super::*;

fn ids() -> Vec<String> {
    vec!["n0".to_owned(), "n1".to_owned(), "n2".to_owned()]
}

fn header(w: &mut ByteWriter, name: &str, items: i16) {
    w.write_s(Some(name))
        .write_i32(4)
        .write_bool(true)
        .write_i32(2)
        .write_f32(0.5)
        .write_i16(items);
}

#[test]
fn decodes_immediate_and_tweened_items() {
    let mut w = ByteWriter::new();
    header(&mut w, "show", 2);

    let mut visible = ByteWriter::new();
    visible
        .write_u8(ActionKind::Visible.tag())
        .write_f32(0.25)
        .write_i16(1)
        .write_s(Some("on"))
        .write_bool(false)
        .write_bool(true);
    w.write_block(visible.as_bytes());

    let mut xy = ByteWriter::new();
    xy.write_u8(ActionKind::XY.tag())
        .write_f32(0.5)
        .write_i16(-1)
        .write_s(None)
        .write_bool(true)
        .write_f32(1.0)
        .write_u8(Ease::OutQuad.tag())
        .write_i32(0)
        .write_bool(false)
        .write_s(Some("done"))
        // start: only x authored
        .write_bool(true)
        .write_bool(false)
        .write_f32(10.0)
        .write_f32(99.0)
        .write_bool(false)
        // end
        .write_bool(true)
        .write_bool(true)
        .write_f32(20.0)
        .write_f32(30.0)
        .write_bool(true)
        // path
        .write_i32(2)
        .write_u8(CurveType::Straight.tag())
        .write_f32(0.0)
        .write_f32(0.0)
        .write_u8(CurveType::Bezier.tag())
        .write_f32(4.0)
        .write_f32(2.0)
        .write_f32(1.0)
        .write_f32(8.0);
    w.write_block(xy.as_bytes());

    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());

    assert_eq!(info.name(), "show");
    assert!(info.options().contains(TransitionOptions::AUTO_STOP_AT_END));
    assert!(info.auto_play());
    assert_eq!(info.auto_play_times(), 2);
    assert_eq!(info.auto_play_delay(), 0.5);
    assert_eq!(info.items().len(), 2);

    let first = &info.items()[0];
    assert_eq!(first.kind, ActionKind::Visible);
    assert_eq!(first.target_id, "n1");
    assert_eq!(first.label.as_deref(), Some("on"));
    assert_eq!(first.value, TransitionValue::Visible(true));

    let second = &info.items()[1];
    assert_eq!(second.target_id, "");
    let tween = second.tween.as_ref().unwrap();
    assert_eq!(tween.ease, Ease::OutQuad);
    assert_eq!(tween.end_label.as_deref(), Some("done"));
    assert_eq!(
        tween.start,
        TransitionValue::Vector {
            x: Some(10.0),
            y: None,
            percent: false
        }
    );
    assert_eq!(
        tween.end,
        TransitionValue::Vector {
            x: Some(20.0),
            y: Some(30.0),
            percent: true
        }
    );
    assert_eq!(tween.path.len(), 2);
    assert_eq!(tween.path[1].curve, CurveType::Bezier);
    assert_eq!(tween.path[1].control1, Point::new(1.0, 8.0));
    assert_eq!(info.total_duration(), 1.5);
}

#[test]
fn version_one_has_no_percent_or_path() {
    let mut w = ByteWriter::new();
    header(&mut w, "old", 1);
    let mut xy = ByteWriter::new();
    xy.write_u8(ActionKind::XY.tag())
        .write_f32(0.0)
        .write_i16(-1)
        .write_s(None)
        .write_bool(false)
        .write_bool(true)
        .write_bool(true)
        .write_f32(3.0)
        .write_f32(4.0);
    w.write_block(xy.as_bytes());
    let bytes = w.into_bytes();

    let info = decode_transition(&mut ByteBuffer::with_version(&bytes, 1), ids().as_slice());
    assert_eq!(info.items()[0].value, TransitionValue::xy(3.0, 4.0));
}

#[test]
fn truncated_item_keeps_defaults_and_following_items() {
    let mut w = ByteWriter::new();
    header(&mut w, "t", 3);

    // Declared as alpha but the value is cut off.
    let mut cut = ByteWriter::new();
    cut.write_u8(ActionKind::Alpha.tag())
        .write_f32(0.5)
        .write_i16(0)
        .write_s(None)
        .write_bool(false)
        .write_u8(0x00);
    w.write_block(cut.as_bytes());

    // No time field at all: dropped.
    let mut timeless = ByteWriter::new();
    timeless.write_u8(ActionKind::Alpha.tag()).write_u8(1);
    w.write_block(timeless.as_bytes());

    let mut ok = ByteWriter::new();
    ok.write_u8(ActionKind::Rotation.tag())
        .write_f32(1.0)
        .write_i16(2)
        .write_s(None)
        .write_bool(false)
        .write_f32(90.0);
    w.write_block(ok.as_bytes());

    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(info.items().len(), 2);
    assert_eq!(info.items()[0].value, TransitionValue::Scalar(0.0));
    assert_eq!(info.items()[0].target_id, "n0");
    assert_eq!(info.items()[1].value, TransitionValue::Scalar(90.0));
    assert_eq!(info.items()[1].target_id, "n2");
}

#[test]
fn fields_after_a_short_string_keep_defaults() {
    let mut w = ByteWriter::new();
    header(&mut w, "t", 1);

    // Name claims ten bytes, only five follow.
    let mut sound = ByteWriter::new();
    sound
        .write_u8(ActionKind::Sound.tag())
        .write_f32(0.0)
        .write_i16(-1)
        .write_s(None)
        .write_bool(false)
        .write_u16(10)
        .write_bytes(b"click");
    w.write_block(sound.as_bytes());

    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(info.items().len(), 1);
    assert_eq!(
        info.items()[0].value,
        TransitionValue::Sound {
            name: None,
            volume: 0.0,
        }
    );
}

#[test]
fn auto_play_settings_survive_without_auto_play() {
    let mut w = ByteWriter::new();
    w.write_s(Some("idle"))
        .write_i32(0)
        .write_bool(false)
        .write_i32(3)
        .write_f32(0.5)
        .write_i16(0);

    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert!(!info.auto_play());
    assert_eq!(info.auto_play_times(), 3);
    assert_eq!(info.auto_play_delay(), 0.5);

    let mut again = ByteWriter::new();
    encode_transition(&mut again, &info, &|_: &str| None::<i16>);
    assert_eq!(again.as_bytes(), bytes.as_slice());
}

#[test]
fn overlong_block_and_short_header_never_panic() {
    let mut w = ByteWriter::new();
    header(&mut w, "x", 5);
    w.write_i16(400).write_u8(ActionKind::Visible.tag()).write_f32(0.25);
    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(info.items().len(), 1);
    assert_eq!(info.items()[0].value, TransitionValue::Visible(false));

    for cut in 0..bytes.len() {
        let _ = decode_transition(&mut ByteBuffer::new(&bytes[..cut]), ids().as_slice());
    }
    let empty = decode_transition(&mut ByteBuffer::new(&[]), ids().as_slice());
    assert_eq!(empty.name(), "");
    assert!(empty.items().is_empty());
}

#[test]
fn unknown_action_tag_is_kept() {
    let mut w = ByteWriter::new();
    header(&mut w, "future", 1);
    let mut item = ByteWriter::new();
    item.write_u8(77)
        .write_f32(0.5)
        .write_i16(-1)
        .write_s(None)
        .write_bool(false)
        .write_bytes(&[1, 2, 3, 4]);
    w.write_block(item.as_bytes());
    let bytes = w.into_bytes();
    let info = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(info.items()[0].kind, ActionKind::Unknown(77));
    assert_eq!(info.items()[0].value, TransitionValue::None);
}

#[test]
fn unresolvable_index_targets_owner() {
    let mut w = ByteWriter::new();
    header(&mut w, "x", 1);
    let mut item = ByteWriter::new();
    item.write_u8(ActionKind::Visible.tag())
        .write_f32(0.0)
        .write_i16(17)
        .write_s(None)
        .write_bool(false)
        .write_bool(true);
    w.write_block(item.as_bytes());
    let bytes = w.into_bytes();
    let lookup = |i: usize| (i == 0).then(|| "only".to_owned());
    let info = decode_transition(&mut ByteBuffer::new(&bytes), &lookup);
    assert_eq!(info.items()[0].target_id, "");
}

#[test]
fn sound_name_absent_and_empty_stay_distinct() {
    let items = vec![
        TransitionItem::new(
            0.0,
            ActionKind::Sound,
            TransitionValue::Sound {
                name: None,
                volume: 1.0,
            },
        ),
        TransitionItem::new(
            0.0,
            ActionKind::Sound,
            TransitionValue::Sound {
                name: Some(String::new()),
                volume: 0.5,
            },
        ),
    ];
    let info = TransitionInfo::new("s", items);
    let mut w = ByteWriter::new();
    encode_transition(&mut w, &info, &|_| None);
    let bytes = w.into_bytes();
    let decoded = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(decoded, info);
}

#[test]
fn encoded_timeline_decodes_identically_twice() {
    let info = TransitionInfo::new(
        "move",
        vec![
            TransitionItem::tweened(
                0.25,
                ActionKind::XY,
                TransitionTween::new(0.5, TransitionValue::current(), TransitionValue::xy(8.0, 4.0))
                    .with_ease(Ease::InOutSine)
                    .with_repeat(1, true)
                    .with_path(vec![
                        PathPoint::spline((0.0, 0.0)),
                        PathPoint::spline((2.0, 1.0)),
                        PathPoint::cubic((4.0, 0.0), (5.0, 1.0), (6.0, 1.0)),
                        PathPoint::straight((8.0, 4.0)),
                    ]),
            )
            .with_target("n2"),
            TransitionItem::new(
                0.5,
                ActionKind::Color,
                TransitionValue::Color(0xFF33_6699),
            )
            .with_label("tint"),
        ],
    )
    .with_options(TransitionOptions::AUTO_STOP_DISABLED);

    let mut w = ByteWriter::new();
    encode_transition(&mut w, &info, &|id| {
        ids().iter().position(|s| s == id).map(|i| i as i16)
    });
    let bytes = w.into_bytes();

    let a = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    let b = decode_transition(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(a, b);
    assert_eq!(a, info);
}

#[test]
fn list_isolates_corrupt_transitions() {
    let good = TransitionInfo::new(
        "good",
        vec![TransitionItem::new(0.5, ActionKind::Alpha, TransitionValue::Scalar(0.25))],
    );
    let mut good_bytes = ByteWriter::new();
    encode_transition(&mut good_bytes, &good, &|_| None);

    let mut w = ByteWriter::new();
    w.write_i16(3);
    w.write_block(&good_bytes.as_bytes()[..5]);
    w.write_block(good_bytes.as_bytes());
    w.write_block(good_bytes.as_bytes());
    let bytes = w.into_bytes();

    let list = decode_transition_list(&mut ByteBuffer::new(&bytes), ids().as_slice());
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].name(), "");
    assert_eq!(list[1], good);
    assert_eq!(list[2], good);
}
