use crate::{
    animation::ease::Ease,
    foundation::{
        buffer::{ByteBuffer, ByteWriter},
        core::Point,
        error::{TransitionError, TransitionResult},
    },
    path::builder::{CurveType, PathPoint},
    timeline::model::{
        ActionKind, TransitionInfo, TransitionItem, TransitionOptions, TransitionTween,
        TransitionValue,
    },
};

/// Maps a stored child index to the stable id items use to find their target.
pub trait ChildLookup {
    /// Id for the child at `index`, or `None` when there is no such child.
    fn child_id(&self, index: usize) -> Option<String>;
}

impl ChildLookup for [String] {
    fn child_id(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

impl<F> ChildLookup for F
where
    F: Fn(usize) -> Option<String>,
{
    fn child_id(&self, index: usize) -> Option<String> {
        self(index)
    }
}

/// Field reader that substitutes defaults once the block runs dry.
struct Fields<'b, 'a> {
    buf: &'b mut ByteBuffer<'a>,
    truncated: bool,
}

impl<'b, 'a> Fields<'b, 'a> {
    fn new(buf: &'b mut ByteBuffer<'a>) -> Self {
        Self {
            buf,
            truncated: false,
        }
    }

    fn version(&self) -> u8 {
        self.buf.version()
    }

    fn try_read<T>(
        &mut self,
        read: impl FnOnce(&mut ByteBuffer<'a>) -> TransitionResult<T>,
    ) -> Option<T> {
        if self.truncated {
            return None;
        }
        match read(&mut *self.buf) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::debug!(%err, "timeline field unreadable, using defaults");
                self.truncated = true;
                None
            }
        }
    }

    fn read<T: Default>(
        &mut self,
        read: impl FnOnce(&mut ByteBuffer<'a>) -> TransitionResult<T>,
    ) -> T {
        self.try_read(read).unwrap_or_default()
    }

    fn u8(&mut self) -> u8 {
        self.read(ByteBuffer::read_u8)
    }

    fn bool(&mut self) -> bool {
        self.read(ByteBuffer::read_bool)
    }

    fn i16(&mut self) -> i16 {
        self.read(ByteBuffer::read_i16)
    }

    fn i32(&mut self) -> i32 {
        self.read(ByteBuffer::read_i32)
    }

    fn u32(&mut self) -> u32 {
        self.read(ByteBuffer::read_u32)
    }

    fn f64(&mut self) -> f64 {
        f64::from(self.read(ByteBuffer::read_f32))
    }

    fn point(&mut self) -> Point {
        let x = self.f64();
        let y = self.f64();
        Point::new(x, y)
    }

    fn s(&mut self) -> Option<String> {
        self.read(ByteBuffer::read_s)
    }
}

/// Decode one transition starting at the buffer's current position.
///
/// Never fails: unreadable fields fall back to defaults and each item resumes at its declared
/// block boundary, so a damaged item only loses itself.
#[tracing::instrument(skip(buffer, children), fields(version = buffer.version()))]
pub fn decode_transition<C>(buffer: &mut ByteBuffer<'_>, children: &C) -> TransitionInfo
where
    C: ChildLookup + ?Sized,
{
    let mut header = Fields::new(buffer);
    let name = header.s().unwrap_or_default();
    let options = TransitionOptions(header.i32() as u32);
    let auto_play = header.bool();
    let auto_play_times = header.i32();
    let auto_play_delay = header.f64();
    let item_count = header.i16().max(0);

    let mut items = Vec::with_capacity(usize::from(item_count.unsigned_abs()));
    for index in 0..item_count {
        let Ok(len) = buffer.read_i16() else {
            tracing::debug!(index, "item table ends early");
            break;
        };
        if len < 0 {
            let err = TransitionError::decode(format!("item {index} declares length {len}"));
            tracing::debug!(%err, "item read as empty");
        }
        let mut block = buffer.sub_block(usize::from(len.max(0).unsigned_abs()));
        match decode_item(&mut block, children) {
            Some(item) => items.push(item),
            None => tracing::debug!(index, "item dropped, no start time"),
        }
    }

    TransitionInfo::new(name, items)
        .with_options(options)
        .with_auto_play_settings(auto_play, auto_play_times, auto_play_delay)
}

/// Decode a component's transition section: `count:i16`, then length-prefixed transitions.
#[tracing::instrument(skip(buffer, children), fields(version = buffer.version()))]
pub fn decode_transition_list<C>(buffer: &mut ByteBuffer<'_>, children: &C) -> Vec<TransitionInfo>
where
    C: ChildLookup + ?Sized,
{
    let count = buffer.read_i16().unwrap_or_default().max(0);
    let mut out = Vec::new();
    for _ in 0..count {
        let Ok(len) = buffer.read_i16() else {
            break;
        };
        let mut block = buffer.sub_block(usize::from(len.max(0).unsigned_abs()));
        out.push(decode_transition(&mut block, children));
    }
    out
}

fn decode_item<C>(block: &mut ByteBuffer<'_>, children: &C) -> Option<TransitionItem>
where
    C: ChildLookup + ?Sized,
{
    let mut r = Fields::new(block);
    let kind = ActionKind::from_tag(r.u8());
    let time = f64::from(r.try_read(ByteBuffer::read_f32)?);

    let target_index = r.try_read(ByteBuffer::read_i16).unwrap_or(-1);
    let target_id = usize::try_from(target_index)
        .ok()
        .and_then(|i| children.child_id(i))
        .unwrap_or_default();
    let label = r.s();

    let item = if r.bool() {
        let duration = r.f64();
        let ease = Ease::from_tag(r.u8());
        let repeat = r.i32();
        let yoyo = r.bool();
        let end_label = r.s();
        let start = read_value(kind, &mut r);
        let end = read_value(kind, &mut r);
        let path = if kind == ActionKind::XY && r.version() >= 2 {
            read_path(&mut r)
        } else {
            Vec::new()
        };
        let tween = TransitionTween {
            duration,
            ease,
            repeat,
            yoyo,
            end_label,
            path,
            start,
            end,
        };
        TransitionItem::tweened(time, kind, tween)
    } else {
        let value = read_value(kind, &mut r);
        TransitionItem::new(time, kind, value)
    };

    Some(TransitionItem {
        target_id,
        label,
        ..item
    })
}

fn read_value(kind: ActionKind, r: &mut Fields<'_, '_>) -> TransitionValue {
    match kind {
        ActionKind::XY | ActionKind::Size | ActionKind::Pivot | ActionKind::Skew => {
            let has_x = r.bool();
            let has_y = r.bool();
            let x = r.f64();
            let y = r.f64();
            let percent = kind == ActionKind::XY && r.version() >= 2 && r.bool();
            TransitionValue::Vector {
                x: has_x.then_some(x),
                y: has_y.then_some(y),
                percent,
            }
        }
        ActionKind::Alpha | ActionKind::Rotation => TransitionValue::Scalar(r.f64()),
        ActionKind::Scale => TransitionValue::Scale {
            x: r.f64(),
            y: r.f64(),
        },
        ActionKind::Color => TransitionValue::Color(r.u32()),
        ActionKind::Animation => TransitionValue::Animation {
            playing: r.bool(),
            frame: r.i32(),
        },
        ActionKind::Visible => TransitionValue::Visible(r.bool()),
        ActionKind::Sound => TransitionValue::Sound {
            name: r.s(),
            volume: r.f64(),
        },
        ActionKind::Transition => TransitionValue::Transition {
            name: r.s(),
            play_times: r.i32(),
        },
        ActionKind::Shake => TransitionValue::Shake {
            amplitude: r.f64(),
            duration: r.f64(),
        },
        ActionKind::ColorFilter => {
            TransitionValue::ColorFilter([r.f64(), r.f64(), r.f64(), r.f64()])
        }
        ActionKind::Text | ActionKind::Icon => TransitionValue::Text(r.s()),
        ActionKind::Unknown(_) => TransitionValue::None,
    }
}

/// Smallest encoded point: curve byte plus one coordinate pair.
const MIN_POINT_BYTES: usize = 9;

fn read_path(r: &mut Fields<'_, '_>) -> Vec<PathPoint> {
    let Some(count) = r.try_read(ByteBuffer::read_i32) else {
        return Vec::new();
    };
    let count = usize::try_from(count).unwrap_or_else(|_| {
        let err = TransitionError::decode(format!("path declares {count} points"));
        tracing::debug!(%err, "path dropped");
        0
    });
    let mut points = Vec::with_capacity(count.min(r.buf.remaining() / MIN_POINT_BYTES));
    for _ in 0..count {
        if r.truncated {
            break;
        }
        let curve = CurveType::from_tag(r.u8());
        let pos = r.point();
        let point = match curve {
            CurveType::Bezier => PathPoint::bezier(pos, r.point()),
            CurveType::CubicBezier => {
                let c1 = r.point();
                let c2 = r.point();
                PathPoint::cubic(pos, c1, c2)
            }
            CurveType::CRSpline => PathPoint::spline(pos),
            CurveType::Straight => PathPoint::straight(pos),
        };
        if r.truncated {
            break;
        }
        points.push(point);
    }
    points
}

/// Write `info` in the layout [`decode_transition`] reads.
///
/// `target_index` maps an item's target id back to a child index; unknown ids and the owner
/// map to `-1`.
pub fn encode_transition(
    w: &mut ByteWriter,
    info: &TransitionInfo,
    target_index: &dyn Fn(&str) -> Option<i16>,
) {
    let version = 2;
    w.write_s(Some(info.name()))
        .write_i32(info.options().0 as i32)
        .write_bool(info.auto_play())
        .write_i32(info.auto_play_times())
        .write_f32(info.auto_play_delay() as f32)
        .write_i16(i16::try_from(info.items().len()).unwrap_or(i16::MAX));

    for item in info.items().iter().take(i16::MAX as usize) {
        let mut body = ByteWriter::new();
        let index = if item.target_id.is_empty() {
            -1
        } else {
            target_index(&item.target_id).unwrap_or(-1)
        };
        body.write_u8(item.kind.tag())
            .write_f32(item.time as f32)
            .write_i16(index)
            .write_s(item.label.as_deref())
            .write_bool(item.tween.is_some());
        match &item.tween {
            Some(tween) => {
                body.write_f32(tween.duration as f32)
                    .write_u8(tween.ease.tag())
                    .write_i32(tween.repeat)
                    .write_bool(tween.yoyo)
                    .write_s(tween.end_label.as_deref());
                write_value(&mut body, item.kind, &tween.start, version);
                write_value(&mut body, item.kind, &tween.end, version);
                if item.kind == ActionKind::XY {
                    write_path(&mut body, &tween.path);
                }
            }
            None => write_value(&mut body, item.kind, &item.value, version),
        }
        w.write_block(body.as_bytes());
    }
}

fn write_value(w: &mut ByteWriter, kind: ActionKind, value: &TransitionValue, version: u8) {
    match value {
        TransitionValue::Vector { x, y, percent } => {
            w.write_bool(x.is_some())
                .write_bool(y.is_some())
                .write_f32(x.unwrap_or_default() as f32)
                .write_f32(y.unwrap_or_default() as f32);
            if kind == ActionKind::XY && version >= 2 {
                w.write_bool(*percent);
            }
        }
        TransitionValue::Scalar(v) => {
            w.write_f32(*v as f32);
        }
        TransitionValue::Scale { x, y } => {
            w.write_f32(*x as f32).write_f32(*y as f32);
        }
        TransitionValue::Color(c) => {
            w.write_u32(*c);
        }
        TransitionValue::Animation { playing, frame } => {
            w.write_bool(*playing).write_i32(*frame);
        }
        TransitionValue::Visible(v) => {
            w.write_bool(*v);
        }
        TransitionValue::Sound { name, volume } => {
            w.write_s(name.as_deref()).write_f32(*volume as f32);
        }
        TransitionValue::Transition { name, play_times } => {
            w.write_s(name.as_deref()).write_i32(*play_times);
        }
        TransitionValue::Shake {
            amplitude,
            duration,
        } => {
            w.write_f32(*amplitude as f32).write_f32(*duration as f32);
        }
        TransitionValue::ColorFilter(c) => {
            for v in c {
                w.write_f32(*v as f32);
            }
        }
        TransitionValue::Text(s) => {
            w.write_s(s.as_deref());
        }
        TransitionValue::None => {}
    }
}

fn write_path(w: &mut ByteWriter, path: &[PathPoint]) {
    w.write_i32(i32::try_from(path.len()).unwrap_or(i32::MAX));
    for p in path {
        w.write_u8(p.curve.tag())
            .write_f32(p.pos.x as f32)
            .write_f32(p.pos.y as f32);
        match p.curve {
            CurveType::Bezier => {
                w.write_f32(p.control1.x as f32).write_f32(p.control1.y as f32);
            }
            CurveType::CubicBezier => {
                w.write_f32(p.control1.x as f32)
                    .write_f32(p.control1.y as f32)
                    .write_f32(p.control2.x as f32)
                    .write_f32(p.control2.y as f32);
            }
            CurveType::CRSpline | CurveType::Straight => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/decode.rs"]
mod tests;
