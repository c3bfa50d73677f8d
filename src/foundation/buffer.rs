use crate::foundation::error::{TransitionError, TransitionResult};

/// Marker length for an absent string.
pub const NULL_STRING_LEN: u16 = 0xFFFF;

/// Little-endian reader over a borrowed byte region.
///
/// Reads never panic: running out of bytes yields [`TransitionError::Truncated`] and leaves
/// the position unchanged. `version` is the package format version and only steers optional
/// fields in the timeline layout.
#[derive(Clone, Debug)]
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    version: u8,
}

impl<'a> ByteBuffer<'a> {
    /// Reader at offset 0 for the current format version.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_version(data, 2)
    }

    /// Reader for data written by format `version`.
    pub fn with_version(data: &'a [u8], version: u8) -> Self {
        Self {
            data,
            pos: 0,
            version,
        }
    }

    /// Package format version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Cursor offset from the start of the region.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor; positions past the end clamp to the end.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Size of the whole region.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` for an empty region.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Advance past `n` bytes.
    pub fn skip(&mut self, n: usize) -> TransitionResult<()> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> TransitionResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(TransitionError::Truncated {
                need: n,
                at: self.pos,
                remaining: self.remaining(),
            });
        }
        let data: &'a [u8] = self.data;
        let out = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> TransitionResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// One byte.
    pub fn read_u8(&mut self) -> TransitionResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// One byte; nonzero is `true`.
    pub fn read_bool(&mut self) -> TransitionResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Little-endian `i16`.
    pub fn read_i16(&mut self) -> TransitionResult<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    /// Little-endian `u16`.
    pub fn read_u16(&mut self) -> TransitionResult<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Little-endian `i32`.
    pub fn read_i32(&mut self) -> TransitionResult<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Little-endian `u32`.
    pub fn read_u32(&mut self) -> TransitionResult<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Little-endian IEEE `f32`.
    pub fn read_f32(&mut self) -> TransitionResult<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Nullable length-prefixed string.
    ///
    /// `Ok(None)` is an absent string, `Ok(Some(""))` a present empty one. Invalid UTF-8 is
    /// replaced rather than rejected. A truncated body rewinds to before the length prefix.
    pub fn read_s(&mut self) -> TransitionResult<Option<String>> {
        let start = self.pos;
        let len = self.read_u16()?;
        if len == NULL_STRING_LEN {
            return Ok(None);
        }
        match self.take(usize::from(len)) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Split off the next `len` bytes as an independent reader and advance past them.
    ///
    /// A `len` running past the end is clamped to what remains.
    pub fn sub_block(&mut self, len: usize) -> ByteBuffer<'a> {
        let len = len.min(self.remaining());
        let all: &'a [u8] = self.data;
        let data = &all[self.pos..self.pos + len];
        self.pos += len;
        ByteBuffer {
            data,
            pos: 0,
            version: self.version,
        }
    }
}

/// Little-endian writer producing the layout [`ByteBuffer`] reads.
///
/// Used by the dump tool's fixtures and by tests to author timelines.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` before the first write.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One byte.
    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    /// `1` or `0`.
    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.write_u8(u8::from(v))
    }

    /// Little-endian `i16`.
    pub fn write_i16(&mut self, v: i16) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Little-endian `u16`.
    pub fn write_u16(&mut self, v: u16) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Little-endian `i32`.
    pub fn write_i32(&mut self, v: i32) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Little-endian `u32`.
    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Little-endian IEEE `f32`.
    pub fn write_f32(&mut self, v: f32) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Nullable length-prefixed string; `None` writes the absent marker.
    ///
    /// Strings longer than `0xFFFE` bytes are cut at a char boundary.
    pub fn write_s(&mut self, v: Option<&str>) -> &mut Self {
        let Some(s) = v else {
            return self.write_u16(NULL_STRING_LEN);
        };
        let mut end = s.len().min(usize::from(NULL_STRING_LEN - 1));
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.write_u16(end as u16);
        self.data.extend_from_slice(&s.as_bytes()[..end]);
        self
    }

    /// Raw bytes, no prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Write `body` prefixed by its length as `i16`.
    pub fn write_block(&mut self, body: &[u8]) -> &mut Self {
        let len = body.len().min(i16::MAX as usize);
        self.write_i16(len as i16);
        self.data.extend_from_slice(&body[..len]);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/buffer.rs"]
mod tests;
