use super::*;

#[test]
fn reads_little_endian_scalars() {
    let mut w = ByteWriter::new();
    w.write_u8(7)
        .write_bool(true)
        .write_i16(-2)
        .write_i32(0x0102_0304)
        .write_u32(0xFFEE_DDCC)
        .write_f32(1.5);
    let bytes = w.into_bytes();
    assert_eq!(&bytes[2..4], &[0xFE, 0xFF]);

    let mut r = ByteBuffer::new(&bytes);
    assert_eq!(r.read_u8().unwrap(), 7);
    assert!(r.read_bool().unwrap());
    assert_eq!(r.read_i16().unwrap(), -2);
    assert_eq!(r.read_i32().unwrap(), 0x0102_0304);
    assert_eq!(r.read_u32().unwrap(), 0xFFEE_DDCC);
    assert_eq!(r.read_f32().unwrap(), 1.5);
    assert_eq!(r.remaining(), 0);
}

#[test]
fn strings_distinguish_absent_from_empty() {
    let mut w = ByteWriter::new();
    w.write_s(None).write_s(Some("")).write_s(Some("fade"));
    let bytes = w.into_bytes();

    let mut r = ByteBuffer::new(&bytes);
    assert_eq!(r.read_s().unwrap(), None);
    assert_eq!(r.read_s().unwrap(), Some(String::new()));
    assert_eq!(r.read_s().unwrap().as_deref(), Some("fade"));
}

#[test]
fn truncated_read_keeps_position() {
    let bytes = [1u8, 2, 3];
    let mut r = ByteBuffer::new(&bytes);
    r.skip(1).unwrap();
    let err = r.read_i32().unwrap_err();
    assert!(err.is_truncation());
    assert_eq!(r.position(), 1);
    assert_eq!(r.read_i16().unwrap(), i16::from_le_bytes([2, 3]));
}

#[test]
fn truncated_string_body_rewinds() {
    let bytes = [5u8, 0, b'a', b'b'];
    let mut r = ByteBuffer::new(&bytes);
    assert!(r.read_s().is_err());
    assert_eq!(r.position(), 0);
}

#[test]
fn sub_block_is_bounded_and_clamped() {
    let bytes = [1u8, 2, 3, 4, 5];
    let mut r = ByteBuffer::with_version(&bytes, 1);
    let mut block = r.sub_block(2);
    assert_eq!(block.version(), 1);
    assert_eq!(block.read_u8().unwrap(), 1);
    assert_eq!(block.read_u8().unwrap(), 2);
    assert!(block.read_u8().is_err());
    assert_eq!(r.position(), 2);

    let rest = r.sub_block(100);
    assert_eq!(rest.len(), 3);
    assert_eq!(r.remaining(), 0);
}

#[test]
fn set_position_clamps_to_end() {
    let bytes = [0u8; 4];
    let mut r = ByteBuffer::new(&bytes);
    r.set_position(99);
    assert_eq!(r.position(), 4);
    assert!(r.read_u8().is_err());
}
