/// Reads a little-endian `u32` at `offset`. Returns `0` if the read would
/// go out of bounds rather than failing — era bytes from a newer fork than
/// this decoder knows about must still yield a usable (if zeroed) value.
pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    match buf.get(offset..offset + 4) {
        Some(bytes) => u32::from_le_bytes(bytes.try_into().expect("slice is exactly 4 bytes")),
        None => 0,
    }
}

/// Reads a little-endian `u64` at `offset`, with the same 0-on-out-of-bounds
/// tolerance as [`read_u32_le`].
pub fn read_u64_le(buf: &[u8], offset: usize) -> u64 {
    match buf.get(offset..offset + 8) {
        Some(bytes) => u64::from_le_bytes(bytes.try_into().expect("slice is exactly 8 bytes")),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_bounds_u32() {
        let buf = [0x01, 0x00, 0x00, 0x00, 0xff];
        assert_eq!(read_u32_le(&buf, 0), 1);
    }

    #[test]
    fn out_of_bounds_u32_is_zero() {
        let buf = [0x01, 0x02];
        assert_eq!(read_u32_le(&buf, 0), 0);
        assert_eq!(read_u32_le(&buf, 100), 0);
    }

    #[test]
    fn reads_in_bounds_u64() {
        let mut buf = [0u8; 8];
        buf[0] = 0x2a;
        assert_eq!(read_u64_le(&buf, 0), 0x2a);
    }

    #[test]
    fn out_of_bounds_u64_is_zero() {
        let buf = [0u8; 4];
        assert_eq!(read_u64_le(&buf, 0), 0);
    }
}
