use crate::error::ReaderError;

const SNAPPY_STREAM_MAGIC: [u8; 10] = [0xff, 0x06, 0x00, 0x00, b's', b'N', b'a', b'P', b'p', b'Y'];

/// Decompresses a snappy-framed payload. Era files store block bodies
/// through the streaming "framed" snappy format, not raw block-compressed
/// snappy, so a plain `snap::raw::Decoder` call is tried first (cheap, and
/// correct for any payload that happens to be raw snappy) before falling
/// back to walking the frame structure.
pub fn decompress_snappy_framed(bytes: &[u8]) -> Result<Vec<u8>, ReaderError> {
    if let Ok(decoded) = snap::raw::Decoder::new().decompress_vec(bytes) {
        return Ok(decoded);
    }

    let mut pos = 0;
    if bytes.len() >= SNAPPY_STREAM_MAGIC.len() && bytes[..10] == SNAPPY_STREAM_MAGIC {
        pos = 10;
    }

    let mut out = Vec::new();
    while pos < bytes.len() {
        if pos + 4 > bytes.len() {
            break;
        }
        let frame_type = bytes[pos];
        let frame_len = u32::from_le_bytes([bytes[pos + 1], bytes[pos + 2], bytes[pos + 3], 0]) as usize;
        pos += 4;
        if pos + frame_len > bytes.len() {
            break;
        }
        let frame = &bytes[pos..pos + frame_len];
        match frame_type {
            0x00 => {
                if frame.len() < 4 {
                    break;
                }
                match snap::raw::Decoder::new().decompress_vec(&frame[4..]) {
                    Ok(chunk) => out.extend_from_slice(&chunk),
                    Err(err) => return Err(ReaderError::Decompression(err.to_string())),
                }
            }
            0x01 => {
                if frame.len() < 4 {
                    break;
                }
                out.extend_from_slice(&frame[4..]);
            }
            _ => {}
        }
        pos += frame_len;
    }

    if out.is_empty() {
        return Err(ReaderError::Decompression("no frames decoded".to_string()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_snappy_roundtrips() {
        let original = b"hello era parser world".to_vec();
        let compressed = snap::raw::Encoder::new().compress_vec(&original).unwrap();
        let decoded = decompress_snappy_framed(&compressed).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn empty_input_fails() {
        assert!(decompress_snappy_framed(&[]).is_err());
    }
}
