/// Formats a byte slice as a `0x`-prefixed lowercase hex string, the
/// convention every root/signature/pubkey field in this crate uses instead
/// of a fixed-size byte array newtype (era bytes are read once and never
/// re-encoded, so there is no round-trip pressure to keep them typed).
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
