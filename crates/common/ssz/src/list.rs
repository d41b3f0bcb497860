use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::primitives::read_u32_le;

/// Counts tolerance paths taken by [`parse_ssz_list`] (truncated fixed-size
/// lists, malformed offset tables falling back to a single-item parse,
/// out-of-bounds offset-table entries). A caller processing one era can
/// snapshot this around the call to surface "how much did we have to
/// tolerate" without plumbing a counter through every parser signature.
static FALLBACK_COUNT: AtomicU64 = AtomicU64::new(0);

/// Current process-wide fallback-path count.
pub fn fallback_count() -> u64 {
    FALLBACK_COUNT.load(Ordering::Relaxed)
}

/// Resets the fallback-path counter, typically before processing one era.
pub fn reset_fallback_count() {
    FALLBACK_COUNT.store(0, Ordering::Relaxed);
}

fn record_fallback() {
    FALLBACK_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Describes how to decode one item of an SSZ list.
///
/// This is the data-driven replacement for a self-describing "does this
/// parser have a fixed size" attribute: the tag itself carries the answer,
/// and [`parse_ssz_list`] branches on it once instead of probing.
pub enum ItemParser<'a, T> {
    /// Every item occupies exactly `size` bytes.
    Fixed {
        size: usize,
        parse: Box<dyn Fn(&[u8]) -> Option<T> + 'a>,
    },
    /// Items are laid out behind an offset table.
    Variable {
        parse: Box<dyn Fn(&[u8]) -> Option<T> + 'a>,
    },
}

impl<'a, T> ItemParser<'a, T> {
    pub fn fixed(size: usize, parse: impl Fn(&[u8]) -> Option<T> + 'a) -> Self {
        ItemParser::Fixed {
            size,
            parse: Box::new(parse),
        }
    }

    pub fn variable(parse: impl Fn(&[u8]) -> Option<T> + 'a) -> Self {
        ItemParser::Variable {
            parse: Box::new(parse),
        }
    }
}

/// Decodes an SSZ-encoded list of items out of `buf`.
///
/// Malformed items are dropped rather than treated as fatal: a single
/// corrupted attestation must not take down an otherwise-healthy block.
pub fn parse_ssz_list<T>(buf: &[u8], item_parser: &ItemParser<'_, T>, field_name: &str) -> Vec<T> {
    match item_parser {
        ItemParser::Fixed { size, parse } => parse_fixed_list(buf, *size, parse, field_name),
        ItemParser::Variable { parse } => parse_variable_list(buf, parse, field_name),
    }
}

fn parse_fixed_list<T>(
    buf: &[u8],
    size: usize,
    parse: &dyn Fn(&[u8]) -> Option<T>,
    field_name: &str,
) -> Vec<T> {
    if size == 0 || buf.is_empty() {
        return Vec::new();
    }
    let count = buf.len() / size;
    if buf.len() % size != 0 {
        record_fallback();
        warn!(
            field = field_name,
            len = buf.len(),
            size,
            "fixed-size list length is not a multiple of item size, truncating"
        );
    }
    (0..count)
        .filter_map(|i| parse(&buf[i * size..(i + 1) * size]))
        .collect()
}

fn parse_variable_list<T>(
    buf: &[u8],
    parse: &dyn Fn(&[u8]) -> Option<T>,
    field_name: &str,
) -> Vec<T> {
    if buf.len() < 4 {
        return parse(buf).into_iter().collect();
    }

    let first_offset = read_u32_le(buf, 0) as usize;

    if first_offset == 0 {
        return parse(buf).into_iter().collect();
    }
    if first_offset == buf.len() {
        return Vec::new();
    }
    if first_offset % 4 != 0 || first_offset < 4 {
        record_fallback();
        warn!(
            field = field_name,
            first_offset, "malformed offset table, falling back to single-item parse"
        );
        return parse(buf).into_iter().collect();
    }

    let num_items = first_offset / 4;
    let mut offsets = Vec::with_capacity(num_items);
    for i in 0..num_items {
        let offset = read_u32_le(buf, i * 4) as usize;
        if offset > buf.len() {
            record_fallback();
            warn!(field = field_name, offset, len = buf.len(), "offset table entry out of bounds, skipping item");
            continue;
        }
        offsets.push(offset);
    }

    let mut items = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets
            .iter()
            .skip(i + 1)
            .copied()
            .find(|&o| o >= start)
            .unwrap_or(buf.len());
        if start > end || end > buf.len() {
            continue;
        }
        if let Some(item) = parse(&buf[start..end]) {
            items.push(item);
        }
    }
    items
}

/// Encodes `items` as a variable-size SSZ list whose items are each a
/// single byte, for use by the round-trip property test below. Not used
/// by production code: the era format is read-only, so nothing in this
/// crate ever needs to produce offset tables, only consume them.
#[cfg(test)]
fn encode_single_byte_list(items: &[u8]) -> Vec<u8> {
    let table_len = items.len() * 4;
    let mut buf = Vec::with_capacity(table_len + items.len());
    for i in 0..items.len() {
        let offset = (table_len + i) as u32;
        buf.extend_from_slice(&offset.to_le_bytes());
    }
    buf.extend_from_slice(items);
    buf
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tracing_test::traced_test;

    use super::*;

    fn parse_u8(bytes: &[u8]) -> Option<u8> {
        bytes.first().copied()
    }

    proptest! {
        #[test]
        fn variable_list_round_trips_through_offset_table(items in prop::collection::vec(any::<u8>(), 1..64)) {
            let encoded = encode_single_byte_list(&items);
            let parser = ItemParser::variable(parse_u8);
            let decoded = parse_ssz_list(&encoded, &parser, "test");
            prop_assert_eq!(decoded, items);
        }
    }

    #[test]
    fn fixed_list_decodes_every_item() {
        let buf = [1u8, 2, 3, 4];
        let parser = ItemParser::fixed(2, |bytes: &[u8]| bytes.first().copied());
        let items = parse_ssz_list(&buf, &parser, "test");
        assert_eq!(items, vec![1, 3]);
    }

    #[test]
    fn fixed_list_truncates_on_remainder() {
        let buf = [1u8, 2, 3];
        let parser = ItemParser::fixed(2, |bytes: &[u8]| bytes.first().copied());
        let items = parse_ssz_list(&buf, &parser, "test");
        assert_eq!(items, vec![1]);
    }

    #[test]
    fn variable_list_empty_when_first_offset_is_buf_len() {
        let buf = 4u32.to_le_bytes();
        let parser = ItemParser::variable(parse_u8);
        let items = parse_ssz_list(&buf, &parser, "test");
        assert!(items.is_empty());
    }

    #[test]
    fn variable_list_short_buffer_is_single_item() {
        let buf = [7u8, 8];
        let parser = ItemParser::variable(parse_u8);
        let items = parse_ssz_list(&buf, &parser, "test");
        assert_eq!(items, vec![7]);
    }

    #[test]
    fn variable_list_decodes_offset_table() {
        // two items: offsets [8, 9], buf length 10
        let mut buf = Vec::new();
        buf.extend_from_slice(&8u32.to_le_bytes());
        buf.extend_from_slice(&9u32.to_le_bytes());
        buf.push(0xaa);
        buf.push(0xbb);
        let parser = ItemParser::variable(parse_u8);
        let items = parse_ssz_list(&buf, &parser, "test");
        assert_eq!(items, vec![0xaa, 0xbb]);
    }

    #[test]
    fn variable_list_malformed_offset_falls_back_to_single_item() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes()); // not a multiple of 4
        buf.push(0xcc);
        let parser = ItemParser::variable(parse_u8);
        let items = parse_ssz_list(&buf, &parser, "test");
        assert_eq!(items.len(), 1);
    }

    #[traced_test]
    #[test]
    fn malformed_offset_table_warns_and_increments_fallback_count() {
        reset_fallback_count();
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.push(0xcc);
        let parser = ItemParser::variable(parse_u8);
        let before = fallback_count();
        parse_ssz_list(&buf, &parser, "attestations");
        assert_eq!(fallback_count(), before + 1);
        assert!(logs_contain("malformed offset table"));
        assert!(logs_contain("attestations"));
    }
}
