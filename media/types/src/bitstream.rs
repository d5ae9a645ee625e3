/*!
    NAL unit framing.

    Encoded units travel in one of two framings: Annex-B, where every unit
    is preceded by a start code, and length-prefixed, where every unit is
    preceded by its size as a 4-byte big-endian integer. Elementary stream
    files use the former, MP4 samples and codec configuration the latter.
*/

/// The 4-byte start code written before every unit of a raw stream.
pub const START_CODE: [u8; 4] = [0, 0, 0, 1];

/// Size of the big-endian length prefix in length-prefixed framing.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/**
    Append `payload` with a 4-byte start code.
*/
pub fn push_annexb(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(payload);
}

/**
    Append `payload` with a 4-byte big-endian length prefix.

    # Panics

    Panics if the payload is larger than `u32::MAX` bytes.
*/
pub fn push_length_prefixed(out: &mut Vec<u8>, payload: &[u8]) {
    let len = u32::try_from(payload.len()).expect("NAL unit larger than 4 GiB");
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
}

/**
    Split an Annex-B byte stream into unit payloads.

    Accepts both 3- and 4-byte start codes. Bytes before the first start code
    are ignored, as are empty units.
*/
pub fn split_annexb(data: &[u8]) -> Vec<&[u8]> {
    let mut units = Vec::new();
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            if let Some(s) = start {
                let mut end = i;
                // A 4-byte start code leaves its leading zero on the previous unit
                if end > s && data[end - 1] == 0 {
                    end -= 1;
                }
                if end > s {
                    units.push(&data[s..end]);
                }
            }
            i += 3;
            start = Some(i);
        } else {
            i += 1;
        }
    }

    if let Some(s) = start
        && s < data.len()
    {
        units.push(&data[s..]);
    }

    units
}

/**
    Split a length-prefixed buffer into unit payloads.

    Returns None if a length runs past the end of the buffer.
*/
pub fn split_length_prefixed(data: &[u8]) -> Option<Vec<&[u8]>> {
    let mut units = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let (prefix, tail) = rest.split_at_checked(LENGTH_PREFIX_SIZE)?;
        let len = u32::from_be_bytes(prefix.try_into().ok()?) as usize;
        let (unit, tail) = tail.split_at_checked(len)?;
        units.push(unit);
        rest = tail;
    }

    Some(units)
}

/**
    Re-frame a length-prefixed buffer as Annex-B.
*/
pub fn length_prefixed_to_annexb(data: &[u8]) -> Option<Vec<u8>> {
    let units = split_length_prefixed(data)?;
    let mut out = Vec::with_capacity(data.len());
    for unit in units {
        push_annexb(&mut out, unit);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_four_and_three_byte_start_codes() {
        let data = [0, 0, 0, 1, 0x40, 0x01, 0, 0, 1, 0x42, 0x01, 0x02, 0, 0, 0, 1, 0x26];
        let units = split_annexb(&data);
        assert_eq!(units, vec![&[0x40, 0x01][..], &[0x42, 0x01, 0x02], &[0x26]]);
    }

    #[test]
    fn split_ignores_leading_garbage_and_empty_units() {
        let data = [0xFF, 0, 0, 1, 0, 0, 1, 0x02, 0xAA];
        assert_eq!(split_annexb(&data), vec![&[0x02, 0xAA][..]]);
        assert!(split_annexb(&[]).is_empty());
        assert!(split_annexb(&[0, 0, 0, 1]).is_empty());
    }

    #[test]
    fn length_prefix_is_big_endian() {
        let mut out = Vec::new();
        push_length_prefixed(&mut out, &[0xAB; 258]);
        assert_eq!(&out[..4], &[0, 0, 1, 2]);
        assert_eq!(out.len(), 262);
    }

    #[test]
    fn split_length_prefixed_rejects_truncated_input() {
        let mut out = Vec::new();
        push_length_prefixed(&mut out, &[1, 2, 3]);
        push_length_prefixed(&mut out, &[4]);
        assert_eq!(
            split_length_prefixed(&out),
            Some(vec![&[1, 2, 3][..], &[4]])
        );
        assert_eq!(split_length_prefixed(&out[..out.len() - 1]), None);
        assert_eq!(split_length_prefixed(&[0, 0]), None);
    }

    #[test]
    fn reframe_as_annexb() {
        let mut prefixed = Vec::new();
        push_length_prefixed(&mut prefixed, &[0x40, 0x01]);
        push_length_prefixed(&mut prefixed, &[0x42]);
        let annexb = length_prefixed_to_annexb(&prefixed).unwrap();
        assert_eq!(annexb, vec![0, 0, 0, 1, 0x40, 0x01, 0, 0, 0, 1, 0x42]);
    }
}
