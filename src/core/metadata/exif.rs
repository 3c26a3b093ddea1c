//! Minimal JPEG/TIFF walker that extracts `DateTimeOriginal`.
//!
//! Only the bytes needed to reach tag `0x9003` are interpreted. Every read
//! is bounds-checked and a malformed buffer simply yields `None`.

use chrono::{NaiveDate, NaiveDateTime};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const APP1: u8 = 0xE1;
const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const FORMAT_ASCII: u16 = 2;
const IFD_ENTRY_LEN: usize = 12;

/// TIFF byte order, taken from the two-byte header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn from_header(header: &[u8]) -> Option<Self> {
        match header.get(0..2)? {
            b"II" => Some(ByteOrder::Little),
            b"MM" => Some(ByteOrder::Big),
            _ => None,
        }
    }

    fn u16_at(self, buf: &[u8], off: usize) -> Option<u16> {
        let bytes: [u8; 2] = buf.get(off..off.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn u32_at(self, buf: &[u8], off: usize) -> Option<u32> {
        let bytes: [u8; 4] = buf.get(off..off.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }
}

/// Extract the original capture timestamp from raw file bytes.
///
/// JPEG files are searched for their EXIF APP1 segment; anything else is
/// treated as a bare TIFF structure (TIFF and most RAW formats).
pub fn parse_capture_date(bytes: &[u8]) -> Option<NaiveDateTime> {
    if bytes.starts_with(&JPEG_SOI) {
        let tiff = find_exif_segment(bytes)?;
        return parse_tiff_date(tiff);
    }
    parse_tiff_date(bytes)
}

/// Walk JPEG marker segments until an APP1 segment with an EXIF signature.
fn find_exif_segment(jpeg: &[u8]) -> Option<&[u8]> {
    let mut pos = JPEG_SOI.len();

    loop {
        if *jpeg.get(pos)? != 0xFF {
            return None;
        }
        // Fill bytes: any number of 0xFF may precede the marker code
        while *jpeg.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        let marker = *jpeg.get(pos + 1)?;

        match marker {
            // EOI / SOS: no metadata after this point
            0xD9 | 0xDA => return None,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD8 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let len = ByteOrder::Big.u16_at(jpeg, pos + 2)? as usize;
        if len < 2 {
            return None;
        }
        let data_start = pos + 4;
        let data_end = pos.checked_add(2 + len)?;
        let data = jpeg.get(data_start..data_end)?;

        if marker == APP1 && data.starts_with(EXIF_SIGNATURE) {
            return Some(&data[EXIF_SIGNATURE.len()..]);
        }

        pos = data_end;
    }
}

/// Look for `DateTimeOriginal` in IFD0, then in the EXIF sub-IFD.
fn parse_tiff_date(tiff: &[u8]) -> Option<NaiveDateTime> {
    let order = ByteOrder::from_header(tiff)?;
    let ifd0 = order.u32_at(tiff, 4)? as usize;

    if let Some(date) = find_date_in_ifd(tiff, order, ifd0) {
        return Some(date);
    }

    let entry = find_entry(tiff, order, ifd0, TAG_EXIF_IFD_POINTER)?;
    let sub_ifd = order.u32_at(tiff, entry + 8)? as usize;
    find_date_in_ifd(tiff, order, sub_ifd)
}

fn find_date_in_ifd(tiff: &[u8], order: ByteOrder, ifd: usize) -> Option<NaiveDateTime> {
    let entry = find_entry(tiff, order, ifd, TAG_DATE_TIME_ORIGINAL)?;
    if order.u16_at(tiff, entry + 2)? != FORMAT_ASCII {
        return None;
    }
    let value = read_ascii(tiff, order, entry)?;
    parse_exif_datetime(value)
}

/// Offset of the first directory entry carrying `tag`.
fn find_entry(tiff: &[u8], order: ByteOrder, ifd: usize, tag: u16) -> Option<usize> {
    let count = order.u16_at(tiff, ifd)? as usize;
    let first = ifd.checked_add(2)?;

    (0..count)
        .map(|i| first + i * IFD_ENTRY_LEN)
        .take_while(|&off| off + IFD_ENTRY_LEN <= tiff.len())
        .find(|&off| order.u16_at(tiff, off) == Some(tag))
}

/// ASCII values of up to four bytes live inside the entry itself; longer
/// ones sit at an offset from the start of the TIFF structure.
fn read_ascii(tiff: &[u8], order: ByteOrder, entry: usize) -> Option<&[u8]> {
    let count = order.u32_at(tiff, entry + 4)? as usize;
    let start = if count <= 4 {
        entry + 8
    } else {
        order.u32_at(tiff, entry + 8)? as usize
    };
    tiff.get(start..start.checked_add(count)?)
}

/// Accept exactly `YYYY:MM:DD HH:MM:SS`, optionally NUL-terminated.
pub(crate) fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let value = match raw.iter().position(|&b| b == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    if value.len() != 19 {
        return None;
    }

    for (i, &b) in value.iter().enumerate() {
        let ok = match i {
            4 | 7 | 13 | 16 => b == b':',
            10 => b == b' ',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return None;
        }
    }

    let number = |range: std::ops::Range<usize>| -> u32 {
        value[range]
            .iter()
            .fold(0, |acc, &d| acc * 10 + u32::from(d - b'0'))
    };

    NaiveDate::from_ymd_opt(number(0..4) as i32, number(5..7), number(8..10))?.and_hms_opt(
        number(11..13),
        number(14..16),
        number(17..19),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &[u8] = b"2023:06:01 14:30:05\0";

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    /// Little builder for TIFF buffers in either byte order.
    struct Tiff {
        big: bool,
        buf: Vec<u8>,
    }

    impl Tiff {
        fn new(big: bool) -> Self {
            let mut t = Tiff { big, buf: Vec::new() };
            t.buf.extend_from_slice(if big { b"MM" } else { b"II" });
            t.u16(42);
            t.u32(8);
            t
        }

        fn u16(&mut self, v: u16) {
            let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
            self.buf.extend_from_slice(&b);
        }

        fn u32(&mut self, v: u32) {
            let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
            self.buf.extend_from_slice(&b);
        }

        /// IFD at offset 8 with the given entries: (tag, format, count, value/offset)
        fn ifd(&mut self, entries: &[(u16, u16, u32, u32)]) {
            self.u16(entries.len() as u16);
            for &(tag, format, count, value) in entries {
                self.u16(tag);
                self.u16(format);
                self.u32(count);
                self.u32(value);
            }
            self.u32(0);
        }

        fn offset(&self) -> u32 {
            self.buf.len() as u32
        }
    }

    fn tiff_with_date_in_ifd0(big: bool) -> Vec<u8> {
        let mut t = Tiff::new(big);
        // 2 (count) + 12 (entry) + 4 (next) after the 8-byte header
        let value_offset = 8 + 2 + 12 + 4;
        t.ifd(&[(TAG_DATE_TIME_ORIGINAL, FORMAT_ASCII, DATE.len() as u32, value_offset)]);
        assert_eq!(t.offset(), value_offset);
        t.buf.extend_from_slice(DATE);
        t.buf
    }

    fn tiff_with_date_in_sub_ifd(big: bool) -> Vec<u8> {
        let mut t = Tiff::new(big);
        let sub_ifd = 8 + 2 + 12 + 4;
        t.ifd(&[(TAG_EXIF_IFD_POINTER, 4, 1, sub_ifd)]);
        let value_offset = sub_ifd + 2 + 12 + 4;
        t.ifd(&[(TAG_DATE_TIME_ORIGINAL, FORMAT_ASCII, DATE.len() as u32, value_offset)]);
        t.buf.extend_from_slice(DATE);
        t.buf
    }

    fn jpeg_wrapping(tiff: &[u8]) -> Vec<u8> {
        let mut v = JPEG_SOI.to_vec();
        // APP0 JFIF segment first
        v.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x07, b'J', b'F', b'I', b'F', 0x00]);
        let mut app1 = EXIF_SIGNATURE.to_vec();
        app1.extend_from_slice(tiff);
        v.extend_from_slice(&[0xFF, APP1]);
        v.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
        v.extend_from_slice(&app1);
        v.extend_from_slice(&[0xFF, 0xD9]);
        v
    }

    #[test]
    fn parses_little_endian_ifd0() {
        assert_eq!(parse_capture_date(&tiff_with_date_in_ifd0(false)), Some(expected()));
    }

    #[test]
    fn parses_big_endian_ifd0() {
        assert_eq!(parse_capture_date(&tiff_with_date_in_ifd0(true)), Some(expected()));
    }

    #[test]
    fn follows_exif_sub_ifd_pointer() {
        assert_eq!(parse_capture_date(&tiff_with_date_in_sub_ifd(false)), Some(expected()));
        assert_eq!(parse_capture_date(&tiff_with_date_in_sub_ifd(true)), Some(expected()));
    }

    #[test]
    fn finds_exif_inside_jpeg() {
        let jpeg = jpeg_wrapping(&tiff_with_date_in_sub_ifd(true));
        assert_eq!(parse_capture_date(&jpeg), Some(expected()));
    }

    #[test]
    fn skips_fill_bytes_standalone_markers_and_xmp() {
        let mut jpeg = JPEG_SOI.to_vec();
        jpeg.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xD0]);
        jpeg.extend_from_slice(&[0xFF, 0x01]);

        let mut xmp = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
        xmp.extend_from_slice(b"<x:xmpmeta/>");
        jpeg.extend_from_slice(&[0xFF, 0xFF, APP1]);
        jpeg.extend_from_slice(&((xmp.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(&xmp);

        // Rest of the stream after the SOI
        jpeg.extend_from_slice(&jpeg_wrapping(&tiff_with_date_in_ifd0(false))[2..]);

        assert_eq!(parse_capture_date(&jpeg), Some(expected()));
    }

    #[test]
    fn jpeg_without_exif_has_no_date() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xD9];
        assert_eq!(parse_capture_date(&jpeg), None);
    }

    #[test]
    fn short_ascii_value_is_read_inline() {
        // Inline storage is exercised through the reader directly: a 3-byte
        // value sits in the entry's value field.
        let mut t = Tiff::new(false);
        t.ifd(&[(TAG_DATE_TIME_ORIGINAL, FORMAT_ASCII, 3, u32::from_le_bytes(*b"ab\0\0"))]);
        let order = ByteOrder::Little;
        let entry = find_entry(&t.buf, order, 8, TAG_DATE_TIME_ORIGINAL).unwrap();
        assert_eq!(read_ascii(&t.buf, order, entry), Some(&b"ab\0"[..]));
        // Too short to be a timestamp
        assert_eq!(parse_capture_date(&t.buf), None);
    }

    #[test]
    fn non_ascii_format_is_ignored() {
        let mut t = Tiff::new(false);
        let value_offset = 8 + 2 + 12 + 4;
        t.ifd(&[(TAG_DATE_TIME_ORIGINAL, 7, DATE.len() as u32, value_offset)]);
        t.buf.extend_from_slice(DATE);
        assert_eq!(parse_capture_date(&t.buf), None);
    }

    #[test]
    fn unknown_byte_order_fails() {
        let mut buf = tiff_with_date_in_ifd0(false);
        buf[0] = b'X';
        assert_eq!(parse_capture_date(&buf), None);
    }

    #[test]
    fn truncated_and_garbage_buffers_fail_quietly() {
        let full = tiff_with_date_in_ifd0(true);
        for len in 0..full.len() {
            // Any prefix that cuts the value short must not panic
            let _ = parse_capture_date(&full[..len]);
        }
        assert_eq!(parse_capture_date(&full[..full.len() - 5]), None);
        assert_eq!(parse_capture_date(b"this is not an image"), None);
        assert_eq!(parse_capture_date(&[0xFF, 0xD8, 0xFF]), None);
    }

    #[test]
    fn out_of_range_offsets_fail() {
        let mut t = Tiff::new(false);
        t.ifd(&[(TAG_DATE_TIME_ORIGINAL, FORMAT_ASCII, 20, 0xFFFF_FF00)]);
        assert_eq!(parse_capture_date(&t.buf), None);
    }

    #[test]
    fn datetime_pattern_is_strict() {
        assert_eq!(parse_exif_datetime(b"2023:06:01 14:30:05"), Some(expected()));
        assert_eq!(parse_exif_datetime(DATE), Some(expected()));
        assert_eq!(parse_exif_datetime(b"2023-06-01 14:30:05"), None);
        assert_eq!(parse_exif_datetime(b"2023:06:01T14:30:05"), None);
        assert_eq!(parse_exif_datetime(b"    :  :     :  :  "), None);
        assert_eq!(parse_exif_datetime(b"0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_datetime(b"2023:13:01 00:00:00"), None);
    }
}
