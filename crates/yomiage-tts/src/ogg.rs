//! Minimal Ogg demuxer for Opus streams.
//!
//! Splits an Ogg file into its packets by following the page lacing values,
//! joining packets that continue across pages, and drops the `OpusHead` and
//! `OpusTags` header packets so only audio packets remain. Page CRCs are not
//! verified; the input comes straight from a TLS-protected API response.

use thiserror::Error;

const CAPTURE_PATTERN: &[u8; 4] = b"OggS";
const HEADER_LEN: usize = 27;
const FLAG_CONTINUED: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OggError {
    #[error("Missing OggS capture pattern at byte {offset}")]
    BadCapturePattern { offset: usize },

    #[error("Unsupported Ogg stream structure version {version} at byte {offset}")]
    UnsupportedVersion { version: u8, offset: usize },

    #[error("Truncated Ogg page at byte {offset}")]
    Truncated { offset: usize },

    #[error("Stream ended inside a packet")]
    UnterminatedPacket,
}

/// Every packet of the stream, header packets included, in order.
pub fn raw_packets(data: &[u8]) -> Result<Vec<Vec<u8>>, OggError> {
    let mut packets = Vec::new();
    let mut partial: Vec<u8> = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let header = data
            .get(offset..offset + HEADER_LEN)
            .ok_or(OggError::Truncated { offset })?;
        if &header[..4] != CAPTURE_PATTERN {
            return Err(OggError::BadCapturePattern { offset });
        }
        if header[4] != 0 {
            return Err(OggError::UnsupportedVersion {
                version: header[4],
                offset,
            });
        }

        let flags = header[5];
        if flags & FLAG_CONTINUED == 0 && !partial.is_empty() {
            // A fresh page after an unfinished packet: the packet was lost.
            partial.clear();
        }

        let segment_count = usize::from(header[26]);
        let lacing_start = offset + HEADER_LEN;
        let lacing = data
            .get(lacing_start..lacing_start + segment_count)
            .ok_or(OggError::Truncated { offset })?;
        let body_len: usize = lacing.iter().map(|l| usize::from(*l)).sum();
        let body_start = lacing_start + segment_count;
        let body = data
            .get(body_start..body_start + body_len)
            .ok_or(OggError::Truncated { offset })?;

        let mut cursor = 0;
        for &lace in lacing {
            let len = usize::from(lace);
            partial.extend_from_slice(&body[cursor..cursor + len]);
            cursor += len;
            if lace < 255 {
                packets.push(std::mem::take(&mut partial));
            }
        }

        offset = body_start + body_len;
    }

    if !partial.is_empty() {
        return Err(OggError::UnterminatedPacket);
    }
    Ok(packets)
}

/// Audio packets of an Ogg/Opus stream.
pub fn packets(data: &[u8]) -> Result<Vec<Vec<u8>>, OggError> {
    Ok(raw_packets(data)?
        .into_iter()
        .filter(|p| !is_opus_header(p))
        .collect())
}

fn is_opus_header(packet: &[u8]) -> bool {
    packet.starts_with(b"OpusHead") || packet.starts_with(b"OpusTags")
}
