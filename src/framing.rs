//! Wire framing for encoded payloads.

use crate::error::SenderError;

/// Default maximum payload size (in bytes) accepted for a single frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB

/// How an encoded payload is delimited on the stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameFormat {
    /// Payload followed by a single NUL byte, as GELF TCP inputs expect.
    #[default]
    NullDelimited,
    /// Big-endian `u32` length prefix followed by the payload.
    LengthPrefixed,
}

impl FrameFormat {
    /// Frame `payload`, rejecting payloads larger than `max_size`.
    pub fn frame(self, payload: &[u8], max_size: usize) -> Result<Vec<u8>, SenderError> {
        let too_large = || SenderError::FrameTooLarge {
            size: payload.len(),
            max: max_size,
        };
        if payload.len() > max_size {
            return Err(too_large());
        }
        match self {
            FrameFormat::NullDelimited => {
                // An embedded NUL would split the frame on the collector side.
                if payload.contains(&0) {
                    return Err(SenderError::Validation);
                }
                let mut framed = Vec::with_capacity(payload.len() + 1);
                framed.extend_from_slice(payload);
                framed.push(0);
                Ok(framed)
            }
            FrameFormat::LengthPrefixed => {
                let len = u32::try_from(payload.len()).map_err(|_| too_large())?;
                let capacity = payload.len().checked_add(4).ok_or_else(too_large)?;
                let mut framed = Vec::with_capacity(capacity);
                framed.extend(len.to_be_bytes());
                framed.extend_from_slice(payload);
                Ok(framed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FrameFormat::NullDelimited)]
    #[case(FrameFormat::LengthPrefixed)]
    fn frame_enforces_limit(#[case] format: FrameFormat) {
        let payload = vec![1u8; 32];
        let err = format.frame(&payload, 16).expect_err("payload over limit");
        assert!(matches!(err, SenderError::FrameTooLarge { size: 32, max: 16 }));
    }

    #[rstest]
    fn length_prefix_is_big_endian() {
        let payload = vec![1u8, 2, 3];
        let framed = FrameFormat::LengthPrefixed
            .frame(&payload, 16)
            .expect("payload fits frame");
        assert_eq!(&framed[..4], &3u32.to_be_bytes());
        assert_eq!(&framed[4..], payload);
    }

    #[rstest]
    fn null_delimited_appends_terminator() {
        let framed = FrameFormat::NullDelimited
            .frame(b"{}", 16)
            .expect("payload fits frame");
        assert_eq!(framed, b"{}\0");
    }

    #[rstest]
    fn null_delimited_rejects_embedded_nul() {
        let err = FrameFormat::NullDelimited
            .frame(b"a\0b", 16)
            .expect_err("embedded NUL must be rejected");
        assert!(matches!(err, SenderError::Validation));
    }
}
