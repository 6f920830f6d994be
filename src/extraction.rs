//! Compressed beamforming angle extraction.
//!
//! The angles of a VHT report are packed back-to-back as variable-width
//! fields with no byte alignment. Which fields appear, in which order and
//! at which widths is fully determined by the MIMO Control field: this
//! module owns the angle representation table, the bit-level reader and
//! the quantized-angle decoding.
use std::f64::consts::PI;

use crate::errors::FeedbackError;
use crate::vht_mimo_ctrl::VhtMimoControl;

const ANGLE_UNUSED: u8 = 0;
const ANGLE_PSI: u8 = 1;
const ANGLE_PHI: u8 = 2;

/// Per-configuration angle type sequence (0 = unused, 1 = psi, 2 = phi).
///
/// Row selection is the antenna-count index computed in [`angle_pattern`];
/// each row lists, in wire order, the type of every angle slot emitted per
/// subcarrier.
static ANGLE_REPRESENTATION_TABLE: [[u8; 12]; 9] = [
    [2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0],
    [2, 2, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 1, 1, 1, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 1, 1, 1, 2, 2, 1, 1, 0, 0],
    [2, 2, 2, 1, 1, 1, 2, 2, 1, 1, 2, 1],
    [2, 2, 2, 1, 1, 1, 2, 2, 1, 1, 2, 1],
];

/// Select the angle type sequence for an antenna configuration.
///
/// The index formula requires `num_rows >= num_cols`; anything that lands
/// outside the table is rejected as an invalid configuration.
pub fn angle_pattern(
    num_rows: usize,
    num_cols: usize,
) -> Result<&'static [u8; 12], FeedbackError> {
    let (rows, cols) = (num_rows as i64, num_cols as i64);
    let row = ((2 + cols) * (cols - 2)) / 2 + rows - 1;

    usize::try_from(row)
        .ok()
        .and_then(|idx| ANGLE_REPRESENTATION_TABLE.get(idx))
        .ok_or_else(|| FeedbackError::InvalidConfiguration {
            table: "angle_representation",
            key: format!("num_rows={num_rows}, num_cols={num_cols}"),
        })
}

/// Parse-relevant parameters derived once from the MIMO Control field.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub num_rows: usize,
    pub num_cols: usize,
    pub num_subcarriers: usize,
    pub num_angles: usize,
    pub phi_size: u8,
    pub psi_size: u8,
    pattern: &'static [u8; 12],
}

impl ExtractionConfig {
    pub fn from_mimo_ctrl(ctrl: &VhtMimoControl) -> Result<Self, FeedbackError> {
        Ok(Self {
            num_rows: ctrl.num_rows(),
            num_cols: ctrl.num_cols(),
            num_subcarriers: ctrl.num_subcarriers()?,
            num_angles: ctrl.num_angles()?,
            phi_size: ctrl.phi_size(),
            psi_size: ctrl.psi_size(),
            pattern: angle_pattern(ctrl.num_rows(), ctrl.num_cols())?,
        })
    }
}

/// Dequantize a psi angle to radians.
pub fn decode_psi(raw: u16, size: u8) -> f64 {
    raw as f64 * PI / (1u64 << (size + 1)) as f64 + PI / (1u64 << (size + 2)) as f64
}

/// Dequantize a phi angle to radians.
pub fn decode_phi(raw: u16, size: u8) -> f64 {
    raw as f64 * PI / (1u64 << (size - 1)) as f64 + PI / (1u64 << size) as f64
}

/// Average SNR byte to dB (two's complement, 0.25 dB steps from -10 dB).
fn parse_asnr(byte: u8) -> f64 {
    let mut value = byte as i32;
    if value > 128 {
        value -= 256;
    }
    -10.0 + (value + 128) as f64 * 0.25
}

/// LSB-first reader over the packed angle bitstream.
///
/// Holds a widening bit window refilled in 16-bit little-endian chunks
/// (one byte for an odd-length tail). Every refill is bounds-checked, so
/// running off the end of the payload surfaces as `TruncatedFrame` instead
/// of reading garbage.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    window: u32,
    bits: u8,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            window: 0,
            bits: 0,
        }
    }

    /// Extract the next `size` bits, least significant first.
    fn read(&mut self, size: u8) -> Result<u16, FeedbackError> {
        while self.bits < size {
            self.refill()?;
        }
        let value = (self.window & ((1u32 << size) - 1)) as u16;
        self.window >>= size;
        self.bits -= size;
        Ok(value)
    }

    fn refill(&mut self) -> Result<(), FeedbackError> {
        match self.data.len() - self.pos {
            0 => Err(FeedbackError::TruncatedFrame {
                required: 1,
                available: 0,
            }),
            1 => {
                self.window |= (self.data[self.pos] as u32) << self.bits;
                self.pos += 1;
                self.bits += 8;
                Ok(())
            }
            _ => {
                let chunk = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
                self.window |= (chunk as u32) << self.bits;
                self.pos += 2;
                self.bits += 16;
                Ok(())
            }
        }
    }
}

/// Extract per-column average SNRs and per-subcarrier angle sequences from
/// the report payload (everything after the MIMO Control field).
///
/// Angles come back in radians, in wire order per subcarrier. Slots the
/// representation table marks unused carry no bits and emit no angle.
pub fn extract_feedback(
    config: &ExtractionConfig,
    payload: &[u8],
) -> Result<(Vec<f64>, Vec<Vec<f64>>), FeedbackError> {
    if payload.len() < config.num_cols {
        return Err(FeedbackError::TruncatedFrame {
            required: config.num_cols,
            available: payload.len(),
        });
    }
    let asnr: Vec<f64> = payload[..config.num_cols]
        .iter()
        .map(|&b| parse_asnr(b))
        .collect();

    let mut reader = BitReader::new(&payload[config.num_cols..]);
    let mut angles = Vec::with_capacity(config.num_subcarriers);
    for _ in 0..config.num_subcarriers {
        let mut subcarrier = Vec::with_capacity(config.num_angles);
        for &code in &config.pattern[..config.num_angles] {
            match code {
                ANGLE_PSI => {
                    let raw = reader.read(config.psi_size)?;
                    subcarrier.push(decode_psi(raw, config.psi_size));
                }
                ANGLE_PHI => {
                    let raw = reader.read(config.phi_size)?;
                    subcarrier.push(decode_phi(raw, config.phi_size));
                }
                _ => debug_assert_eq!(code, ANGLE_UNUSED),
            }
        }
        angles.push(subcarrier);
    }

    log::trace!(
        "Extracted {} ASNR value(s) and angles for {} subcarrier(s)",
        asnr.len(),
        angles.len()
    );
    Ok((asnr, angles))
}
