//! Very High Throughput (VHT) MIMO Control field
//!
//! This module defines types and handles extraction of the 3-byte VHT MIMO
//! Control field that opens a VHT Compressed Beamforming report, plus the
//! quantities derived from it (subcarrier count, angle count, angle bit
//! widths) that govern how the rest of the report is parsed.
use bilge::prelude::*;

use crate::errors::FeedbackError;

/// Bandwidth enum corresponding to the index in the VHT MIMO Control field
#[bitsize(2)]
#[derive(FromBits, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Bandwidth {
    Bw20,
    Bw40,
    Bw80,
    Bw160,
}

impl Bandwidth {
    /// Channel bandwidth in Megahertz
    pub fn to_mhz(self) -> u16 {
        // Each index doubles the previous bandwidth, starting at 20 MHz
        (2 << (self as u16)) * 10
    }

    /// Channel bandwidth in Hertz
    pub fn to_hz(self) -> u32 {
        self.to_mhz() as u32 * 1_000_000
    }
}

/// VHT MIMO Control field (IEEE 802.11ac, 3 bytes, LSB first)
#[bitsize(24)]
#[derive(FromBits, DebugBits)]
pub struct VhtMimoControl {
    pub bandwidth: Bandwidth,  // Channel bandwidth index
    pub nr_index: u3,          // Index for number of rows (TX antennas)
    pub nc_index: u3,          // Index for number of columns (space-time streams)
    pub first_segment: u1,     // Whether this is the first (or only) feedback segment
    pub remaining_segments: u3, // Number of remaining feedback segments
    pub feedback_type: u1,     // Feedback type (0 = SU, 1 = MU)
    pub codebook_info: u1,     // Codebook size selector
    pub grouping: u2,          // Subcarrier grouping Ng
    pub sounding_token: u6,    // Sounding dialog token number
    pub reserved: u2,          // Reserved padding
}

impl VhtMimoControl {
    /// Extract the VHT MIMO Control field from the report bytestream
    /// (requires the first 3 bytes).
    pub fn from_buf(buf: &[u8]) -> Result<Self, FeedbackError> {
        if buf.len() < 3 {
            return Err(FeedbackError::TruncatedFrame {
                required: 3,
                available: buf.len(),
            });
        }

        let value: UInt<u32, 24> = UInt::<u32, 24>::new(
            (buf[0] as u32) | ((buf[1] as u32) << 8) | ((buf[2] as u32) << 16),
        );
        Ok(VhtMimoControl::from(value))
    }

    /// Reserved padding bits (bilge renames `reserved` fields to `reserved_i`)
    pub fn reserved(&self) -> UInt<u8, 2> {
        self.reserved_i()
    }

    /// Number of rows in the steering matrix (TX antennas at the beamformer)
    pub fn num_rows(&self) -> usize {
        u8::from(self.nr_index()) as usize + 1
    }

    /// Number of columns in the steering matrix (space-time streams)
    pub fn num_cols(&self) -> usize {
        u8::from(self.nc_index()) as usize + 1
    }

    /// Number of subcarriers carrying feedback, from bandwidth and grouping.
    pub fn num_subcarriers(&self) -> Result<usize, FeedbackError> {
        let ng = u8::from(self.grouping());
        let ns = match (self.bandwidth(), ng) {
            (Bandwidth::Bw20, 0) => 52,
            (Bandwidth::Bw20, 1) => 30,
            (Bandwidth::Bw20, 2) => 16,
            (Bandwidth::Bw40, 0) => 108,
            (Bandwidth::Bw40, 1) => 58,
            (Bandwidth::Bw40, 2) => 30,
            (Bandwidth::Bw80, 0) => 234,
            (Bandwidth::Bw80, 1) => 122,
            (Bandwidth::Bw80, 2) => 62,
            (Bandwidth::Bw160, 0) => 468,
            (Bandwidth::Bw160, 1) => 124,
            (Bandwidth::Bw160, 2) => 244,
            _ => {
                return Err(FeedbackError::InvalidConfiguration {
                    table: "num_subcarriers",
                    key: format!("bw={} MHz, ng={}", self.bandwidth().to_mhz(), ng),
                })
            }
        };
        Ok(ns)
    }

    /// Bit width of a quantized phi angle.
    pub fn phi_size(&self) -> u8 {
        match (u8::from(self.feedback_type()), u8::from(self.codebook_info())) {
            (0, 0) => 4,
            (0, _) => 6,
            (_, 0) => 7,
            (_, _) => 9,
        }
    }

    /// Bit width of a quantized psi angle.
    pub fn psi_size(&self) -> u8 {
        match (u8::from(self.feedback_type()), u8::from(self.codebook_info())) {
            (0, 0) => 2,
            (0, _) => 4,
            (_, 0) => 5,
            (_, _) => 7,
        }
    }

    /// Number of angle slots emitted per subcarrier.
    ///
    /// The angle-count table assumes `num_rows >= num_cols`; configurations
    /// violating that are rejected rather than misparsed.
    pub fn num_angles(&self) -> Result<usize, FeedbackError> {
        let (rows, cols) = (self.num_rows(), self.num_cols());
        if rows < cols {
            return Err(FeedbackError::InvalidConfiguration {
                table: "num_angles",
                key: format!("num_rows={rows}, num_cols={cols}"),
            });
        }
        if rows == 2 {
            return Ok(2);
        }
        let na = match (rows, cols) {
            (3, 1) => 4,
            (3, 2) | (3, 3) => 6,
            (4, 1) => 6,
            (4, 2) => 10,
            (4, 3) | (4, 4) => 12,
            _ => {
                return Err(FeedbackError::InvalidConfiguration {
                    table: "num_angles",
                    key: format!("num_rows={rows}, num_cols={cols}"),
                })
            }
        };
        Ok(na)
    }
}
