//! Frame-level decoding of compressed beamforming action frames.
//!
//! Entry point for the library: takes the action frame body (category byte
//! onward, as handed over by whatever parsed the management frame) and
//! produces the fully decoded report. Decoding is all-or-nothing; on any
//! error no partial result is exposed.
use crate::bfa_to_v::{reconstruct_steering_matrix, SteeringMatrix};
use crate::errors::FeedbackError;
use crate::extraction::{extract_feedback, ExtractionConfig};
use crate::vht_mimo_ctrl::VhtMimoControl;

/// Action frame category carrying a VHT compressed beamforming report.
pub const CATEGORY_VHT: u8 = 0x15;
/// Action frame category of the HE (802.11ax) variant. Recognized on the
/// wire but not decodable by this library.
pub const CATEGORY_HE: u8 = 0x1e;

/// Antenna/codebook context of a decoded report.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub bandwidth: u16,
    pub num_rows: u8,
    pub num_cols: u8,
    pub codebook_info: u8,
    pub feedback_type: u8,
    pub sounding_token: u8,
}

impl ReportMetadata {
    pub fn from_mimo_ctrl(ctrl: &VhtMimoControl) -> Self {
        Self {
            bandwidth: ctrl.bandwidth().to_mhz(),
            num_rows: ctrl.num_rows() as u8,
            num_cols: ctrl.num_cols() as u8,
            codebook_info: ctrl.codebook_info().into(),
            feedback_type: ctrl.feedback_type().into(),
            sounding_token: ctrl.sounding_token().into(),
        }
    }
}

/// A decoded VHT compressed beamforming report.
#[derive(Debug, Clone)]
pub struct VhtFeedback {
    pub metadata: ReportMetadata,
    /// Per-column average SNR in dB (`num_cols` entries).
    pub asnr: Vec<f64>,
    /// Decoded angles in radians, one list per subcarrier, in wire order.
    pub angles: Vec<Vec<f64>>,
}

impl VhtFeedback {
    /// Rebuild the complex steering matrices from the decoded angles,
    /// shaped `[num_subcarriers, num_rows, num_cols]`.
    pub fn steering_matrix(&self) -> Result<SteeringMatrix, FeedbackError> {
        reconstruct_steering_matrix(
            &self.angles,
            self.metadata.num_rows as usize,
            self.metadata.num_cols as usize,
        )
    }
}

/// Decode a compressed beamforming action frame body.
///
/// `buf` starts at the category byte. Only the VHT category is supported;
/// anything else (including HE) fails with [`FeedbackError::UnknownCategory`].
pub fn decode_frame(buf: &[u8]) -> Result<VhtFeedback, FeedbackError> {
    if buf.len() < 2 {
        return Err(FeedbackError::TruncatedFrame {
            required: 2,
            available: buf.len(),
        });
    }

    let category = buf[0];
    if category != CATEGORY_VHT {
        return Err(FeedbackError::UnknownCategory { category });
    }
    // buf[1] is the action code; present on the wire but not interpreted.

    let ctrl = VhtMimoControl::from_buf(&buf[2..])?;
    let config = ExtractionConfig::from_mimo_ctrl(&ctrl)?;
    log::debug!(
        "Decoding VHT report: {}x{} antennas, {} MHz, {} subcarrier(s)",
        config.num_rows,
        config.num_cols,
        ctrl.bandwidth().to_mhz(),
        config.num_subcarriers
    );

    let (asnr, angles) = extract_feedback(&config, &buf[5..])?;
    Ok(VhtFeedback {
        metadata: ReportMetadata::from_mimo_ctrl(&ctrl),
        asnr,
        angles,
    })
}
