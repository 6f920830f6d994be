//! Decoder for IEEE 802.11ac (VHT) NDP sounding feedback.
//!
//! Takes the body of a captured "VHT Compressed Beamforming" action frame
//! and recovers the per-column average SNRs, the compressed phi/psi angles
//! and the per-subcarrier complex steering matrices V. Capture, management
//! header parsing and persistence are left to the caller.
mod bfa_to_v;
mod errors;
mod extraction;
mod report;
mod vht_mimo_ctrl;

// Public re-export
pub use crate::bfa_to_v::{
    reconstruct_steering_matrix, reconstruct_subcarrier, required_angle_count, SteeringMatrix,
};
pub use crate::errors::FeedbackError;
pub use crate::extraction::{
    angle_pattern, decode_phi, decode_psi, extract_feedback, ExtractionConfig,
};
pub use crate::report::{decode_frame, ReportMetadata, VhtFeedback, CATEGORY_HE, CATEGORY_VHT};
pub use crate::vht_mimo_ctrl::{Bandwidth, VhtMimoControl};
