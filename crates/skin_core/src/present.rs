//! Display text for the result card and upload panel. Strings are Indonesian.

use crate::classifier::{ClassificationResult, SkinType};
use chrono::{DateTime, TimeZone};
use std::fmt;

/// Confidences strictly above this get the high-tier badge.
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.8;

pub const CLOSING_NOTE: &str = "Analisis selesai! Terima kasih telah memilih Jiabao Klinik \
sebagai mitra kesehatan anda. Layanan terbaik selalu menjadi prioritas kami.";

pub const DISCLAIMER: &str = "⚠️ Catatan Medis: Hasil ini adalah prediksi dari sistem AI dan \
harus dikonfirmasi oleh tenaga medis profesional.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
}

impl ConfidenceTier {
    pub fn for_confidence(confidence: f32) -> Self {
        if confidence > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else {
            ConfidenceTier::Medium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "Tinggi",
            ConfidenceTier::Medium => "Sedang",
        }
    }
}

pub fn skin_type_label(skin_type: SkinType) -> &'static str {
    match skin_type {
        SkinType::Dry => "Kulit Kering",
        SkinType::Normal => "Kulit Normal",
        SkinType::Oily => "Kulit Berminyak",
    }
}

/// Care tip shown under the result.
pub fn recommendation(skin_type: SkinType) -> &'static str {
    match skin_type {
        SkinType::Dry => "Gunakan pelembab yang kaya dan hindari pembersih yang terlalu keras.",
        SkinType::Normal => "Pertahankan rutinitas perawatan kulit yang seimbang.",
        SkinType::Oily => "Gunakan produk bebas minyak dan pembersih yang lembut.",
    }
}

/// Stage text next to the progress bar, by progress band.
pub fn progress_status(progress: u8) -> &'static str {
    match progress {
        0..30 => "Memproses gambar...",
        30..60 => "Mengekstrak fitur wajah...",
        60..90 => "Menjalankan Random Forest...",
        _ => "Menyelesaikan analisis...",
    }
}

/// Everything the result card shows, derived from one result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub title: &'static str,
    pub confidence_text: String,
    pub tier: ConfidenceTier,
    pub processed_at: String,
    pub recommendation: &'static str,
    pub note: &'static str,
}

impl ResultView {
    pub fn from_result(result: &ClassificationResult) -> Self {
        Self {
            title: skin_type_label(result.skin_type),
            confidence_text: format!(
                "Tingkat Kepercayaan: {:.1}%",
                f64::from(result.confidence) * 100.0
            ),
            tier: ConfidenceTier::for_confidence(result.confidence),
            processed_at: format!("Diproses pada: {}", result.timestamp),
            recommendation: recommendation(result.skin_type),
            note: CLOSING_NOTE,
        }
    }
}

/// Indonesian locale shape, e.g. `16/10/2026, 09.05.03`.
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.format("%-d/%-m/%Y, %H.%M.%S").to_string()
}

pub fn file_size_text(bytes: u64) -> String {
    format!("Ukuran: {:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

pub fn trigger_label(running: bool) -> &'static str {
    if running {
        "Menganalisis Jenis Kulit..."
    } else {
        "Analisis Jenis Kulit"
    }
}
