// Amateur Radio Band Definitions
// Reference: ARRL Band Plan, contest band labels (meters without unit)
//
// This module maps raw radio readings (Hz) to band labels and provides the
// default operating frequency for each band when no radio is connected.

/// Label used when a reading is not numeric or falls outside every band
pub const UNKNOWN_BAND: &str = "0";

/// (low Hz, high Hz, label). Both ends are exclusive. Ranges must not overlap
/// and are kept in ascending order.
const BAND_EDGES: &[(u64, u64, &str)] = &[
    (1_800_000, 2_000_000, "160"),
    (3_500_000, 4_000_000, "80"),
    (5_330_000, 5_406_000, "60"),
    (7_000_000, 7_300_000, "40"),
    (10_100_000, 10_150_000, "30"),
    (14_000_000, 14_350_000, "20"),
    (18_068_000, 18_168_000, "17"),
    (21_000_000, 21_450_000, "15"),
    (24_890_000, 24_990_000, "12"),
    (28_000_000, 29_700_000, "10"),
    (50_000_000, 54_000_000, "6"),
    (144_000_000, 148_000_000, "2"),
];

/// Frequency logged when the operator picks a band by hand
const DEFAULT_FREQS: &[(&str, &str)] = &[
    ("160", "1830000"),
    ("80", "3530000"),
    ("60", "5340000"),
    ("40", "7030000"),
    ("20", "14030000"),
    ("15", "21030000"),
    ("10", "28030000"),
    ("6", "50030000"),
    ("2", "144030000"),
    ("222", "222030000"),
    ("432", "432030000"),
];

/// Convert a frequency reading in Hz into a band label.
///
/// Non-numeric readings and readings outside every band both yield
/// [`UNKNOWN_BAND`]. Fractional readings are truncated.
pub fn classify(reading: &str) -> &'static str {
    let hz = match parse_hz(reading) {
        Some(hz) => hz,
        None => return UNKNOWN_BAND,
    };

    // First range whose upper edge lies above the reading
    let idx = BAND_EDGES.partition_point(|&(_, high, _)| high <= hz);
    match BAND_EDGES.get(idx) {
        Some(&(low, high, label)) if hz > low && hz < high => label,
        _ => UNKNOWN_BAND,
    }
}

/// Parse a reading such as `"7030000"` or `"7030000.0"` into whole Hz
pub fn parse_hz(reading: &str) -> Option<u64> {
    let trimmed = reading.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(hz) = trimmed.parse::<u64>() {
        return Some(hz);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f.trunc() as u64),
        _ => None,
    }
}

/// Default frequency (Hz, as text) for a band label
pub fn default_freq(band: &str) -> Option<&'static str> {
    DEFAULT_FREQS
        .iter()
        .find(|(label, _)| *label == band)
        .map(|(_, freq)| *freq)
}

/// Whether `band` is a label this logger can store
pub fn is_band_label(band: &str) -> bool {
    band == UNKNOWN_BAND
        || BAND_EDGES.iter().any(|&(_, _, label)| label == band)
        || default_freq(band).is_some()
}

/// Band labels the operator may select by hand, lowest frequency first
pub fn selectable_bands() -> impl Iterator<Item = &'static str> {
    DEFAULT_FREQS.iter().map(|(label, _)| *label)
}
