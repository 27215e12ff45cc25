// ADIF (Amateur Data Interchange Format) writer and band table
// Reference: https://adif.org/

pub mod writer;
pub mod bands;

pub use writer::write_adif;
pub use bands::{classify, default_freq, is_band_label, selectable_bands, UNKNOWN_BAND};
