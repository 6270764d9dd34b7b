//! Background geometry: aspect-preserving resize followed by a biased horizontal crop.

pub mod fit;
