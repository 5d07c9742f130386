/// Square input resolution of the wheat disease classifier.
pub const DEFAULT_INPUT_SIZE: u32 = 256;

/// Colour planes in the model input (R, G, B).
pub const CHANNELS: usize = 3;
