pub mod decoder;
pub mod resample;
pub mod wav;

pub use decoder::{decode_clip_bytes, DecodeError, DecodedClip};
pub use resample::resample_stereo;
pub use wav::encode_wav;
