mod mp4;
mod y4m;

pub use mp4::{Mp4Carrier, MAX_BOX_PAYLOAD, VEILFORGE_UUID};
pub use y4m::Y4mCarrier;
