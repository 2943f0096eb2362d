mod package;
mod pdf;
mod text;

pub use package::{PackageCarrier, PAYLOAD_ENTRY};
pub use pdf::{PdfCarrier, MIN_SLOT_CAPACITY};
pub use text::TextCarrier;
