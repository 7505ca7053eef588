// Text layout: font descriptors, width measurement, greedy line packing, line markup.
// Everything here is synchronous and host-independent; the reflow module drives it.

pub mod font;
pub mod font_metrics;
pub mod markup;
pub mod measure;
pub mod packer;

pub use font::FontDescriptor;
pub use measure::MeasurementService;
pub use packer::pack;
