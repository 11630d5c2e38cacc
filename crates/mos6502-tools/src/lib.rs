pub mod model;

pub use model::{is_mapped, load_raw_bin, read_u16, read_u8, split_ines, Image, InesHeader, Segment};
