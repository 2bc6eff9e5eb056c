pub mod map_archive;

pub use map_archive::{MapArchiveError, load_map_data_from_json_str, read_archive_into};
