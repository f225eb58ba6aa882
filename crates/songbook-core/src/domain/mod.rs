pub mod ids;
pub mod query;
pub mod song;

pub use ids::SongId;
pub use query::{Pagination, SongFilter};
pub use song::{NewSong, Song, SongDetail};
