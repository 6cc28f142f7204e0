pub mod claims;
pub mod leaderboard;
pub mod player;
pub mod score;
pub mod sync;
pub mod tournament;

pub use claims::*;
pub use leaderboard::*;
pub use player::*;
pub use score::*;
pub use sync::*;
pub use tournament::*;
