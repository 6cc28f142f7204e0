use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Player {
    pub player_id: i64,
    pub name: String,
    pub handicap: f64,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub tee: Option<String>,
}
