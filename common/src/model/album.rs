use serde::{Deserialize, Serialize};

/// A music album as stored in the `album` table and returned by the
/// listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub artist: String,
    pub year: Option<i32>,
    pub best_of_compilation: bool,
}
