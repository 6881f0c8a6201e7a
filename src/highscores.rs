//! Personal best board
//!
//! Persisted to LocalStorage, tracks the top 10 survival scores on this device.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub score: u64,
    /// Which pet played the run
    #[serde(default)]
    pub pet_id: Option<String>,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score board, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "pet_dodge_highscores";

    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Record a finished run
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_score(&mut self, score: u64, pet_id: Option<&str>, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            pet_id: pet_id.map(str::to_owned),
            timestamp,
        };

        // Ties go below existing entries
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score so far, optionally for one pet only
    pub fn personal_best(&self, pet_id: Option<&str>) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| pet_id.is_none() || e.pet_id.as_deref() == pet_id)
            .map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut board = HighScores::new();
        assert_eq!(board.add_score(0, None, 1.0), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_sorted_descending_with_ranks() {
        let mut board = HighScores::new();
        assert_eq!(board.add_score(50, Some("rex"), 1.0), Some(1));
        assert_eq!(board.add_score(80, Some("rex"), 2.0), Some(1));
        assert_eq!(board.add_score(60, Some("tom"), 3.0), Some(2));
        assert_eq!(board.add_score(60, Some("rex"), 4.0), Some(3));

        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![80, 60, 60, 50]);
        assert_eq!(board.entries[1].pet_id.as_deref(), Some("tom"));
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = HighScores::new();
        for score in 1..=MAX_HIGH_SCORES as u64 {
            board.add_score(score * 10, None, 0.0);
        }
        assert!(!board.qualifies(10));
        assert_eq!(board.add_score(5, None, 0.0), None);
        assert_eq!(board.add_score(15, None, 0.0), Some(MAX_HIGH_SCORES));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_personal_best_per_pet() {
        let mut board = HighScores::new();
        board.add_score(30, Some("rex"), 0.0);
        board.add_score(90, Some("tom"), 0.0);
        assert_eq!(board.personal_best(None), Some(90));
        assert_eq!(board.personal_best(Some("rex")), Some(30));
        assert_eq!(board.personal_best(Some("kit")), None);
    }

    #[test]
    fn test_reads_entries_without_pet() {
        let board: HighScores =
            serde_json::from_str(r#"{"entries":[{"score":12,"timestamp":5.0}]}"#).unwrap();
        assert_eq!(board.entries[0].pet_id, None);
        assert_eq!(board.personal_best(None), Some(12));
    }
}
