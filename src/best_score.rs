//! Best-score persistence.
//!
//! The best score is a single `u32` that never decreases.  Storage sits
//! behind [`BestScoreStore`] so the game can run against the TOML file in
//! `saves/` or an in-memory store in tests.
//!
//! File format (`saves/best_score.toml` by default):
//!
//! ```toml
//! best = 2048
//! ```

use crate::config::{load_game_config, GameConfig};
use crate::error::{GameError, GameResult};
use crate::game_over::{periodic_game_over_sweep_system, GameOverReached};
use crate::menu::GameState;
use crate::merge::merge_items_system;
use crate::session::GameSession;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Somewhere the best score can be read from and written to.
pub trait BestScoreStore: Send + Sync {
    /// Stored best score; `Ok(0)` when nothing has been stored yet.
    fn load(&self) -> GameResult<u32>;
    fn save(&mut self, best: u32) -> GameResult<()>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct BestScoreFile {
    best: u32,
}

/// TOML file backend.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, err: impl std::fmt::Display) -> GameError {
        GameError::Storage {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl BestScoreStore for TomlFileStore {
    fn load(&self) -> GameResult<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.storage_error(e))?;
        let file: BestScoreFile = toml::from_str(&contents).map_err(|e| GameError::MalformedStore {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(file.best)
    }

    fn save(&mut self, best: u32) -> GameResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
        }
        let serialized =
            toml::to_string_pretty(&BestScoreFile { best }).map_err(|e| self.storage_error(e))?;
        fs::write(&self.path, serialized).map_err(|e| self.storage_error(e))
    }
}

/// Volatile backend, starts empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStore {
    pub best: u32,
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> GameResult<u32> {
        Ok(self.best)
    }

    fn save(&mut self, best: u32) -> GameResult<()> {
        self.best = best;
        Ok(())
    }
}

/// The store the game writes through.  Inserted at startup unless a test
/// already provided one.
#[derive(Resource)]
pub struct BestScoreStorage(pub Box<dyn BestScoreStore>);

/// In-memory best score shown on the HUD.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BestScore(pub u32);

impl BestScore {
    /// Raise the best to `score` if it is higher.  Returns `true` on a new
    /// record.
    #[inline]
    pub fn offer(&mut self, score: u32) -> bool {
        if score > self.0 {
            self.0 = score;
            true
        } else {
            false
        }
    }
}

pub struct BestScorePlugin;

impl Plugin for BestScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BestScore>()
            .add_systems(
                Startup,
                (init_best_score_storage, load_best_score_system)
                    .chain()
                    .after(load_game_config),
            )
            .add_message::<GameOverReached>()
            .add_systems(
                PostUpdate,
                (
                    track_best_score_system
                        .after(merge_items_system)
                        .run_if(in_state(GameState::Playing)),
                    record_final_score_system.after(periodic_game_over_sweep_system),
                ),
            );
    }
}

fn init_best_score_storage(
    mut commands: Commands,
    config: Res<GameConfig>,
    existing: Option<Res<BestScoreStorage>>,
) {
    if existing.is_none() {
        commands.insert_resource(BestScoreStorage(Box::new(TomlFileStore::new(
            &config.best_score_path,
        ))));
    }
}

/// Read the stored best score once at startup.  Failures start from zero.
pub fn load_best_score_system(storage: Res<BestScoreStorage>, mut best: ResMut<BestScore>) {
    match storage.0.load() {
        Ok(stored) => {
            best.0 = stored;
            info!("Best score: {stored}");
        }
        Err(e) => warn!("Could not load best score ({e}); starting from 0"),
    }
}

/// Raise and persist the best score whenever the session score passes it.
pub fn track_best_score_system(
    session: Res<GameSession>,
    mut best: ResMut<BestScore>,
    mut storage: ResMut<BestScoreStorage>,
) {
    if !session.is_changed() || !best.offer(session.score) {
        return;
    }
    debug!("New best score {}", best.0);
    if let Err(e) = storage.0.save(best.0) {
        warn!("Could not save best score: {e}");
    }
}

/// Offer each finished session's final score and persist the record it holds.
pub fn record_final_score_system(
    mut reached: MessageReader<GameOverReached>,
    mut best: ResMut<BestScore>,
    mut storage: ResMut<BestScoreStorage>,
) {
    for event in reached.read() {
        best.offer(event.final_score);
        info!("Session over: final score {}, best {}", event.final_score, best.0);
        // Flush the record this session set, even if a mid-session write failed.
        if event.final_score == 0 || event.final_score < best.0 {
            continue;
        }
        if let Err(e) = storage.0.save(best.0) {
            warn!("Could not save best score: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("duoduo-merge-{}-{name}", std::process::id()))
            .join("best_score.toml")
    }

    #[test]
    fn offer_never_lowers_the_best() {
        let mut best = BestScore(100);
        assert!(!best.offer(40));
        assert_eq!(best.0, 100);
        assert!(!best.offer(100));
        assert!(best.offer(101));
        assert_eq!(best.0, 101);
    }

    #[test]
    fn missing_file_loads_as_zero() {
        let store = TomlFileStore::new(temp_path("missing"));
        assert_eq!(store.load().expect("missing file is not an error"), 0);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let path = temp_path("persist");
        let mut store = TomlFileStore::new(&path);
        store.save(512).expect("save");

        let reopened = TomlFileStore::new(&path);
        assert_eq!(reopened.load().expect("load"), 512);

        let contents = fs::read_to_string(&path).expect("file written");
        assert!(contents.contains("best = 512"));
        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn garbage_file_is_malformed() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        fs::write(&path, "best = \"lots\"").expect("write");

        let err = TomlFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, GameError::MalformedStore { .. }));
        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn tracking_saves_only_new_records() {
        let mut world = World::new();
        world.insert_resource(GameSession::default());
        world.insert_resource(BestScore(10));
        world.insert_resource(BestScoreStorage(Box::new(MemoryStore { best: 10 })));
        let mut schedule = Schedule::default();
        schedule.add_systems(track_best_score_system);

        world.resource_mut::<GameSession>().award(8);
        schedule.run(&mut world);
        assert_eq!(world.resource::<BestScore>().0, 10);

        world.resource_mut::<GameSession>().award(8);
        schedule.run(&mut world);
        assert_eq!(world.resource::<BestScore>().0, 16);
        assert_eq!(world.resource::<BestScoreStorage>().0.load().expect("memory"), 16);
    }

    fn final_score_world(best: u32, stored: u32) -> (World, Schedule) {
        let mut world = World::new();
        world.init_resource::<Messages<GameOverReached>>();
        world.insert_resource(BestScore(best));
        world.insert_resource(BestScoreStorage(Box::new(MemoryStore { best: stored })));
        let mut schedule = Schedule::default();
        schedule.add_systems(record_final_score_system);
        (world, schedule)
    }

    #[test]
    fn final_score_record_is_persisted() {
        // The in-memory best already moved, but the file write never happened.
        let (mut world, mut schedule) = final_score_world(96, 40);
        world.write_message(GameOverReached { final_score: 96 });
        schedule.run(&mut world);

        assert_eq!(world.resource::<BestScore>().0, 96);
        assert_eq!(world.resource::<BestScoreStorage>().0.load().expect("memory"), 96);
    }

    #[test]
    fn final_score_below_best_leaves_the_store_alone() {
        let (mut world, mut schedule) = final_score_world(300, 300);
        world.write_message(GameOverReached { final_score: 120 });
        schedule.run(&mut world);

        assert_eq!(world.resource::<BestScore>().0, 300);
        assert_eq!(world.resource::<BestScoreStorage>().0.load().expect("memory"), 300);
    }

    #[test]
    fn final_score_raises_a_stale_best() {
        let (mut world, mut schedule) = final_score_world(10, 10);
        world.write_message(GameOverReached { final_score: 64 });
        schedule.run(&mut world);

        assert_eq!(world.resource::<BestScore>().0, 64);
        assert_eq!(world.resource::<BestScoreStorage>().0.load().expect("memory"), 64);
    }
}
