//! Composite game actors built by composition: a player with a shape
//! delegate, an enemy swarm driven by [`EnemyRules`], and a boss.

mod boss;
mod enemies;
mod player;

pub use boss::Boss;
pub use enemies::{Enemies, EnemyRules};
pub use player::{Movement, Player, Scoreboard};
