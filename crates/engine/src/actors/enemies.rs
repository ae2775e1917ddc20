use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::actors::{Boss, Player};
use crate::collision::{first_hit, intersects};
use crate::object::{Body, Entity, Handle};
use crate::screen::Screen;
use crate::entity_body;

/// Per-game behaviour of an [`Enemies`] swarm.
pub trait EnemyRules {
    /// Build one new enemy. It is added to the screen as a kid of the swarm.
    fn create_enemy(&mut self, screen: &mut Screen, player: &Player) -> Handle;

    /// An enemy was destroyed by one of the player's weapons.
    fn on_death(&mut self, _enemy: &Handle, player: &mut Player, _screen: &mut Screen) {
        player.add_score(1);
    }

    /// Extra enemies on top of the swarm's cap, e.g. growing with score.
    fn additional_enemies(&self, _player: &Player) -> usize {
        0
    }

    fn should_spawn_boss(&self, _player: &Player) -> bool {
        false
    }

    fn create_boss(&mut self, _screen: &mut Screen, _player: &Rc<RefCell<Player>>) -> Option<Boss> {
        None
    }

    fn on_boss_defeated(&mut self, player: &mut Player, _screen: &mut Screen) {
        player.add_score(10);
    }

    /// Whether a weapon that hits something is used up.
    fn consumes_weapons(&self) -> bool {
        true
    }
}

/// Spawns and referees enemies for a player.
///
/// Every render it resolves hits from the player's kids (first match wins),
/// kills the player on contact and tops the swarm up to its cap. Once the
/// player is gone the enemies fall off the screen.
pub struct Enemies {
    body: Body,
    player: Rc<RefCell<Player>>,
    rules: Box<dyn EnemyRules>,
    pub max_enemies: usize,
    boss: Option<Rc<RefCell<Boss>>>,
    boss_defeated: bool,
}

impl Enemies {
    pub fn new(player: Rc<RefCell<Player>>, rules: Box<dyn EnemyRules>, max_enemies: usize) -> Self {
        Self {
            body: Body::new(0.0, 0.0),
            player,
            rules,
            max_enemies,
            boss: None,
            boss_defeated: false,
        }
    }

    pub fn boss(&self) -> Option<&Rc<RefCell<Boss>>> {
        self.boss.as_ref()
    }

    /// Enemies currently alive, the boss excluded.
    pub fn count(&self) -> usize {
        self.body.kids.len() - usize::from(self.boss.is_some())
    }

    fn boss_handle(&self) -> Option<Handle> {
        self.boss.as_ref().map(|b| b.clone() as Handle)
    }

    fn is_boss(&self, h: &Handle) -> bool {
        self.boss_handle()
            .is_some_and(|b| crate::object::same(&b, h))
    }

    fn live_weapons(&self) -> Vec<Handle> {
        let Ok(player) = self.player.try_borrow() else {
            return Vec::new();
        };
        player
            .body()
            .all_kids()
            .into_iter()
            .filter(|k| k.try_borrow().map(|e| !e.body().expired).unwrap_or(false))
            .collect()
    }

    fn spend(&self, weapon: &Handle) {
        if !self.rules.consumes_weapons() {
            return;
        }
        if let Ok(mut w) = weapon.try_borrow_mut() {
            w.body_mut().expired = true;
            w.body_mut().hide();
        }
    }

    fn scatter(&mut self) {
        for kid in &self.body.kids {
            if let Ok(mut k) = kid.try_borrow_mut() {
                k.body_mut().y_delta += 0.5;
                k.body_mut().protected = false;
            }
        }
    }

    fn referee(&mut self, screen: &mut Screen) {
        let mut weapons = self.live_weapons();
        let player_coords = self.player.borrow().body().coords.clone();

        for enemy in self.body.kids.clone() {
            let coords = match enemy.try_borrow() {
                Ok(e) => e.body().coords.clone(),
                Err(_) => continue,
            };
            if let Some(weapon) = first_hit(&coords, &weapons).cloned() {
                self.spend(&weapon);
                if self.rules.consumes_weapons() {
                    weapons.retain(|w| !crate::object::same(w, &weapon));
                }
                if self.is_boss(&enemy) {
                    self.hit_boss(screen, &enemy);
                } else {
                    self.body.remove_kid(&enemy);
                    screen.remove(&enemy);
                    let mut player = self.player.borrow_mut();
                    self.rules.on_death(&enemy, &mut player, screen);
                }
                continue;
            }
            if intersects(&coords, &player_coords) {
                self.player.borrow_mut().destruct(screen);
                return;
            }
        }
    }

    fn hit_boss(&mut self, screen: &mut Screen, handle: &Handle) {
        let Some(boss) = self.boss.clone() else {
            return;
        };
        let defeated = {
            let mut b = boss.borrow_mut();
            b.hit();
            b.is_defeated()
        };
        if defeated {
            debug!("boss defeated");
            self.body.remove_kid(handle);
            screen.remove(handle);
            screen.clear_status("Boss");
            self.boss = None;
            self.boss_defeated = true;
            let mut player = self.player.borrow_mut();
            self.rules.on_boss_defeated(&mut player, screen);
        }
    }

    fn populate(&mut self, screen: &mut Screen) {
        if self.boss.is_none() && !self.boss_defeated {
            let wants_boss = self.rules.should_spawn_boss(&self.player.borrow());
            if wants_boss {
                if let Some(boss) = self.rules.create_boss(screen, &self.player) {
                    debug!("boss spawned");
                    let boss = Rc::new(RefCell::new(boss));
                    screen.spawn(&mut self.body, boss.clone());
                    self.boss = Some(boss);
                }
            }
        }

        let cap = self.max_enemies + self.rules.additional_enemies(&self.player.borrow());
        if self.count() < cap {
            let enemy = self.rules.create_enemy(screen, &self.player.borrow());
            screen.spawn(&mut self.body, enemy);
        }
    }
}

impl Entity for Enemies {
    entity_body!();

    fn render(&mut self, screen: &mut Screen) {
        self.advance(screen);
        // Enemies culled off screen leave our kid list on their own.
        self.body.kids.retain(|k| screen.contains(k));
        if self.boss.as_ref().is_some_and(|b| !screen.contains(&(b.clone() as Handle))) {
            self.boss = None;
        }

        if !self.player.borrow().is_active() {
            self.scatter();
            return;
        }
        self.referee(screen);
        if self.player.borrow().is_active() {
            self.populate(screen);
        }
    }

    fn is_out(&self) -> bool {
        false
    }
}
