//! Hit tests, damage application, and secondary effects.

use netbattle_core::{mitigated_damage, Event, OnHit, Side, TileCoord};

use crate::World;

impl World {
    /// Resolves projectile hits and due impacts, then compacts dead entities.
    pub(crate) fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.projectiles.len() {
            if !self.projectiles[index].alive {
                continue;
            }
            match self.projectiles[index].owner {
                Side::Virus => self.resolve_hostile_projectile(index, out_events),
                Side::Navi => self.resolve_friendly_projectile(index, out_events),
            }
        }

        for index in 0..self.impacts.len() {
            if !self.impacts[index].is_due() {
                continue;
            }
            let impact = &mut self.impacts[index];
            impact.alive = false;
            let (id, owner, damage) = (impact.id, impact.owner, impact.damage);
            let tiles = impact.tiles();
            for tile in &tiles {
                self.strike_tile(*tile, damage, owner, out_events);
            }
            out_events.push(Event::ImpactDetonated { impact: id, tiles });
        }

        self.projectiles.retain(|projectile| projectile.alive);
        self.impacts.retain(|impact| impact.alive);
    }

    fn resolve_hostile_projectile(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let projectile = &self.projectiles[index];
        if !projectile.overlaps(self.navi.tile) {
            return;
        }
        let damage = projectile.damage;
        if !projectile.pierce {
            self.projectiles[index].alive = false;
        }
        self.strike_navi(damage, out_events);
    }

    fn resolve_friendly_projectile(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let projectile = &self.projectiles[index];
        let (damage, on_hit, owner, pierce) = (
            projectile.damage,
            projectile.on_hit,
            projectile.owner,
            projectile.pierce,
        );
        let Some(target) = self
            .enemies
            .iter()
            .position(|enemy| enemy.alive && projectile.overlaps(enemy.tile))
        else {
            return;
        };

        if !pierce {
            self.projectiles[index].alive = false;
        }
        let struck = self.enemies[target].tile;
        self.strike_enemy(target, damage, out_events);
        self.apply_on_hit(on_hit, target, struck, damage, owner, out_events);
    }

    fn apply_on_hit(
        &mut self,
        on_hit: OnHit,
        target: usize,
        struck: TileCoord,
        damage: i32,
        owner: Side,
        out_events: &mut Vec<Event>,
    ) {
        let behind = struck.offset(owner.forward(), 0);
        match on_hit {
            OnHit::None => {}
            OnHit::Shotgun => self.strike_tile(behind, damage, owner, out_events),
            OnHit::Spreader { diagonals } => {
                self.strike_tile(behind, damage, owner, out_events);
                if diagonals {
                    self.strike_tile(behind.offset(0, -1), damage, owner, out_events);
                    self.strike_tile(behind.offset(0, 1), damage, owner, out_events);
                }
            }
            OnHit::AirShot { push } => self.push_enemy(target, push, owner, out_events),
        }
    }

    fn push_enemy(&mut self, target: usize, push: i32, owner: Side, out_events: &mut Vec<Event>) {
        let enemy = &self.enemies[target];
        if !enemy.alive {
            return;
        }
        let from = enemy.tile;
        let victim_side = owner.opponent();
        let pushed = from.offset(owner.forward().saturating_mul(push), 0);
        let destination = TileCoord::new(
            pushed
                .column()
                .clamp(victim_side.min_column(), victim_side.max_column()),
            from.row(),
        );
        if destination == from {
            return;
        }
        let blocked = self
            .enemies
            .iter()
            .enumerate()
            .any(|(index, other)| index != target && other.alive && other.tile == destination);
        if blocked {
            return;
        }
        self.enemies[target].tile = destination;
        out_events.push(Event::EnemyPushed {
            enemy: self.enemies[target].id,
            from,
            to: destination,
        });
    }

    /// Damages every combatant of the opposing side standing exactly on `tile`.
    ///
    /// Off-grid tiles are skipped.
    pub(crate) fn strike_tile(
        &mut self,
        tile: TileCoord,
        damage: i32,
        owner: Side,
        out_events: &mut Vec<Event>,
    ) {
        if !tile.in_bounds() {
            return;
        }
        match owner {
            Side::Navi => {
                for index in 0..self.enemies.len() {
                    if self.enemies[index].alive && self.enemies[index].tile == tile {
                        self.strike_enemy(index, damage, out_events);
                    }
                }
            }
            Side::Virus => {
                if self.navi.tile == tile {
                    self.strike_navi(damage, out_events);
                }
            }
        }
    }

    fn strike_navi(&mut self, raw: i32, out_events: &mut Vec<Event>) {
        if self.navi.is_invisible() {
            out_events.push(Event::HitBlocked);
            return;
        }
        let amount = mitigated_damage(raw, self.navi.stats.defense);
        let stats = &mut self.navi.stats;
        stats.hp = stats.hp.saturating_sub(amount).max(0);
        out_events.push(Event::NaviDamaged {
            amount,
            remaining: stats.hp,
        });
    }

    fn strike_enemy(&mut self, index: usize, raw: i32, out_events: &mut Vec<Event>) {
        let enemy = &mut self.enemies[index];
        if !enemy.alive {
            return;
        }
        let amount = mitigated_damage(raw, enemy.defense);
        enemy.hp = enemy.hp.saturating_sub(amount);
        out_events.push(Event::EnemyDamaged {
            enemy: enemy.id,
            amount,
            remaining: enemy.hp.max(0),
        });
        if enemy.hp <= 0 {
            enemy.hp = 0;
            enemy.alive = false;
            out_events.push(Event::EnemyDeleted { enemy: enemy.id });
        }
    }
}

